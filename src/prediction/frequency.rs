//! Least-frequent digit heuristic

use super::{DigitHistory, DigitPredictor};

/// Observations required before counts are trusted
pub const DEFAULT_MIN_OBSERVATIONS: usize = 20;

/// Pick the digit least likely to settle next, by recent frequency
///
/// `exclude` (the prediction that just lost) is never returned. With fewer
/// than `min_observations` digits the smallest remaining candidate is used.
/// Ties go to the smallest digit.
pub fn predict_excluded_digit(
    history: &DigitHistory,
    exclude: Option<u8>,
    min_observations: usize,
) -> u8 {
    let candidates: Vec<u8> = (0..=9).filter(|d| Some(*d) != exclude).collect();

    let Some(&smallest) = candidates.first() else {
        return 0;
    };
    if history.len() < min_observations {
        return smallest;
    }

    let counts = history.counts();
    candidates
        .into_iter()
        .min_by_key(|&d| (counts[d as usize], d))
        .unwrap_or(0)
}

/// [`predict_excluded_digit`] behind the predictor trait
#[derive(Debug, Clone)]
pub struct FrequencyPredictor {
    min_observations: usize,
}

impl FrequencyPredictor {
    pub fn new(min_observations: usize) -> Self {
        Self { min_observations }
    }

    pub fn min_observations(&self) -> usize {
        self.min_observations
    }
}

impl Default for FrequencyPredictor {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_OBSERVATIONS)
    }
}

impl DigitPredictor for FrequencyPredictor {
    fn predict(&self, history: &DigitHistory, exclude: Option<u8>) -> u8 {
        predict_excluded_digit(history, exclude, self.min_observations)
    }

    fn name(&self) -> &'static str {
        "frequency"
    }
}
