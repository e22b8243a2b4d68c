//! Digit prediction
//!
//! Chooses the barrier digit for each DIGITDIFF trade from the recent
//! settlement digits.

mod frequency;
mod history;

pub use frequency::{predict_excluded_digit, FrequencyPredictor, DEFAULT_MIN_OBSERVATIONS};
pub use history::{DigitHistory, DEFAULT_HISTORY_CAPACITY};

/// Trait for barrier-digit predictors
pub trait DigitPredictor: Send + Sync {
    /// Digit (0-9) predicted NOT to be the next settlement digit
    fn predict(&self, history: &DigitHistory, exclude: Option<u8>) -> u8;
    /// Short name for logs
    fn name(&self) -> &'static str;
}
