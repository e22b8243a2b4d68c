//! Predict command implementation

use clap::Args;

use crate::config::PredictionConfig;
use crate::prediction::{DigitHistory, DigitPredictor, FrequencyPredictor};

#[derive(Args, Debug)]
pub struct PredictArgs {
    /// Observed settlement digits, oldest first
    #[arg(value_parser = clap::value_parser!(u8).range(0..=9))]
    pub digits: Vec<u8>,

    /// Digit whose prediction just lost
    #[arg(short, long, value_parser = clap::value_parser!(u8).range(0..=9))]
    pub exclude: Option<u8>,
}

impl PredictArgs {
    pub fn execute(&self, config: &PredictionConfig) -> anyhow::Result<()> {
        let mut history = DigitHistory::new(config.history_capacity);
        history.extend(self.digits.iter().copied());

        let predictor = FrequencyPredictor::new(config.min_observations);
        let digit = predictor.predict(&history, self.exclude);

        println!("Observations: {}", history.len());
        println!("Counts: {:?}", history.counts());
        if history.len() < config.min_observations {
            println!(
                "  (fewer than {} observations, using smallest candidate)",
                config.min_observations
            );
        }
        println!("Prediction (digit differs): {}", digit);
        Ok(())
    }
}
