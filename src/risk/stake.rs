//! Martingale-style stake sizing
//!
//! Grows the stake by a fixed factor after every win and drops back to
//! the base stake after a loss. The digit that just lost is remembered so
//! the next prediction can avoid it.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::config::TradingConfig;
use crate::execution::Outcome;

/// Decimal places stakes are rounded to
pub const STAKE_PRECISION: u32 = 2;

/// Current stake and the last losing prediction
#[derive(Debug, Clone)]
pub struct StakeManager {
    base_stake: Decimal,
    current: Decimal,
    growth_factor: Decimal,
    loss_reset_fraction: Decimal,
    last_losing_prediction: Option<u8>,
}

impl StakeManager {
    /// Create a manager starting at `base_stake`
    pub fn new(base_stake: Decimal, growth_factor: Decimal, loss_reset_fraction: Decimal) -> Self {
        Self {
            base_stake,
            current: base_stake,
            growth_factor,
            loss_reset_fraction,
            last_losing_prediction: None,
        }
    }

    /// Create from TradingConfig
    pub fn from_config(config: &TradingConfig) -> Self {
        Self::new(
            config.base_stake,
            config.growth_factor,
            config.loss_reset_fraction,
        )
    }

    pub fn current(&self) -> Decimal {
        self.current
    }

    pub fn base_stake(&self) -> Decimal {
        self.base_stake
    }

    pub fn last_losing_prediction(&self) -> Option<u8> {
        self.last_losing_prediction
    }

    /// Lowest stake allowed before the guard resets it
    pub fn floor(&self) -> Decimal {
        self.base_stake * self.loss_reset_fraction
    }

    /// Pre-trade check: reset to the base stake if below the floor
    ///
    /// Returns true if a reset happened.
    pub fn guard(&mut self) -> bool {
        if self.current >= self.floor() {
            return false;
        }

        tracing::warn!(
            stake = %self.current,
            floor = %self.floor(),
            base_stake = %self.base_stake,
            "Stake below loss-reset floor, resetting"
        );
        self.current = self.base_stake;
        true
    }

    /// Apply a settled trade and return the stake for the next one
    pub fn record(&mut self, outcome: Outcome, prediction: u8) -> Decimal {
        match outcome {
            Outcome::Won => {
                self.current = match self.current.checked_mul(self.growth_factor) {
                    Some(next) => next.round_dp(STAKE_PRECISION),
                    None => {
                        tracing::warn!(
                            stake = %self.current,
                            growth_factor = %self.growth_factor,
                            "Stake growth overflowed, resetting to base stake"
                        );
                        self.base_stake
                    }
                };
                self.last_losing_prediction = None;
            }
            Outcome::Lost => {
                self.current = self.base_stake;
                self.last_losing_prediction = Some(prediction);
            }
        }
        self.current
    }
}

impl Default for StakeManager {
    fn default() -> Self {
        Self::new(dec!(100), dec!(1.08), dec!(0.5))
    }
}
