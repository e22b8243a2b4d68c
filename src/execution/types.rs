//! Execution types

use crate::api::ContractId;
use crate::ws::RouterExit;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Reported in place of a settlement digit that could not be read
pub const UNKNOWN_DIGIT: i8 = -1;

/// Result of a settled contract
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Outcome {
    Won,
    Lost,
}

impl Outcome {
    /// Positive profit wins; zero or negative loses
    pub fn from_profit(profit: Decimal) -> Self {
        if profit > Decimal::ZERO {
            Outcome::Won
        } else {
            Outcome::Lost
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Outcome::Won => "WON",
            Outcome::Lost => "LOST",
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A completed trade
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TradeRecord {
    /// 1-based position in the session
    pub index: u32,
    pub contract_id: ContractId,
    /// Barrier digit we bet against
    pub prediction: u8,
    /// Last digit of the settlement value, if it could be read
    pub actual_digit: Option<u8>,
    pub outcome: Outcome,
    pub stake: Decimal,
    pub profit: Decimal,
    pub settled_at: DateTime<Utc>,
}

impl TradeRecord {
    /// Settlement digit, or [`UNKNOWN_DIGIT`]
    pub fn actual_digit_code(&self) -> i8 {
        self.actual_digit.map_or(UNKNOWN_DIGIT, |d| d as i8)
    }
}

/// Everything a finished session produced
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub run_id: Uuid,
    pub records: Vec<TradeRecord>,
    /// Trade slots abandoned before a contract was placed
    pub skipped: Vec<u32>,
    /// Session stopped by a shutdown signal
    pub interrupted: bool,
    pub final_stake: Decimal,
    /// Digit history at the end of the session, oldest first
    pub history: Vec<u8>,
    /// How the router ended; `None` if no connection was made
    pub router_exit: Option<RouterExit>,
}

impl RunSummary {
    pub fn wins(&self) -> usize {
        self.count(Outcome::Won)
    }

    pub fn losses(&self) -> usize {
        self.count(Outcome::Lost)
    }

    pub fn net_profit(&self) -> Decimal {
        self.records.iter().map(|r| r.profit).sum()
    }

    /// Fraction of settled trades won, zero when none settled
    pub fn win_rate(&self) -> Decimal {
        if self.records.is_empty() {
            return Decimal::ZERO;
        }
        (Decimal::from(self.wins()) / Decimal::from(self.records.len())).round_dp(4)
    }

    fn count(&self, outcome: Outcome) -> usize {
        self.records.iter().filter(|r| r.outcome == outcome).count()
    }

    /// Log the totals followed by one line per trade
    pub fn log(&self) {
        tracing::info!(
            run_id = %self.run_id,
            trades = self.records.len(),
            wins = self.wins(),
            losses = self.losses(),
            skipped = self.skipped.len(),
            net_profit = %self.net_profit(),
            win_rate = %self.win_rate(),
            final_stake = %self.final_stake,
            interrupted = self.interrupted,
            "Session summary"
        );

        for record in &self.records {
            tracing::info!(
                trade = record.index,
                contract_id = %record.contract_id,
                prediction = record.prediction,
                digit = record.actual_digit_code(),
                outcome = %record.outcome,
                stake = %record.stake,
                profit = %record.profit,
                "Trade record"
            );
        }
    }
}
