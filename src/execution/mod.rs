//! Execution module
//!
//! The trading session and the records it produces

mod orchestrator;
mod types;

pub use orchestrator::TradeOrchestrator;
pub use types::{Outcome, RunSummary, TradeRecord, UNKNOWN_DIGIT};

use crate::ws::WsError;
use std::time::Duration;
use thiserror::Error;

/// Errors that end a trading session
#[derive(Debug, Error)]
pub enum TradeError {
    /// Connection failed or the channel closed
    #[error("WebSocket error: {0}")]
    Ws(#[from] WsError),
    /// The API rejected the token
    #[error("Authorization failed: {0}")]
    Unauthorized(String),
    /// No response to a request that cannot be skipped
    #[error("Timed out after {timeout:?} waiting for {phase} response")]
    Timeout {
        phase: &'static str,
        timeout: Duration,
    },
}
