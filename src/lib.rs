//! digitdiff-bot: automated DIGITDIFF trading on the Deriv WebSocket API
//!
//! This library provides the core components for:
//! - WebSocket session with a background message router
//! - Request/response shapes for authorize, buy and contract status
//! - Least-frequent-digit prediction over a bounded digit history
//! - Martingale-style stake sizing with a loss-reset floor
//! - The sequential trading session that ties them together
//! - Logging and Prometheus metrics

pub mod api;
pub mod cli;
pub mod config;
pub mod execution;
pub mod prediction;
pub mod risk;
pub mod telemetry;
pub mod ws;
