//! WebSocket transport
//!
//! A client that opens one session per run, a router task that turns
//! inbound frames into a FIFO queue of JSON messages, and the session
//! handle the trading loop talks through.

mod client;
mod router;
mod session;
mod types;

pub use client::WsClient;
pub use router::run_router;
pub use session::{WsSession, WsStream};
pub use types::{RouterExit, WsConfig, WsError};
