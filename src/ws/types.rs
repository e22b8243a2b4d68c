//! WebSocket types and configuration

use std::time::Duration;
use thiserror::Error;

/// WebSocket client configuration
#[derive(Debug, Clone)]
pub struct WsConfig {
    /// WebSocket URL to connect to
    pub url: String,
    /// Upper bound on a single connection handshake
    pub connect_timeout: Duration,
    /// Connection attempts before giving up (1 = no retry)
    pub max_connect_attempts: u32,
    /// Initial delay before the second attempt
    pub initial_reconnect_delay: Duration,
    /// Maximum delay between attempts
    pub max_reconnect_delay: Duration,
}

impl Default for WsConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            connect_timeout: Duration::from_secs(10),
            max_connect_attempts: 1,
            initial_reconnect_delay: Duration::from_secs(1),
            max_reconnect_delay: Duration::from_secs(30),
        }
    }
}

impl WsConfig {
    /// Create a new config with the given URL
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }

    /// Set the handshake timeout
    pub fn connect_timeout(mut self, d: Duration) -> Self {
        self.connect_timeout = d;
        self
    }

    /// Set maximum connection attempts
    pub fn max_connects(mut self, n: u32) -> Self {
        self.max_connect_attempts = n;
        self
    }

    /// Set initial reconnection delay
    pub fn initial_delay(mut self, d: Duration) -> Self {
        self.initial_reconnect_delay = d;
        self
    }

    /// Set maximum reconnection delay
    pub fn max_delay(mut self, d: Duration) -> Self {
        self.max_reconnect_delay = d;
        self
    }
}

/// How the message router task ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouterExit {
    /// Peer closed the connection or the stream ended
    Closed,
    /// The session queue was dropped
    ReceiverDropped,
    /// Unrecoverable read or parse error
    Failed(String),
    /// Aborted during session shutdown
    Cancelled,
}

impl RouterExit {
    /// True if the router stopped without a read or parse failure
    pub fn is_clean(&self) -> bool {
        !matches!(self, RouterExit::Failed(_))
    }
}

/// WebSocket errors
#[derive(Debug, Error)]
pub enum WsError {
    /// Connection failed
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),
    /// Handshake did not complete in time
    #[error("Connection timed out after {0:?}")]
    ConnectTimeout(Duration),
    /// Inbound queue closed (router stopped)
    #[error("Channel closed")]
    ChannelClosed,
    /// Send failed
    #[error("Send failed: {0}")]
    SendFailed(String),
    /// Nothing arrived on the queue in time
    #[error("No message received within {0:?}")]
    RecvTimeout(Duration),
    /// Outbound message could not be encoded
    #[error("Failed to encode message: {0}")]
    Encode(#[from] serde_json::Error),
}
