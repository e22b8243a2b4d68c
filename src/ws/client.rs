//! WebSocket client with bounded connection attempts

use super::session::{WsSession, WsStream};
use super::types::{WsConfig, WsError};
use tokio::time::{sleep, timeout};
use tokio_tungstenite::connect_async;

/// Opens WebSocket sessions against a single endpoint
#[derive(Debug, Clone)]
pub struct WsClient {
    config: WsConfig,
}

impl WsClient {
    /// Create a new WebSocket client with the given configuration
    pub fn new(config: WsConfig) -> Self {
        Self { config }
    }

    /// Create a new client with just a URL using default config
    pub fn with_url(url: impl Into<String>) -> Self {
        Self::new(WsConfig::new(url))
    }

    /// Get the configured URL
    pub fn url(&self) -> &str {
        &self.config.url
    }

    /// Connect and start the message router
    ///
    /// Retries with exponential backoff only when `max_connect_attempts`
    /// is greater than one. The returned session owns the router task.
    pub async fn connect(&self) -> Result<WsSession, WsError> {
        let max_attempts = self.config.max_connect_attempts.max(1);
        let mut attempts = 0;
        let mut delay = self.config.initial_reconnect_delay;

        loop {
            attempts += 1;
            match self.open().await {
                Ok(stream) => return Ok(WsSession::start(stream)),
                Err(e) if attempts >= max_attempts => {
                    tracing::error!(error = %e, attempts, "Unable to connect to WebSocket");
                    return Err(e);
                }
                Err(e) => {
                    tracing::warn!(
                        error = %e,
                        attempt = attempts,
                        "WebSocket connection failed, retrying..."
                    );
                    sleep(delay).await;
                    delay = (delay * 2).min(self.config.max_reconnect_delay);
                }
            }
        }
    }

    async fn open(&self) -> Result<WsStream, WsError> {
        tracing::info!(url = %self.config.url, "Connecting to WebSocket");

        let handshake = connect_async(&self.config.url);
        let (ws_stream, _response) = timeout(self.config.connect_timeout, handshake)
            .await
            .map_err(|_| WsError::ConnectTimeout(self.config.connect_timeout))?
            .map_err(|e| WsError::ConnectionFailed(e.to_string()))?;

        tracing::info!("WebSocket connected");
        Ok(ws_stream)
    }
}
