//! A connected WebSocket session
//!
//! Outbound requests are written directly to the socket; inbound messages
//! arrive through the queue fed by the router task.

use super::router::run_router;
use super::types::{RouterExit, WsError};
use futures_util::stream::SplitSink;
use futures_util::{SinkExt, StreamExt};
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::timeout;
use tokio_tungstenite::{tungstenite::Message, MaybeTlsStream, WebSocketStream};

/// Longest wait for the close handshake on shutdown
pub const CLOSE_TIMEOUT: Duration = Duration::from_secs(5);

/// Client-side socket type
pub type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Write half plus the router-fed inbound queue
pub struct WsSession {
    writer: SplitSink<WsStream, Message>,
    queue: mpsc::UnboundedReceiver<Value>,
    router: JoinHandle<RouterExit>,
}

impl WsSession {
    /// Split the stream and spawn the router on the read half
    pub(crate) fn start(stream: WsStream) -> Self {
        let (writer, read) = stream.split();
        let (tx, queue) = mpsc::unbounded_channel();
        let router = tokio::spawn(run_router(read, tx));

        Self {
            writer,
            queue,
            router,
        }
    }

    /// Serialize and send one request
    pub async fn send_json<T: Serialize>(&mut self, message: &T) -> Result<(), WsError> {
        let text = serde_json::to_string(message)?;
        self.writer
            .send(Message::Text(text))
            .await
            .map_err(|e| WsError::SendFailed(e.to_string()))
    }

    /// Take the next queued message, waiting at most `wait`
    pub async fn next_message(&mut self, wait: Duration) -> Result<Value, WsError> {
        match timeout(wait, self.queue.recv()).await {
            Ok(Some(value)) => Ok(value),
            Ok(None) => Err(WsError::ChannelClosed),
            Err(_) => Err(WsError::RecvTimeout(wait)),
        }
    }

    /// Cancel the router, wait for it to finish, then close the socket
    pub async fn shutdown(self) -> RouterExit {
        self.shutdown_within(CLOSE_TIMEOUT).await
    }

    /// Like `shutdown`, giving the close handshake at most `close_wait`
    pub async fn shutdown_within(mut self, close_wait: Duration) -> RouterExit {
        self.router.abort();
        let exit = match self.router.await {
            Ok(exit) => exit,
            Err(e) if e.is_cancelled() => RouterExit::Cancelled,
            Err(e) => RouterExit::Failed(e.to_string()),
        };

        match timeout(close_wait, self.writer.close()).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => tracing::debug!(error = %e, "WebSocket close handshake failed"),
            Err(_) => tracing::warn!(wait = ?close_wait, "WebSocket close timed out"),
        }

        exit
    }
}
