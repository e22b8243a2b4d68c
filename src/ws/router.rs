//! Inbound message router
//!
//! Reads frames off the socket and forwards every parsed JSON message, in
//! arrival order, into the session queue. It is the queue's only writer.

use super::types::RouterExit;
use futures_util::{Stream, StreamExt};
use serde_json::Value;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::{Error as TungsteniteError, Message};

/// Forward inbound text frames into `tx` until the stream ends or fails
pub async fn run_router<S>(mut read: S, tx: mpsc::UnboundedSender<Value>) -> RouterExit
where
    S: Stream<Item = Result<Message, TungsteniteError>> + Unpin,
{
    while let Some(frame) = read.next().await {
        match frame {
            Ok(Message::Text(text)) => match serde_json::from_str::<Value>(&text) {
                Ok(value) => {
                    if tx.send(value).is_err() {
                        tracing::debug!("Queue receiver dropped, stopping router");
                        return RouterExit::ReceiverDropped;
                    }
                }
                Err(e) => {
                    tracing::error!(error = %e, "Failed to parse inbound message");
                    return RouterExit::Failed(format!("invalid JSON: {}", e));
                }
            },
            Ok(Message::Close(frame)) => {
                tracing::info!(?frame, "Received close frame");
                return RouterExit::Closed;
            }
            // Binary, ping, pong
            Ok(_) => {}
            Err(TungsteniteError::ConnectionClosed) | Err(TungsteniteError::AlreadyClosed) => {
                tracing::info!("WebSocket connection closed");
                return RouterExit::Closed;
            }
            Err(e) => {
                tracing::error!(error = %e, "WebSocket read failed");
                return RouterExit::Failed(e.to_string());
            }
        }
    }

    tracing::info!("WebSocket stream ended");
    RouterExit::Closed
}
