//! WebSocket session and router lifecycle tests

use crate::mock_server::{MockServer, Reply};
use digitdiff_bot::ws::{RouterExit, WsClient, WsError};
use serde_json::{json, Value};
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::time::{timeout, Instant};
use tokio_tungstenite::accept_async;

#[tokio::test]
async fn test_session_request_response() {
    let server = MockServer::start(|request: &Value| {
        vec![Reply::Json(json!({"echo_req": request, "msg_type": "ping", "ping": "pong"}))]
    })
    .await;

    let mut session = WsClient::with_url(server.url()).connect().await.unwrap();
    session.send_json(&json!({"ping": 1})).await.unwrap();

    let reply = session.next_message(Duration::from_secs(2)).await.unwrap();
    assert_eq!(reply["ping"], "pong");
    assert_eq!(reply["echo_req"]["ping"], 1);

    assert_eq!(session.shutdown().await, RouterExit::Cancelled);
}

#[tokio::test]
async fn test_session_preserves_order() {
    let server = MockServer::start(|_: &Value| {
        (1..=5).map(|i| Reply::Json(json!({"seq": i}))).collect()
    })
    .await;

    let mut session = WsClient::with_url(server.url()).connect().await.unwrap();
    session.send_json(&json!({"go": 1})).await.unwrap();

    for expected in 1..=5 {
        let msg = session.next_message(Duration::from_secs(2)).await.unwrap();
        assert_eq!(msg["seq"], expected);
    }
    session.shutdown().await;
}

#[tokio::test]
async fn test_session_receive_timeout() {
    let server = MockServer::start(|_: &Value| vec![]).await;

    let mut session = WsClient::with_url(server.url()).connect().await.unwrap();
    let result = session.next_message(Duration::from_millis(50)).await;
    assert!(matches!(result, Err(WsError::RecvTimeout(_))));

    assert!(session.shutdown().await.is_clean());
}

#[tokio::test]
async fn test_router_ends_when_server_closes() {
    let server =
        MockServer::start(|_: &Value| vec![Reply::Json(json!({"last": true})), Reply::Close]).await;

    let mut session = WsClient::with_url(server.url()).connect().await.unwrap();
    session.send_json(&json!({"bye": 1})).await.unwrap();

    let msg = session.next_message(Duration::from_secs(2)).await.unwrap();
    assert_eq!(msg["last"], true);

    let result = session.next_message(Duration::from_secs(2)).await;
    assert!(matches!(result, Err(WsError::ChannelClosed)));

    // already finished, so the join reports how it ended
    assert_eq!(session.shutdown().await, RouterExit::Closed);
}

#[tokio::test]
async fn test_shutdown_bounded_when_peer_stops_reading() {
    // Completes the handshake, then never reads again
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let url = format!("ws://{}", listener.local_addr().unwrap());
    let peer = tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        let _ws = accept_async(stream).await.unwrap();
        tokio::time::sleep(Duration::from_secs(60)).await;
    });

    let mut session = WsClient::with_url(&url).connect().await.unwrap();

    // Fill the socket buffers until a send stalls
    let chunk = json!({"pad": "x".repeat(64 * 1024)});
    for _ in 0..2048 {
        match timeout(Duration::from_millis(100), session.send_json(&chunk)).await {
            Ok(Ok(())) => continue,
            _ => break,
        }
    }

    let started = Instant::now();
    let exit = session.shutdown_within(Duration::from_millis(200)).await;
    assert!(started.elapsed() < Duration::from_secs(2));
    assert_eq!(exit, RouterExit::Cancelled);

    peer.abort();
}
