//! End-to-end trading sessions against the mock server

use crate::mock_server::{MockServer, Reply};
use digitdiff_bot::config::Config;
use digitdiff_bot::execution::{Outcome, TradeError, TradeOrchestrator, UNKNOWN_DIGIT};
use digitdiff_bot::ws::WsError;
use rust_decimal_macros::dec;
use secrecy::SecretString;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::time::Duration;

fn config(url: &str, trades: u32) -> Config {
    Config::from_toml(&format!(
        r#"
        [api]
        app_id = "1"
        url = "{url}"

        [trading]
        symbol = "R_50"
        currency = "USD"
        duration = 1
        num_trades = {trades}
        base_stake = 100
        inter_trade_delay_ms = 0

        [timing]
        auth_timeout_ms = 2000
        ack_timeout_ms = 2000
        poll_timeout_ms = 500
        poll_interval_ms = 5
        "#
    ))
    .unwrap()
}

fn orchestrator(server: &MockServer, trades: u32) -> TradeOrchestrator {
    TradeOrchestrator::from_config(
        &config(server.url(), trades),
        SecretString::new("test-token".into()),
    )
}

fn tick() -> Reply {
    Reply::Json(json!({"msg_type": "tick", "tick": {"symbol": "R_50", "quote": 1234.5}}))
}

fn authorized() -> Reply {
    Reply::Json(json!({
        "msg_type": "authorize",
        "authorize": {"loginid": "VRTC100", "currency": "USD", "balance": 10000}
    }))
}

fn bought(contract_id: u64) -> Reply {
    Reply::Json(json!({
        "msg_type": "buy",
        "buy": {"contract_id": contract_id, "buy_price": 100}
    }))
}

fn contract(contract_id: u64, sold: bool, profit: f64, exit: Option<&str>) -> Reply {
    let mut poc = json!({
        "contract_id": contract_id,
        "is_sold": if sold { 1 } else { 0 },
        "profit": profit,
    });
    if let Some(exit) = exit {
        poc["exit_tick"] = json!(exit);
    }
    Reply::Json(json!({"msg_type": "proposal_open_contract", "proposal_open_contract": poc}))
}

/// Accepts every buy; each contract is sold on its second status poll
fn deriv(profit: f64, exit: Option<&'static str>) -> impl FnMut(&Value) -> Vec<Reply> + Send {
    let mut next_id = 100;
    let mut polls: HashMap<u64, u32> = HashMap::new();

    move |request| {
        if request.get("authorize").is_some() {
            vec![tick(), authorized()]
        } else if request.get("buy").is_some() {
            next_id += 1;
            vec![tick(), bought(next_id)]
        } else if let Some(id) = request.get("contract_id").and_then(Value::as_u64) {
            let n = polls.entry(id).or_insert(0);
            *n += 1;
            if *n == 1 {
                vec![contract(id, false, 0.0, None)]
            } else {
                vec![contract(id, true, profit, exit)]
            }
        } else {
            vec![]
        }
    }
}

fn barriers(server: &MockServer) -> Vec<String> {
    server
        .requests_with("buy")
        .iter()
        .map(|r| r["parameters"]["barrier"].as_str().unwrap().to_string())
        .collect()
}

fn amounts(server: &MockServer) -> Vec<f64> {
    server
        .requests_with("buy")
        .iter()
        .map(|r| r["parameters"]["amount"].as_f64().unwrap())
        .collect()
}

#[tokio::test]
async fn test_three_winning_trades() {
    let server = MockServer::start(deriv(5.0, Some("1234"))).await;

    let summary = orchestrator(&server, 3).run().await.unwrap();

    assert_eq!(summary.records.len(), 3);
    for (i, record) in summary.records.iter().enumerate() {
        assert_eq!(record.index, i as u32 + 1);
        assert_eq!(record.outcome, Outcome::Won);
        assert_eq!(record.actual_digit, Some(4));
        assert_eq!(record.profit, dec!(5));
    }
    assert_eq!(summary.history, vec![4, 4, 4]);
    assert_eq!(summary.final_stake, dec!(125.97));
    assert_eq!(summary.wins(), 3);
    assert!(summary.skipped.is_empty());
    assert!(!summary.interrupted);

    // stake grows by 1.08 per win
    let amounts = amounts(&server);
    assert_eq!(amounts.len(), 3);
    assert!((amounts[0] - 100.0).abs() < 1e-9);
    assert!((amounts[1] - 108.0).abs() < 1e-9);
    assert!((amounts[2] - 116.64).abs() < 1e-9);
    assert_eq!(barriers(&server), vec!["0", "0", "0"]);

    let requests = server.requests();
    assert_eq!(requests[0], json!({"authorize": "test-token"}));
    assert_eq!(
        server.requests_with("proposal_open_contract").len(),
        6,
        "two polls per contract"
    );

    let exit = summary.router_exit.expect("router ran");
    assert!(exit.is_clean(), "router ended with {:?}", exit);
}

#[tokio::test]
async fn test_loss_resets_stake_and_excludes_digit() {
    let server = MockServer::start(deriv(-100.0, Some("1230"))).await;

    let summary = orchestrator(&server, 3).run().await.unwrap();

    assert!(summary.records.iter().all(|r| r.outcome == Outcome::Lost));
    assert_eq!(summary.final_stake, dec!(100));
    assert_eq!(summary.net_profit(), dec!(-300));
    // each losing prediction is excluded from the next trade
    assert_eq!(barriers(&server), vec!["0", "1", "0"]);
    assert_eq!(amounts(&server), vec![100.0, 100.0, 100.0]);
}

#[tokio::test]
async fn test_missing_settlement_value() {
    let server = MockServer::start(deriv(5.0, None)).await;

    let summary = orchestrator(&server, 1).run().await.unwrap();

    assert_eq!(summary.records.len(), 1);
    assert_eq!(summary.records[0].actual_digit, None);
    assert_eq!(summary.records[0].actual_digit_code(), UNKNOWN_DIGIT);
    assert_eq!(summary.records[0].outcome, Outcome::Won);
    assert!(summary.history.is_empty());
}

#[tokio::test]
async fn test_authorization_error_aborts() {
    let server = MockServer::start(|request: &Value| {
        if request.get("authorize").is_some() {
            vec![Reply::Json(json!({
                "msg_type": "authorize",
                "error": {"code": "InvalidToken", "message": "The token is invalid."}
            }))]
        } else {
            vec![]
        }
    })
    .await;

    let result = orchestrator(&server, 3).run().await;

    match result {
        Err(TradeError::Unauthorized(message)) => assert_eq!(message, "The token is invalid."),
        other => panic!("expected authorization failure, got {:?}", other),
    }
    assert!(server.requests_with("buy").is_empty());
}

#[tokio::test]
async fn test_authorization_timeout_aborts() {
    let server = MockServer::start(|_: &Value| vec![tick()]).await;

    let mut config = config(server.url(), 1);
    config.timing.auth_timeout_ms = 200;
    let orchestrator =
        TradeOrchestrator::from_config(&config, SecretString::new("test-token".into()));

    let result = orchestrator.run().await;
    assert!(matches!(
        result,
        Err(TradeError::Timeout { phase: "authorize", .. })
    ));
}

#[tokio::test]
async fn test_unacknowledged_buys_are_skipped() {
    let mut inner = deriv(5.0, Some("1237"));
    let mut buys = 0;
    let server = MockServer::start(move |request: &Value| {
        if request.get("buy").is_some() {
            buys += 1;
            match buys {
                1 => return vec![Reply::Json(json!({"msg_type": "buy", "echo_req": request}))],
                2 => {
                    return vec![Reply::Json(json!({
                        "msg_type": "buy",
                        "error": {"code": "InsufficientBalance", "message": "Balance too low."}
                    }))]
                }
                _ => {}
            }
        }
        inner(request)
    })
    .await;

    let summary = orchestrator(&server, 3).run().await.unwrap();

    assert_eq!(summary.skipped, vec![1, 2]);
    assert_eq!(summary.records.len(), 1);
    assert_eq!(summary.records[0].index, 3);
    assert_eq!(summary.records[0].actual_digit, Some(7));
    // skipped slots leave the stake alone
    assert_eq!(amounts(&server), vec![100.0, 100.0, 100.0]);
}

#[tokio::test]
async fn test_interrupt_stops_polling() {
    // contracts never settle
    let server = MockServer::start(|request: &Value| {
        if request.get("authorize").is_some() {
            vec![authorized()]
        } else if request.get("buy").is_some() {
            vec![bought(1)]
        } else {
            vec![contract(1, false, 0.0, None)]
        }
    })
    .await;

    let summary = orchestrator(&server, 1)
        .run_until(tokio::time::sleep(Duration::from_millis(300)))
        .await
        .unwrap();

    assert!(summary.interrupted);
    assert!(summary.records.is_empty());
    assert!(server.requests_with("proposal_open_contract").len() > 1);
    assert!(summary.router_exit.expect("router ran").is_clean());
}

#[tokio::test]
async fn test_server_close_during_poll_is_fatal() {
    let server = MockServer::start(|request: &Value| {
        if request.get("authorize").is_some() {
            vec![authorized()]
        } else if request.get("buy").is_some() {
            vec![bought(1)]
        } else {
            vec![Reply::Close]
        }
    })
    .await;

    let result = orchestrator(&server, 1).run().await;
    assert!(matches!(result, Err(TradeError::Ws(_))));
}

#[tokio::test]
async fn test_invalid_frame_stops_router() {
    let server = MockServer::start(|request: &Value| {
        if request.get("authorize").is_some() {
            vec![Reply::Raw("<html>bad gateway</html>".into())]
        } else {
            vec![]
        }
    })
    .await;

    let result = orchestrator(&server, 1).run().await;
    assert!(matches!(result, Err(TradeError::Ws(WsError::ChannelClosed))));
}

#[tokio::test]
async fn test_silent_buy_is_skipped_and_silent_poll_is_retried() {
    let mut buys = 0;
    let mut polls = 0;
    let server = MockServer::start(move |request: &Value| {
        if request.get("authorize").is_some() {
            vec![authorized()]
        } else if request.get("buy").is_some() {
            buys += 1;
            if buys == 1 {
                vec![]
            } else {
                vec![bought(7)]
            }
        } else if request.get("proposal_open_contract").is_some() {
            polls += 1;
            if polls == 1 {
                vec![]
            } else {
                vec![contract(7, true, 5.0, Some("1232"))]
            }
        } else {
            vec![]
        }
    })
    .await;

    let mut config = config(server.url(), 2);
    config.timing.ack_timeout_ms = 200;
    config.timing.poll_timeout_ms = 200;
    let orchestrator =
        TradeOrchestrator::from_config(&config, SecretString::new("test-token".into()));

    let summary = orchestrator.run().await.unwrap();

    assert_eq!(summary.skipped, vec![1]);
    assert_eq!(summary.records.len(), 1);
    assert_eq!(summary.records[0].index, 2);
    assert_eq!(summary.records[0].actual_digit, Some(2));
    assert_eq!(server.requests_with("buy").len(), 2);
    assert_eq!(server.requests_with("proposal_open_contract").len(), 2);
}
