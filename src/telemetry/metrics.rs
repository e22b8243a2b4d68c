//! Prometheus metrics

use crate::execution::Outcome;
use ::metrics::{counter, gauge};
use metrics_exporter_prometheus::PrometheusBuilder;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use std::net::SocketAddr;

/// Serve metrics over HTTP on `port`
pub fn install_exporter(port: u16) -> anyhow::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .map_err(|e| anyhow::anyhow!("Failed to install metrics exporter: {}", e))?;

    tracing::info!(%addr, "Metrics exporter listening");
    Ok(())
}

/// Count a settled trade and add its profit to the running total
pub fn record_trade(outcome: Outcome, profit: Decimal) {
    counter!("digitdiff_trades_total", "outcome" => outcome.as_str()).increment(1);
    gauge!("digitdiff_net_profit").increment(profit.to_f64().unwrap_or(0.0));
}

/// Count a trade slot abandoned before a contract was placed
pub fn record_skipped_trade() {
    counter!("digitdiff_trades_skipped_total").increment(1);
}

/// Count one settlement status request
pub fn record_poll() {
    counter!("digitdiff_settlement_polls_total").increment(1);
}

/// Set the stake for the next trade
pub fn set_stake(stake: Decimal) {
    gauge!("digitdiff_stake").set(stake.to_f64().unwrap_or(0.0));
}
