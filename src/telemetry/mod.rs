//! Telemetry module
//!
//! Logging and metrics

mod logging;
mod metrics;

pub use self::logging::{init_logging, LogFormat};
pub use self::metrics::{install_exporter, record_poll, record_skipped_trade, record_trade, set_stake};

use crate::config::TelemetryConfig;

/// Guard that cleans up telemetry on drop
pub struct TelemetryGuard {
    _priv: (),
}

/// Initialize all telemetry subsystems
pub fn init_telemetry(config: &TelemetryConfig) -> anyhow::Result<TelemetryGuard> {
    init_logging(&config.log_level, config.log_format)?;

    if let Some(port) = config.metrics_port {
        install_exporter(port)?;
    }

    Ok(TelemetryGuard { _priv: () })
}
