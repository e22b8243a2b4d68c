//! Configuration types for digitdiff-bot
//!
//! Loaded from TOML. The API token is never stored in the file: `[api]`
//! names the environment variable that holds it.

use rust_decimal::Decimal;
use secrecy::SecretString;
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;

use crate::api::DERIV_WS_URL;
use crate::prediction::{DEFAULT_HISTORY_CAPACITY, DEFAULT_MIN_OBSERVATIONS};
use crate::telemetry::LogFormat;
use crate::ws::WsConfig;

/// Bundled example, used when no config file is found
const EXAMPLE_CONFIG: &str = include_str!("../config.toml.example");

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Invalid config: {0}")]
    Invalid(String),
    #[error("API token environment variable {0} is not set")]
    MissingToken(String),
}

/// Root configuration structure
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub api: ApiConfig,
    pub trading: TradingConfig,
    #[serde(default)]
    pub timing: TimingConfig,
    #[serde(default)]
    pub prediction: PredictionConfig,
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

/// API endpoint and credentials
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    pub app_id: String,
    /// Environment variable holding the API token
    #[serde(default = "default_token_env")]
    pub api_token_env: String,
    /// Full WebSocket URL, overrides endpoint and app_id
    #[serde(default)]
    pub url: Option<String>,
}

fn default_endpoint() -> String {
    DERIV_WS_URL.to_string()
}
fn default_token_env() -> String {
    "DERIV_API_TOKEN".to_string()
}

impl ApiConfig {
    /// WebSocket URL for this app id
    pub fn ws_url(&self) -> String {
        match &self.url {
            Some(url) => url.clone(),
            None => format!("{}?app_id={}", self.endpoint, self.app_id),
        }
    }

    /// Read the API token from the environment
    pub fn token(&self) -> Result<SecretString, ConfigError> {
        match std::env::var(&self.api_token_env) {
            Ok(token) if !token.trim().is_empty() => Ok(SecretString::new(token)),
            _ => Err(ConfigError::MissingToken(self.api_token_env.clone())),
        }
    }
}

/// Contract parameters and stake policy
#[derive(Debug, Clone, Deserialize)]
pub struct TradingConfig {
    /// Underlying symbol, e.g. R_50
    pub symbol: String,
    #[serde(default = "default_contract_type")]
    pub contract_type: String,
    pub currency: String,
    /// Contract length in `duration_unit`s
    pub duration: u32,
    #[serde(default = "default_duration_unit")]
    pub duration_unit: String,
    /// Trades per session
    pub num_trades: u32,
    pub base_stake: Decimal,
    /// Stake multiplier after a win
    #[serde(default = "default_growth_factor")]
    pub growth_factor: Decimal,
    /// Stake below base_stake * this is reset before trading
    #[serde(default = "default_loss_reset_fraction")]
    pub loss_reset_fraction: Decimal,
    #[serde(default = "default_inter_trade_delay_ms")]
    pub inter_trade_delay_ms: u64,
    /// Exit value key inside proposal_open_contract
    #[serde(default = "default_settlement_field")]
    pub settlement_field: String,
}

fn default_contract_type() -> String {
    "DIGITDIFF".to_string()
}
fn default_duration_unit() -> String {
    "t".to_string()
}
fn default_growth_factor() -> Decimal {
    Decimal::new(108, 2) // 1.08
}
fn default_loss_reset_fraction() -> Decimal {
    Decimal::new(5, 1) // 0.5
}
fn default_inter_trade_delay_ms() -> u64 {
    2500
}
fn default_settlement_field() -> String {
    "exit_tick".to_string()
}

impl TradingConfig {
    pub fn inter_trade_delay(&self) -> Duration {
        Duration::from_millis(self.inter_trade_delay_ms)
    }
}

/// Connection and response timing
#[derive(Debug, Clone, Deserialize)]
pub struct TimingConfig {
    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,
    /// 1 = single attempt, no retry
    #[serde(default = "default_max_connect_attempts")]
    pub max_connect_attempts: u32,
    #[serde(default = "default_auth_timeout_ms")]
    pub auth_timeout_ms: u64,
    #[serde(default = "default_ack_timeout_ms")]
    pub ack_timeout_ms: u64,
    /// Wait per settlement poll before asking again
    #[serde(default = "default_poll_timeout_ms")]
    pub poll_timeout_ms: u64,
    /// Pause between settlement polls
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
}

fn default_connect_timeout_ms() -> u64 {
    10_000
}
fn default_max_connect_attempts() -> u32 {
    1
}
fn default_auth_timeout_ms() -> u64 {
    10_000
}
fn default_ack_timeout_ms() -> u64 {
    10_000
}
fn default_poll_timeout_ms() -> u64 {
    5_000
}
fn default_poll_interval_ms() -> u64 {
    300
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            connect_timeout_ms: default_connect_timeout_ms(),
            max_connect_attempts: default_max_connect_attempts(),
            auth_timeout_ms: default_auth_timeout_ms(),
            ack_timeout_ms: default_ack_timeout_ms(),
            poll_timeout_ms: default_poll_timeout_ms(),
            poll_interval_ms: default_poll_interval_ms(),
        }
    }
}

impl TimingConfig {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    pub fn auth_timeout(&self) -> Duration {
        Duration::from_millis(self.auth_timeout_ms)
    }

    pub fn ack_timeout(&self) -> Duration {
        Duration::from_millis(self.ack_timeout_ms)
    }

    pub fn poll_timeout(&self) -> Duration {
        Duration::from_millis(self.poll_timeout_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

/// Digit history and heuristic settings
#[derive(Debug, Clone, Deserialize)]
pub struct PredictionConfig {
    #[serde(default = "default_history_capacity")]
    pub history_capacity: usize,
    /// Below this many digits the heuristic falls back to the smallest candidate
    #[serde(default = "default_min_observations")]
    pub min_observations: usize,
}

fn default_history_capacity() -> usize {
    DEFAULT_HISTORY_CAPACITY
}
fn default_min_observations() -> usize {
    DEFAULT_MIN_OBSERVATIONS
}

impl Default for PredictionConfig {
    fn default() -> Self {
        Self {
            history_capacity: DEFAULT_HISTORY_CAPACITY,
            min_observations: DEFAULT_MIN_OBSERVATIONS,
        }
    }
}

/// Telemetry configuration
#[derive(Debug, Clone, Deserialize)]
pub struct TelemetryConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default)]
    pub log_format: LogFormat,
    /// Serve Prometheus metrics on this port when set
    #[serde(default)]
    pub metrics_port: Option<u16>,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_format: LogFormat::default(),
            metrics_port: None,
        }
    }
}

impl Config {
    /// Load and validate configuration from a TOML file
    pub fn load(path: impl AsRef<std::path::Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parse and validate configuration from TOML text
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// The bundled example configuration
    pub fn example() -> Result<Self, ConfigError> {
        Self::from_toml(EXAMPLE_CONFIG)
    }

    /// Load `path`, or the bundled example if the file does not exist
    ///
    /// Any other failure, including a parse or validation error in an
    /// existing file, is returned as is.
    pub fn load_or_example(path: impl AsRef<std::path::Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        match Self::load(path) {
            Err(ConfigError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::warn!(
                    path = %path.display(),
                    "Config file not found, using bundled example"
                );
                Self::example()
            }
            other => other,
        }
    }

    /// Check values the trading loop relies on
    pub fn validate(&self) -> Result<(), ConfigError> {
        let t = &self.trading;
        if t.base_stake <= Decimal::ZERO {
            return Err(ConfigError::Invalid("trading.base_stake must be positive".into()));
        }
        if t.growth_factor < Decimal::ONE {
            return Err(ConfigError::Invalid("trading.growth_factor must be at least 1".into()));
        }
        if t.loss_reset_fraction <= Decimal::ZERO || t.loss_reset_fraction > Decimal::ONE {
            return Err(ConfigError::Invalid(
                "trading.loss_reset_fraction must be in (0, 1]".into(),
            ));
        }
        if t.num_trades == 0 {
            return Err(ConfigError::Invalid("trading.num_trades must be positive".into()));
        }
        if t.settlement_field.trim().is_empty() {
            return Err(ConfigError::Invalid("trading.settlement_field is empty".into()));
        }
        if self.prediction.history_capacity == 0 {
            return Err(ConfigError::Invalid(
                "prediction.history_capacity must be positive".into(),
            ));
        }
        Ok(())
    }

    /// WebSocket client settings for the configured endpoint
    pub fn ws_config(&self) -> WsConfig {
        WsConfig::new(self.api.ws_url())
            .connect_timeout(self.timing.connect_timeout())
            .max_connects(self.timing.max_connect_attempts)
    }
}
