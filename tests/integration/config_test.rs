//! Configuration loading tests

use digitdiff_bot::config::{Config, ConfigError};
use digitdiff_bot::execution::TradeOrchestrator;
use secrecy::SecretString;
use std::io::Write;

#[test]
fn test_example_config_loads_from_disk() {
    let example = include_str!("../../config.toml.example");
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(example.as_bytes()).unwrap();

    let config = tokio_test::assert_ok!(Config::load(file.path()));
    assert_eq!(config.trading.symbol, "R_50");
    assert_eq!(config.trading.contract_type, "DIGITDIFF");
    assert!(config.api.ws_url().starts_with("wss://"));
    assert!(config.api.ws_url().ends_with("app_id=1089"));
}

#[test]
fn test_orchestrator_starts_from_config() {
    let config = Config::example().unwrap();
    let orchestrator = TradeOrchestrator::from_config(&config, SecretString::new("t".into()));

    assert_eq!(orchestrator.stake().current(), config.trading.base_stake);
    assert_eq!(orchestrator.history().capacity(), config.prediction.history_capacity);
    assert!(orchestrator.records().is_empty());
}

#[test]
fn test_invalid_config_file_rejected() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(b"[api]\napp_id = 1\n").unwrap();
    assert!(Config::load(file.path()).is_err());
}

#[test]
fn test_invalid_config_file_is_not_replaced_by_example() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    let invalid = include_str!("../../config.toml.example")
        .replace("symbol = \"R_50\"", "symbol = \"R_100\"")
        .replace("base_stake = ", "base_stake = 0\n# was ");
    file.write_all(invalid.as_bytes()).unwrap();

    let result = Config::load_or_example(file.path());
    assert!(matches!(result, Err(ConfigError::Invalid(_))), "{:?}", result);
}

#[test]
fn test_unparsable_config_file_is_not_replaced_by_example() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(b"[trading\nsymbol = ").unwrap();

    let result = Config::load_or_example(file.path());
    assert!(matches!(result, Err(ConfigError::Parse(_))), "{:?}", result);
}

#[test]
fn test_missing_config_file_uses_example() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    let config = tokio_test::assert_ok!(Config::load_or_example(path));
    assert_eq!(config.trading.symbol, "R_50");
}
