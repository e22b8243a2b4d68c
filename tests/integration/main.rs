//! Integration tests

mod config_test;
mod session_test;
mod trading_test;
