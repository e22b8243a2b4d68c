//! CLI interface for digitdiff-bot
//!
//! Provides subcommands for:
//! - `run`: Execute a trading session
//! - `predict`: Evaluate the digit heuristic offline
//! - `config`: Show configuration

mod predict;
mod run;

pub use predict::PredictArgs;
pub use run::RunArgs;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "digitdiff-bot")]
#[command(about = "Automated DIGITDIFF trading on the Deriv WebSocket API")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml")]
    pub config: String,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Execute a trading session
    Run(RunArgs),
    /// Predict the next barrier digit from a list of observed digits
    Predict(PredictArgs),
    /// Show configuration
    Config,
}
