//! Run command implementation

use clap::Args;

use crate::config::Config;
use crate::execution::TradeOrchestrator;

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Number of trades, overrides trading.num_trades
    #[arg(short = 'n', long)]
    pub trades: Option<u32>,

    /// WebSocket URL, overrides the configured endpoint
    #[arg(long)]
    pub url: Option<String>,

    /// Print trade records as JSON when the session ends
    #[arg(long)]
    pub json: bool,
}

impl RunArgs {
    pub async fn execute(&self, mut config: Config) -> anyhow::Result<()> {
        if let Some(trades) = self.trades {
            config.trading.num_trades = trades;
        }
        if let Some(url) = &self.url {
            config.api.url = Some(url.clone());
        }
        config.validate()?;

        let token = config.api.token()?;
        let orchestrator = TradeOrchestrator::from_config(&config, token);

        let summary = orchestrator.run_until(ctrl_c()).await?;

        if self.json {
            println!("{}", serde_json::to_string_pretty(&summary.records)?);
        }
        Ok(())
    }
}

/// Resolves on Ctrl-C; never resolves if the handler can't be installed
async fn ctrl_c() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("Received Ctrl-C"),
        Err(e) => {
            tracing::error!(error = %e, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    }
}
