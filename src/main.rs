use anyhow::Context;
use clap::Parser;
use digitdiff_bot::cli::{Cli, Commands};
use digitdiff_bot::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenv::dotenv();
    let cli = Cli::parse();

    // Load configuration, falling back to the bundled example only when
    // the file is absent
    let config = Config::load_or_example(&cli.config)
        .with_context(|| format!("Could not load config from {}", cli.config))?;

    // Initialize telemetry
    let _telemetry = digitdiff_bot::telemetry::init_telemetry(&config.telemetry)?;

    match cli.command {
        Commands::Run(args) => {
            tracing::info!("Starting trading session");
            args.execute(config).await?;
        }
        Commands::Predict(args) => {
            args.execute(&config.prediction)?;
        }
        Commands::Config => {
            println!("Current configuration:");
            println!("  Endpoint: {}", config.api.ws_url());
            let token_state = if config.api.token().is_ok() {
                "set"
            } else {
                "not set"
            };
            println!("  Token: ${} ({})", config.api.api_token_env, token_state);
            println!(
                "  Contract: {} {} {}{} on {}",
                config.trading.contract_type,
                config.trading.currency,
                config.trading.duration,
                config.trading.duration_unit,
                config.trading.symbol
            );
            println!(
                "  Stake: base={}, growth={}, reset below {}x",
                config.trading.base_stake,
                config.trading.growth_factor,
                config.trading.loss_reset_fraction
            );
            println!(
                "  Session: {} trades, {}ms apart",
                config.trading.num_trades, config.trading.inter_trade_delay_ms
            );
            println!(
                "  Prediction: history={}, min observations={}",
                config.prediction.history_capacity, config.prediction.min_observations
            );
        }
    }

    Ok(())
}
