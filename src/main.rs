use clap::Parser;
use kalshi_quant::cli::{Cli, Commands};
use kalshi_quant::config::Config;
use kalshi_quant::feed::{KalshiClient, KalshiFeedConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let config = Config::load(&cli.config).unwrap_or_else(|e| {
        eprintln!("Warning: Could not load config from {}: {}", cli.config, e);
        eprintln!("Using default configuration");
        toml::from_str(include_str!("../config.toml.example")).expect("Invalid default config")
    });

    // Initialize telemetry
    kalshi_quant::telemetry::init_telemetry(&config.telemetry)?;

    match cli.command {
        Commands::Stream(args) => {
            tracing::info!("Starting market data stream");
            args.execute(&config).await?;
        }
        Commands::Status => {
            let client = KalshiClient::with_config(KalshiFeedConfig::from(&config.feed));
            println!("kalshi-quant status");
            println!("  Feed:            {}", config.feed.base_url);
            println!("{}", kalshi_quant::account::balance_report(&client).await);
        }
        Commands::Config => {
            println!("Current configuration:");
            println!("  Feed: {}", config.feed.base_url);
            println!(
                "  Stream: every {}s, up to {} markets",
                config.stream.update_interval_secs, config.stream.max_markets_per_tick
            );
            println!("  Log level: {}", config.telemetry.log_level);
            match config.telemetry.metrics_port {
                Some(port) => println!("  Metrics: port {port}"),
                None => println!("  Metrics: disabled"),
            }
        }
    }

    Ok(())
}
