//! CLI interface for kalshi-quant
//!
//! Provides subcommands for:
//! - `stream`: Run the market data aggregator until interrupted
//! - `status`: Show current state
//! - `config`: Show configuration

mod stream;

pub use stream::StreamArgs;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "kalshi-quant")]
#[command(about = "Market data streaming and performance analytics for Kalshi event contracts")]
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
    /// Run the market data aggregator until interrupted
    Stream(StreamArgs),
    /// Show current state
    Status,
    /// Show configuration
    Config,
}
