//! Market feed module
//!
//! Narrow seam to the exchange: "fetch current markets". The aggregator only
//! ever talks to the [`MarketFeed`] trait, so tests and other venues can
//! plug in their own source.

mod kalshi;
mod types;

pub use kalshi::{KalshiClient, KalshiFeedConfig};
pub use types::MarketQuote;

use async_trait::async_trait;

/// Trait for market quote sources
#[async_trait]
pub trait MarketFeed: Send + Sync {
    /// Fetch the current list of markets with their latest quotes
    async fn fetch_markets(&self) -> anyhow::Result<Vec<MarketQuote>>;
}
