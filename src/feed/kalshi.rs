//! Kalshi REST client for market quotes
//!
//! Polls the public markets endpoint. Kalshi prices arrive as integer cents
//! (1..=99 for a binary contract) and are converted to dollars here so the
//! rest of the crate only sees `Decimal` dollar amounts.

use super::{MarketFeed, MarketQuote};
use crate::account::{AccountFeed, RawBalance};
use crate::config::FeedConfig;
use async_trait::async_trait;
use reqwest::Client;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::time::Duration;

/// Default Kalshi API base URL
pub const KALSHI_API_URL: &str = "https://api.elections.kalshi.com/trade-api/v2";

/// Configuration for the Kalshi client
#[derive(Debug, Clone)]
pub struct KalshiFeedConfig {
    /// Base URL for the REST API
    pub base_url: String,
    /// Request timeout
    pub timeout: Duration,
    /// Maximum markets requested per call
    pub page_limit: usize,
}

impl Default for KalshiFeedConfig {
    fn default() -> Self {
        Self {
            base_url: KALSHI_API_URL.to_string(),
            timeout: Duration::from_secs(10),
            page_limit: 100,
        }
    }
}

impl From<&FeedConfig> for KalshiFeedConfig {
    fn from(config: &FeedConfig) -> Self {
        Self {
            base_url: config.base_url.clone(),
            timeout: Duration::from_secs(config.request_timeout_secs),
            page_limit: config.page_limit,
        }
    }
}

/// Client for the Kalshi markets endpoint
pub struct KalshiClient {
    config: KalshiFeedConfig,
    client: Client,
}

impl KalshiClient {
    /// Create a new client with default configuration
    pub fn new() -> Self {
        Self::with_config(KalshiFeedConfig::default())
    }

    /// Create a new client with custom configuration
    pub fn with_config(config: KalshiFeedConfig) -> Self {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .expect("Failed to create HTTP client");

        Self { config, client }
    }

    /// Convert a raw market entry to a quote, skipping unusable entries
    fn convert_to_quote(raw: RawMarket) -> Option<MarketQuote> {
        if raw.ticker.is_empty() {
            return None;
        }

        Some(MarketQuote {
            id: raw.ticker,
            title: raw.title.unwrap_or_default(),
            price: raw.last_price.map(cents_to_dollars),
            volume: raw.volume,
            open_interest: raw.open_interest,
        })
    }
}

#[async_trait]
impl MarketFeed for KalshiClient {
    async fn fetch_markets(&self) -> anyhow::Result<Vec<MarketQuote>> {
        let url = format!("{}/markets", self.config.base_url);

        tracing::debug!(url = %url, "Fetching markets from Kalshi API");

        let response = self
            .client
            .get(&url)
            .query(&[("limit", self.config.page_limit.to_string())])
            .query(&[("status", "open")])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Kalshi API error: {} - {}", status, body);
        }

        let payload: MarketsResponse = response.json().await?;

        let quotes: Vec<MarketQuote> = payload
            .markets
            .into_iter()
            .filter_map(Self::convert_to_quote)
            .collect();

        tracing::debug!(market_count = quotes.len(), "Fetched market quotes");

        Ok(quotes)
    }
}

#[async_trait]
impl AccountFeed for KalshiClient {
    async fn fetch_balance(&self) -> anyhow::Result<RawBalance> {
        let url = format!("{}/portfolio/balance", self.config.base_url);

        let response = self.client.get(&url).send().await?;
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Kalshi API error: {} - {}", status, body);
        }

        Ok(response.json().await?)
    }
}

impl Default for KalshiClient {
    fn default() -> Self {
        Self::new()
    }
}

/// Convert integer cents to a dollar amount
pub fn cents_to_dollars(cents: i64) -> Decimal {
    Decimal::new(cents, 2)
}

/// Markets list response
#[derive(Debug, Deserialize)]
struct MarketsResponse {
    #[serde(default)]
    markets: Vec<RawMarket>,
}

/// Raw market entry from the API
#[derive(Debug, Deserialize)]
struct RawMarket {
    /// Market ticker
    #[serde(default)]
    ticker: String,
    /// Market title
    title: Option<String>,
    /// Last traded price in cents
    last_price: Option<i64>,
    /// Contracts traded
    volume: Option<i64>,
    /// Open interest
    open_interest: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_client_creation() {
        let client = KalshiClient::new();
        assert_eq!(client.config.base_url, KALSHI_API_URL);
    }

    #[test]
    fn test_config_default() {
        let config = KalshiFeedConfig::default();
        assert_eq!(config.timeout, Duration::from_secs(10));
        assert_eq!(config.page_limit, 100);
    }

    #[test]
    fn test_config_from_feed_config() {
        let feed = FeedConfig {
            base_url: "https://test.example.com".to_string(),
            request_timeout_secs: 5,
            page_limit: 25,
        };
        let config = KalshiFeedConfig::from(&feed);
        assert_eq!(config.base_url, "https://test.example.com");
        assert_eq!(config.timeout, Duration::from_secs(5));
        assert_eq!(config.page_limit, 25);
    }

    #[test]
    fn test_cents_to_dollars() {
        assert_eq!(cents_to_dollars(67), dec!(0.67));
        assert_eq!(cents_to_dollars(100), dec!(1.00));
        assert_eq!(cents_to_dollars(0), dec!(0.00));
    }

    #[test]
    fn test_convert_to_quote() {
        let raw = RawMarket {
            ticker: "INXD-24AUG29-B5500".to_string(),
            title: Some("S&P above 5500?".to_string()),
            last_price: Some(42),
            volume: Some(1200),
            open_interest: Some(300),
        };

        let quote = KalshiClient::convert_to_quote(raw).unwrap();
        assert_eq!(quote.id, "INXD-24AUG29-B5500");
        assert_eq!(quote.price, Some(dec!(0.42)));
        assert_eq!(quote.volume, Some(1200));
    }

    #[test]
    fn test_convert_missing_ticker_skipped() {
        let raw = RawMarket {
            ticker: String::new(),
            title: None,
            last_price: Some(50),
            volume: None,
            open_interest: None,
        };
        assert!(KalshiClient::convert_to_quote(raw).is_none());
    }

    #[test]
    fn test_convert_without_price() {
        let raw = RawMarket {
            ticker: "NEWMKT".to_string(),
            title: None,
            last_price: None,
            volume: None,
            open_interest: None,
        };

        // Kept, but without a price; the aggregator skips it per tick
        let quote = KalshiClient::convert_to_quote(raw).unwrap();
        assert!(quote.price.is_none());
        assert_eq!(quote.title, "");
    }

    #[test]
    fn test_markets_response_parse() {
        let json = r#"{
            "markets": [
                {"ticker": "A", "title": "Market A", "last_price": 55, "volume": 10, "open_interest": 4},
                {"ticker": "B", "last_price": 31}
            ]
        }"#;

        let parsed: MarketsResponse = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.markets.len(), 2);
        assert_eq!(parsed.markets[0].last_price, Some(55));
        assert!(parsed.markets[1].title.is_none());
    }

    #[test]
    fn test_markets_response_missing_key() {
        let parsed: MarketsResponse = serde_json::from_str("{}").unwrap();
        assert!(parsed.markets.is_empty());
    }
}
