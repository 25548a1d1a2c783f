//! Configuration types for kalshi-quant

use serde::Deserialize;

/// Root configuration structure
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub feed: FeedConfig,
    #[serde(default)]
    pub stream: StreamConfig,
    pub telemetry: TelemetryConfig,
}

/// Market feed configuration
#[derive(Debug, Clone, Deserialize)]
pub struct FeedConfig {
    /// Base URL of the exchange REST API
    pub base_url: String,
    /// Per-request timeout in seconds
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    /// Maximum markets requested per page
    #[serde(default = "default_page_limit")]
    pub page_limit: usize,
}

/// Streaming/aggregation configuration
#[derive(Debug, Clone, Deserialize)]
pub struct StreamConfig {
    /// Seconds between polling cycles; zero is clamped to one second
    #[serde(default = "default_update_interval_secs")]
    pub update_interval_secs: u64,

    /// Per-tick cap on processed markets
    #[serde(default = "default_max_markets_per_tick")]
    pub max_markets_per_tick: usize,
}

/// Telemetry configuration
#[derive(Debug, Clone, Deserialize)]
pub struct TelemetryConfig {
    pub log_level: String,
    /// Prometheus scrape port; metrics are disabled when absent
    pub metrics_port: Option<u16>,
}

fn default_request_timeout_secs() -> u64 {
    10
}
fn default_page_limit() -> usize {
    100
}
fn default_update_interval_secs() -> u64 {
    30
}
fn default_max_markets_per_tick() -> usize {
    20
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            update_interval_secs: 30,
            max_markets_per_tick: 20,
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load(path: impl AsRef<std::path::Path>) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_deserialize() {
        let toml = r#"
            [feed]
            base_url = "https://api.elections.kalshi.com/trade-api/v2"
            request_timeout_secs = 5
            page_limit = 50

            [stream]
            update_interval_secs = 15
            max_markets_per_tick = 10

            [telemetry]
            log_level = "info"
            metrics_port = 9090
        "#;

        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.feed.page_limit, 50);
        assert_eq!(config.stream.update_interval_secs, 15);
        assert_eq!(config.telemetry.metrics_port, Some(9090));
    }

    #[test]
    fn test_stream_section_defaults() {
        let toml = r#"
            [feed]
            base_url = "https://example.com"

            [telemetry]
            log_level = "debug"
        "#;

        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.stream.update_interval_secs, 30);
        assert_eq!(config.stream.max_markets_per_tick, 20);
        assert_eq!(config.feed.request_timeout_secs, 10);
        assert!(config.telemetry.metrics_port.is_none());
    }

    #[test]
    fn test_config_load_nonexistent() {
        let result = Config::load("/nonexistent/path/config.toml");
        assert!(result.is_err());
    }

    #[test]
    fn test_config_clone() {
        let config = StreamConfig {
            update_interval_secs: 5,
            max_markets_per_tick: 3,
        };
        let cloned = config.clone();
        assert_eq!(config.max_markets_per_tick, cloned.max_markets_per_tick);
    }
}
