//! Account reporting surface
//!
//! Reshapes raw exchange account payloads (integer cents, naming drift
//! across API versions) into typed dollar summaries. The account feed
//! itself is an external collaborator behind [`AccountFeed`].

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Narrow seam to the exchange account endpoints
#[async_trait]
pub trait AccountFeed: Send + Sync {
    /// Fetch the raw balance payload
    async fn fetch_balance(&self) -> anyhow::Result<RawBalance>;
}

/// Raw balance payload; field names vary across API revisions, so each
/// field tolerates the known aliases
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawBalance {
    #[serde(alias = "available_balance", alias = "cash_balance")]
    pub available_cash: Option<i64>,
    #[serde(alias = "equity", alias = "total_equity")]
    pub portfolio_value: Option<i64>,
    #[serde(alias = "unrealized_pl")]
    pub unrealized_pnl: Option<i64>,
    #[serde(alias = "realized_pl")]
    pub realized_pnl: Option<i64>,
}

/// Account balance in dollars
#[derive(Debug, Clone, Serialize)]
pub struct BalanceSummary {
    pub available: Option<Decimal>,
    pub total_equity: Option<Decimal>,
    pub unrealized_pnl: Option<Decimal>,
    pub realized_pnl: Option<Decimal>,
}

impl From<RawBalance> for BalanceSummary {
    fn from(raw: RawBalance) -> Self {
        Self {
            available: raw.available_cash.map(cents_to_dollars),
            total_equity: raw.portfolio_value.map(cents_to_dollars),
            unrealized_pnl: raw.unrealized_pnl.map(cents_to_dollars),
            realized_pnl: raw.realized_pnl.map(cents_to_dollars),
        }
    }
}

impl BalanceSummary {
    /// Render as indented status lines
    pub fn format_lines(&self) -> String {
        format!(
            "  Available:       {}\n  Total equity:    {}\n  Unrealized P&L:  {}\n  Realized P&L:    {}",
            format_money(self.available),
            format_money(self.total_equity),
            format_money(self.unrealized_pnl),
            format_money(self.realized_pnl),
        )
    }
}

/// Fetch the balance and render it for status output
///
/// A failed fetch degrades to an "unavailable" line; status must render
/// even when the exchange is unreachable or the client is unauthenticated.
pub async fn balance_report(feed: &dyn AccountFeed) -> String {
    match feed.fetch_balance().await {
        Ok(raw) => BalanceSummary::from(raw).format_lines(),
        Err(e) => {
            tracing::warn!(error = %e, "Balance fetch failed");
            format!("  Balance:         unavailable ({e})")
        }
    }
}

fn format_money(value: Option<Decimal>) -> String {
    match value {
        Some(v) => format!("${v:.2}"),
        None => "n/a".to_string(),
    }
}

fn cents_to_dollars(cents: i64) -> Decimal {
    Decimal::new(cents, 2)
}
