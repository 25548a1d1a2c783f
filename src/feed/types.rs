//! Market feed types

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One market's quote as delivered by the feed
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketQuote {
    /// Market ticker (e.g., "INXD-24AUG29-B5500")
    pub id: String,
    /// Human-readable market title
    pub title: String,
    /// Latest traded price in dollars; absent when the market has no print
    pub price: Option<Decimal>,
    /// Contracts traded
    pub volume: Option<i64>,
    /// Open interest
    pub open_interest: Option<i64>,
}
