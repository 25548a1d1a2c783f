//! Trade record types

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Trade direction
///
/// A closed enum: malformed side strings fail at parse time instead of
/// being silently treated as a sell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Buy,
    Sell,
}

/// Error parsing a trade side
#[derive(Debug, Error, PartialEq, Eq)]
#[error("Unknown trade side: {0}")]
pub struct ParseSideError(pub String);

impl FromStr for Side {
    type Err = ParseSideError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "buy" => Ok(Side::Buy),
            "sell" => Ok(Side::Sell),
            other => Err(ParseSideError(other.to_string())),
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Buy => write!(f, "buy"),
            Side::Sell => write!(f, "sell"),
        }
    }
}

/// One open or closed position
///
/// Entry fields are fixed at recording time; exit fields are set exactly
/// once when the trade closes. P&L fields are present if and only if the
/// trade is closed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TradeRecord {
    /// Caller-supplied unique identifier
    pub trade_id: String,
    /// Market the trade was placed in
    pub market_id: String,
    /// Strategy tag that produced the trade
    pub strategy: String,
    /// Trade direction
    pub side: Side,
    /// Contracts traded
    pub quantity: u32,
    /// Entry price per contract
    pub entry_price: Decimal,
    /// When the trade was opened
    pub entry_time: DateTime<Utc>,
    /// Strategy confidence at entry
    pub confidence: Option<f64>,
    /// Exit price per contract
    pub exit_price: Option<Decimal>,
    /// When the trade was closed
    pub exit_time: Option<DateTime<Utc>>,
    /// Why the trade was closed
    pub exit_reason: Option<String>,
    /// Realized P&L
    pub pnl: Option<Decimal>,
    /// Realized P&L as a percentage of entry notional
    pub pnl_pct: Option<Decimal>,
    /// Hours between entry and exit
    pub holding_period_hours: Option<f64>,
}

impl TradeRecord {
    /// Open a new trade at the current time
    pub fn open(
        trade_id: impl Into<String>,
        market_id: impl Into<String>,
        strategy: impl Into<String>,
        side: Side,
        quantity: u32,
        entry_price: Decimal,
    ) -> Self {
        Self {
            trade_id: trade_id.into(),
            market_id: market_id.into(),
            strategy: strategy.into(),
            side,
            quantity,
            entry_price,
            entry_time: Utc::now(),
            confidence: None,
            exit_price: None,
            exit_time: None,
            exit_reason: None,
            pnl: None,
            pnl_pct: None,
            holding_period_hours: None,
        }
    }

    /// Attach a confidence score
    pub fn with_confidence(mut self, confidence: f64) -> Self {
        self.confidence = Some(confidence);
        self
    }

    /// Override the entry timestamp
    pub fn with_entry_time(mut self, entry_time: DateTime<Utc>) -> Self {
        self.entry_time = entry_time;
        self
    }

    /// Whether the trade has been closed
    pub fn is_closed(&self) -> bool {
        self.exit_price.is_some()
    }

    /// Entry notional value (entry price x quantity)
    pub fn entry_notional(&self) -> Decimal {
        self.entry_price * Decimal::from(self.quantity)
    }

    /// Close the trade and derive P&L fields
    ///
    /// Only the ledger calls this, after checking the trade is still open.
    pub(crate) fn close(&mut self, exit_price: Decimal, reason: &str, now: DateTime<Utc>) {
        self.exit_price = Some(exit_price);
        self.exit_time = Some(now);
        self.exit_reason = Some(reason.to_string());

        let quantity = Decimal::from(self.quantity);
        let pnl = match self.side {
            Side::Buy => (exit_price - self.entry_price) * quantity,
            Side::Sell => (self.entry_price - exit_price) * quantity,
        };
        self.pnl = Some(pnl);

        let notional = self.entry_notional();
        if !notional.is_zero() {
            self.pnl_pct = Some(pnl / notional * Decimal::ONE_HUNDRED);
        }

        let held = now - self.entry_time;
        self.holding_period_hours = Some(held.num_milliseconds() as f64 / 3_600_000.0);
    }
}
