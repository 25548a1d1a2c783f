//! Per-market snapshot state

use super::volatility::rolling_volatility;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Maximum retained price history per market
pub const HISTORY_CAPACITY: usize = 100;

/// Latest known price/volume/volatility state of one market
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketSnapshot {
    /// Market ticker, immutable once created
    pub market_id: String,
    /// Market title
    pub title: String,
    /// Latest price
    pub current_price: Decimal,
    /// Price from the previous tick
    pub previous_price: Option<Decimal>,
    /// Contracts traded
    pub volume: Option<i64>,
    /// Open interest
    pub open_interest: Option<i64>,
    /// When this snapshot last changed
    pub last_updated: DateTime<Utc>,
    /// Recent prices, oldest first, capped at [`HISTORY_CAPACITY`]
    pub price_history: VecDeque<Decimal>,
    /// Annualized rolling volatility; absent until enough history exists
    pub volatility: Option<f64>,
}

impl MarketSnapshot {
    /// Create a snapshot from the first observation of a market
    pub fn new(
        market_id: impl Into<String>,
        title: impl Into<String>,
        price: Decimal,
        volume: Option<i64>,
        open_interest: Option<i64>,
        now: DateTime<Utc>,
    ) -> Self {
        let mut price_history = VecDeque::with_capacity(HISTORY_CAPACITY);
        price_history.push_back(price);

        Self {
            market_id: market_id.into(),
            title: title.into(),
            current_price: price,
            previous_price: None,
            volume,
            open_interest,
            last_updated: now,
            price_history,
            volatility: None,
        }
    }

    /// Fold a fresh quote into the snapshot
    ///
    /// Shifts the current price into `previous_price`, appends to the
    /// history (evicting the oldest entry past capacity) and recomputes
    /// volatility.
    pub fn apply_quote(
        &mut self,
        price: Decimal,
        volume: Option<i64>,
        open_interest: Option<i64>,
        now: DateTime<Utc>,
    ) {
        self.previous_price = Some(self.current_price);
        self.current_price = price;
        if volume.is_some() {
            self.volume = volume;
        }
        if open_interest.is_some() {
            self.open_interest = open_interest;
        }
        self.last_updated = now;

        self.price_history.push_back(price);
        while self.price_history.len() > HISTORY_CAPACITY {
            self.price_history.pop_front();
        }

        self.volatility = rolling_volatility(&self.price_history);
    }

    /// Price change from the previous tick
    pub fn price_change(&self) -> Option<Decimal> {
        Some(self.current_price - self.previous_price?)
    }

    /// Percentage price change from the previous tick
    ///
    /// Undefined when there is no previous price or it is zero.
    pub fn price_change_pct(&self) -> Option<Decimal> {
        let previous = self.previous_price?;
        if previous.is_zero() {
            return None;
        }
        Some(self.price_change()? / previous * Decimal::ONE_HUNDRED)
    }
}
