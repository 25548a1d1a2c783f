//! The performance ledger: authoritative in-memory record of all trades

use super::trade::TradeRecord;
use crate::telemetry::{set_gauge, GaugeMetric};
use chrono::Utc;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use std::collections::BTreeMap;
use thiserror::Error;

/// Ledger operation errors
#[derive(Debug, Error)]
pub enum LedgerError {
    /// No trade with the given identifier
    #[error("Trade not found: {0}")]
    TradeNotFound(String),
    /// The trade was already closed; close is one-way
    #[error("Trade already closed: {0}")]
    AlreadyClosed(String),
}

/// Owns every trade, open and closed, plus day-bucketed realized P&L
///
/// Statistics are derived views and never mutate ledger state. The ledger
/// expects a single logical owner; callers sharing it across tasks must
/// serialize `record`/`close`.
#[derive(Debug, Default)]
pub struct PerformanceLedger {
    pub(crate) trades: Vec<TradeRecord>,
    /// Realized P&L keyed by UTC calendar day ("%Y-%m-%d")
    pub(crate) daily_pnl: BTreeMap<String, Decimal>,
}

impl PerformanceLedger {
    /// Create an empty ledger
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a new open trade
    ///
    /// Identifier uniqueness is the caller's contract; duplicates are not
    /// rejected here.
    pub fn record(&mut self, trade: TradeRecord) {
        tracing::info!(
            trade_id = %trade.trade_id,
            strategy = %trade.strategy,
            side = %trade.side,
            quantity = trade.quantity,
            market = %trade.market_id,
            entry_price = %trade.entry_price,
            "Recorded trade"
        );
        self.trades.push(trade);
        self.publish_gauges();
    }

    /// Close the first open trade with the given identifier
    ///
    /// Fails without mutating anything when the id is unknown or the trade
    /// is already closed.
    pub fn close(
        &mut self,
        trade_id: &str,
        exit_price: Decimal,
        reason: &str,
    ) -> Result<&TradeRecord, LedgerError> {
        let index = match self
            .trades
            .iter()
            .position(|t| t.trade_id == trade_id && !t.is_closed())
        {
            Some(index) => index,
            None => {
                let error = if self.trades.iter().any(|t| t.trade_id == trade_id) {
                    LedgerError::AlreadyClosed(trade_id.to_string())
                } else {
                    LedgerError::TradeNotFound(trade_id.to_string())
                };
                tracing::warn!(trade_id, error = %error, "Close request rejected");
                return Err(error);
            }
        };

        let now = Utc::now();
        let trade = &mut self.trades[index];
        trade.close(exit_price, reason, now);

        let pnl = trade.pnl.unwrap_or_default();
        let day = now.format("%Y-%m-%d").to_string();
        *self.daily_pnl.entry(day).or_insert(Decimal::ZERO) += pnl;

        tracing::info!(
            trade_id,
            pnl = %pnl,
            pnl_pct = ?trade.pnl_pct,
            reason,
            "Closed trade"
        );

        self.publish_gauges();
        Ok(&self.trades[index])
    }

    /// All trades in recording order
    pub fn trades(&self) -> &[TradeRecord] {
        &self.trades
    }

    /// Number of recorded trades
    pub fn len(&self) -> usize {
        self.trades.len()
    }

    /// Whether the ledger has no trades
    pub fn is_empty(&self) -> bool {
        self.trades.is_empty()
    }

    fn publish_gauges(&self) {
        let closed: Vec<&TradeRecord> = self.trades.iter().filter(|t| t.is_closed()).collect();
        let open = self.trades.len() - closed.len();
        let realized: Decimal = closed.iter().filter_map(|t| t.pnl).sum();
        let winners = closed
            .iter()
            .filter(|t| t.pnl.is_some_and(|p| p > Decimal::ZERO))
            .count();

        set_gauge(GaugeMetric::OpenTrades, open as f64);
        set_gauge(GaugeMetric::RealizedPnl, realized.to_f64().unwrap_or(0.0));
        if !closed.is_empty() {
            set_gauge(GaugeMetric::WinRate, winners as f64 / closed.len() as f64);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::Side;
    use rust_decimal_macros::dec;

    fn trade(id: &str, side: Side, quantity: u32, entry: Decimal) -> TradeRecord {
        TradeRecord::open(id, "MKT-1", "momentum", side, quantity, entry)
    }

    #[test]
    fn test_record_and_len() {
        let mut ledger = PerformanceLedger::new();
        assert!(ledger.is_empty());

        ledger.record(trade("T1", Side::Buy, 10, dec!(0.50)));
        assert_eq!(ledger.len(), 1);
        assert!(!ledger.trades()[0].is_closed());
    }

    #[test]
    fn test_close_success_updates_daily_bucket() {
        let mut ledger = PerformanceLedger::new();
        ledger.record(trade("T1", Side::Buy, 10, dec!(0.50)));

        let closed = ledger.close("T1", dec!(0.60), "target").unwrap();
        assert_eq!(closed.pnl, Some(dec!(1.00)));

        assert_eq!(ledger.daily_pnl.len(), 1);
        let today = Utc::now().format("%Y-%m-%d").to_string();
        assert_eq!(ledger.daily_pnl[&today], dec!(1.00));
    }

    #[test]
    fn test_close_unknown_trade() {
        let mut ledger = PerformanceLedger::new();
        let result = ledger.close("missing", dec!(0.60), "manual");
        assert!(matches!(result, Err(LedgerError::TradeNotFound(_))));
    }

    #[test]
    fn test_double_close_is_rejected_without_mutation() {
        let mut ledger = PerformanceLedger::new();
        ledger.record(trade("T1", Side::Buy, 10, dec!(0.50)));

        ledger.close("T1", dec!(0.60), "target").unwrap();
        let first_exit = ledger.trades()[0].exit_time;
        let first_pnl = ledger.trades()[0].pnl;

        let second = ledger.close("T1", dec!(0.99), "again");
        assert!(matches!(second, Err(LedgerError::AlreadyClosed(_))));

        // No field mutated by the failed close
        assert_eq!(ledger.trades()[0].exit_time, first_exit);
        assert_eq!(ledger.trades()[0].pnl, first_pnl);
        assert_eq!(ledger.trades()[0].exit_price, Some(dec!(0.60)));

        let today = Utc::now().format("%Y-%m-%d").to_string();
        assert_eq!(ledger.daily_pnl[&today], dec!(1.00));
    }

    #[test]
    fn test_daily_bucket_accumulates() {
        let mut ledger = PerformanceLedger::new();
        ledger.record(trade("T1", Side::Buy, 10, dec!(0.50)));
        ledger.record(trade("T2", Side::Sell, 5, dec!(1.00)));

        ledger.close("T1", dec!(0.60), "target").unwrap();
        ledger.close("T2", dec!(0.90), "target").unwrap();

        let today = Utc::now().format("%Y-%m-%d").to_string();
        assert_eq!(ledger.daily_pnl[&today], dec!(1.50));
    }

    #[test]
    fn test_duplicate_ids_close_first_open() {
        // Uniqueness is the caller's contract; close touches the first
        // open match only
        let mut ledger = PerformanceLedger::new();
        ledger.record(trade("T1", Side::Buy, 1, dec!(0.50)));
        ledger.record(trade("T1", Side::Buy, 2, dec!(0.50)));

        ledger.close("T1", dec!(0.60), "first").unwrap();
        assert!(ledger.trades()[0].is_closed());
        assert!(!ledger.trades()[1].is_closed());

        ledger.close("T1", dec!(0.70), "second").unwrap();
        assert!(ledger.trades()[1].is_closed());
    }
}
