//! Trade-lifecycle ledger and performance statistics
//!
//! The ledger exclusively owns every [`TradeRecord`]; the strategy engine
//! records and closes trades, reporting queries read derived views.

#[allow(clippy::module_inception)]
mod ledger;
mod stats;
mod trade;

pub use ledger::{LedgerError, PerformanceLedger};
pub use stats::{
    BucketStats, MarketStats, Period, RiskMetrics, StatsError, StrategyStats, TradeStatistics,
};
pub use trade::{ParseSideError, Side, TradeRecord};
