//! Market data streaming and aggregation
//!
//! A background worker polls the market feed at a fixed interval, folds
//! quotes into bounded-history snapshots, recomputes rolling volatility,
//! and fans out change notifications to subscribers.

mod aggregator;
mod snapshot;
mod volatility;

pub use aggregator::{
    MarketAggregator, MarketSummary, SnapshotTable, SubscriberFn, SubscriberId,
};
pub use snapshot::{MarketSnapshot, HISTORY_CAPACITY};
pub use volatility::{rolling_volatility, MIN_HISTORY_FOR_VOLATILITY, VOLATILITY_WINDOW};
