//! kalshi-quant: market data streaming and performance analytics for Kalshi
//! event contracts
//!
//! This library provides the core components for:
//! - Market quote polling via the Kalshi REST API
//! - Snapshot aggregation with rolling volatility and top-mover ranking
//! - Subscriber fan-out from a background polling worker
//! - A trade-lifecycle ledger with multi-dimensional performance statistics
//! - Risk-adjusted metrics (Sharpe, Sortino, Calmar, Omega)
//! - CSV trade export and a composed performance report
//! - Full observability stack

pub mod account;
pub mod cli;
pub mod config;
pub mod data;
pub mod feed;
pub mod ledger;
pub mod notify;
pub mod report;
pub mod stream;
pub mod telemetry;
