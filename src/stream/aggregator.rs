//! Market data aggregator
//!
//! Owns the snapshot table, drives a background polling worker against the
//! market feed, and fans updates out to registered subscribers. One failing
//! fetch or subscriber never stops the loop.

use super::snapshot::MarketSnapshot;
use crate::config::StreamConfig;
use crate::feed::MarketFeed;
use crate::telemetry::{count_tick, set_gauge, GaugeMetric};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{watch, Mutex, RwLock};
use tokio::task::JoinHandle;

/// Bound on how long `stop` waits for the worker to exit
const STOP_TIMEOUT: Duration = Duration::from_secs(5);

/// Snapshot table keyed by market id
pub type SnapshotTable = HashMap<String, MarketSnapshot>;

/// Subscriber callback: receives the ids updated this tick and a copy of
/// the full snapshot table. An `Err` is logged and does not affect other
/// subscribers.
pub type SubscriberFn = Box<dyn Fn(&[String], &SnapshotTable) -> anyhow::Result<()> + Send + Sync>;

/// Handle for removing a registered subscriber
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubscriberId(u64);

/// Aggregate view over all tracked markets
#[derive(Debug, Clone, Serialize)]
pub struct MarketSummary {
    /// Markets with a live snapshot
    pub total_markets: usize,
    /// Mean current price; absent with no markets
    pub average_price: Option<Decimal>,
    /// Mean volatility over markets that have one
    pub average_volatility: Option<f64>,
    /// Markets whose latest change is positive
    pub gainers: usize,
    /// Markets whose latest change is negative
    pub losers: usize,
    /// Remaining markets (no change data, or flat)
    pub unchanged: usize,
    /// Completion time of the last successful tick
    pub last_update: Option<DateTime<Utc>>,
    /// Configured polling interval
    pub update_interval_secs: u64,
}

struct AggregatorState {
    snapshots: SnapshotTable,
    last_update: Option<DateTime<Utc>>,
}

/// Polls the market feed and maintains per-market snapshots
pub struct MarketAggregator<F: MarketFeed> {
    feed: Arc<F>,
    update_interval_secs: u64,
    max_markets_per_tick: usize,
    state: RwLock<AggregatorState>,
    subscribers: RwLock<Vec<(SubscriberId, SubscriberFn)>>,
    next_subscriber_id: AtomicU64,
    worker: Mutex<Option<JoinHandle<()>>>,
    shutdown_tx: watch::Sender<bool>,
}

impl<F: MarketFeed + 'static> MarketAggregator<F> {
    /// Create a new aggregator over the given feed
    ///
    /// A zero polling interval is clamped to one second; `tokio::time::interval`
    /// panics on a zero period, which would kill the worker on its first tick.
    pub fn new(feed: Arc<F>, config: &StreamConfig) -> Self {
        let (shutdown_tx, _) = watch::channel(false);

        let update_interval_secs = config.update_interval_secs.max(1);
        if update_interval_secs != config.update_interval_secs {
            tracing::warn!(
                configured = config.update_interval_secs,
                "Polling interval clamped to 1s"
            );
        }

        Self {
            feed,
            update_interval_secs,
            max_markets_per_tick: config.max_markets_per_tick,
            state: RwLock::new(AggregatorState {
                snapshots: HashMap::new(),
                last_update: None,
            }),
            subscribers: RwLock::new(Vec::new()),
            next_subscriber_id: AtomicU64::new(0),
            worker: Mutex::new(None),
            shutdown_tx,
        }
    }

    /// Create with default stream configuration
    pub fn with_defaults(feed: Arc<F>) -> Self {
        Self::new(feed, &StreamConfig::default())
    }

    /// Register a callback for market-update notifications
    pub async fn add_subscriber(&self, callback: SubscriberFn) -> SubscriberId {
        let id = SubscriberId(self.next_subscriber_id.fetch_add(1, AtomicOrdering::Relaxed));
        let mut subscribers = self.subscribers.write().await;
        subscribers.push((id, callback));
        id
    }

    /// Remove a subscriber; returns whether it was registered
    pub async fn remove_subscriber(&self, id: SubscriberId) -> bool {
        let mut subscribers = self.subscribers.write().await;
        let before = subscribers.len();
        subscribers.retain(|(sid, _)| *sid != id);
        subscribers.len() != before
    }

    /// Start the background polling worker
    ///
    /// Warns and does nothing when already running.
    pub async fn start(self: &Arc<Self>) {
        let mut worker = self.worker.lock().await;
        if worker.is_some() {
            tracing::warn!("Market data aggregator already running");
            return;
        }

        self.shutdown_tx.send_replace(false);
        let mut shutdown_rx = self.shutdown_tx.subscribe();
        let aggregator = Arc::clone(self);

        let handle = tokio::spawn(async move {
            let mut interval =
                tokio::time::interval(Duration::from_secs(aggregator.update_interval_secs));
            interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = shutdown_rx.changed() => {
                        if *shutdown_rx.borrow() {
                            break;
                        }
                    }
                    _ = interval.tick() => {
                        match aggregator.tick().await {
                            Ok(()) => count_tick(true),
                            Err(e) => {
                                count_tick(false);
                                tracing::error!(error = %e, "Market data refresh failed");
                            }
                        }
                    }
                }
            }

            tracing::debug!("Market data worker exited");
        });

        *worker = Some(handle);
        tracing::info!(
            interval_secs = self.update_interval_secs,
            "Started market data aggregator"
        );
    }

    /// Stop the polling worker, waiting up to a bounded timeout
    ///
    /// Safe to call when not running.
    pub async fn stop(&self) {
        let mut worker = self.worker.lock().await;
        let Some(handle) = worker.take() else {
            return;
        };

        let _ = self.shutdown_tx.send(true);

        match tokio::time::timeout(STOP_TIMEOUT, handle).await {
            Ok(Ok(())) => tracing::info!("Stopped market data aggregator"),
            Ok(Err(e)) => tracing::error!(error = %e, "Market data worker terminated abnormally"),
            Err(_) => tracing::warn!("Market data worker did not exit within timeout"),
        }
    }

    /// Whether the polling worker is active
    pub async fn is_running(&self) -> bool {
        self.worker.lock().await.is_some()
    }

    /// One polling cycle: fetch quotes, fold into snapshots, notify
    ///
    /// A fetch error propagates to the caller (the worker loop logs it and
    /// continues); in that case no state changes and nobody is notified.
    pub async fn tick(&self) -> anyhow::Result<()> {
        let quotes = self.feed.fetch_markets().await?;

        let now = Utc::now();
        let mut updated: Vec<String> = Vec::new();

        let table = {
            let mut state = self.state.write().await;

            for quote in quotes.into_iter().take(self.max_markets_per_tick) {
                let Some(price) = quote.price else {
                    continue;
                };

                match state.snapshots.get_mut(&quote.id) {
                    Some(snapshot) => {
                        snapshot.apply_quote(price, quote.volume, quote.open_interest, now);
                    }
                    None => {
                        state.snapshots.insert(
                            quote.id.clone(),
                            MarketSnapshot::new(
                                quote.id.clone(),
                                quote.title,
                                price,
                                quote.volume,
                                quote.open_interest,
                                now,
                            ),
                        );
                    }
                }

                updated.push(quote.id);
            }

            state.last_update = Some(now);
            Self::publish_gauges(&state.snapshots);
            state.snapshots.clone()
        };

        if !updated.is_empty() {
            self.notify_subscribers(&updated, &table).await;
        }

        Ok(())
    }

    async fn notify_subscribers(&self, updated: &[String], table: &SnapshotTable) {
        let subscribers = self.subscribers.read().await;
        for (id, callback) in subscribers.iter() {
            if let Err(e) = callback(updated, table) {
                tracing::error!(subscriber = id.0, error = %e, "Subscriber notification failed");
            }
        }
    }

    fn publish_gauges(snapshots: &SnapshotTable) {
        let gainers = snapshots
            .values()
            .filter(|s| s.price_change_pct().is_some_and(|p| p > Decimal::ZERO))
            .count();
        let losers = snapshots
            .values()
            .filter(|s| s.price_change_pct().is_some_and(|p| p < Decimal::ZERO))
            .count();

        set_gauge(GaugeMetric::TrackedMarkets, snapshots.len() as f64);
        set_gauge(GaugeMetric::Gainers, gainers as f64);
        set_gauge(GaugeMetric::Losers, losers as f64);
        if let Some(avg) = mean_volatility(snapshots) {
            set_gauge(GaugeMetric::AverageVolatility, avg);
        }
    }

    /// Current snapshot for one market
    pub async fn snapshot(&self, market_id: &str) -> Option<MarketSnapshot> {
        let state = self.state.read().await;
        state.snapshots.get(market_id).cloned()
    }

    /// Copy of the full snapshot table
    pub async fn snapshots(&self) -> SnapshotTable {
        let state = self.state.read().await;
        state.snapshots.clone()
    }

    /// Markets with the largest absolute percent change, descending
    ///
    /// Ties break by market id so rankings are reproducible.
    pub async fn top_movers(&self, limit: usize) -> Vec<MarketSnapshot> {
        let state = self.state.read().await;

        let mut movers: Vec<MarketSnapshot> = state
            .snapshots
            .values()
            .filter(|s| s.price_change_pct().is_some())
            .cloned()
            .collect();

        movers.sort_by(|a, b| {
            let pa = a.price_change_pct().unwrap_or_default().abs();
            let pb = b.price_change_pct().unwrap_or_default().abs();
            pb.cmp(&pa).then_with(|| a.market_id.cmp(&b.market_id))
        });

        movers.truncate(limit);
        movers
    }

    /// Markets with the highest volatility, descending; markets without an
    /// estimate are excluded
    pub async fn top_volatility(&self, limit: usize) -> Vec<MarketSnapshot> {
        let state = self.state.read().await;

        let mut volatile: Vec<MarketSnapshot> = state
            .snapshots
            .values()
            .filter(|s| s.volatility.is_some())
            .cloned()
            .collect();

        volatile.sort_by(|a, b| {
            let va = a.volatility.unwrap_or(0.0);
            let vb = b.volatility.unwrap_or(0.0);
            vb.partial_cmp(&va)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.market_id.cmp(&b.market_id))
        });

        volatile.truncate(limit);
        volatile
    }

    /// Aggregate summary over all tracked markets
    pub async fn summary(&self) -> MarketSummary {
        let state = self.state.read().await;
        let snapshots = &state.snapshots;
        let total = snapshots.len();

        let average_price = if total > 0 {
            let sum: Decimal = snapshots.values().map(|s| s.current_price).sum();
            Some(sum / Decimal::from(total))
        } else {
            None
        };

        let gainers = snapshots
            .values()
            .filter(|s| s.price_change_pct().is_some_and(|p| p > Decimal::ZERO))
            .count();
        let losers = snapshots
            .values()
            .filter(|s| s.price_change_pct().is_some_and(|p| p < Decimal::ZERO))
            .count();

        MarketSummary {
            total_markets: total,
            average_price,
            average_volatility: mean_volatility(snapshots),
            gainers,
            losers,
            unchanged: total - gainers - losers,
            last_update: state.last_update,
            update_interval_secs: self.update_interval_secs,
        }
    }
}

fn mean_volatility(snapshots: &SnapshotTable) -> Option<f64> {
    let vols: Vec<f64> = snapshots.values().filter_map(|s| s.volatility).collect();
    if vols.is_empty() {
        return None;
    }
    Some(vols.iter().sum::<f64>() / vols.len() as f64)
}
