//! Gauges published by the aggregator and ledger

/// Gauge metric types
#[derive(Debug, Clone, Copy)]
pub enum GaugeMetric {
    /// Number of markets with a live snapshot
    TrackedMarkets,
    /// Mean volatility across markets that have one
    AverageVolatility,
    /// Gainers in the latest cycle
    Gainers,
    /// Losers in the latest cycle
    Losers,
    /// Trades currently open in the ledger
    OpenTrades,
    /// Realized P&L across all closed trades
    RealizedPnl,
    /// Win rate over closed trades
    WinRate,
}

impl GaugeMetric {
    fn name(self) -> &'static str {
        match self {
            GaugeMetric::TrackedMarkets => "kalshi_quant_tracked_markets",
            GaugeMetric::AverageVolatility => "kalshi_quant_average_volatility",
            GaugeMetric::Gainers => "kalshi_quant_gainers",
            GaugeMetric::Losers => "kalshi_quant_losers",
            GaugeMetric::OpenTrades => "kalshi_quant_open_trades",
            GaugeMetric::RealizedPnl => "kalshi_quant_realized_pnl_usd",
            GaugeMetric::WinRate => "kalshi_quant_win_rate",
        }
    }
}

/// Set a gauge value
pub fn set_gauge(metric: GaugeMetric, value: f64) {
    metrics::gauge!(metric.name()).set(value);
}

/// Count a polling cycle outcome
pub fn count_tick(success: bool) {
    let name = if success {
        "kalshi_quant_ticks_total"
    } else {
        "kalshi_quant_tick_failures_total"
    };
    metrics::counter!(name).increment(1);
}
