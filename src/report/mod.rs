//! Composed performance reporting
//!
//! Pure aggregation over ledger queries; no metric is computed here that
//! the ledger does not already expose.

use crate::ledger::{
    BucketStats, MarketStats, Period, PerformanceLedger, RiskMetrics, StrategyStats,
    TradeStatistics,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;

/// Snapshot report over everything the ledger knows
#[derive(Debug, Clone, Serialize)]
pub struct PerformanceReport {
    pub overall_statistics: TradeStatistics,
    pub strategy_breakdown: BTreeMap<String, StrategyStats>,
    pub market_breakdown: BTreeMap<String, MarketStats>,
    pub daily_performance: BTreeMap<String, BucketStats>,
    /// Absent when there are too few closed trades for risk metrics
    pub risk_adjusted_metrics: Option<RiskMetrics>,
    pub report_generated: DateTime<Utc>,
    pub total_tracked_trades: usize,
}

impl PerformanceReport {
    /// Compose a full report from the ledger
    pub fn generate(ledger: &PerformanceLedger) -> Self {
        let risk_adjusted_metrics = match ledger.risk_adjusted_metrics() {
            Ok(metrics) => Some(metrics),
            Err(e) => {
                tracing::debug!(reason = %e, "Risk metrics omitted from report");
                None
            }
        };

        Self {
            overall_statistics: ledger.statistics(),
            strategy_breakdown: ledger.strategy_performance(),
            market_breakdown: ledger.market_performance(),
            daily_performance: ledger.time_performance(Period::Daily),
            risk_adjusted_metrics,
            report_generated: Utc::now(),
            total_tracked_trades: ledger.len(),
        }
    }

    /// Format as table for CLI output
    pub fn format_table(&self) -> String {
        let stats = &self.overall_statistics;
        let risk = match &self.risk_adjusted_metrics {
            Some(m) => format!(
                "Sortino Ratio:    {:.2}\nCalmar Ratio:     {:.2}\nOmega Ratio:      {:.2}",
                m.sortino_ratio, m.calmar_ratio, m.omega_ratio
            ),
            None => "Risk metrics:     insufficient data".to_string(),
        };

        format!(
            r#"
══════════════════════════════════════════════════════
               PERFORMANCE REPORT
══════════════════════════════════════════════════════

PERFORMANCE
───────────────────────────────────────────────────────
Total P&L:        {:+.2} ({:+.2}%)
Win Rate:         {:.1}%
Profit Factor:    {:.2}
Sharpe Ratio:     {:.2}
Max Drawdown:     {:.2}
{}

ACTIVITY
───────────────────────────────────────────────────────
Total Trades:     {} ({} open, {} closed)
Avg Holding:      {:.1}h
Strategies:       {}
Markets:          {}
══════════════════════════════════════════════════════
"#,
            stats.total_pnl,
            stats.total_return_pct,
            stats.win_rate * 100.0,
            stats.profit_factor,
            stats.sharpe_ratio,
            stats.max_drawdown,
            risk,
            stats.total_trades,
            stats.open_trades,
            stats.closed_trades,
            stats.avg_holding_period_hours,
            self.strategy_breakdown.len(),
            self.market_breakdown.len(),
        )
    }
}
