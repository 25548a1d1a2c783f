//! Performance statistics over the ledger
//!
//! Every query here is a pure view over the closed subset of trades. "No
//! data" is an explicit condition (defaulted counts or an
//! [`StatsError::InsufficientData`]), never a silent zero.

use super::ledger::PerformanceLedger;
use super::trade::TradeRecord;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;
use thiserror::Error;

const TRADING_DAYS_PER_YEAR: f64 = 252.0;

/// Risk metrics need at least this many closed trades with a return
const MIN_TRADES_FOR_RISK_METRICS: usize = 2;

/// Errors from statistics queries
#[derive(Debug, Error)]
pub enum StatsError {
    /// Not enough closed trades to compute the metric
    #[error("Insufficient data: need {required} closed trades with returns, have {actual}")]
    InsufficientData { required: usize, actual: usize },
}

/// Comprehensive statistics over all trades
#[derive(Debug, Clone, Default, Serialize)]
pub struct TradeStatistics {
    pub total_trades: usize,
    pub open_trades: usize,
    pub closed_trades: usize,
    pub winning_trades: usize,
    pub losing_trades: usize,
    /// Winners over closed trades
    pub win_rate: f64,
    pub total_pnl: Decimal,
    /// Sum of per-trade percent returns
    pub total_return_pct: Decimal,
    pub avg_win: Decimal,
    pub avg_loss: Decimal,
    /// Sum of wins over |sum of losses|; +inf with no losses
    pub profit_factor: f64,
    /// Daily-bucket Sharpe proxy, annualized by sqrt(252)
    pub sharpe_ratio: f64,
    /// Largest peak-to-trough gap of cumulative P&L in closing order
    pub max_drawdown: Decimal,
    pub avg_holding_period_hours: f64,
    pub best_trade: Decimal,
    pub worst_trade: Decimal,
}

/// Per-strategy performance breakdown
#[derive(Debug, Clone, Default, Serialize)]
pub struct StrategyStats {
    pub total_trades: usize,
    pub winning_trades: usize,
    pub total_pnl: Decimal,
    pub win_rate: f64,
    pub avg_pnl: Decimal,
    pub best_trade: Decimal,
    pub worst_trade: Decimal,
}

/// Per-market performance breakdown
#[derive(Debug, Clone, Default, Serialize)]
pub struct MarketStats {
    pub total_trades: usize,
    pub total_pnl: Decimal,
    pub win_rate: f64,
    pub avg_pnl: Decimal,
}

/// Calendar bucketing granularity for time-based breakdowns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Period {
    Daily,
    Weekly,
    Monthly,
}

impl Period {
    fn bucket_key(self, time: chrono::DateTime<chrono::Utc>) -> String {
        let fmt = match self {
            Period::Daily => "%Y-%m-%d",
            Period::Weekly => "%Y-%W",
            Period::Monthly => "%Y-%m",
        };
        time.format(fmt).to_string()
    }
}

/// Performance within one calendar bucket
#[derive(Debug, Clone, Default, Serialize)]
pub struct BucketStats {
    pub total_pnl: Decimal,
    pub trade_count: usize,
    pub win_rate: f64,
    pub avg_pnl: Decimal,
}

/// Risk-adjusted performance metrics
#[derive(Debug, Clone, Serialize)]
pub struct RiskMetrics {
    /// Mean return over downside deviation; +inf with no downside returns
    pub sortino_ratio: f64,
    /// Total percent return over |max drawdown|; +inf at zero drawdown
    pub calmar_ratio: f64,
    /// Gains over |losses| at threshold zero; +inf with no losses
    pub omega_ratio: f64,
    pub sharpe_ratio: f64,
    pub max_drawdown: Decimal,
    pub total_return_pct: Decimal,
}

impl PerformanceLedger {
    /// Comprehensive trade statistics
    pub fn statistics(&self) -> TradeStatistics {
        let closed: Vec<&TradeRecord> = self.trades.iter().filter(|t| t.is_closed()).collect();

        let mut stats = TradeStatistics {
            total_trades: self.trades.len(),
            open_trades: self.trades.len() - closed.len(),
            closed_trades: closed.len(),
            ..Default::default()
        };

        if closed.is_empty() {
            return stats;
        }

        let pnls: Vec<Decimal> = closed.iter().map(|t| t.pnl.unwrap_or_default()).collect();
        let wins: Vec<Decimal> = pnls.iter().copied().filter(|p| *p > Decimal::ZERO).collect();
        let losses: Vec<Decimal> = pnls.iter().copied().filter(|p| *p <= Decimal::ZERO).collect();

        stats.winning_trades = wins.len();
        stats.losing_trades = losses.len();
        stats.win_rate = wins.len() as f64 / closed.len() as f64;
        stats.total_pnl = pnls.iter().sum();
        stats.total_return_pct = closed.iter().filter_map(|t| t.pnl_pct).sum();

        if !wins.is_empty() {
            stats.avg_win = wins.iter().sum::<Decimal>() / Decimal::from(wins.len());
        }
        if !losses.is_empty() {
            stats.avg_loss = losses.iter().sum::<Decimal>() / Decimal::from(losses.len());
        }

        let total_wins: Decimal = wins.iter().sum();
        let total_losses: Decimal = losses.iter().sum::<Decimal>().abs();
        stats.profit_factor = if total_losses.is_zero() {
            f64::INFINITY
        } else {
            (total_wins / total_losses).to_f64().unwrap_or(0.0)
        };

        stats.sharpe_ratio = self.daily_sharpe();
        stats.max_drawdown = max_drawdown(&pnls);

        let holding: Vec<f64> = closed.iter().filter_map(|t| t.holding_period_hours).collect();
        if !holding.is_empty() {
            stats.avg_holding_period_hours = holding.iter().sum::<f64>() / holding.len() as f64;
        }

        stats.best_trade = pnls.iter().copied().max().unwrap_or_default();
        stats.worst_trade = pnls.iter().copied().min().unwrap_or_default();

        stats
    }

    /// Sharpe proxy over daily realized-P&L buckets
    ///
    /// Zero (not an error) with fewer than two buckets or zero volatility.
    fn daily_sharpe(&self) -> f64 {
        let daily: Vec<f64> = self
            .daily_pnl
            .values()
            .map(|p| p.to_f64().unwrap_or(0.0))
            .collect();

        if daily.len() < 2 {
            return 0.0;
        }

        let avg = mean(&daily);
        let vol = population_std(&daily);
        if vol > 0.0 {
            avg / vol * TRADING_DAYS_PER_YEAR.sqrt()
        } else {
            0.0
        }
    }

    /// Performance breakdown by strategy tag
    pub fn strategy_performance(&self) -> BTreeMap<String, StrategyStats> {
        let mut breakdown: BTreeMap<String, StrategyStats> = BTreeMap::new();

        for trade in self.trades.iter().filter(|t| t.is_closed()) {
            let pnl = trade.pnl.unwrap_or_default();
            let entry = breakdown.entry(trade.strategy.clone()).or_default();

            if entry.total_trades == 0 {
                entry.best_trade = pnl;
                entry.worst_trade = pnl;
            } else {
                entry.best_trade = entry.best_trade.max(pnl);
                entry.worst_trade = entry.worst_trade.min(pnl);
            }

            entry.total_trades += 1;
            entry.total_pnl += pnl;
            if pnl > Decimal::ZERO {
                entry.winning_trades += 1;
            }
        }

        for stats in breakdown.values_mut() {
            stats.win_rate = stats.winning_trades as f64 / stats.total_trades as f64;
            stats.avg_pnl = stats.total_pnl / Decimal::from(stats.total_trades);
        }

        breakdown
    }

    /// Performance breakdown by market
    pub fn market_performance(&self) -> BTreeMap<String, MarketStats> {
        let mut breakdown: BTreeMap<String, MarketStats> = BTreeMap::new();
        let mut winners: BTreeMap<String, usize> = BTreeMap::new();

        for trade in self.trades.iter().filter(|t| t.is_closed()) {
            let pnl = trade.pnl.unwrap_or_default();
            let entry = breakdown.entry(trade.market_id.clone()).or_default();
            entry.total_trades += 1;
            entry.total_pnl += pnl;
            if pnl > Decimal::ZERO {
                *winners.entry(trade.market_id.clone()).or_default() += 1;
            }
        }

        for (market, stats) in breakdown.iter_mut() {
            let wins = winners.get(market).copied().unwrap_or(0);
            stats.win_rate = wins as f64 / stats.total_trades as f64;
            stats.avg_pnl = stats.total_pnl / Decimal::from(stats.total_trades);
        }

        breakdown
    }

    /// Performance grouped by calendar bucket of the exit time
    pub fn time_performance(&self, period: Period) -> BTreeMap<String, BucketStats> {
        let mut groups: BTreeMap<String, Vec<Decimal>> = BTreeMap::new();

        for trade in self.trades.iter().filter(|t| t.is_closed()) {
            let Some(exit_time) = trade.exit_time else {
                continue;
            };
            groups
                .entry(period.bucket_key(exit_time))
                .or_default()
                .push(trade.pnl.unwrap_or_default());
        }

        groups
            .into_iter()
            .map(|(key, pnls)| {
                let count = pnls.len();
                let total: Decimal = pnls.iter().sum();
                let wins = pnls.iter().filter(|p| **p > Decimal::ZERO).count();
                (
                    key,
                    BucketStats {
                        total_pnl: total,
                        trade_count: count,
                        win_rate: wins as f64 / count as f64,
                        avg_pnl: total / Decimal::from(count),
                    },
                )
            })
            .collect()
    }

    /// Risk-adjusted metrics over per-trade percent returns
    ///
    /// Requires at least two closed trades with a defined percent return;
    /// otherwise reports insufficient data so callers cannot mistake "no
    /// signal" for a real zero.
    pub fn risk_adjusted_metrics(&self) -> Result<RiskMetrics, StatsError> {
        let returns: Vec<f64> = self
            .trades
            .iter()
            .filter(|t| t.is_closed())
            .filter_map(|t| t.pnl_pct)
            .map(|p| p.to_f64().unwrap_or(0.0))
            .collect();

        if returns.len() < MIN_TRADES_FOR_RISK_METRICS {
            return Err(StatsError::InsufficientData {
                required: MIN_TRADES_FOR_RISK_METRICS,
                actual: returns.len(),
            });
        }

        // Threshold / risk-free proxy is zero throughout
        let avg_return = mean(&returns);

        let downside: Vec<f64> = returns.iter().copied().filter(|r| *r < 0.0).collect();
        let sortino_ratio = if downside.is_empty() {
            f64::INFINITY
        } else {
            let downside_dev = population_std(&downside);
            if downside_dev > 0.0 {
                avg_return / downside_dev
            } else {
                f64::INFINITY
            }
        };

        let stats = self.statistics();
        let drawdown = stats.max_drawdown.abs();
        let calmar_ratio = if drawdown.is_zero() {
            f64::INFINITY
        } else {
            (stats.total_return_pct / drawdown).to_f64().unwrap_or(0.0)
        };

        let gains: f64 = returns.iter().filter(|r| **r > 0.0).sum();
        let losses: Vec<f64> = returns.iter().copied().filter(|r| *r <= 0.0).collect();
        let omega_ratio = if losses.is_empty() {
            f64::INFINITY
        } else {
            let loss_sum = losses.iter().sum::<f64>().abs();
            if loss_sum > 0.0 {
                gains / loss_sum
            } else {
                f64::INFINITY
            }
        };

        Ok(RiskMetrics {
            sortino_ratio,
            calmar_ratio,
            omega_ratio,
            sharpe_ratio: stats.sharpe_ratio,
            max_drawdown: drawdown,
            total_return_pct: stats.total_return_pct,
        })
    }
}

/// Largest running-peak-to-current gap of the cumulative P&L series
fn max_drawdown(pnls: &[Decimal]) -> Decimal {
    let mut cumulative = Decimal::ZERO;
    let mut peak: Option<Decimal> = None;
    let mut worst = Decimal::ZERO;

    for pnl in pnls {
        cumulative += *pnl;
        let running_max = match peak {
            Some(p) => p.max(cumulative),
            None => cumulative,
        };
        peak = Some(running_max);
        worst = worst.max(running_max - cumulative);
    }

    worst
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

fn population_std(values: &[f64]) -> f64 {
    let avg = mean(values);
    let variance = values.iter().map(|v| (v - avg).powi(2)).sum::<f64>() / values.len() as f64;
    variance.sqrt()
}
