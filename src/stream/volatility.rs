//! Rolling volatility from snapshot price history
//!
//! Standard deviation of successive relative returns over the most recent
//! window, annualized with the 252 trading-day convention.

use rust_decimal::Decimal;
use std::collections::VecDeque;

/// History must be strictly longer than this before volatility is computed
pub const MIN_HISTORY_FOR_VOLATILITY: usize = 10;

/// At most this many recent points enter the calculation
pub const VOLATILITY_WINDOW: usize = 20;

const TRADING_DAYS_PER_YEAR: f64 = 252.0;

/// Annualized volatility over the most recent window of the history
///
/// Returns `None` while the history is too short or no valid return can be
/// formed (e.g., zero prices).
pub fn rolling_volatility(history: &VecDeque<Decimal>) -> Option<f64> {
    if history.len() <= MIN_HISTORY_FOR_VOLATILITY {
        return None;
    }

    let start = history.len().saturating_sub(VOLATILITY_WINDOW);
    let recent: Vec<f64> = history
        .iter()
        .skip(start)
        .map(|p| (*p).try_into().unwrap_or(0.0))
        .collect();

    let mut returns = Vec::with_capacity(recent.len().saturating_sub(1));
    for pair in recent.windows(2) {
        if pair[0] > 0.0 {
            returns.push(pair[1] / pair[0] - 1.0);
        }
    }

    if returns.is_empty() {
        return None;
    }

    // Population standard deviation of the returns
    let n = returns.len() as f64;
    let mean = returns.iter().sum::<f64>() / n;
    let variance = returns.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / n;
    let std_dev = variance.sqrt();

    Some(std_dev * TRADING_DAYS_PER_YEAR.sqrt())
}
