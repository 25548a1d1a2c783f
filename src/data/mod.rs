//! Trade export
//!
//! Flattens the ledger into a CSV table, one row per trade (open and
//! closed), timestamps rendered as ISO-8601 strings by the serde
//! implementations on [`TradeRecord`].

use crate::ledger::TradeRecord;
use std::path::Path;

/// Write all trades to a CSV file
///
/// Returns the number of rows written. Warns and writes nothing when there
/// are no trades.
pub fn export_trades_csv(trades: &[TradeRecord], path: impl AsRef<Path>) -> anyhow::Result<usize> {
    if trades.is_empty() {
        tracing::warn!("No trades to export");
        return Ok(0);
    }

    let path = path.as_ref();
    let mut writer = csv::Writer::from_path(path)?;
    for trade in trades {
        writer.serialize(trade)?;
    }
    writer.flush()?;

    tracing::info!(count = trades.len(), path = %path.display(), "Exported trades");
    Ok(trades.len())
}
