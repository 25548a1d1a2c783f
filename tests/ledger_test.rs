//! End-to-end trade lifecycle: record, close, statistics, report, export

use kalshi_quant::data::export_trades_csv;
use kalshi_quant::ledger::{LedgerError, PerformanceLedger, Period, Side, TradeRecord};
use kalshi_quant::report::PerformanceReport;
use rust_decimal_macros::dec;

fn seeded_ledger() -> PerformanceLedger {
    let mut ledger = PerformanceLedger::new();

    ledger.record(
        TradeRecord::open("T1", "INXD-B5500", "momentum", Side::Buy, 10, dec!(0.50))
            .with_confidence(0.8),
    );
    ledger.record(TradeRecord::open(
        "T2",
        "FED-CUT",
        "mean-reversion",
        Side::Sell,
        5,
        dec!(1.00),
    ));
    ledger.record(TradeRecord::open(
        "T3",
        "INXD-B5500",
        "momentum",
        Side::Buy,
        4,
        dec!(0.25),
    ));

    ledger.close("T1", dec!(0.60), "target").unwrap();
    ledger.close("T2", dec!(0.90), "target").unwrap();
    // T3 stays open

    ledger
}

#[test]
fn lifecycle_statistics() {
    let ledger = seeded_ledger();
    let stats = ledger.statistics();

    assert_eq!(stats.total_trades, 3);
    assert_eq!(stats.open_trades, 1);
    assert_eq!(stats.closed_trades, 2);
    assert_eq!(stats.winning_trades, 2);
    assert_eq!(stats.losing_trades, 0);
    assert!((stats.win_rate - 1.0).abs() < f64::EPSILON);
    assert_eq!(stats.total_pnl, dec!(1.50));
    // 20% on T1 plus 10% on T2
    assert_eq!(stats.total_return_pct, dec!(30));
    assert_eq!(stats.profit_factor, f64::INFINITY);
    assert_eq!(stats.best_trade, dec!(1.00));
    assert_eq!(stats.worst_trade, dec!(0.50));
    assert_eq!(stats.max_drawdown, dec!(0));
}

#[test]
fn lifecycle_breakdowns() {
    let ledger = seeded_ledger();

    let by_strategy = ledger.strategy_performance();
    assert_eq!(by_strategy.len(), 2);
    let momentum = &by_strategy["momentum"];
    assert_eq!(momentum.total_trades, 1);
    assert_eq!(momentum.total_pnl, dec!(1.00));

    let by_market = ledger.market_performance();
    assert_eq!(by_market["FED-CUT"].total_pnl, dec!(0.50));

    let by_day = ledger.time_performance(Period::Daily);
    assert_eq!(by_day.len(), 1);
    let (_, bucket) = by_day.iter().next().unwrap();
    assert_eq!(bucket.trade_count, 2);
    assert_eq!(bucket.total_pnl, dec!(1.50));
}

#[test]
fn lifecycle_risk_metrics() {
    let ledger = seeded_ledger();
    let metrics = ledger.risk_adjusted_metrics().unwrap();

    // All winners: downside-denominated ratios saturate
    assert_eq!(metrics.sortino_ratio, f64::INFINITY);
    assert_eq!(metrics.calmar_ratio, f64::INFINITY);
    assert_eq!(metrics.omega_ratio, f64::INFINITY);
    assert_eq!(metrics.total_return_pct, dec!(30));
}

#[test]
fn lifecycle_close_errors() {
    let mut ledger = seeded_ledger();

    assert!(matches!(
        ledger.close("missing", dec!(0.50), "manual"),
        Err(LedgerError::TradeNotFound(_))
    ));
    assert!(matches!(
        ledger.close("T1", dec!(0.70), "again"),
        Err(LedgerError::AlreadyClosed(_))
    ));
    assert_eq!(ledger.trades()[0].exit_price, Some(dec!(0.60)));
}

#[test]
fn lifecycle_report() {
    let ledger = seeded_ledger();
    let report = PerformanceReport::generate(&ledger);

    assert_eq!(report.total_tracked_trades, 3);
    assert_eq!(report.overall_statistics.closed_trades, 2);
    assert!(report.risk_adjusted_metrics.is_some());
    assert_eq!(report.strategy_breakdown.len(), 2);

    let table = report.format_table();
    assert!(table.contains("Total Trades"));
    assert!(table.contains("Win Rate"));

    // Reports are derived views; generating one never mutates the ledger
    assert_eq!(ledger.len(), 3);
}

#[test]
fn lifecycle_csv_export() {
    let ledger = seeded_ledger();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("trades.csv");

    let written = export_trades_csv(ledger.trades(), &path).unwrap();
    assert_eq!(written, 3);

    let content = std::fs::read_to_string(&path).unwrap();
    let mut lines = content.lines();
    let header = lines.next().unwrap();
    assert!(header.contains("trade_id"));
    assert!(header.contains("pnl_pct"));
    assert_eq!(lines.count(), 3);
    assert!(content.contains("INXD-B5500"));
}
