//! Batch scan over CSV files in a temporary data directory.

use chrono::NaiveDate;
use std::path::Path;
use tradegrid_core::domain::{Interval, PriceSeries};
use tradegrid_core::strategy::StrategyKind;
use tradegrid_runner::data_loader::ticker_path;
use tradegrid_runner::{
    generate_synthetic_series, load_ticker, restrict_window, scan, LoadError, LoadOptions,
    OptimizeConfig, ScanError,
};

fn synthetic(symbol: &str) -> PriceSeries {
    generate_synthetic_series(
        symbol,
        NaiveDate::from_ymd_opt(2023, 1, 1).unwrap(),
        NaiveDate::from_ymd_opt(2023, 12, 31).unwrap(),
    )
    .unwrap()
}

/// Write a series in the column order of a typical vendor export.
fn write_csv(dir: &Path, series: &PriceSeries) {
    let path = ticker_path(dir, series.symbol(), Interval::Daily);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    let mut out = String::from("Date,Close,High,Low,Open,Volume\n");
    for b in series.bars() {
        out.push_str(&format!(
            "{},{},{},{},{},{}\n",
            b.timestamp.format("%Y-%m-%d"),
            b.close,
            b.high,
            b.low,
            b.open,
            b.volume
        ));
    }
    std::fs::write(path, out).unwrap();
}

fn tickers(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}

#[test]
fn csv_round_trip_matches_generated_series() {
    let dir = tempfile::tempdir().unwrap();
    let original = synthetic("RT");
    write_csv(dir.path(), &original);

    let opts = LoadOptions {
        data_dir: dir.path().to_path_buf(),
        ..LoadOptions::default()
    };
    let loaded = load_ticker("RT", &opts).unwrap();
    assert_eq!(loaded.len(), original.len());
    for (a, b) in loaded.bars().iter().zip(original.bars()) {
        assert_eq!(a.timestamp, b.timestamp);
        assert!((a.close - b.close).abs() < 1e-9);
    }
}

#[test]
fn failing_tickers_do_not_abort_the_batch() {
    let dir = tempfile::tempdir().unwrap();
    for symbol in ["AAA", "BBB"] {
        write_csv(dir.path(), &synthetic(symbol));
    }
    let opts = LoadOptions {
        data_dir: dir.path().to_path_buf(),
        ..LoadOptions::default()
    };
    let names = tickers(&["AAA", "MISSING", "BBB"]);
    let cfg = OptimizeConfig::default().with_constraint("ns < nl".parse().unwrap());

    let report = scan(&names, |t| load_ticker(t, &opts), StrategyKind::SmaCross, &cfg);

    assert_eq!(report.outcomes.len(), 3);
    assert_eq!(report.outcomes[1].ticker, "MISSING");
    assert!(matches!(
        report.outcomes[1].outcome,
        Err(ScanError::Load(LoadError::Io { .. }))
    ));
    assert_eq!(report.summary.succeeded, 2);
    assert_eq!(report.summary.failed, 1);
}

#[test]
fn extreme_window_fails_only_its_own_ticker() {
    let names = tickers(&["AAA", "BBB"]);
    let cfg = OptimizeConfig::default().with_constraint("ns < nl".parse().unwrap());

    let report = scan(
        &names,
        |t| {
            let days_ago = if t == "AAA" { 1_000_000_000 } else { 0 };
            restrict_window(synthetic(t), days_ago, None)
        },
        StrategyKind::SmaCross,
        &cfg,
    );

    assert_eq!(report.outcomes.len(), 2);
    assert!(matches!(
        report.outcomes[0].outcome,
        Err(ScanError::Load(LoadError::EmptyWindow { .. }))
    ));
    assert_eq!(report.outcomes[1].result().unwrap().symbol, "BBB");
    assert_eq!(report.summary.succeeded, 1);
    assert_eq!(report.summary.failed, 1);
}

#[test]
fn summary_statistics_fold_successful_results() {
    let names = tickers(&["S1", "S2", "S3", "S4"]);
    let report = scan(
        &names,
        |t| Ok(synthetic(t)),
        StrategyKind::RsiSignal,
        &OptimizeConfig::default(),
    );

    let returns: Vec<f64> = report
        .outcomes
        .iter()
        .map(|o| o.result().unwrap().return_pct())
        .collect();
    let n = returns.len() as f64;
    let mean = returns.iter().sum::<f64>() / n;
    let var = returns.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / (n - 1.0);

    let s = &report.summary;
    assert!((s.mean_return_pct - mean).abs() < 1e-9);
    assert!((s.return_std_pct - var.sqrt()).abs() < 1e-9);

    let best = returns.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    assert_eq!(s.best_return_pct, Some(best));
    let best_ticker = s.best_ticker.as_deref().unwrap();
    assert_eq!(report.best().unwrap().symbol, best_ticker);

    for o in &report.outcomes {
        let r = o.result().unwrap();
        assert_eq!(s.buy_signal_tickers.contains(&o.ticker), r.recent.buy);
        assert_eq!(s.sell_signal_tickers.contains(&o.ticker), r.recent.sell);
    }
}

#[test]
fn all_failures_give_empty_statistics() {
    let names = tickers(&["X", "Y"]);
    let report = scan(
        &names,
        |t| Err(LoadError::UnknownTicker(t.to_string())),
        StrategyKind::SmaCross,
        &OptimizeConfig::default(),
    );
    assert_eq!(report.summary.failed, 2);
    assert_eq!(report.summary.mean_return_pct, 0.0);
    assert_eq!(report.summary.return_std_pct, 0.0);
    assert!(report.summary.best_ticker.is_none());
    assert!(report.best().is_none());
}
