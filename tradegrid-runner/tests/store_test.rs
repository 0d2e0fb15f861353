//! Results store and ticker-name lookup against temporary files.

use chrono::NaiveDate;
use tradegrid_core::engine::EngineConfig;
use tradegrid_core::strategy::StrategyKind;
use tradegrid_runner::{
    generate_synthetic_series, lookup_ticker_name, run_with_params, BacktestResult, LoadError,
    ResultsStore,
};

fn result(symbol: &str, kind: StrategyKind) -> BacktestResult {
    let series = generate_synthetic_series(
        symbol,
        NaiveDate::from_ymd_opt(2023, 1, 1).unwrap(),
        NaiveDate::from_ymd_opt(2023, 9, 30).unwrap(),
    )
    .unwrap();
    run_with_params(&series, kind, &kind.default_params(), &EngineConfig::default(), 2).unwrap()
}

#[test]
fn header_is_written_once() {
    let dir = tempfile::tempdir().unwrap();
    let store = ResultsStore::new(dir.path().join("out").join("results.csv"));

    store.append(&result("AAA", StrategyKind::SmaCross), Some("Alpha")).unwrap();
    store.append(&result("BBB", StrategyKind::RsiSignal), None).unwrap();

    let text = std::fs::read_to_string(store.path()).unwrap();
    let header_lines = text.lines().filter(|l| l.starts_with("executed_at,")).count();
    assert_eq!(header_lines, 1);
    assert_eq!(text.lines().count(), 3);

    let rows = store.read_all().unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].ticker, "AAA");
    assert_eq!(rows[0].ticker_name, "Alpha");
    assert_eq!(rows[0].strategy, "sma_cross");
    assert_eq!(rows[0].interval, "daily");
    assert_eq!(rows[1].ticker_name, "");
    assert_eq!(rows[1].strategy, "rsi_signal");
}

#[test]
fn row_mirrors_the_result() {
    let dir = tempfile::tempdir().unwrap();
    let store = ResultsStore::new(dir.path().join("results.csv"));
    let r = result("CCC", StrategyKind::SmaCross);

    let row = store.append(&r, None).unwrap();
    assert_eq!(row.trades, r.trade_count());
    assert_eq!(row.recent_buy, r.recent.buy);
    assert_eq!(row.recent_sell, r.recent.sell);
    assert_eq!(row.run_id, r.run_id());
    assert_eq!(row.params, r#"{"nl":25,"ns":5}"#);

    let back = store.read_all().unwrap();
    assert_eq!(back[0].run_id, row.run_id);
    assert_eq!(back[0].params, row.params);
    assert_eq!(back[0].trades, row.trades);
}

#[test]
fn ticker_name_lookup_strips_exchange_suffix() {
    let dir = tempfile::tempdir().unwrap();
    let table = dir.path().join("stock_id.csv");
    std::fs::write(&table, "コード,銘柄名,市場\n7203,トヨタ自動車,プライム\n6758,ソニーグループ,プライム\n")
        .unwrap();

    assert_eq!(lookup_ticker_name(&table, "7203.T").unwrap(), "トヨタ自動車");
    assert_eq!(lookup_ticker_name(&table, "6758").unwrap(), "ソニーグループ");
    assert!(matches!(
        lookup_ticker_name(&table, "9999.T"),
        Err(LoadError::UnknownTicker(_))
    ));
}

#[test]
fn ticker_name_lookup_accepts_english_headers() {
    let dir = tempfile::tempdir().unwrap();
    let table = dir.path().join("names.csv");
    std::fs::write(&table, "Code,Name\nAAPL,Apple Inc.\n").unwrap();
    assert_eq!(lookup_ticker_name(&table, "AAPL").unwrap(), "Apple Inc.");
}
