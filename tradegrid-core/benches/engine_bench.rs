//! Criterion benchmarks for the engine hot paths.
//!
//! 1. Single backtest run per strategy kind (default parameters)
//! 2. Indicator precompute for a typical indicator set
//! 3. Sequential sweep over the full SMA-cross grid

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use tradegrid_core::domain::{Bar, Interval, PriceSeries};
use tradegrid_core::engine::{precompute_indicators, run_backtest, EngineConfig};
use tradegrid_core::indicators::{Atr, Bollinger, Indicator, Macd, Rsi, Sma};
use tradegrid_core::strategy::StrategyKind;

fn make_series(n: usize) -> PriceSeries {
    let base = chrono::NaiveDate::from_ymd_opt(2015, 1, 2)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap();
    let bars = (0..n)
        .map(|i| {
            let close = 100.0 + (i as f64 * 0.05).sin() * 15.0 + (i as f64 * 0.013).cos() * 5.0;
            let open = close - 0.3;
            Bar::new(
                base + chrono::Duration::days(i as i64),
                open,
                close.max(open) + 1.5,
                close.min(open) - 1.5,
                close,
                1_000_000.0,
            )
        })
        .collect();
    PriceSeries::new("BENCH", Interval::Daily, bars).unwrap()
}

fn bench_single_run(c: &mut Criterion) {
    let series = make_series(2_500);
    let config = EngineConfig::default();
    let mut group = c.benchmark_group("single_run");
    for kind in StrategyKind::ALL {
        let params = kind.default_params();
        group.bench_with_input(BenchmarkId::from_parameter(kind.name()), &kind, |b, &kind| {
            b.iter(|| run_backtest(black_box(&series), kind, &params, &config))
        });
    }
    group.finish();
}

fn bench_precompute(c: &mut Criterion) {
    let series = make_series(2_500);
    let indicators: Vec<Box<dyn Indicator>> = vec![
        Box::new(Sma::new(20)),
        Box::new(Sma::new(50)),
        Box::new(Rsi::new(14)),
        Box::new(Macd::line(12, 26)),
        Box::new(Macd::signal(12, 26, 9)),
        Box::new(Atr::new(14)),
        Box::new(Bollinger::upper(20, 2.0)),
        Box::new(Bollinger::lower(20, 2.0)),
    ];
    c.bench_function("precompute_8_indicators_2500_bars", |b| {
        b.iter(|| precompute_indicators(black_box(series.bars()), &indicators))
    });
}

fn bench_sma_grid(c: &mut Criterion) {
    let series = make_series(1_000);
    let config = EngineConfig::default();
    let kind = StrategyKind::SmaCross;
    let candidates = kind.declare_parameters().candidates();
    c.bench_function("sma_cross_grid_sequential", |b| {
        b.iter(|| {
            candidates
                .iter()
                .filter_map(|p| run_backtest(&series, kind, p, &config).ok())
                .map(|r| r.total_return_pct())
                .fold(f64::NEG_INFINITY, f64::max)
        })
    });
}

criterion_group!(benches, bench_single_run, bench_precompute, bench_sma_grid);
criterion_main!(benches);
