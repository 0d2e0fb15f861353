//! Behavioural tests for strategy rules through the public API.

use chrono::{Duration, NaiveDate};
use tradegrid_core::domain::{Bar, StrategyParams};
use tradegrid_core::strategy::{build_strategy, Action, StrategyError, StrategyKind};

fn bars(closes: &[f64]) -> Vec<Bar> {
    let base = NaiveDate::from_ymd_opt(2024, 1, 2)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap();
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| {
            let open = if i == 0 { close } else { closes[i - 1] };
            Bar::new(
                base + Duration::days(i as i64),
                open,
                open.max(close) + 1.0,
                open.min(close) - 1.0,
                close,
                1000.0,
            )
        })
        .collect()
}

fn entries(kind: StrategyKind, params: &StrategyParams, closes: &[f64]) -> Vec<usize> {
    let rule = build_strategy(kind, params).unwrap();
    let bars = bars(closes);
    let values = rule.warm_up(&bars);
    (0..bars.len())
        .filter(|&i| matches!(rule.decide(&bars, i, &values, None), Action::EnterLong { .. }))
        .collect()
}

#[test]
fn crossover_fires_once_after_flat_run() {
    let mut closes = vec![50.0; 40];
    closes.extend((1..=20).map(|k| 50.0 + k as f64));
    let params = StrategyParams::new().with("ns", 5i64).with("nl", 20i64);
    assert_eq!(entries(StrategyKind::SmaCross, &params, &closes), vec![40]);
}

#[test]
fn rsi_cross_fires_once_after_flat_run() {
    // Flat RSI is undefined, so the first cross can only happen once prices move
    // and both lines are defined.
    let mut closes = vec![50.0; 30];
    closes.extend((1..=10).map(|k| 50.0 - k as f64));
    closes.extend((1..=10).map(|k| 40.0 + 2.0 * k as f64));
    let params = StrategyParams::new().with("ns", 3i64).with("nl", 8i64);
    let hits = entries(StrategyKind::RsiCross, &params, &closes);
    assert_eq!(hits, vec![40]);
}

#[test]
fn rsi_threshold_waits_for_oversold() {
    let mut closes: Vec<f64> = (0..20).map(|i| 100.0 + (i % 2) as f64).collect();
    closes.extend((1..=8).map(|k| 100.0 - 3.0 * k as f64));
    let hits = entries(
        StrategyKind::RsiThreshold,
        &StrategyKind::RsiThreshold
            .default_params()
            .with("rsi_period", 10i64),
        &closes,
    );
    assert!(!hits.is_empty());
    assert!(hits.iter().all(|&i| i >= 20));
}

#[test]
fn unknown_strategy_name_is_error() {
    let err = "momentum".parse::<StrategyKind>().unwrap_err();
    assert!(matches!(err, StrategyError::UnknownStrategy(_)));
}

#[test]
fn wrong_parameter_shape_is_error() {
    let params = StrategyParams::new()
        .with("window", 20i64)
        .with("deviation", 2.0);
    let err = build_strategy(StrategyKind::Bollinger, &params).err().unwrap();
    assert!(err.to_string().contains("dev"));
}

#[test]
fn extra_parameters_are_ignored() {
    let params = StrategyKind::SmaCross.default_params().with("unused", 1i64);
    assert!(build_strategy(StrategyKind::SmaCross, &params).is_ok());
}
