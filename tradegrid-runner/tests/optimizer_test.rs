//! Optimizer integration tests on synthetic series.
//!
//! 1. Optimality: the winner maximizes the objective over every feasible
//!    candidate, earliest candidate on ties
//! 2. Constraint enforcement and infeasible grids
//! 3. Determinism across repeated and parallel/sequential runs

use chrono::NaiveDate;
use tradegrid_core::domain::{ParamRange, ParamSpace, PriceSeries, StrategyParams};
use tradegrid_core::engine::run_backtest;
use tradegrid_core::strategy::StrategyKind;
use tradegrid_runner::{
    generate_synthetic_series, optimize, Constraint, Objective, OptimizeConfig, OptimizeError,
    PerformanceMetrics,
};

fn series(symbol: &str) -> PriceSeries {
    generate_synthetic_series(
        symbol,
        NaiveDate::from_ymd_opt(2021, 1, 1).unwrap(),
        NaiveDate::from_ymd_opt(2023, 6, 30).unwrap(),
    )
    .unwrap()
}

/// ns ∈ {5, 10, 15, 20}, nl ∈ {10, 20, ..., 70}.
fn sma_space() -> ParamSpace {
    ParamSpace::new()
        .with_range(
            "ns",
            ParamRange::IntStep {
                start: 5,
                stop: 25,
                step: 5,
            },
        )
        .int_step("nl", 10, 71, 10)
}

fn sma_config() -> OptimizeConfig {
    OptimizeConfig::default()
        .with_space(sma_space())
        .with_constraint("ns < nl".parse().unwrap())
}

/// Exhaustive reference: objective of every feasible candidate, in order.
fn brute_force(
    series: &PriceSeries,
    kind: StrategyKind,
    cfg: &OptimizeConfig,
) -> Vec<(StrategyParams, f64)> {
    let (candidates, _) = cfg.feasible_candidates(kind);
    candidates
        .into_iter()
        .map(|p| {
            let run = run_backtest(series, kind, &p, &cfg.engine).unwrap();
            let value = cfg.objective.extract(&PerformanceMetrics::compute(&run, series));
            (p, value)
        })
        .collect()
}

#[test]
fn winner_is_the_first_maximum_over_feasible_candidates() {
    let s = series("OPTIMAL");
    let cfg = sma_config();
    let result = optimize(&s, StrategyKind::SmaCross, &cfg).unwrap();

    let reference = brute_force(&s, StrategyKind::SmaCross, &cfg);
    let max = reference
        .iter()
        .map(|(_, v)| *v)
        .fold(f64::NEG_INFINITY, f64::max);
    let (expected, _) = reference.iter().find(|(_, v)| *v == max).unwrap();

    assert_eq!(&result.params, expected);
    let summary = result.optimization.as_ref().unwrap();
    assert_eq!(summary.best_value, max);
    assert_eq!(summary.feasible_candidates, reference.len());
    assert_eq!(summary.total_candidates, 4 * 7);
    assert_eq!(result.metrics.return_pct, max);
}

#[test]
fn winner_satisfies_the_constraint() {
    for symbol in ["C1", "C2", "C3"] {
        let s = series(symbol);
        let result = optimize(&s, StrategyKind::SmaCross, &sma_config()).unwrap();
        let ns = result.params.int("ns").unwrap();
        let nl = result.params.int("nl").unwrap();
        assert!(ns < nl, "{symbol}: ns={ns} nl={nl}");
    }
}

#[test]
fn three_runs_pick_identical_parameters() {
    let s = series("REPEAT");
    let runs: Vec<_> = (0..3)
        .map(|_| optimize(&s, StrategyKind::SmaCross, &sma_config()).unwrap())
        .collect();
    assert_eq!(runs[0].params, runs[1].params);
    assert_eq!(runs[1].params, runs[2].params);
    assert_eq!(runs[0], runs[2]);
    let nl = runs[0].params.int("nl").unwrap();
    assert!((10..=70).contains(&nl) && nl % 10 == 0);
}

#[test]
fn parallel_and_sequential_agree() {
    let s = series("PAR");
    let kind = StrategyKind::Bollinger;
    let par = optimize(&s, kind, &OptimizeConfig::default()).unwrap();
    let seq = optimize(&s, kind, &OptimizeConfig::default().sequential()).unwrap();
    assert_eq!(par, seq);
}

#[test]
fn impossible_constraint_is_reported() {
    let cfg = OptimizeConfig::default().with_constraint(Constraint::custom(|_| false));
    let err = optimize(&series("NONE"), StrategyKind::RsiSignal, &cfg).unwrap_err();
    assert_eq!(
        err,
        OptimizeError::NoFeasibleCandidates {
            strategy: StrategyKind::RsiSignal,
            total: 10 * 4,
        }
    );
}

#[test]
fn drawdown_objective_prefers_shallower_losses() {
    let s = series("DD");
    let cfg = sma_config().with_objective(Objective::MaxDrawdown);
    let result = optimize(&s, StrategyKind::SmaCross, &cfg).unwrap();
    let reference = brute_force(&s, StrategyKind::SmaCross, &cfg);
    assert!(reference
        .iter()
        .all(|(_, v)| *v <= result.metrics.max_drawdown_pct));
}

#[test]
fn result_carries_recent_signal_flags_for_its_trades() {
    let s = series("FLAGS");
    let result = optimize(&s, StrategyKind::RsiThreshold, &OptimizeConfig::default()).unwrap();
    let since = s.timestamp_from_end(2).unwrap();
    let exited_recently = result.trades.iter().any(|t| t.exit_time >= since);
    assert_eq!(result.recent.sell, exited_recently);
    assert_eq!(result.recent.since, Some(since));
}
