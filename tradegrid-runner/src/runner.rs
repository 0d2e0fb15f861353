//! Canonical backtest result and the fixed-parameter runner.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use tradegrid_core::domain::{Interval, Position, PriceSeries, StrategyParams, Trade};
use tradegrid_core::engine::{
    run_backtest, EngineConfig, EngineError, EquityPoint, RunResult, RunWarning, SignalRecord,
};
use tradegrid_core::strategy::StrategyKind;

use crate::data_loader::dataset_hash;
use crate::metrics::PerformanceMetrics;
use crate::objective::Objective;
use crate::signal_window::RecentSignals;

/// Current schema version for persisted artifacts.
pub const SCHEMA_VERSION: u32 = 1;

/// How the parameters of a result were chosen.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizationSummary {
    pub objective: Objective,
    pub best_value: f64,
    /// Size of the full grid before constraint pruning.
    pub total_candidates: usize,
    pub feasible_candidates: usize,
    /// Candidates that failed or produced a non-finite value in the
    /// successful attempt.
    pub skipped_candidates: usize,
    pub attempts: u32,
}

/// Complete result of one backtest at fixed parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacktestResult {
    /// Schema version for forward-compatible deserialization.
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
    pub symbol: String,
    pub interval: Interval,
    pub strategy: StrategyKind,
    pub params: StrategyParams,
    pub metrics: PerformanceMetrics,
    pub trades: Vec<Trade>,
    pub equity_curve: Vec<EquityPoint>,
    pub open_position: Option<Position>,
    pub signals: Vec<SignalRecord>,
    pub warnings: Vec<RunWarning>,
    pub recent: RecentSignals,
    pub initial_cash: f64,
    pub bar_count: usize,
    pub warmup_bars: usize,
    pub start: Option<NaiveDateTime>,
    pub end: Option<NaiveDateTime>,
    pub dataset_hash: String,
    #[serde(default)]
    pub optimization: Option<OptimizationSummary>,
}

fn default_schema_version() -> u32 {
    SCHEMA_VERSION
}

impl BacktestResult {
    /// Assemble the canonical result from an engine run over `series`.
    pub fn from_run(
        series: &PriceSeries,
        strategy: StrategyKind,
        params: StrategyParams,
        run: RunResult,
        window_bars: usize,
    ) -> Self {
        let metrics = PerformanceMetrics::compute(&run, series);
        let recent = RecentSignals::evaluate(&run, series, window_bars);
        Self {
            schema_version: SCHEMA_VERSION,
            symbol: series.symbol().to_string(),
            interval: series.interval(),
            strategy,
            params,
            metrics,
            trades: run.trades,
            equity_curve: run.equity_curve,
            open_position: run.open_position,
            signals: run.signals,
            warnings: run.warnings,
            recent,
            initial_cash: run.initial_cash,
            bar_count: run.bar_count,
            warmup_bars: run.warmup_bars,
            start: series.first().map(|b| b.timestamp),
            end: series.last().map(|b| b.timestamp),
            dataset_hash: dataset_hash(series),
            optimization: None,
        }
    }

    /// Short content hash of strategy and parameters.
    ///
    /// Two rows with the same run id were produced by the same configuration.
    pub fn run_id(&self) -> String {
        run_id(self.strategy, &self.params)
    }

    pub fn return_pct(&self) -> f64 {
        self.metrics.return_pct
    }

    pub fn trade_count(&self) -> usize {
        self.trades.len()
    }
}

/// First 16 hex characters of the BLAKE3 hash of `strategy:params_json`.
pub fn run_id(strategy: StrategyKind, params: &StrategyParams) -> String {
    let json = serde_json::to_string(params).unwrap_or_default();
    let hash = blake3::hash(format!("{strategy}:{json}").as_bytes());
    hash.to_hex()[..16].to_string()
}

/// Run one backtest at fixed parameters and summarize it.
pub fn run_with_params(
    series: &PriceSeries,
    strategy: StrategyKind,
    params: &StrategyParams,
    engine: &EngineConfig,
    window_bars: usize,
) -> Result<BacktestResult, EngineError> {
    let run = run_backtest(series, strategy, params, engine)?;
    Ok(BacktestResult::from_run(
        series,
        strategy,
        params.clone(),
        run,
        window_bars,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_loader::generate_synthetic_series;
    use chrono::NaiveDate;

    fn series() -> PriceSeries {
        generate_synthetic_series(
            "RUN",
            NaiveDate::from_ymd_opt(2023, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2023, 12, 31).unwrap(),
        )
        .unwrap()
    }

    #[test]
    fn fixed_params_result_is_populated() {
        let s = series();
        let kind = StrategyKind::SmaCross;
        let r = run_with_params(&s, kind, &kind.default_params(), &EngineConfig::default(), 2)
            .unwrap();
        assert_eq!(r.schema_version, SCHEMA_VERSION);
        assert_eq!(r.symbol, "RUN");
        assert_eq!(r.equity_curve.len(), s.len());
        assert_eq!(r.bar_count, s.len());
        assert_eq!(r.metrics.trade_count, r.trades.len());
        assert_eq!(r.start, s.first().map(|b| b.timestamp));
        assert!(r.optimization.is_none());
        assert_eq!(r.dataset_hash.len(), 64);
    }

    #[test]
    fn run_id_depends_on_params_and_strategy() {
        let a = StrategyParams::new().with("ns", 5i64).with("nl", 25i64);
        let b = StrategyParams::new().with("ns", 10i64).with("nl", 25i64);
        assert_eq!(run_id(StrategyKind::SmaCross, &a), run_id(StrategyKind::SmaCross, &a));
        assert_ne!(run_id(StrategyKind::SmaCross, &a), run_id(StrategyKind::SmaCross, &b));
        assert_ne!(run_id(StrategyKind::SmaCross, &a), run_id(StrategyKind::RsiCross, &a));
        assert_eq!(run_id(StrategyKind::SmaCross, &a).len(), 16);
    }

    #[test]
    fn json_without_schema_version_defaults() {
        let s = series();
        let kind = StrategyKind::RsiSignal;
        let r = run_with_params(&s, kind, &kind.default_params(), &EngineConfig::default(), 2)
            .unwrap();
        let mut value = serde_json::to_value(&r).unwrap();
        value.as_object_mut().unwrap().remove("schema_version");
        let back: BacktestResult = serde_json::from_value(value).unwrap();
        assert_eq!(back.schema_version, SCHEMA_VERSION);
        assert_eq!(back.params, r.params);
    }
}
