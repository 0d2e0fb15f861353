//! Grid-search optimizer with bounded retry.
//!
//! 1. Enumerate the strategy's parameter grid and drop infeasible candidates.
//! 2. Evaluate every survivor (in parallel on the rayon pool when enabled),
//!    keeping only the objective value.
//! 3. Reduce in enumeration order to the strictly best value, so ties keep
//!    the earliest candidate regardless of thread scheduling.
//! 4. Retry a failed sweep up to `max_attempts` times.
//! 5. Re-run the winner once to produce the canonical result.

use rayon::prelude::*;
use thiserror::Error;
use tradegrid_core::domain::{ParamSpace, PriceSeries, StrategyParams};
use tradegrid_core::engine::{run_backtest, EngineConfig, EngineError};
use tradegrid_core::strategy::StrategyKind;

use crate::constraint::Constraint;
use crate::metrics::PerformanceMetrics;
use crate::objective::Objective;
use crate::retry::{retry_bounded, Retried};
use crate::runner::{run_with_params, BacktestResult, OptimizationSummary};
use crate::signal_window::DEFAULT_WINDOW_BARS;

/// Default number of sweep attempts.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

#[derive(Debug, Clone)]
pub struct OptimizeConfig {
    pub objective: Objective,
    pub constraint: Option<Constraint>,
    pub max_attempts: u32,
    pub engine: EngineConfig,
    pub parallel: bool,
    /// Replaces the strategy's declared grid when set.
    pub space: Option<ParamSpace>,
    /// Trailing bars inspected for recent signals on the final result.
    pub window_bars: usize,
}

impl Default for OptimizeConfig {
    fn default() -> Self {
        Self {
            objective: Objective::default(),
            constraint: None,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            engine: EngineConfig::default(),
            parallel: true,
            space: None,
            window_bars: DEFAULT_WINDOW_BARS,
        }
    }
}

impl OptimizeConfig {
    pub fn with_objective(mut self, objective: Objective) -> Self {
        self.objective = objective;
        self
    }

    pub fn with_constraint(mut self, constraint: Constraint) -> Self {
        self.constraint = Some(constraint);
        self
    }

    pub fn with_space(mut self, space: ParamSpace) -> Self {
        self.space = Some(space);
        self
    }

    pub fn with_engine(mut self, engine: EngineConfig) -> Self {
        self.engine = engine;
        self
    }

    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    pub fn sequential(mut self) -> Self {
        self.parallel = false;
        self
    }

    /// Grid to search for `kind`.
    pub fn space_for(&self, kind: StrategyKind) -> ParamSpace {
        self.space
            .clone()
            .unwrap_or_else(|| kind.declare_parameters())
    }

    /// Feasible candidates in enumeration order, plus the unpruned grid size.
    pub fn feasible_candidates(&self, kind: StrategyKind) -> (Vec<StrategyParams>, usize) {
        let all = self.space_for(kind).candidates();
        let total = all.len();
        let feasible = match &self.constraint {
            Some(c) => all.into_iter().filter(|p| c.allows(p)).collect(),
            None => all,
        };
        (feasible, total)
    }
}

/// Why a single sweep attempt produced no winner.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SweepError {
    #[error("all {candidates} candidates failed, last error: {last}")]
    AllCandidatesFailed { candidates: usize, last: EngineError },

    #[error("no candidate produced a finite {objective} value")]
    NoFiniteValue { objective: Objective },
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum OptimizeError {
    #[error("no {strategy} candidate satisfies the constraint ({total} enumerated)")]
    NoFeasibleCandidates { strategy: StrategyKind, total: usize },

    #[error("optimization failed after {attempts} attempt(s): {last_error}")]
    Exhausted { attempts: u32, last_error: SweepError },

    #[error(transparent)]
    Engine(#[from] EngineError),
}

/// Winner of one sweep.
#[derive(Debug, Clone, Copy, PartialEq)]
struct SweepOutcome {
    best_index: usize,
    best_value: f64,
    skipped: usize,
}

fn evaluate(
    series: &PriceSeries,
    kind: StrategyKind,
    params: &StrategyParams,
    cfg: &OptimizeConfig,
) -> Result<f64, EngineError> {
    let run = run_backtest(series, kind, params, &cfg.engine)?;
    let metrics = PerformanceMetrics::compute(&run, series);
    Ok(cfg.objective.extract(&metrics))
}

fn sweep(
    series: &PriceSeries,
    kind: StrategyKind,
    candidates: &[StrategyParams],
    cfg: &OptimizeConfig,
) -> Result<SweepOutcome, SweepError> {
    let scores: Vec<Result<f64, EngineError>> = if cfg.parallel {
        candidates
            .par_iter()
            .map(|p| evaluate(series, kind, p, cfg))
            .collect()
    } else {
        candidates
            .iter()
            .map(|p| evaluate(series, kind, p, cfg))
            .collect()
    };

    let mut best: Option<(usize, f64)> = None;
    let mut skipped = 0;
    let mut failed = 0;
    let mut last_error = None;
    for (index, score) in scores.into_iter().enumerate() {
        match score {
            Ok(value) if value.is_finite() => {
                if best.map_or(true, |(_, b)| cfg.objective.is_better(value, b)) {
                    best = Some((index, value));
                }
            }
            Ok(value) => {
                skipped += 1;
                tracing::debug!(
                    strategy = %kind,
                    params = %candidates[index],
                    value,
                    "non-finite objective, skipping candidate"
                );
            }
            Err(e) => {
                skipped += 1;
                failed += 1;
                tracing::warn!(
                    strategy = %kind,
                    params = %candidates[index],
                    error = %e,
                    "candidate failed, skipping"
                );
                last_error = Some(e);
            }
        }
    }

    match (best, last_error) {
        (Some((best_index, best_value)), _) => Ok(SweepOutcome {
            best_index,
            best_value,
            skipped,
        }),
        (None, Some(last)) if failed == candidates.len() => Err(SweepError::AllCandidatesFailed {
            candidates: candidates.len(),
            last,
        }),
        (None, _) => Err(SweepError::NoFiniteValue {
            objective: cfg.objective,
        }),
    }
}

/// Search `kind`'s parameter grid for the configuration maximizing
/// `cfg.objective` over `series`, then return the canonical result at the
/// winning parameters.
pub fn optimize(
    series: &PriceSeries,
    kind: StrategyKind,
    cfg: &OptimizeConfig,
) -> Result<BacktestResult, OptimizeError> {
    cfg.engine.validate()?;

    let (candidates, total) = cfg.feasible_candidates(kind);
    if candidates.is_empty() {
        return Err(OptimizeError::NoFeasibleCandidates {
            strategy: kind,
            total,
        });
    }

    let outcome = retry_bounded(cfg.max_attempts, |attempt| {
        tracing::info!(
            symbol = series.symbol(),
            strategy = %kind,
            attempt,
            max_attempts = cfg.max_attempts,
            candidates = candidates.len(),
            "optimization attempt started"
        );
        sweep(series, kind, &candidates, cfg).map_err(|e| {
            tracing::warn!(
                symbol = series.symbol(),
                strategy = %kind,
                attempt,
                error = %e,
                "optimization attempt failed"
            );
            e
        })
    });

    let (best, attempts) = match outcome {
        Retried::Succeeded { value, attempt } => (value, attempt),
        Retried::Exhausted {
            attempts,
            last_error,
        } => {
            return Err(OptimizeError::Exhausted {
                attempts,
                last_error,
            })
        }
    };

    let params = &candidates[best.best_index];
    tracing::info!(
        symbol = series.symbol(),
        strategy = %kind,
        params = %params,
        objective = %cfg.objective,
        value = best.best_value,
        "best parameters selected"
    );

    let mut result = run_with_params(series, kind, params, &cfg.engine, cfg.window_bars)?;
    result.optimization = Some(OptimizationSummary {
        objective: cfg.objective,
        best_value: best.best_value,
        total_candidates: total,
        feasible_candidates: candidates.len(),
        skipped_candidates: best.skipped,
        attempts,
    });
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_loader::generate_synthetic_series;
    use chrono::NaiveDate;

    fn series() -> PriceSeries {
        generate_synthetic_series(
            "OPT",
            NaiveDate::from_ymd_opt(2022, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2022, 12, 31).unwrap(),
        )
        .unwrap()
    }

    #[test]
    fn constraint_prunes_before_evaluation() {
        let cfg = OptimizeConfig::default().with_constraint("ns < nl".parse().unwrap());
        let (feasible, total) = cfg.feasible_candidates(StrategyKind::SmaCross);
        assert_eq!(total, 4 * 14);
        assert!(feasible.len() < total);
        assert!(feasible
            .iter()
            .all(|p| p.int("ns").unwrap() < p.int("nl").unwrap()));
    }

    #[test]
    fn every_candidate_failing_exhausts_attempts() {
        let cfg = OptimizeConfig::default()
            .with_space(ParamSpace::new().int_step("ns", 0, 1, 1).int_step("nl", 10, 20, 5))
            .with_max_attempts(2);
        let err = optimize(&series(), StrategyKind::SmaCross, &cfg).unwrap_err();
        match err {
            OptimizeError::Exhausted {
                attempts,
                last_error: SweepError::AllCandidatesFailed { candidates, .. },
            } => {
                assert_eq!(attempts, 2);
                assert_eq!(candidates, 2);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn failing_candidates_are_skipped_not_fatal() {
        let cfg = OptimizeConfig::default()
            .with_space(ParamSpace::new().int_step("ns", 0, 10, 5).int_step("nl", 20, 30, 5))
            .sequential();
        let r = optimize(&series(), StrategyKind::SmaCross, &cfg).unwrap();
        let summary = r.optimization.unwrap();
        assert_eq!(summary.skipped_candidates, 2);
        assert_eq!(summary.attempts, 1);
        assert_eq!(r.params.int("ns").unwrap(), 5);
    }

    #[test]
    fn invalid_engine_config_fails_fast() {
        let cfg = OptimizeConfig::default().with_engine(EngineConfig::new(0.0));
        let err = optimize(&series(), StrategyKind::SmaCross, &cfg).unwrap_err();
        assert!(matches!(err, OptimizeError::Engine(EngineError::InvalidConfig(_))));
    }
}
