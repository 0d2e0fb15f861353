//! Batch scan: optimize one strategy across many tickers.
//!
//! Tickers are independent. Each one is loaded and optimized on the rayon
//! pool; a failure is kept as that ticker's outcome and the batch carries on.
//! The report is a fold over the outcomes in input order.

use rayon::prelude::*;
use serde::Serialize;
use thiserror::Error;
use tradegrid_core::domain::PriceSeries;
use tradegrid_core::strategy::StrategyKind;

use crate::data_loader::LoadError;
use crate::metrics::{mean_f64, std_dev};
use crate::optimizer::{optimize, OptimizeConfig, OptimizeError};
use crate::runner::BacktestResult;

#[derive(Debug, Error)]
pub enum ScanError {
    #[error("load failed: {0}")]
    Load(#[from] LoadError),

    #[error("optimization failed: {0}")]
    Optimize(#[from] OptimizeError),
}

#[derive(Debug)]
pub struct TickerOutcome {
    pub ticker: String,
    pub outcome: Result<Box<BacktestResult>, ScanError>,
}

impl TickerOutcome {
    pub fn result(&self) -> Option<&BacktestResult> {
        self.outcome.as_deref().ok()
    }
}

/// Aggregate statistics over the tickers that succeeded.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ScanSummary {
    pub succeeded: usize,
    pub failed: usize,
    pub mean_return_pct: f64,
    /// Sample standard deviation; 0 with fewer than two successes.
    pub return_std_pct: f64,
    pub mean_trade_count: f64,
    pub buy_signal_tickers: Vec<String>,
    pub sell_signal_tickers: Vec<String>,
    /// Highest return; ties keep the earlier ticker.
    pub best_ticker: Option<String>,
    pub best_return_pct: Option<f64>,
}

#[derive(Debug)]
pub struct ScanReport {
    pub strategy: StrategyKind,
    pub outcomes: Vec<TickerOutcome>,
    pub summary: ScanSummary,
}

impl ScanReport {
    pub fn fold(strategy: StrategyKind, outcomes: Vec<TickerOutcome>) -> Self {
        let mut summary = ScanSummary::default();
        let mut returns = Vec::new();
        let mut trade_counts = Vec::new();

        for o in &outcomes {
            let Some(r) = o.result() else {
                summary.failed += 1;
                continue;
            };
            summary.succeeded += 1;
            returns.push(r.return_pct());
            trade_counts.push(r.trade_count() as f64);
            if r.recent.buy {
                summary.buy_signal_tickers.push(o.ticker.clone());
            }
            if r.recent.sell {
                summary.sell_signal_tickers.push(o.ticker.clone());
            }
            if summary.best_return_pct.map_or(true, |b| r.return_pct() > b) {
                summary.best_ticker = Some(o.ticker.clone());
                summary.best_return_pct = Some(r.return_pct());
            }
        }

        summary.mean_return_pct = mean_f64(&returns);
        summary.return_std_pct = std_dev(&returns);
        summary.mean_trade_count = mean_f64(&trade_counts);

        Self {
            strategy,
            outcomes,
            summary,
        }
    }

    pub fn best(&self) -> Option<&BacktestResult> {
        let ticker = self.summary.best_ticker.as_deref()?;
        self.outcomes
            .iter()
            .find(|o| o.ticker == ticker)
            .and_then(TickerOutcome::result)
    }
}

/// Load and optimize every ticker, then fold the outcomes into a report.
pub fn scan<L>(tickers: &[String], load: L, kind: StrategyKind, cfg: &OptimizeConfig) -> ScanReport
where
    L: Fn(&str) -> Result<PriceSeries, LoadError> + Sync,
{
    let outcomes: Vec<TickerOutcome> = tickers
        .par_iter()
        .map(|ticker| {
            let outcome = load(ticker.as_str())
                .map_err(ScanError::from)
                .and_then(|series| optimize(&series, kind, cfg).map_err(ScanError::from))
                .map(Box::new);
            if let Err(e) = &outcome {
                tracing::warn!(ticker = %ticker, strategy = %kind, error = %e, "ticker failed");
            }
            TickerOutcome {
                ticker: ticker.clone(),
                outcome,
            }
        })
        .collect();

    ScanReport::fold(kind, outcomes)
}
