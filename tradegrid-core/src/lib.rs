//! TradeGrid Core: domain types, indicators, strategies and the bar loop.
//!
//! - Validated price series and strategy parameter grids
//! - Pure, index-aligned indicators with `NaN` warm-up
//! - Nine rule-based strategies behind a closed `StrategyKind` factory
//! - Single-symbol, long-only simulation engine with stop handling

pub mod domain;
pub mod engine;
pub mod indicators;
pub mod strategy;

pub use domain::{Bar, Interval, PriceSeries, StrategyParams};
pub use engine::{run_backtest, EngineConfig, FillPolicy, RunResult};
pub use strategy::{Action, StrategyKind, StrategyRule};
