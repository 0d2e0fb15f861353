//! TradeGrid Runner: optimization and batch orchestration on top of `tradegrid-core`.
//!
//! - Performance summary and optimization objectives
//! - Grid-search optimizer with constraint pruning and bounded retry
//! - Recent buy/sell signal flags
//! - Multi-ticker batch scans
//! - TOML scan config, CSV data loading, synthetic series, results store

pub mod config;
pub mod constraint;
pub mod data_loader;
pub mod metrics;
pub mod objective;
pub mod optimizer;
pub mod results_store;
pub mod retry;
pub mod runner;
pub mod scan;
pub mod signal_window;

pub use config::{ConfigError, ScanConfig};
pub use constraint::{Constraint, ConstraintParseError};
pub use data_loader::{
    generate_synthetic_series, load_csv, load_ticker, lookup_ticker_name, restrict_window,
    LoadError, LoadOptions,
};
pub use metrics::PerformanceMetrics;
pub use objective::Objective;
pub use optimizer::{optimize, OptimizeConfig, OptimizeError, SweepError};
pub use results_store::{ResultRow, ResultsStore, StoreError};
pub use retry::{retry_bounded, Retried};
pub use runner::{run_with_params, BacktestResult, OptimizationSummary, SCHEMA_VERSION};
pub use scan::{scan, ScanError, ScanReport, ScanSummary, TickerOutcome};
pub use signal_window::{RecentSignals, DEFAULT_WINDOW_BARS};
