//! Simulation engine: single-symbol, long-only bar loop.
//!
//! Indicators are precomputed once, then the loop walks the series tracking
//! cash, an optional position, and an optional order queued for the next
//! open. The run returns an immutable trade log, signal log and equity curve.

pub mod loop_runner;
pub mod precompute;
pub mod state;

pub use loop_runner::{run_backtest, run_rule};
pub use precompute::{compute_warmup, precompute_indicators};
pub use state::{
    EngineConfig, EngineError, EquityPoint, FillPolicy, RunResult, RunWarning, SignalRecord,
};
