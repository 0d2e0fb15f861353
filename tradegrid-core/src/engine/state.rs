//! Engine configuration, per-run mutable state, and run result types.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::{Bar, ExitReason, Position, Trade};
use crate::strategy::{Action, StrategyError};

/// Which price an order signalled at bar t fills at.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FillPolicy {
    /// Trade-on-close: fill at bar t's close.
    #[default]
    SignalClose,
    /// Fill at bar t+1's open. Orders signalled on the final bar never fill.
    NextOpen,
}

/// Configuration for a single backtest run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    pub initial_cash: f64,
    #[serde(default)]
    pub fill_policy: FillPolicy,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            initial_cash: 100_000.0,
            fill_policy: FillPolicy::SignalClose,
        }
    }
}

impl EngineConfig {
    pub fn new(initial_cash: f64) -> Self {
        Self {
            initial_cash,
            ..Self::default()
        }
    }

    pub fn with_fill_policy(mut self, fill_policy: FillPolicy) -> Self {
        self.fill_policy = fill_policy;
        self
    }

    pub fn validate(&self) -> Result<(), EngineError> {
        if !self.initial_cash.is_finite() || self.initial_cash <= 0.0 {
            return Err(EngineError::InvalidConfig(format!(
                "initial_cash must be positive and finite, got {}",
                self.initial_cash
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    #[error(transparent)]
    Strategy(#[from] StrategyError),

    #[error("invalid engine config: {0}")]
    InvalidConfig(String),
}

/// Non-fatal conditions observed during a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RunWarning {
    /// The series is too short for the strategy to make any decision.
    InsufficientWarmup { required: usize, available: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EquityPoint {
    pub timestamp: NaiveDateTime,
    pub equity: f64,
}

/// A non-Hold decision, recorded whether or not it changed the position.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SignalRecord {
    pub bar_index: usize,
    pub timestamp: NaiveDateTime,
    pub action: Action,
}

/// Output of one engine run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunResult {
    pub strategy: String,
    pub equity_curve: Vec<EquityPoint>,
    pub trades: Vec<Trade>,
    /// Position still held after the last bar, marked to market in `final_equity`.
    pub open_position: Option<Position>,
    pub signals: Vec<SignalRecord>,
    pub warmup_bars: usize,
    pub bar_count: usize,
    pub initial_cash: f64,
    pub final_equity: f64,
    pub warnings: Vec<RunWarning>,
}

impl RunResult {
    pub fn total_return_pct(&self) -> f64 {
        if self.initial_cash == 0.0 {
            return 0.0;
        }
        (self.final_equity / self.initial_cash - 1.0) * 100.0
    }

    pub fn trade_count(&self) -> usize {
        self.trades.len()
    }

    pub fn is_flat(&self) -> bool {
        self.open_position.is_none()
    }
}

/// Order waiting for the next bar's open.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum PendingOrder {
    Enter { stop_loss: Option<f64> },
    Exit,
}

/// Mutable state that evolves bar by bar. Owned by exactly one run.
#[derive(Debug)]
pub(crate) struct EngineState {
    pub cash: f64,
    pub position: Option<Position>,
    pub pending: Option<PendingOrder>,
    pub trades: Vec<Trade>,
    pub signals: Vec<SignalRecord>,
    pub equity_curve: Vec<EquityPoint>,
}

impl EngineState {
    pub fn new(initial_cash: f64, bar_count: usize) -> Self {
        Self {
            cash: initial_cash,
            position: None,
            pending: None,
            trades: Vec::new(),
            signals: Vec::new(),
            equity_curve: Vec::with_capacity(bar_count),
        }
    }

    /// All-in long entry. Ignored while already long.
    pub fn open(&mut self, bar_index: usize, bar: &Bar, price: f64, stop_loss: Option<f64>) {
        if self.position.is_some() || price <= 0.0 {
            return;
        }
        let quantity = self.cash / price;
        self.cash = 0.0;
        self.position = Some(Position {
            entry_bar: bar_index,
            entry_time: bar.timestamp,
            entry_price: price,
            quantity,
            stop_loss,
        });
    }

    /// Close the whole position and log the trade. Ignored while flat.
    pub fn close(&mut self, bar_index: usize, bar: &Bar, price: f64, reason: ExitReason) {
        let Some(position) = self.position.take() else {
            return;
        };
        self.cash += position.market_value(price);
        self.trades
            .push(Trade::close(&position, bar_index, bar.timestamp, price, reason));
    }

    /// Fill a queued order at this bar's open.
    pub fn fill_pending(&mut self, bar_index: usize, bar: &Bar) {
        match self.pending.take() {
            Some(PendingOrder::Enter { stop_loss }) => {
                self.open(bar_index, bar, bar.open, stop_loss)
            }
            Some(PendingOrder::Exit) => self.close(bar_index, bar, bar.open, ExitReason::Signal),
            None => {}
        }
    }

    /// Exit at the stop if this bar's low reaches it. A bar that opens
    /// through the stop fills at the open. Returns true if the stop fired.
    pub fn check_stop(&mut self, bar_index: usize, bar: &Bar) -> bool {
        let Some(stop) = self
            .position
            .as_ref()
            .filter(|p| p.stop_hit(bar.low))
            .and_then(|p| p.stop_loss)
        else {
            return false;
        };
        let price = if bar.open <= stop { bar.open } else { stop };
        self.close(bar_index, bar, price, ExitReason::StopLoss);
        true
    }

    /// Mark to market at this bar's close and append the equity point.
    pub fn mark(&mut self, bar: &Bar) -> f64 {
        let equity = self.equity_at(bar.close);
        self.equity_curve.push(EquityPoint {
            timestamp: bar.timestamp,
            equity,
        });
        equity
    }

    pub fn equity_at(&self, price: f64) -> f64 {
        self.cash
            + self
                .position
                .as_ref()
                .map_or(0.0, |p| p.market_value(price))
    }
}
