//! Closed round-trip trades.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::position::Position;

/// Why a position was closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExitReason {
    Signal,
    StopLoss,
}

impl fmt::Display for ExitReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExitReason::Signal => f.write_str("signal"),
            ExitReason::StopLoss => f.write_str("stop_loss"),
        }
    }
}

/// A completed round trip. Immutable once recorded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trade {
    pub entry_bar: usize,
    pub entry_time: NaiveDateTime,
    pub entry_price: f64,
    pub exit_bar: usize,
    pub exit_time: NaiveDateTime,
    pub exit_price: f64,
    pub quantity: f64,
    pub pnl: f64,
    pub exit_reason: ExitReason,
}

impl Trade {
    /// Close `position` at the given bar and price.
    pub fn close(
        position: &Position,
        exit_bar: usize,
        exit_time: NaiveDateTime,
        exit_price: f64,
        exit_reason: ExitReason,
    ) -> Self {
        Self {
            entry_bar: position.entry_bar,
            entry_time: position.entry_time,
            entry_price: position.entry_price,
            exit_bar,
            exit_time,
            exit_price,
            quantity: position.quantity,
            pnl: position.unrealized_pnl(exit_price),
            exit_reason,
        }
    }

    /// Percentage return of the round trip.
    pub fn return_pct(&self) -> f64 {
        if self.entry_price == 0.0 {
            return 0.0;
        }
        (self.exit_price / self.entry_price - 1.0) * 100.0
    }

    pub fn bars_held(&self) -> usize {
        self.exit_bar.saturating_sub(self.entry_bar)
    }

    pub fn is_winner(&self) -> bool {
        self.pnl > 0.0
    }
}
