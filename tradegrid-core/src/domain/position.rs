//! Open long position held by a single engine run.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub entry_bar: usize,
    pub entry_time: NaiveDateTime,
    pub entry_price: f64,
    pub quantity: f64,
    /// Fixed at entry; never trailed.
    pub stop_loss: Option<f64>,
}

impl Position {
    pub fn market_value(&self, price: f64) -> f64 {
        self.quantity * price
    }

    pub fn unrealized_pnl(&self, price: f64) -> f64 {
        (price - self.entry_price) * self.quantity
    }

    /// True when the bar's low touches the stop.
    pub fn stop_hit(&self, low: f64) -> bool {
        self.stop_loss.is_some_and(|stop| low <= stop)
    }
}
