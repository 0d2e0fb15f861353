//! Recent buy/sell flags derived from a completed run.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use tradegrid_core::domain::PriceSeries;
use tradegrid_core::engine::RunResult;

/// Number of trailing bars inspected when no window is given.
pub const DEFAULT_WINDOW_BARS: usize = 2;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecentSignals {
    /// A trade was entered at or after `since` (the open position included).
    pub buy: bool,
    /// A trade was exited at or after `since`.
    pub sell: bool,
    pub window_bars: usize,
    /// Timestamp of the `window_bars`-th last bar; `None` when the series is
    /// shorter than the window, in which case both flags are false.
    pub since: Option<NaiveDateTime>,
}

impl RecentSignals {
    pub fn evaluate(run: &RunResult, series: &PriceSeries, window_bars: usize) -> Self {
        let Some(since) = series.timestamp_from_end(window_bars) else {
            return Self {
                window_bars,
                ..Self::default()
            };
        };

        let open_entry = run.open_position.as_ref().map(|p| p.entry_time);
        let buy = run
            .trades
            .iter()
            .map(|t| t.entry_time)
            .chain(open_entry)
            .any(|t| t >= since);
        let sell = run.trades.iter().any(|t| t.exit_time >= since);

        Self {
            buy,
            sell,
            window_bars,
            since: Some(since),
        }
    }

    pub fn any(&self) -> bool {
        self.buy || self.sell
    }
}
