//! MACD: difference of two EMAs and its signal line.
//!
//! Two separate indicator instances:
//! - Line: EMA(close, fast) - EMA(close, slow); lookback max(fast, slow) - 1.
//! - Signal: EMA(line, signal); lookback line lookback + signal - 1.
//!
//! `fast > slow` is accepted; the line simply changes sign.

use super::ema::ema_series;
use super::indicator::Indicator;
use crate::domain::Bar;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MacdLine {
    Macd,
    Signal,
}

#[derive(Debug, Clone)]
pub struct Macd {
    fast: usize,
    slow: usize,
    signal: usize,
    line: MacdLine,
    name: String,
}

impl Macd {
    pub fn line(fast: usize, slow: usize) -> Self {
        debug_assert!(fast >= 1 && slow >= 1, "MACD periods must be >= 1");
        Self {
            fast,
            slow,
            signal: 1,
            line: MacdLine::Macd,
            name: Self::line_key(fast, slow),
        }
    }

    pub fn signal(fast: usize, slow: usize, signal: usize) -> Self {
        debug_assert!(
            fast >= 1 && slow >= 1 && signal >= 1,
            "MACD periods must be >= 1"
        );
        Self {
            fast,
            slow,
            signal,
            line: MacdLine::Signal,
            name: Self::signal_key(fast, slow, signal),
        }
    }

    pub fn line_key(fast: usize, slow: usize) -> String {
        format!("macd_{fast}_{slow}")
    }

    pub fn signal_key(fast: usize, slow: usize, signal: usize) -> String {
        format!("macd_signal_{fast}_{slow}_{signal}")
    }

    fn macd_values(&self, bars: &[Bar]) -> Vec<f64> {
        let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
        let fast = ema_series(&closes, self.fast);
        let slow = ema_series(&closes, self.slow);
        fast.iter().zip(&slow).map(|(f, s)| f - s).collect()
    }
}

impl Indicator for Macd {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        let line = self.fast.max(self.slow).saturating_sub(1);
        match self.line {
            MacdLine::Macd => line,
            MacdLine::Signal => line + self.signal.saturating_sub(1),
        }
    }

    fn compute(&self, bars: &[Bar]) -> Vec<f64> {
        let macd = self.macd_values(bars);
        match self.line {
            MacdLine::Macd => macd,
            MacdLine::Signal => ema_series(&macd, self.signal),
        }
    }
}
