//! Average True Range (ATR) with Wilder smoothing.
//!
//! TR[0] = high - low; TR[t] = max(high-low, |high-prev_close|, |low-prev_close|).
//! Seed: mean of TR[1..=period]. Lookback: period.

use super::indicator::Indicator;
use crate::domain::Bar;

#[derive(Debug, Clone)]
pub struct Atr {
    period: usize,
    name: String,
}

impl Atr {
    pub fn new(period: usize) -> Self {
        debug_assert!(period >= 1, "ATR period must be >= 1");
        Self {
            period,
            name: Self::key(period),
        }
    }

    pub fn key(period: usize) -> String {
        format!("atr_{period}")
    }
}

pub fn true_range(bars: &[Bar]) -> Vec<f64> {
    bars.iter()
        .enumerate()
        .map(|(i, bar)| {
            let hl = bar.high - bar.low;
            if i == 0 {
                return hl;
            }
            let pc = bars[i - 1].close;
            hl.max((bar.high - pc).abs()).max((bar.low - pc).abs())
        })
        .collect()
}

impl Indicator for Atr {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.period
    }

    fn compute(&self, bars: &[Bar]) -> Vec<f64> {
        let n = bars.len();
        let mut result = vec![f64::NAN; n];
        if self.period == 0 || n < self.period + 1 {
            return result;
        }

        let tr = true_range(bars);
        let mut atr = tr[1..=self.period].iter().sum::<f64>() / self.period as f64;
        result[self.period] = atr;

        let alpha = 1.0 / self.period as f64;
        for i in (self.period + 1)..n {
            atr = alpha * tr[i] + (1.0 - alpha) * atr;
            result[i] = atr;
        }
        result
    }
}
