//! Exponential Moving Average (EMA).
//!
//! EMA[t] = alpha * x[t] + (1 - alpha) * EMA[t-1], alpha = 2 / (period + 1).
//! Seeded with the SMA of the first `period` values.
//! Lookback: period - 1.

use super::indicator::Indicator;
use crate::domain::Bar;

#[derive(Debug, Clone)]
pub struct Ema {
    period: usize,
    name: String,
}

impl Ema {
    pub fn new(period: usize) -> Self {
        debug_assert!(period >= 1, "EMA period must be >= 1");
        Self {
            period,
            name: format!("ema_{period}"),
        }
    }
}

impl Indicator for Ema {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.period.saturating_sub(1)
    }

    fn compute(&self, bars: &[Bar]) -> Vec<f64> {
        let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
        ema_series(&closes, self.period)
    }
}

/// EMA over an arbitrary series that may start with a `NaN` warm-up span.
///
/// The seed window begins at the first finite value, so the output lookback
/// is `leading_nan + period - 1`. A `NaN` after the seed taints the rest.
pub fn ema_series(values: &[f64], period: usize) -> Vec<f64> {
    let n = values.len();
    let mut result = vec![f64::NAN; n];
    if period == 0 {
        return result;
    }

    let Some(start) = values.iter().position(|v| v.is_finite()) else {
        return result;
    };
    let seed_end = start + period;
    if seed_end > n {
        return result;
    }

    let seed_window = &values[start..seed_end];
    if seed_window.iter().any(|v| !v.is_finite()) {
        return result;
    }
    let seed = seed_window.iter().sum::<f64>() / period as f64;
    result[seed_end - 1] = seed;

    let alpha = 2.0 / (period as f64 + 1.0);
    let mut prev = seed;
    for i in seed_end..n {
        if !values[i].is_finite() {
            break;
        }
        prev = alpha * values[i] + (1.0 - alpha) * prev;
        result[i] = prev;
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, make_bars, DEFAULT_EPSILON};

    #[test]
    fn ema_seed_is_sma() {
        let bars = make_bars(&[2.0, 4.0, 6.0, 8.0]);
        let out = Ema::new(3).compute(&bars);
        assert!(out[1].is_nan());
        assert_approx(out[2], 4.0, DEFAULT_EPSILON);
        // alpha = 0.5: 0.5 * 8 + 0.5 * 4 = 6
        assert_approx(out[3], 6.0, DEFAULT_EPSILON);
    }

    #[test]
    fn ema_series_skips_leading_nan() {
        let values = [f64::NAN, f64::NAN, 1.0, 3.0, 5.0];
        let out = ema_series(&values, 2);
        assert!(out[2].is_nan());
        assert_approx(out[3], 2.0, DEFAULT_EPSILON);
        // alpha = 2/3: 2/3 * 5 + 1/3 * 2 = 4
        assert_approx(out[4], 4.0, DEFAULT_EPSILON);
    }

    #[test]
    fn ema_series_too_short() {
        let out = ema_series(&[f64::NAN, 1.0], 2);
        assert!(out.iter().all(|v| v.is_nan()));
    }
}
