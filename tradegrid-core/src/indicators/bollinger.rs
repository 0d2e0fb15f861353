//! Bollinger Bands.
//!
//! Three bands as separate indicator instances:
//! - Middle: SMA(close, window)
//! - Upper/Lower: middle +/- deviation * sigma
//!
//! sigma is the sample standard deviation (divide by N - 1), so the window
//! must hold at least two bars. Lookback: window - 1.

use super::indicator::Indicator;
use super::sma::rolling_mean;
use crate::domain::Bar;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BollingerBand {
    Upper,
    Middle,
    Lower,
}

impl BollingerBand {
    fn label(&self) -> &'static str {
        match self {
            BollingerBand::Upper => "upper",
            BollingerBand::Middle => "middle",
            BollingerBand::Lower => "lower",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Bollinger {
    window: usize,
    deviation: f64,
    band: BollingerBand,
    name: String,
}

impl Bollinger {
    fn with_band(window: usize, deviation: f64, band: BollingerBand) -> Self {
        debug_assert!(window >= 2, "Bollinger window must be >= 2");
        Self {
            window,
            deviation,
            band,
            name: Self::key(band, window, deviation),
        }
    }

    pub fn upper(window: usize, deviation: f64) -> Self {
        Self::with_band(window, deviation, BollingerBand::Upper)
    }

    pub fn middle(window: usize, deviation: f64) -> Self {
        Self::with_band(window, deviation, BollingerBand::Middle)
    }

    pub fn lower(window: usize, deviation: f64) -> Self {
        Self::with_band(window, deviation, BollingerBand::Lower)
    }

    pub fn key(band: BollingerBand, window: usize, deviation: f64) -> String {
        format!("bb_{}_{window}_{deviation}", band.label())
    }
}

impl Indicator for Bollinger {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.window.saturating_sub(1)
    }

    fn compute(&self, bars: &[Bar]) -> Vec<f64> {
        let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
        let middle = rolling_mean(&closes, self.window);
        if self.band == BollingerBand::Middle {
            return middle;
        }

        let sign = match self.band {
            BollingerBand::Upper => 1.0,
            _ => -1.0,
        };
        let sigma = rolling_sample_std(&closes, &middle, self.window);
        middle
            .iter()
            .zip(&sigma)
            .map(|(m, s)| m + sign * self.deviation * s)
            .collect()
    }
}

/// Rolling sample standard deviation given the rolling mean.
fn rolling_sample_std(values: &[f64], means: &[f64], window: usize) -> Vec<f64> {
    let n = values.len();
    let mut result = vec![f64::NAN; n];
    if window < 2 {
        return result;
    }
    for i in (window - 1)..n {
        let mean = means[i];
        let ss: f64 = values[i + 1 - window..=i]
            .iter()
            .map(|v| (v - mean).powi(2))
            .sum();
        result[i] = (ss / (window - 1) as f64).sqrt();
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, make_bars, DEFAULT_EPSILON};

    #[test]
    fn bands_use_sample_stdev() {
        // closes 1..=4: mean 2.5, sample var = 5/3
        let bars = make_bars(&[1.0, 2.0, 3.0, 4.0]);
        let sd = (5.0f64 / 3.0).sqrt();
        let up = Bollinger::upper(4, 2.0).compute(&bars);
        let mid = Bollinger::middle(4, 2.0).compute(&bars);
        let lo = Bollinger::lower(4, 2.0).compute(&bars);
        assert!(up[2].is_nan());
        assert_approx(mid[3], 2.5, DEFAULT_EPSILON);
        assert_approx(up[3], 2.5 + 2.0 * sd, DEFAULT_EPSILON);
        assert_approx(lo[3], 2.5 - 2.0 * sd, DEFAULT_EPSILON);
    }

    #[test]
    fn flat_series_collapses_bands() {
        let bars = make_bars(&[7.0; 6]);
        let up = Bollinger::upper(3, 2.5).compute(&bars);
        assert_approx(up[5], 7.0, DEFAULT_EPSILON);
    }

    #[test]
    fn names_include_band() {
        assert_eq!(Bollinger::upper(20, 2.5).name(), "bb_upper_20_2.5");
        assert_eq!(Bollinger::lower(20, 2.0).name(), "bb_lower_20_2");
    }
}
