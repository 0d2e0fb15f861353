//! Indicator precomputation.
//!
//! All indicators are computed once before the bar loop begins.

use crate::domain::Bar;
use crate::indicators::{Indicator, IndicatorValues};

/// Compute every indicator over the full bar series.
pub fn precompute_indicators(bars: &[Bar], indicators: &[Box<dyn Indicator>]) -> IndicatorValues {
    let mut values = IndicatorValues::new();
    for indicator in indicators {
        let series = indicator.compute(bars);
        debug_assert_eq!(
            series.len(),
            bars.len(),
            "indicator '{}' produced {} values for {} bars",
            indicator.name(),
            series.len(),
            bars.len()
        );
        values.insert(indicator.name(), series);
    }
    values
}

/// Warm-up length: the maximum lookback across all indicators.
pub fn compute_warmup(indicators: &[Box<dyn Indicator>]) -> usize {
    indicators.iter().map(|i| i.lookback()).max().unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{make_bars, Ema, Rsi, Sma};

    #[test]
    fn precompute_stores_each_series() {
        let bars = make_bars(&[10.0, 11.0, 12.0, 13.0, 14.0]);
        let indicators: Vec<Box<dyn Indicator>> = vec![Box::new(Sma::new(3)), Box::new(Ema::new(2))];
        let iv = precompute_indicators(&bars, &indicators);
        assert_eq!(iv.len(), 2);
        assert_eq!(iv.get_series("sma_3").unwrap().len(), 5);
        assert_eq!(iv.get("sma_3", 2), Some(11.0));
    }

    #[test]
    fn warmup_is_max_lookback() {
        let indicators: Vec<Box<dyn Indicator>> = vec![Box::new(Sma::new(20)), Box::new(Rsi::new(14))];
        assert_eq!(compute_warmup(&indicators), 19);
        assert_eq!(compute_warmup(&[]), 0);
    }
}
