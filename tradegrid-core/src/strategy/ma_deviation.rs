//! Moving-average deviation: buy a stretched dip, sell a stretched rally.

use super::{Action, StrategyRule};
use crate::domain::{Bar, Position};
use crate::indicators::{Indicator, IndicatorValues, Sma};

#[derive(Debug, Clone)]
pub struct MaDeviation {
    pub ma_period: usize,
    /// Percent distance from the MA that triggers a decision.
    pub threshold_pct: f64,
    ma_key: String,
}

impl MaDeviation {
    pub fn new(ma_period: usize, threshold_pct: f64) -> Self {
        Self {
            ma_period,
            threshold_pct,
            ma_key: Sma::key(ma_period),
        }
    }

    /// (close - MA) / MA * 100, if the MA is defined and non-zero.
    pub fn deviation_pct(&self, close: f64, indicators: &IndicatorValues, i: usize) -> Option<f64> {
        let ma = indicators.finite(&self.ma_key, i)?;
        if ma == 0.0 {
            return None;
        }
        Some((close - ma) / ma * 100.0)
    }
}

impl StrategyRule for MaDeviation {
    fn name(&self) -> &str {
        "ma_deviation"
    }

    fn indicators(&self) -> Vec<Box<dyn Indicator>> {
        vec![Box::new(Sma::new(self.ma_period))]
    }

    fn decide(
        &self,
        bars: &[Bar],
        bar_index: usize,
        indicators: &IndicatorValues,
        _position: Option<&Position>,
    ) -> Action {
        match self.deviation_pct(bars[bar_index].close, indicators, bar_index) {
            Some(dev) if dev < -self.threshold_pct => Action::enter(),
            Some(dev) if dev > self.threshold_pct => Action::ExitToFlat,
            _ => Action::Hold,
        }
    }
}
