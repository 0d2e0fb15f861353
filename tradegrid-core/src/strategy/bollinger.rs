//! Bollinger band mean reversion: buy below the lower band, sell above the upper.

use super::{Action, StrategyRule};
use crate::domain::{Bar, Position};
use crate::indicators::{Bollinger, BollingerBand, Indicator, IndicatorValues};

#[derive(Debug, Clone)]
pub struct BollingerReversion {
    pub window: usize,
    pub deviation: f64,
    upper_key: String,
    lower_key: String,
}

impl BollingerReversion {
    pub fn new(window: usize, deviation: f64) -> Self {
        Self {
            window,
            deviation,
            upper_key: Bollinger::key(BollingerBand::Upper, window, deviation),
            lower_key: Bollinger::key(BollingerBand::Lower, window, deviation),
        }
    }
}

impl StrategyRule for BollingerReversion {
    fn name(&self) -> &str {
        "bollinger"
    }

    fn indicators(&self) -> Vec<Box<dyn Indicator>> {
        vec![
            Box::new(Bollinger::upper(self.window, self.deviation)),
            Box::new(Bollinger::lower(self.window, self.deviation)),
        ]
    }

    fn decide(
        &self,
        bars: &[Bar],
        bar_index: usize,
        indicators: &IndicatorValues,
        _position: Option<&Position>,
    ) -> Action {
        let (Some(upper), Some(lower)) = (
            indicators.finite(&self.upper_key, bar_index),
            indicators.finite(&self.lower_key, bar_index),
        ) else {
            return Action::Hold;
        };
        let close = bars[bar_index].close;
        if close < lower {
            Action::enter()
        } else if close > upper {
            Action::ExitToFlat
        } else {
            Action::Hold
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::make_bars;

    #[test]
    fn plunge_below_lower_band_enters() {
        let mut closes = vec![100.0, 101.0, 100.0, 101.0, 100.0, 101.0, 100.0, 101.0];
        closes.push(90.0);
        let bars = make_bars(&closes);
        let rule = BollingerReversion::new(5, 1.5);
        let iv = rule.warm_up(&bars);
        assert!(matches!(
            rule.decide(&bars, 8, &iv, None),
            Action::EnterLong { stop_loss: None }
        ));
        assert!(rule.decide(&bars, 7, &iv, None).is_hold());
    }

    #[test]
    fn spike_above_upper_band_exits() {
        let mut closes = vec![100.0, 101.0, 100.0, 101.0, 100.0, 101.0];
        closes.push(112.0);
        let bars = make_bars(&closes);
        let rule = BollingerReversion::new(5, 1.5);
        let iv = rule.warm_up(&bars);
        assert_eq!(rule.decide(&bars, 6, &iv, None), Action::ExitToFlat);
    }

    #[test]
    fn flat_series_holds() {
        let bars = make_bars(&[50.0; 30]);
        let rule = BollingerReversion::new(10, 2.0);
        let iv = rule.warm_up(&bars);
        assert!((0..30).all(|i| rule.decide(&bars, i, &iv, None).is_hold()));
    }
}
