//! MACD / signal-line crossover.

use super::{crossed_above, Action, StrategyRule};
use crate::domain::{Bar, Position};
use crate::indicators::{Indicator, IndicatorValues, Macd};

#[derive(Debug, Clone)]
pub struct MacdCross {
    pub fast: usize,
    pub slow: usize,
    pub signal: usize,
    macd_key: String,
    signal_key: String,
}

impl MacdCross {
    pub fn new(fast: usize, slow: usize, signal: usize) -> Self {
        Self {
            fast,
            slow,
            signal,
            macd_key: Macd::line_key(fast, slow),
            signal_key: Macd::signal_key(fast, slow, signal),
        }
    }
}

impl StrategyRule for MacdCross {
    fn name(&self) -> &str {
        "macd_cross"
    }

    fn indicators(&self) -> Vec<Box<dyn Indicator>> {
        vec![
            Box::new(Macd::line(self.fast, self.slow)),
            Box::new(Macd::signal(self.fast, self.slow, self.signal)),
        ]
    }

    fn decide(
        &self,
        _bars: &[Bar],
        bar_index: usize,
        indicators: &IndicatorValues,
        _position: Option<&Position>,
    ) -> Action {
        if crossed_above(indicators, &self.macd_key, &self.signal_key, bar_index) {
            Action::enter()
        } else if crossed_above(indicators, &self.signal_key, &self.macd_key, bar_index) {
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
    fn no_decision_before_signal_line_exists() {
        let closes: Vec<f64> = (0..80)
            .map(|i| 100.0 + 8.0 * (i as f64 * 0.25).sin())
            .collect();
        let bars = make_bars(&closes);
        let rule = MacdCross::new(12, 26, 9);
        let iv = rule.warm_up(&bars);
        assert_eq!(rule.warmup_bars(), 33);
        for i in 0..=33 {
            assert!(rule.decide(&bars, i, &iv, None).is_hold(), "bar {i}");
        }
        let fired = (34..bars.len()).any(|i| !rule.decide(&bars, i, &iv, None).is_hold());
        assert!(fired);
    }
}
