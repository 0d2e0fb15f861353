//! Dual-period RSI crossover.

use super::{crossed_above, Action, StrategyRule};
use crate::domain::{Bar, Position};
use crate::indicators::{Indicator, IndicatorValues, Rsi};

/// Long when the short-period RSI crosses above the long-period RSI; flat on
/// the reverse cross.
#[derive(Debug, Clone)]
pub struct RsiCross {
    pub short_period: usize,
    pub long_period: usize,
    short_key: String,
    long_key: String,
}

impl RsiCross {
    pub fn new(short_period: usize, long_period: usize) -> Self {
        Self {
            short_period,
            long_period,
            short_key: Rsi::key(short_period),
            long_key: Rsi::key(long_period),
        }
    }
}

impl StrategyRule for RsiCross {
    fn name(&self) -> &str {
        "rsi_cross"
    }

    fn indicators(&self) -> Vec<Box<dyn Indicator>> {
        vec![
            Box::new(Rsi::new(self.short_period)),
            Box::new(Rsi::new(self.long_period)),
        ]
    }

    fn decide(
        &self,
        _bars: &[Bar],
        bar_index: usize,
        indicators: &IndicatorValues,
        _position: Option<&Position>,
    ) -> Action {
        if crossed_above(indicators, &self.short_key, &self.long_key, bar_index) {
            Action::enter()
        } else if crossed_above(indicators, &self.long_key, &self.short_key, bar_index) {
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
    fn fast_rsi_leads_on_reversal() {
        // Decline then sharp rally: the short RSI recovers first.
        let mut closes: Vec<f64> = (0..20).map(|i| 100.0 - i as f64).collect();
        closes.extend((1..=10).map(|i| 81.0 + 3.0 * i as f64));
        let bars = make_bars(&closes);
        let rule = RsiCross::new(3, 8);
        let iv = rule.warm_up(&bars);
        let first_entry = (0..bars.len())
            .find(|&i| matches!(rule.decide(&bars, i, &iv, None), Action::EnterLong { .. }));
        assert_eq!(first_entry, Some(20));
    }

    #[test]
    fn warmup_uses_longest_period() {
        assert_eq!(RsiCross::new(14, 28).warmup_bars(), 28);
    }
}
