//! SMA crossover: long on the golden cross, flat on the death cross.

use super::{crossed_above, Action, StrategyRule};
use crate::domain::{Bar, Position};
use crate::indicators::{Indicator, IndicatorValues, Sma};

/// # Indicator dependencies
/// - `sma_{ns}` and `sma_{nl}`
///
/// `ns >= nl` is accepted; the rule is then inverted or, with equal periods,
/// never fires.
#[derive(Debug, Clone)]
pub struct SmaCross {
    pub short_period: usize,
    pub long_period: usize,
    short_key: String,
    long_key: String,
}

impl SmaCross {
    pub fn new(short_period: usize, long_period: usize) -> Self {
        Self {
            short_period,
            long_period,
            short_key: Sma::key(short_period),
            long_key: Sma::key(long_period),
        }
    }
}

impl StrategyRule for SmaCross {
    fn name(&self) -> &str {
        "sma_cross"
    }

    fn indicators(&self) -> Vec<Box<dyn Indicator>> {
        vec![
            Box::new(Sma::new(self.short_period)),
            Box::new(Sma::new(self.long_period)),
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
