//! RSI against a single signal level.

use super::{Action, StrategyRule};
use crate::domain::{Bar, Position};
use crate::indicators::{Indicator, IndicatorValues, Rsi};

#[derive(Debug, Clone)]
pub struct RsiSignal {
    pub period: usize,
    pub level: f64,
    rsi_key: String,
}

impl RsiSignal {
    pub fn new(period: usize, level: f64) -> Self {
        Self {
            period,
            level,
            rsi_key: Rsi::key(period),
        }
    }
}

impl StrategyRule for RsiSignal {
    fn name(&self) -> &str {
        "rsi_signal"
    }

    fn indicators(&self) -> Vec<Box<dyn Indicator>> {
        vec![Box::new(Rsi::new(self.period))]
    }

    fn decide(
        &self,
        _bars: &[Bar],
        bar_index: usize,
        indicators: &IndicatorValues,
        _position: Option<&Position>,
    ) -> Action {
        match indicators.finite(&self.rsi_key, bar_index) {
            Some(rsi) if rsi > self.level => Action::enter(),
            Some(rsi) if rsi < self.level => Action::ExitToFlat,
            _ => Action::Hold,
        }
    }
}
