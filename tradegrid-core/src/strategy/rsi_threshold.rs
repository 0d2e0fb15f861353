//! RSI oversold / overbought thresholds.

use super::{Action, StrategyRule};
use crate::domain::{Bar, Position};
use crate::indicators::{Indicator, IndicatorValues, Rsi};

#[derive(Debug, Clone)]
pub struct RsiThreshold {
    pub period: usize,
    pub buy_below: f64,
    pub sell_above: f64,
    rsi_key: String,
}

impl RsiThreshold {
    pub fn new(period: usize, buy_below: f64, sell_above: f64) -> Self {
        Self {
            period,
            buy_below,
            sell_above,
            rsi_key: Rsi::key(period),
        }
    }
}

impl StrategyRule for RsiThreshold {
    fn name(&self) -> &str {
        "rsi_threshold"
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
            Some(rsi) if rsi < self.buy_below => Action::enter(),
            Some(rsi) if rsi > self.sell_above => Action::ExitToFlat,
            _ => Action::Hold,
        }
    }
}
