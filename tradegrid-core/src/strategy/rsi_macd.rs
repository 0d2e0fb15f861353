//! RSI filter combined with a MACD crossover trigger.

use super::{crossed_above, Action, StrategyRule};
use crate::domain::{Bar, Position};
use crate::indicators::{Indicator, IndicatorValues, Macd, Rsi};

#[derive(Debug, Clone)]
pub struct RsiMacd {
    pub rsi_period: usize,
    pub buy_below: f64,
    pub sell_above: f64,
    pub macd_fast: usize,
    pub macd_slow: usize,
    pub macd_signal: usize,
    rsi_key: String,
    macd_key: String,
    signal_key: String,
}

impl RsiMacd {
    pub fn new(
        rsi_period: usize,
        buy_below: f64,
        sell_above: f64,
        macd_fast: usize,
        macd_slow: usize,
        macd_signal: usize,
    ) -> Self {
        Self {
            rsi_period,
            buy_below,
            sell_above,
            macd_fast,
            macd_slow,
            macd_signal,
            rsi_key: Rsi::key(rsi_period),
            macd_key: Macd::line_key(macd_fast, macd_slow),
            signal_key: Macd::signal_key(macd_fast, macd_slow, macd_signal),
        }
    }
}

impl StrategyRule for RsiMacd {
    fn name(&self) -> &str {
        "rsi_macd"
    }

    fn indicators(&self) -> Vec<Box<dyn Indicator>> {
        vec![
            Box::new(Rsi::new(self.rsi_period)),
            Box::new(Macd::line(self.macd_fast, self.macd_slow)),
            Box::new(Macd::signal(self.macd_fast, self.macd_slow, self.macd_signal)),
        ]
    }

    fn decide(
        &self,
        _bars: &[Bar],
        bar_index: usize,
        indicators: &IndicatorValues,
        _position: Option<&Position>,
    ) -> Action {
        let Some(rsi) = indicators.finite(&self.rsi_key, bar_index) else {
            return Action::Hold;
        };
        if rsi < self.buy_below
            && crossed_above(indicators, &self.macd_key, &self.signal_key, bar_index)
        {
            Action::enter()
        } else if rsi > self.sell_above
            && crossed_above(indicators, &self.signal_key, &self.macd_key, bar_index)
        {
            Action::ExitToFlat
        } else {
            Action::Hold
        }
    }
}
