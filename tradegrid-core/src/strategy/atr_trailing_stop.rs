//! Trend filter with an ATR-based protective stop.
//!
//! Enters above the MA with `stop = close - multiplier * ATR`. The stop is
//! fixed at entry; the engine enforces it. Exits when close drops below
//! the MA.

use super::{Action, StrategyRule};
use crate::domain::{Bar, Position};
use crate::indicators::{Atr, Indicator, IndicatorValues, Sma};

#[derive(Debug, Clone)]
pub struct AtrTrailingStop {
    pub ma_period: usize,
    pub atr_period: usize,
    pub multiplier: f64,
    ma_key: String,
    atr_key: String,
}

impl AtrTrailingStop {
    pub fn new(ma_period: usize, atr_period: usize, multiplier: f64) -> Self {
        Self {
            ma_period,
            atr_period,
            multiplier,
            ma_key: Sma::key(ma_period),
            atr_key: Atr::key(atr_period),
        }
    }
}

impl StrategyRule for AtrTrailingStop {
    fn name(&self) -> &str {
        "atr_trailing_stop"
    }

    fn indicators(&self) -> Vec<Box<dyn Indicator>> {
        vec![
            Box::new(Sma::new(self.ma_period)),
            Box::new(Atr::new(self.atr_period)),
        ]
    }

    fn decide(
        &self,
        bars: &[Bar],
        bar_index: usize,
        indicators: &IndicatorValues,
        _position: Option<&Position>,
    ) -> Action {
        let (Some(ma), Some(atr)) = (
            indicators.finite(&self.ma_key, bar_index),
            indicators.finite(&self.atr_key, bar_index),
        ) else {
            return Action::Hold;
        };
        let close = bars[bar_index].close;
        if close > ma {
            Action::EnterLong {
                stop_loss: Some(close - self.multiplier * atr),
            }
        } else if close < ma {
            Action::ExitToFlat
        } else {
            Action::Hold
        }
    }
}
