//! The closed set of strategy variants and their static parameter metadata.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::{build_strategy, StrategyError, StrategyRule};
use crate::domain::{ParamSpace, StrategyParams};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    SmaCross,
    RsiCross,
    MacdCross,
    Bollinger,
    RsiThreshold,
    MaDeviation,
    AtrTrailingStop,
    RsiSignal,
    RsiMacd,
}

impl StrategyKind {
    pub const ALL: [StrategyKind; 9] = [
        StrategyKind::SmaCross,
        StrategyKind::RsiCross,
        StrategyKind::MacdCross,
        StrategyKind::Bollinger,
        StrategyKind::RsiThreshold,
        StrategyKind::MaDeviation,
        StrategyKind::AtrTrailingStop,
        StrategyKind::RsiSignal,
        StrategyKind::RsiMacd,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            StrategyKind::SmaCross => "sma_cross",
            StrategyKind::RsiCross => "rsi_cross",
            StrategyKind::MacdCross => "macd_cross",
            StrategyKind::Bollinger => "bollinger",
            StrategyKind::RsiThreshold => "rsi_threshold",
            StrategyKind::MaDeviation => "ma_deviation",
            StrategyKind::AtrTrailingStop => "atr_trailing_stop",
            StrategyKind::RsiSignal => "rsi_signal",
            StrategyKind::RsiMacd => "rsi_macd",
        }
    }

    /// One-line rule summary for listings.
    pub fn description(&self) -> &'static str {
        match self {
            StrategyKind::SmaCross => "long when SMA(ns) crosses above SMA(nl), flat on the reverse cross",
            StrategyKind::RsiCross => "long when RSI(ns) crosses above RSI(nl), flat on the reverse cross",
            StrategyKind::MacdCross => "long when MACD crosses above its signal line, flat on the reverse cross",
            StrategyKind::Bollinger => "long below the lower band, flat above the upper band",
            StrategyKind::RsiThreshold => "long when RSI < rsi_buy, flat when RSI > rsi_sell",
            StrategyKind::MaDeviation => "long when close sits deviation_threshold % below its MA, flat when above",
            StrategyKind::AtrTrailingStop => "long above the MA with an ATR stop, flat below the MA",
            StrategyKind::RsiSignal => "long when RSI > rsi_signal, flat when RSI < rsi_signal",
            StrategyKind::RsiMacd => "oversold RSI plus MACD cross up to enter, overbought RSI plus cross down to exit",
        }
    }

    /// The optimization grid.
    pub fn declare_parameters(&self) -> ParamSpace {
        match self {
            StrategyKind::SmaCross | StrategyKind::RsiCross => ParamSpace::new()
                .int_step("ns", 5, 25, 5)
                .int_step("nl", 5, 75, 5),
            StrategyKind::MacdCross => ParamSpace::new()
                .int_step("n1", 5, 75, 5)
                .int_step("n2", 10, 75, 5)
                .int_step("n3", 10, 75, 5),
            StrategyKind::Bollinger => ParamSpace::new()
                .int_step("window", 10, 50, 5)
                .floats("dev", &[1.5, 2.0, 2.5, 3.0]),
            StrategyKind::RsiThreshold => ParamSpace::new()
                .int_step("rsi_period", 10, 30, 2)
                .int_step("rsi_buy", 20, 40, 5)
                .int_step("rsi_sell", 60, 80, 5),
            StrategyKind::MaDeviation => ParamSpace::new()
                .int_step("ma_period", 10, 50, 5)
                .int_step("deviation_threshold", 2, 10, 2),
            StrategyKind::AtrTrailingStop => ParamSpace::new()
                .int_step("ma_period", 20, 100, 10)
                .int_step("atr_period", 10, 30, 5)
                .floats("atr_multiplier", &[1.5, 2.0, 2.5, 3.0]),
            StrategyKind::RsiSignal => ParamSpace::new()
                .int_step("rsi_period", 10, 30, 2)
                .int_step("rsi_signal", 40, 60, 5),
            StrategyKind::RsiMacd => ParamSpace::new()
                .int_step("rsi_period", 10, 20, 2)
                .int_step("rsi_buy_threshold", 20, 40, 5)
                .int_step("rsi_sell_threshold", 60, 80, 5)
                .int_step("macd_fast", 5, 15, 2)
                .int_step("macd_slow", 15, 30, 2)
                .int_step("macd_signal", 5, 15, 2),
        }
    }

    /// Reference parameters used for a direct run without optimization.
    pub fn default_params(&self) -> StrategyParams {
        let p = StrategyParams::new();
        match self {
            StrategyKind::SmaCross => p.with("ns", 5i64).with("nl", 25i64),
            StrategyKind::RsiCross => p.with("ns", 14i64).with("nl", 28i64),
            StrategyKind::MacdCross => p.with("n1", 12i64).with("n2", 26i64).with("n3", 9i64),
            StrategyKind::Bollinger => p.with("window", 20i64).with("dev", 2.0),
            StrategyKind::RsiThreshold => p
                .with("rsi_period", 14i64)
                .with("rsi_buy", 30i64)
                .with("rsi_sell", 70i64),
            StrategyKind::MaDeviation => p
                .with("ma_period", 20i64)
                .with("deviation_threshold", 5i64),
            StrategyKind::AtrTrailingStop => p
                .with("ma_period", 50i64)
                .with("atr_period", 14i64)
                .with("atr_multiplier", 2.0),
            StrategyKind::RsiSignal => p.with("rsi_period", 14i64).with("rsi_signal", 50i64),
            StrategyKind::RsiMacd => p
                .with("rsi_period", 14i64)
                .with("rsi_buy_threshold", 40i64)
                .with("rsi_sell_threshold", 60i64)
                .with("macd_fast", 6i64)
                .with("macd_slow", 13i64)
                .with("macd_signal", 5i64),
        }
    }

    /// Build a configured rule instance.
    pub fn build(&self, params: &StrategyParams) -> Result<Box<dyn StrategyRule>, StrategyError> {
        build_strategy(*self, params)
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for StrategyKind {
    type Err = StrategyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_ascii_lowercase();
        StrategyKind::ALL
            .into_iter()
            .find(|k| k.name() == needle)
            .ok_or_else(|| StrategyError::UnknownStrategy(s.to_string()))
    }
}
