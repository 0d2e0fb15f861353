//! Factory: turns a `StrategyKind` plus `StrategyParams` into a rule object.
//!
//! Missing keys, zero periods and out-of-range values are reported as
//! `StrategyError`; construction never panics on user input.

use super::{
    AtrTrailingStop, BollingerReversion, MaDeviation, MacdCross, RsiCross, RsiMacd, RsiSignal,
    RsiThreshold, SmaCross, StrategyError, StrategyKind, StrategyRule,
};
use crate::domain::{ParamError, StrategyParams};

/// Parameter reader bound to one strategy name for error reporting.
struct Reader<'a> {
    strategy: &'static str,
    params: &'a StrategyParams,
}

impl Reader<'_> {
    fn wrap(&self, source: ParamError) -> StrategyError {
        StrategyError::Param {
            strategy: self.strategy,
            source,
        }
    }

    fn period(&self, name: &str) -> Result<usize, StrategyError> {
        self.params.period(name).map_err(|e| self.wrap(e))
    }

    fn float(&self, name: &str) -> Result<f64, StrategyError> {
        self.params.float(name).map_err(|e| self.wrap(e))
    }

    fn non_negative(&self, name: &str) -> Result<f64, StrategyError> {
        let value = self.float(name)?;
        if value < 0.0 {
            return Err(self.invalid(format!("{name} must be >= 0, got {value}")));
        }
        Ok(value)
    }

    fn invalid(&self, reason: String) -> StrategyError {
        StrategyError::InvalidValue {
            strategy: self.strategy,
            reason,
        }
    }
}

/// Create a configured strategy rule.
pub fn build_strategy(
    kind: StrategyKind,
    params: &StrategyParams,
) -> Result<Box<dyn StrategyRule>, StrategyError> {
    let r = Reader {
        strategy: kind.name(),
        params,
    };
    match kind {
        StrategyKind::SmaCross => Ok(Box::new(SmaCross::new(r.period("ns")?, r.period("nl")?))),
        StrategyKind::RsiCross => Ok(Box::new(RsiCross::new(r.period("ns")?, r.period("nl")?))),
        StrategyKind::MacdCross => Ok(Box::new(MacdCross::new(
            r.period("n1")?,
            r.period("n2")?,
            r.period("n3")?,
        ))),
        StrategyKind::Bollinger => {
            let window = r.period("window")?;
            if window < 2 {
                return Err(r.invalid(format!(
                    "window must be >= 2 for a sample deviation, got {window}"
                )));
            }
            Ok(Box::new(BollingerReversion::new(
                window,
                r.non_negative("dev")?,
            )))
        }
        StrategyKind::RsiThreshold => Ok(Box::new(RsiThreshold::new(
            r.period("rsi_period")?,
            r.float("rsi_buy")?,
            r.float("rsi_sell")?,
        ))),
        StrategyKind::MaDeviation => Ok(Box::new(MaDeviation::new(
            r.period("ma_period")?,
            r.non_negative("deviation_threshold")?,
        ))),
        StrategyKind::AtrTrailingStop => Ok(Box::new(AtrTrailingStop::new(
            r.period("ma_period")?,
            r.period("atr_period")?,
            r.non_negative("atr_multiplier")?,
        ))),
        StrategyKind::RsiSignal => Ok(Box::new(RsiSignal::new(
            r.period("rsi_period")?,
            r.float("rsi_signal")?,
        ))),
        StrategyKind::RsiMacd => Ok(Box::new(RsiMacd::new(
            r.period("rsi_period")?,
            r.float("rsi_buy_threshold")?,
            r.float("rsi_sell_threshold")?,
            r.period("macd_fast")?,
            r.period("macd_slow")?,
            r.period("macd_signal")?,
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_key_is_param_error() {
        let params = StrategyParams::new().with("ns", 5i64);
        let err = build_strategy(StrategyKind::SmaCross, &params).err().unwrap();
        assert!(matches!(
            err,
            StrategyError::Param {
                strategy: "sma_cross",
                source: ParamError::Missing(_)
            }
        ));
    }

    #[test]
    fn zero_period_is_rejected() {
        let params = StrategyParams::new().with("ns", 0i64).with("nl", 10i64);
        assert!(build_strategy(StrategyKind::SmaCross, &params).is_err());
    }

    #[test]
    fn bollinger_window_one_is_rejected() {
        let params = StrategyParams::new().with("window", 1i64).with("dev", 2.0);
        let err = build_strategy(StrategyKind::Bollinger, &params).err().unwrap();
        assert!(matches!(err, StrategyError::InvalidValue { .. }));
    }

    #[test]
    fn negative_multiplier_is_rejected() {
        let params = StrategyParams::new()
            .with("ma_period", 20i64)
            .with("atr_period", 14i64)
            .with("atr_multiplier", -1.0);
        assert!(build_strategy(StrategyKind::AtrTrailingStop, &params).is_err());
    }

    #[test]
    fn fractional_period_is_rejected() {
        let params = StrategyParams::new()
            .with("rsi_period", 14.5)
            .with("rsi_signal", 50i64);
        assert!(build_strategy(StrategyKind::RsiSignal, &params).is_err());
    }
}
