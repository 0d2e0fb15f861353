//! Strategies: a closed set of rule variants with per-bar decisions.
//!
//! A strategy precomputes its indicators once over the whole series
//! (`warm_up`) and then answers `decide` for each bar index. Decisions may
//! read only bars and indicator values at or before that index. Strategies
//! hold no mutable bookkeeping; the engine owns position and signal logs.

pub mod atr_trailing_stop;
pub mod bollinger;
pub mod factory;
pub mod kind;
pub mod ma_deviation;
pub mod macd_cross;
pub mod rsi_cross;
pub mod rsi_macd;
pub mod rsi_signal;
pub mod rsi_threshold;
pub mod sma_cross;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::{Bar, ParamError, Position};
use crate::engine::{compute_warmup, precompute_indicators};
use crate::indicators::{Indicator, IndicatorValues};

pub use atr_trailing_stop::AtrTrailingStop;
pub use bollinger::BollingerReversion;
pub use factory::build_strategy;
pub use kind::StrategyKind;
pub use ma_deviation::MaDeviation;
pub use macd_cross::MacdCross;
pub use rsi_cross::RsiCross;
pub use rsi_macd::RsiMacd;
pub use rsi_signal::RsiSignal;
pub use rsi_threshold::RsiThreshold;
pub use sma_cross::SmaCross;

/// What a strategy wants to do at a bar.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Action {
    Hold,
    EnterLong { stop_loss: Option<f64> },
    ExitToFlat,
}

impl Action {
    pub fn enter() -> Self {
        Action::EnterLong { stop_loss: None }
    }

    pub fn is_hold(&self) -> bool {
        matches!(self, Action::Hold)
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum StrategyError {
    #[error("unknown strategy '{0}'")]
    UnknownStrategy(String),

    #[error("invalid parameters for {strategy}: {source}")]
    Param {
        strategy: &'static str,
        #[source]
        source: ParamError,
    },

    #[error("invalid parameters for {strategy}: {reason}")]
    InvalidValue {
        strategy: &'static str,
        reason: String,
    },
}

/// A configured strategy instance.
pub trait StrategyRule: Send + Sync {
    /// Registry name (e.g. "sma_cross").
    fn name(&self) -> &str;

    /// Indicators this rule reads, already configured with its parameters.
    fn indicators(&self) -> Vec<Box<dyn Indicator>>;

    /// Compute every indicator over the full series.
    fn warm_up(&self, bars: &[Bar]) -> IndicatorValues {
        precompute_indicators(bars, &self.indicators())
    }

    /// First bar index at which every indicator is defined.
    fn warmup_bars(&self) -> usize {
        compute_warmup(&self.indicators())
    }

    /// Decide at `bar_index`. Must only read `bars[..=bar_index]` and
    /// indicator values at or before `bar_index`.
    fn decide(
        &self,
        bars: &[Bar],
        bar_index: usize,
        indicators: &IndicatorValues,
        position: Option<&Position>,
    ) -> Action;
}

/// True iff `a` crosses above `b` at bar `i`: `a[i-1] <= b[i-1]` and
/// `a[i] > b[i]`. Any missing or `NaN` value among the four means no cross.
pub fn crossed_above(indicators: &IndicatorValues, a: &str, b: &str, i: usize) -> bool {
    if i == 0 {
        return false;
    }
    let values = (
        indicators.finite(a, i - 1),
        indicators.finite(b, i - 1),
        indicators.finite(a, i),
        indicators.finite(b, i),
    );
    match values {
        (Some(a_prev), Some(b_prev), Some(a_cur), Some(b_cur)) => {
            a_prev <= b_prev && a_cur > b_cur
        }
        _ => false,
    }
}
