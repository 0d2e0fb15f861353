//! Indicator trait and precomputed indicator values container.
//!
//! Indicators are pure functions: bar history in, numeric series out.
//! A strategy computes all of its indicators once over the full series
//! before the bar loop; the loop only reads them by index.

use crate::domain::Bar;
use std::collections::HashMap;

/// A pure, index-aligned indicator.
///
/// # Look-ahead guard
/// The value at bar t may depend only on bars `0..=t`. Every indicator is
/// checked by computing it on a truncated series and comparing against the
/// full-series output.
pub trait Indicator: Send + Sync {
    /// Key under which the output is stored (e.g. "sma_20", "rsi_14").
    fn name(&self) -> &str;

    /// Number of leading bars for which the output is `NaN`.
    fn lookback(&self) -> usize;

    /// Compute over the entire series. Output has the same length as `bars`.
    fn compute(&self, bars: &[Bar]) -> Vec<f64>;
}

/// Named indicator series, queried by bar index during the loop.
#[derive(Debug, Clone, Default)]
pub struct IndicatorValues {
    series: HashMap<String, Vec<f64>>,
}

impl IndicatorValues {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, values: Vec<f64>) {
        self.series.insert(name.into(), values);
    }

    /// Value at `bar_index`, or `None` if the name is unknown or out of range.
    pub fn get(&self, name: &str, bar_index: usize) -> Option<f64> {
        self.series
            .get(name)
            .and_then(|v| v.get(bar_index).copied())
    }

    /// Value at `bar_index` if it exists and is finite.
    pub fn finite(&self, name: &str, bar_index: usize) -> Option<f64> {
        self.get(name, bar_index).filter(|v| v.is_finite())
    }

    pub fn get_series(&self, name: &str) -> Option<&[f64]> {
        self.series.get(name).map(|v| v.as_slice())
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.series.keys().map(|k| k.as_str())
    }

    pub fn len(&self) -> usize {
        self.series.len()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }
}
