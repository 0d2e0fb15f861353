//! PriceSeries: validated, immutable, time-ordered bars for one symbol.
//!
//! Construction fails fast on corrupted data. Sub-ranges are derived as new
//! series; an existing series is never mutated.

use chrono::{Duration, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use super::bar::Bar;

/// Bar granularity of a series.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Interval {
    #[default]
    Daily,
    Intraday,
}

impl Interval {
    pub fn as_str(&self) -> &'static str {
        match self {
            Interval::Daily => "daily",
            Interval::Intraday => "intraday",
        }
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Interval {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "daily" | "day" | "1d" => Ok(Interval::Daily),
            "intraday" | "minute" | "1m" => Ok(Interval::Intraday),
            other => Err(format!("unknown interval '{other}' (expected daily or intraday)")),
        }
    }
}

/// Data integrity violations detected while building a series.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SeriesError {
    #[error(
        "bar {index} at {timestamp} violates OHLC invariants \
         (open={open}, high={high}, low={low}, close={close})"
    )]
    InvalidBar {
        index: usize,
        timestamp: NaiveDateTime,
        open: f64,
        high: f64,
        low: f64,
        close: f64,
    },

    #[error("bar {index} at {timestamp} has invalid volume {volume}")]
    InvalidVolume {
        index: usize,
        timestamp: NaiveDateTime,
        volume: f64,
    },

    #[error("timestamps not strictly increasing at bar {index}: {previous} then {current}")]
    NonIncreasingTimestamp {
        index: usize,
        previous: NaiveDateTime,
        current: NaiveDateTime,
    },
}

/// Time-ordered OHLCV bars for one symbol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceSeries {
    symbol: String,
    interval: Interval,
    bars: Vec<Bar>,
}

impl PriceSeries {
    /// Validate and wrap a bar vector.
    ///
    /// Rejects non-increasing timestamps (duplicates included), non-finite or
    /// non-positive prices, negative volume, and OHLC ordering violations.
    pub fn new(
        symbol: impl Into<String>,
        interval: Interval,
        bars: Vec<Bar>,
    ) -> Result<Self, SeriesError> {
        for (index, bar) in bars.iter().enumerate() {
            if !bar.is_sane() {
                return Err(SeriesError::InvalidBar {
                    index,
                    timestamp: bar.timestamp,
                    open: bar.open,
                    high: bar.high,
                    low: bar.low,
                    close: bar.close,
                });
            }
            if !bar.volume.is_finite() || bar.volume < 0.0 {
                return Err(SeriesError::InvalidVolume {
                    index,
                    timestamp: bar.timestamp,
                    volume: bar.volume,
                });
            }
            if index > 0 {
                let previous = bars[index - 1].timestamp;
                if bar.timestamp <= previous {
                    return Err(SeriesError::NonIncreasingTimestamp {
                        index,
                        previous,
                        current: bar.timestamp,
                    });
                }
            }
        }

        Ok(Self {
            symbol: symbol.into(),
            interval,
            bars,
        })
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn interval(&self) -> Interval {
        self.interval
    }

    pub fn bars(&self) -> &[Bar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn first(&self) -> Option<&Bar> {
        self.bars.first()
    }

    pub fn last(&self) -> Option<&Bar> {
        self.bars.last()
    }

    /// Close prices in bar order.
    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.close).collect()
    }

    /// Timestamp of the `n`-th bar counted from the end (1 = last bar).
    pub fn timestamp_from_end(&self, n: usize) -> Option<NaiveDateTime> {
        if n == 0 || n > self.bars.len() {
            return None;
        }
        Some(self.bars[self.bars.len() - n].timestamp)
    }

    /// Bars whose calendar date lies within `[start, end]`. Either bound may be open.
    pub fn between(&self, start: Option<NaiveDate>, end: Option<NaiveDate>) -> PriceSeries {
        self.filtered(|bar| {
            let date = bar.date();
            start.map_or(true, |s| date >= s) && end.map_or(true, |e| date <= e)
        })
    }

    /// Bars within `days` calendar days of the last bar. A span reaching past
    /// the representable calendar keeps every bar.
    pub fn last_days(&self, days: i64) -> PriceSeries {
        let Some(last) = self.last() else {
            return self.clone();
        };
        match days_before(last.timestamp, days) {
            Some(start) => self.filtered(|bar| bar.timestamp >= start),
            None => self.clone(),
        }
    }

    /// `lookback_days` of history ending `days_ago` calendar days before the last bar.
    ///
    /// Offsets past the representable calendar saturate: an unrepresentable
    /// end leaves no bars, an unrepresentable start leaves the window open.
    pub fn window_before(&self, days_ago: i64, lookback_days: i64) -> PriceSeries {
        let Some(last) = self.last() else {
            return self.clone();
        };
        let Some(end) = days_before(last.timestamp, days_ago) else {
            return self.derived(Vec::new());
        };
        let start = days_before(end, lookback_days);
        self.filtered(|bar| start.map_or(true, |s| bar.timestamp >= s) && bar.timestamp <= end)
    }

    /// Contiguous sub-range by bar index. Bounds are clamped to the series.
    pub fn slice(&self, start: usize, end: usize) -> PriceSeries {
        let end = end.min(self.bars.len());
        let start = start.min(end);
        self.derived(self.bars[start..end].to_vec())
    }

    fn filtered(&self, keep: impl Fn(&Bar) -> bool) -> PriceSeries {
        self.derived(self.bars.iter().filter(|b| keep(b)).cloned().collect())
    }

    // Any contiguous subset of an already-validated series is itself valid.
    fn derived(&self, bars: Vec<Bar>) -> PriceSeries {
        PriceSeries {
            symbol: self.symbol.clone(),
            interval: self.interval,
            bars,
        }
    }
}

fn days_before(ts: NaiveDateTime, days: i64) -> Option<NaiveDateTime> {
    Duration::try_days(days).and_then(|d| ts.checked_sub_signed(d))
}
