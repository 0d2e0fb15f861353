//! Price data loading for the runner.
//!
//! Real data comes from per-ticker CSV files laid out as
//! `<data_dir>/daily/<TICKER>_daily.csv` and
//! `<data_dir>/minute/<TICKER>_minute.csv`. Column order does not matter; the
//! header names Date/Datetime, Open, High, Low, Close and Volume are matched
//! case-insensitively and anything else (e.g. `Adj Close`) is ignored.
//!
//! A deterministic synthetic generator, seeded from the symbol, stands in for
//! real data in demos and offline tests.

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime};
use std::io::Read;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tradegrid_core::domain::{Bar, Interval, PriceSeries, SeriesError};

/// Errors from the data loading layer.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed CSV in {source_name}: {error}")]
    Csv {
        source_name: String,
        #[source]
        error: csv::Error,
    },

    #[error("{source_name} has no '{column}' column")]
    MissingColumn { source_name: String, column: String },

    #[error("{source_name} line {line}: missing or non-numeric '{column}'")]
    IncompleteRow {
        source_name: String,
        line: u64,
        column: String,
    },

    #[error("ticker '{0}' not found in name table")]
    UnknownTicker(String),

    #[error("{symbol}: no bars left after restricting to {lookback_days:?} days ending {days_ago} days back")]
    EmptyWindow {
        symbol: String,
        days_ago: i64,
        lookback_days: Option<i64>,
    },

    #[error(transparent)]
    Series(#[from] SeriesError),
}

/// Where and how to load ticker files.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadOptions {
    pub data_dir: PathBuf,
    pub interval: Interval,
    /// Drop rows with missing prices instead of failing.
    pub drop_incomplete: bool,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            interval: Interval::Daily,
            drop_incomplete: true,
        }
    }
}

/// Conventional file path for a ticker.
pub fn ticker_path(data_dir: &Path, ticker: &str, interval: Interval) -> PathBuf {
    match interval {
        Interval::Daily => data_dir.join("daily").join(format!("{ticker}_daily.csv")),
        Interval::Intraday => data_dir.join("minute").join(format!("{ticker}_minute.csv")),
    }
}

/// Load one ticker from the conventional layout.
pub fn load_ticker(ticker: &str, opts: &LoadOptions) -> Result<PriceSeries, LoadError> {
    let path = ticker_path(&opts.data_dir, ticker, opts.interval);
    load_csv(&path, ticker, opts.interval, opts.drop_incomplete)
}

/// Load a CSV file into a validated series.
pub fn load_csv(
    path: &Path,
    symbol: &str,
    interval: Interval,
    drop_incomplete: bool,
) -> Result<PriceSeries, LoadError> {
    let file = std::fs::File::open(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    read_series(file, &path.display().to_string(), symbol, interval, drop_incomplete)
}

#[derive(Debug, Clone, Copy)]
struct Columns {
    date: usize,
    open: usize,
    high: usize,
    low: usize,
    close: usize,
    volume: usize,
}

impl Columns {
    fn locate(headers: &csv::StringRecord, source_name: &str) -> Result<Self, LoadError> {
        let find = |names: &[&str]| {
            headers.iter().position(|h| {
                let h = h.trim().trim_start_matches('\u{feff}').to_ascii_lowercase();
                names.iter().any(|n| h == *n)
            })
        };
        let need = |column: &str| {
            find(&[column]).ok_or_else(|| LoadError::MissingColumn {
                source_name: source_name.to_string(),
                column: column.to_string(),
            })
        };
        // An unnamed leading index column is treated as the timestamp.
        let date = find(&["date", "datetime", "timestamp"])
            .or_else(|| (headers.len() > 5).then_some(0))
            .ok_or_else(|| LoadError::MissingColumn {
                source_name: source_name.to_string(),
                column: "date".to_string(),
            })?;
        Ok(Self {
            date,
            open: need("open")?,
            high: need("high")?,
            low: need("low")?,
            close: need("close")?,
            volume: need("volume")?,
        })
    }
}

/// Parse CSV rows from any reader.
///
/// Rows whose timestamp does not parse are skipped. Rows with a missing or
/// non-numeric price or volume are skipped when `drop_incomplete` is set and
/// are an error otherwise.
pub fn read_series<R: Read>(
    reader: R,
    source_name: &str,
    symbol: &str,
    interval: Interval,
    drop_incomplete: bool,
) -> Result<PriceSeries, LoadError> {
    let csv_err = |error| LoadError::Csv {
        source_name: source_name.to_string(),
        error,
    };
    let mut rdr = csv::ReaderBuilder::new().flexible(true).from_reader(reader);
    let headers = rdr.headers().map_err(csv_err)?.clone();
    let cols = Columns::locate(&headers, source_name)?;

    let mut bars = Vec::new();
    let mut unparsed_dates = 0usize;
    let mut dropped = 0usize;
    for record in rdr.records() {
        let record = record.map_err(csv_err)?;
        let line = record.position().map_or(0, |p| p.line());

        let Some(timestamp) = record.get(cols.date).and_then(|raw| parse_timestamp(raw, interval))
        else {
            unparsed_dates += 1;
            continue;
        };

        let field = |idx: usize| record.get(idx).and_then(parse_number);
        let values = [
            ("open", field(cols.open)),
            ("high", field(cols.high)),
            ("low", field(cols.low)),
            ("close", field(cols.close)),
            ("volume", field(cols.volume)),
        ];
        if let Some((column, _)) = values.iter().find(|(_, v)| v.is_none()) {
            if drop_incomplete {
                dropped += 1;
                continue;
            }
            return Err(LoadError::IncompleteRow {
                source_name: source_name.to_string(),
                line,
                column: column.to_string(),
            });
        }
        let [open, high, low, close, volume] = values.map(|(_, v)| v.unwrap_or(f64::NAN));
        bars.push(Bar::new(timestamp, open, high, low, close, volume));
    }

    if unparsed_dates > 0 || dropped > 0 {
        tracing::debug!(
            source = source_name,
            unparsed_dates,
            dropped,
            "skipped unusable rows"
        );
    }

    Ok(PriceSeries::new(symbol, interval, bars)?)
}

fn parse_number(raw: &str) -> Option<f64> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    raw.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Parse a timestamp, dropping any UTC offset and keeping wall-clock time.
/// Daily data is floored to midnight.
pub fn parse_timestamp(raw: &str, interval: Interval) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    let parsed = DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.naive_local())
        .or_else(|_| DateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%:z").map(|dt| dt.naive_local()))
        .or_else(|_| DateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%z").map(|dt| dt.naive_local()))
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S"))
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S"))
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M"))
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y/%m/%d %H:%M:%S"))
        .ok()
        .or_else(|| {
            NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .or_else(|_| NaiveDate::parse_from_str(raw, "%Y/%m/%d"))
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })?;

    match interval {
        Interval::Daily => parsed.date().and_hms_opt(0, 0, 0),
        Interval::Intraday => Some(parsed),
    }
}

/// Lookback used when only `days_ago` is given.
pub const UNBOUNDED_LOOKBACK_DAYS: i64 = 36_500;

/// Largest `days_ago` or `lookback_days` a config may request.
pub const MAX_WINDOW_DAYS: i64 = UNBOUNDED_LOOKBACK_DAYS;

/// Keep `lookback_days` of history ending `days_ago` days before the last
/// bar. With neither set the series is returned unchanged.
///
/// A window that empties a non-empty series is an [`LoadError::EmptyWindow`].
pub fn restrict_window(
    series: PriceSeries,
    days_ago: i64,
    lookback_days: Option<i64>,
) -> Result<PriceSeries, LoadError> {
    let restricted = match lookback_days {
        Some(days) => series.window_before(days_ago, days),
        None if days_ago > 0 => series.window_before(days_ago, UNBOUNDED_LOOKBACK_DAYS),
        None => return Ok(series),
    };
    if restricted.is_empty() && !series.is_empty() {
        return Err(LoadError::EmptyWindow {
            symbol: series.symbol().to_string(),
            days_ago,
            lookback_days,
        });
    }
    Ok(restricted)
}

/// Look up a ticker's display name in a code→name CSV.
///
/// The table's code column is `コード` or `code`, the name column `銘柄名` or
/// `name`. A `.T` exchange suffix on `ticker` is ignored.
pub fn lookup_ticker_name(table: &Path, ticker: &str) -> Result<String, LoadError> {
    let file = std::fs::File::open(table).map_err(|source| LoadError::Io {
        path: table.to_path_buf(),
        source,
    })?;
    let source_name = table.display().to_string();
    let csv_err = |error| LoadError::Csv {
        source_name: source_name.clone(),
        error,
    };
    let mut rdr = csv::ReaderBuilder::new().flexible(true).from_reader(file);
    let headers = rdr.headers().map_err(csv_err)?.clone();
    let find = |names: &[&str]| {
        headers.iter().position(|h| {
            let h = h.trim().trim_start_matches('\u{feff}').to_lowercase();
            names.contains(&h.as_str())
        })
    };
    let missing = |column: &str| LoadError::MissingColumn {
        source_name: source_name.clone(),
        column: column.to_string(),
    };
    let code_col = find(&["コード", "code"]).ok_or_else(|| missing("code"))?;
    let name_col = find(&["銘柄名", "name"]).ok_or_else(|| missing("name"))?;

    let code = ticker.strip_suffix(".T").unwrap_or(ticker);
    for record in rdr.records() {
        let record = record.map_err(csv_err)?;
        if record.get(code_col).map(str::trim) == Some(code) {
            if let Some(name) = record.get(name_col) {
                return Ok(name.trim().to_string());
            }
        }
    }
    Err(LoadError::UnknownTicker(ticker.to_string()))
}

/// Deterministic BLAKE3 hash over the symbol and every bar.
pub fn dataset_hash(series: &PriceSeries) -> String {
    let mut hasher = blake3::Hasher::new();
    hasher.update(series.symbol().as_bytes());
    hasher.update(series.interval().as_str().as_bytes());
    for bar in series.bars() {
        hasher.update(&bar.timestamp.and_utc().timestamp().to_le_bytes());
        hasher.update(&bar.open.to_le_bytes());
        hasher.update(&bar.high.to_le_bytes());
        hasher.update(&bar.low.to_le_bytes());
        hasher.update(&bar.close.to_le_bytes());
        hasher.update(&bar.volume.to_le_bytes());
    }
    hasher.finalize().to_hex().to_string()
}

/// Generate a synthetic daily random walk from 100.0 over weekdays in
/// `[start, end]`. The same symbol always yields the same series.
pub fn generate_synthetic_series(
    symbol: &str,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<PriceSeries, SeriesError> {
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    let mut rng = StdRng::from_seed(*blake3::hash(symbol.as_bytes()).as_bytes());

    let mut bars = Vec::new();
    let mut price = 100.0_f64;
    for day in start.iter_days().take_while(|d| *d <= end) {
        if matches!(day.weekday(), chrono::Weekday::Sat | chrono::Weekday::Sun) {
            continue;
        }
        let Some(timestamp) = day.and_hms_opt(0, 0, 0) else {
            continue;
        };

        let daily_return: f64 = rng.gen_range(-0.03..0.03);
        let open = price;
        let close = price * (1.0 + daily_return);
        let high = open.max(close) * (1.0 + rng.gen_range(0.0..0.01));
        let low = open.min(close) * (1.0 - rng.gen_range(0.0..0.01));
        let volume = rng.gen_range(500_000..5_000_000u64) as f64;

        bars.push(Bar::new(timestamp, open, high, low, close, volume));
        price = close;
    }

    PriceSeries::new(symbol, Interval::Daily, bars)
}
