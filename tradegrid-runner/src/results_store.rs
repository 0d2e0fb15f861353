//! Append-only CSV log of backtest runs.

use chrono::{Local, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::runner::BacktestResult;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("cannot open results file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot write results row: {0}")]
    Csv(#[from] csv::Error),

    #[error("cannot encode parameters: {0}")]
    Params(#[from] serde_json::Error),
}

/// One row of the results file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultRow {
    pub executed_at: String,
    pub ticker: String,
    pub ticker_name: String,
    pub interval: String,
    pub strategy: String,
    pub return_pct: f64,
    pub buy_hold_return_pct: f64,
    pub max_drawdown_pct: f64,
    pub trades: usize,
    pub win_rate_pct: f64,
    pub final_equity: f64,
    pub recent_buy: bool,
    pub recent_sell: bool,
    pub params: String,
    pub run_id: String,
}

impl ResultRow {
    pub fn from_result(
        result: &BacktestResult,
        ticker_name: Option<&str>,
        executed_at: NaiveDateTime,
    ) -> Result<Self, StoreError> {
        Ok(Self {
            executed_at: executed_at.format("%Y-%m-%d %H:%M:%S").to_string(),
            ticker: result.symbol.clone(),
            ticker_name: ticker_name.unwrap_or_default().to_string(),
            interval: result.interval.to_string(),
            strategy: result.strategy.to_string(),
            return_pct: result.metrics.return_pct,
            buy_hold_return_pct: result.metrics.buy_hold_return_pct,
            max_drawdown_pct: result.metrics.max_drawdown_pct,
            trades: result.metrics.trade_count,
            win_rate_pct: result.metrics.win_rate_pct,
            final_equity: result.metrics.final_equity,
            recent_buy: result.recent.buy,
            recent_sell: result.recent.sell,
            params: serde_json::to_string(&result.params)?,
            run_id: result.run_id(),
        })
    }
}

/// Results CSV at a fixed path.
#[derive(Debug, Clone)]
pub struct ResultsStore {
    path: PathBuf,
}

impl ResultsStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one row stamped with the current local time.
    pub fn append(
        &self,
        result: &BacktestResult,
        ticker_name: Option<&str>,
    ) -> Result<ResultRow, StoreError> {
        let row = ResultRow::from_result(result, ticker_name, Local::now().naive_local())?;
        self.append_row(&row)?;
        Ok(row)
    }

    /// Append a row, writing the header only when the file is new or empty.
    /// Parent directories are created as needed.
    pub fn append_row(&self, row: &ResultRow) -> Result<(), StoreError> {
        let io_err = |source| StoreError::Io {
            path: self.path.clone(),
            source,
        };
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(io_err)?;
        }
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(io_err)?;
        let needs_header = file.metadata().map_err(io_err)?.len() == 0;

        let mut writer = csv::WriterBuilder::new()
            .has_headers(needs_header)
            .from_writer(file);
        writer.serialize(row)?;
        writer.flush().map_err(io_err)?;
        tracing::debug!(path = %self.path.display(), run_id = %row.run_id, "result appended");
        Ok(())
    }

    /// Read every row back, oldest first.
    pub fn read_all(&self) -> Result<Vec<ResultRow>, StoreError> {
        let mut reader = csv::Reader::from_path(&self.path)?;
        let rows = reader.deserialize().collect::<Result<Vec<ResultRow>, _>>()?;
        Ok(rows)
    }
}
