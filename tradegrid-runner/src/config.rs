//! TOML scan configuration.
//!
//! Every field has a default, so a file only needs the keys it changes:
//!
//! ```toml
//! strategy = "rsi_cross"
//! tickers = ["7203.T", "6758.T"]
//! constraint = "ns < nl"
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tradegrid_core::domain::Interval;
use tradegrid_core::engine::{EngineConfig, FillPolicy};
use tradegrid_core::strategy::StrategyKind;

use crate::constraint::{Constraint, ConstraintParseError};
use crate::data_loader::{LoadOptions, MAX_WINDOW_DAYS};
use crate::objective::Objective;
use crate::optimizer::{OptimizeConfig, DEFAULT_MAX_ATTEMPTS};
use crate::signal_window::DEFAULT_WINDOW_BARS;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("cannot serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error(transparent)]
    Constraint(#[from] ConstraintParseError),

    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ScanConfig {
    pub data_dir: PathBuf,
    pub interval: Interval,
    pub tickers: Vec<String>,
    /// Optional file with one ticker per line, appended to `tickers`.
    pub tickers_file: Option<PathBuf>,
    /// Optional code→name CSV used to label results.
    pub ticker_names: Option<PathBuf>,
    pub strategy: StrategyKind,
    pub objective: Objective,
    pub constraint: Option<String>,
    pub max_attempts: u32,
    pub initial_cash: f64,
    pub fill_policy: FillPolicy,
    pub window_bars: usize,
    pub drop_incomplete: bool,
    /// Restrict each series to this many calendar days ending `days_ago`
    /// days before its last bar.
    pub lookback_days: Option<i64>,
    pub days_ago: i64,
    pub parallel: bool,
    /// Results CSV to append to; nothing is written when unset.
    pub results_file: Option<PathBuf>,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            interval: Interval::Daily,
            tickers: Vec::new(),
            tickers_file: None,
            ticker_names: None,
            strategy: StrategyKind::SmaCross,
            objective: Objective::ReturnPct,
            constraint: None,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            initial_cash: EngineConfig::default().initial_cash,
            fill_policy: FillPolicy::SignalClose,
            window_bars: DEFAULT_WINDOW_BARS,
            drop_incomplete: true,
            lookback_days: None,
            days_ago: 0,
            parallel: true,
            results_file: None,
        }
    }
}

impl ScanConfig {
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |msg: String| Err(ConfigError::Invalid(msg));
        if !self.initial_cash.is_finite() || self.initial_cash <= 0.0 {
            return invalid(format!("initial_cash must be positive, got {}", self.initial_cash));
        }
        if self.max_attempts == 0 {
            return invalid("max_attempts must be at least 1".into());
        }
        if self.window_bars == 0 {
            return invalid("window_bars must be at least 1".into());
        }
        if !(0..=MAX_WINDOW_DAYS).contains(&self.days_ago) {
            return invalid(format!(
                "days_ago must be within 0..={MAX_WINDOW_DAYS}, got {}",
                self.days_ago
            ));
        }
        if let Some(days) = self.lookback_days {
            if !(1..=MAX_WINDOW_DAYS).contains(&days) {
                return invalid(format!(
                    "lookback_days must be within 1..={MAX_WINDOW_DAYS}, got {days}"
                ));
            }
        }
        if self.tickers.iter().any(|t| t.trim().is_empty()) {
            return invalid("tickers must not contain empty names".into());
        }
        self.parsed_constraint()?;
        Ok(())
    }

    pub fn parsed_constraint(&self) -> Result<Option<Constraint>, ConfigError> {
        self.constraint
            .as_deref()
            .map(|c| c.parse::<Constraint>())
            .transpose()
            .map_err(ConfigError::from)
    }

    /// `tickers` followed by the non-blank, non-comment lines of `tickers_file`.
    pub fn resolve_tickers(&self) -> Result<Vec<String>, ConfigError> {
        let mut tickers = self.tickers.clone();
        if let Some(path) = &self.tickers_file {
            let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
                path: path.clone(),
                source,
            })?;
            tickers.extend(
                content
                    .lines()
                    .map(str::trim)
                    .filter(|l| !l.is_empty() && !l.starts_with('#'))
                    .map(String::from),
            );
        }
        if tickers.is_empty() {
            return Err(ConfigError::Invalid("no tickers configured".into()));
        }
        Ok(tickers)
    }

    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig::new(self.initial_cash).with_fill_policy(self.fill_policy)
    }

    pub fn optimize_config(&self) -> Result<OptimizeConfig, ConfigError> {
        self.validate()?;
        Ok(OptimizeConfig {
            objective: self.objective,
            constraint: self.parsed_constraint()?,
            max_attempts: self.max_attempts,
            engine: self.engine_config(),
            parallel: self.parallel,
            space: None,
            window_bars: self.window_bars,
        })
    }

    pub fn load_options(&self) -> LoadOptions {
        LoadOptions {
            data_dir: self.data_dir.clone(),
            interval: self.interval,
            drop_incomplete: self.drop_incomplete,
        }
    }
}
