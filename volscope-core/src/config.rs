//! Serializable analysis configuration.
//!
//! The four knobs of an analysis run (tickers, date range, rolling window)
//! plus fetch and output settings. Defaults reproduce the reference run on
//! three Borsa Istanbul tickers.

use crate::data::PriceField;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Invalid configuration: bad tickers, dates, or window.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("ticker set is empty")]
    EmptyTickers,

    #[error("ticker symbol is blank")]
    BlankTicker,

    #[error("ticker '{0}' is listed more than once")]
    DuplicateTicker(String),

    #[error("start date {start} must be before end date {end}")]
    InvalidDateRange { start: NaiveDate, end: NaiveDate },

    #[error("rolling window must be at least 2 trading days, got {window}")]
    WindowTooSmall { window: usize },

    #[error("fetch timeout must be positive")]
    ZeroTimeout,

    #[error("failed to read config {path}: {message}")]
    Read { path: PathBuf, message: String },

    #[error("failed to parse config: {0}")]
    Parse(String),
}

/// Full configuration for one analysis run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AnalysisConfig {
    /// Ticker symbols as the data source knows them (e.g. `THYAO.IS`).
    pub tickers: Vec<String>,

    /// First calendar day fetched (inclusive).
    pub start_date: NaiveDate,

    /// Last calendar day bound (exclusive).
    pub end_date: NaiveDate,

    /// Rolling window in trading days. Larger is smoother and lags more.
    pub window: usize,

    #[serde(default)]
    pub price_field: PriceField,

    #[serde(default)]
    pub fetch: FetchConfig,

    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct FetchConfig {
    /// Timeout for each attempt, covering connect, headers and body.
    /// One ticker may take up to `max_retries + 1` attempts plus backoff.
    pub timeout_secs: u64,
    /// Retries after the first attempt, with exponential backoff.
    pub max_retries: u32,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            max_retries: 3,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct OutputConfig {
    /// Directory the SVG charts are written to.
    pub dir: PathBuf,
    /// Open the interactive terminal viewer after rendering.
    pub display: bool,
    /// Prepended to both chart headings, e.g. "BIST 50".
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title_prefix: Option<String>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("charts"),
            display: false,
            title_prefix: None,
        }
    }
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            tickers: vec!["THYAO.IS".into(), "GARAN.IS".into(), "TUPRS.IS".into()],
            start_date: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap_or_default(),
            end_date: NaiveDate::from_ymd_opt(2026, 1, 13).unwrap_or_default(),
            window: 21,
            price_field: PriceField::default(),
            fetch: FetchConfig::default(),
            output: OutputConfig::default(),
        }
    }
}

impl AnalysisConfig {
    pub fn from_toml(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        Self::from_toml(&content)
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Check every field. The first problem found is returned.
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_tickers(&self.tickers)?;
        validate_date_range(self.start_date, self.end_date)?;
        validate_window(self.window)?;
        if self.fetch.timeout_secs == 0 {
            return Err(ConfigError::ZeroTimeout);
        }
        Ok(())
    }
}

pub(crate) fn validate_tickers(tickers: &[String]) -> Result<(), ConfigError> {
    if tickers.is_empty() {
        return Err(ConfigError::EmptyTickers);
    }
    for (i, ticker) in tickers.iter().enumerate() {
        if ticker.trim().is_empty() {
            return Err(ConfigError::BlankTicker);
        }
        if tickers[..i].contains(ticker) {
            return Err(ConfigError::DuplicateTicker(ticker.clone()));
        }
    }
    Ok(())
}

pub(crate) fn validate_date_range(start: NaiveDate, end: NaiveDate) -> Result<(), ConfigError> {
    if start >= end {
        return Err(ConfigError::InvalidDateRange { start, end });
    }
    Ok(())
}

/// Sample std of fewer than two points is undefined.
pub(crate) fn validate_window(window: usize) -> Result<(), ConfigError> {
    if window < 2 {
        return Err(ConfigError::WindowTooSmall { window });
    }
    Ok(())
}
