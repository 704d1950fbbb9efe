//! Data provider trait and structured error types.
//!
//! The DataProvider trait abstracts over price sources (Yahoo Finance,
//! synthetic random walks) so the pipeline can swap implementations and
//! tests can inject a mock.

use crate::config::ConfigError;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// One daily bar from a provider, before alignment.
///
/// Fields a provider did not report are NaN.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawBar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
    pub adj_close: f64,
}

/// Which bar field becomes the price table cell.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriceField {
    #[default]
    Close,
    AdjClose,
}

impl PriceField {
    pub fn select(self, bar: &RawBar) -> f64 {
        match self {
            PriceField::Close => bar.close,
            PriceField::AdjClose => bar.adj_close,
        }
    }
}

/// Structured error types for fetch operations.
#[derive(Debug, Error)]
pub enum DataError {
    #[error(transparent)]
    InvalidRequest(#[from] ConfigError),

    #[error("network unreachable: {0}")]
    NetworkUnreachable(String),

    #[error("request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    #[error("rate limited by provider (Retry-After {retry_after_secs}s)")]
    RateLimited { retry_after_secs: u64 },

    #[error("response format changed: {0}")]
    ResponseFormatChanged(String),

    #[error("authentication required: {0}")]
    AuthenticationRequired(String),

    #[error("symbol not found: {symbol}")]
    SymbolNotFound { symbol: String },

    #[error("no prices for '{symbol}' between {start} and {end}")]
    EmptyResult {
        symbol: String,
        start: NaiveDate,
        end: NaiveDate,
    },

    #[error("hard stop: data provider has blocked requests (circuit breaker tripped, {cooldown_secs}s cooldown left)")]
    CircuitBreakerTripped { cooldown_secs: u64 },

    #[error("data error: {0}")]
    Other(String),
}

/// Result of a successful fetch for a single symbol.
#[derive(Debug, Clone)]
pub struct FetchResult {
    pub symbol: String,
    pub bars: Vec<RawBar>,
    pub source: DataSource,
}

/// Where the data came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DataSource {
    YahooFinance,
    Synthetic,
}

/// Trait for price sources.
pub trait DataProvider: Send + Sync {
    /// Human-readable name of this provider.
    fn name(&self) -> &str;

    /// Fetch daily bars for a symbol with dates in `[start, end)`.
    fn fetch(&self, symbol: &str, start: NaiveDate, end: NaiveDate)
        -> Result<FetchResult, DataError>;

    /// Check if the provider is currently available (not rate-limited, not blocked).
    fn is_available(&self) -> bool;

    /// Time until a blocked provider accepts requests again.
    fn cooldown_remaining(&self) -> Duration {
        Duration::ZERO
    }
}

/// Progress callback for multi-symbol fetches.
pub trait FetchProgress {
    /// Called once before any network call.
    fn on_begin(&self, symbols: &[String]);

    /// Called when a symbol fetch completes.
    fn on_complete(&self, symbol: &str, index: usize, total: usize, result: &Result<usize, DataError>);
}

/// Prints progress to stdout.
pub struct StdoutProgress;

impl FetchProgress for StdoutProgress {
    fn on_begin(&self, symbols: &[String]) {
        println!("Fetching data for {symbols:?}...");
    }

    fn on_complete(
        &self,
        symbol: &str,
        index: usize,
        total: usize,
        result: &Result<usize, DataError>,
    ) {
        match result {
            Ok(rows) => println!("  [{}/{total}] OK: {symbol} ({rows} rows)", index + 1),
            Err(e) => println!("  [{}/{total}] FAIL: {symbol}: {e}", index + 1),
        }
    }
}

/// Discards progress; for tests and library callers that log instead.
pub struct SilentProgress;

impl FetchProgress for SilentProgress {
    fn on_begin(&self, _symbols: &[String]) {}

    fn on_complete(
        &self,
        _symbol: &str,
        _index: usize,
        _total: usize,
        _result: &Result<usize, DataError>,
    ) {
    }
}
