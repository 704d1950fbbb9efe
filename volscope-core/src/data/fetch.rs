//! Fetch orchestrator: validate the request, fetch every ticker, align.

use super::align::align_prices;
use super::provider::{DataError, DataProvider, DataSource, FetchProgress, PriceField};
use crate::config::{validate_date_range, validate_tickers};
use crate::table::PriceTable;
use chrono::NaiveDate;
use tracing::{debug, info};

/// What to fetch.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchRequest {
    pub tickers: Vec<String>,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub field: PriceField,
}

impl FetchRequest {
    pub fn new(tickers: Vec<String>, start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            tickers,
            start,
            end,
            field: PriceField::default(),
        }
    }

    pub fn with_field(mut self, field: PriceField) -> Self {
        self.field = field;
        self
    }
}

/// Price table plus provenance.
#[derive(Debug, Clone)]
pub struct FetchedPrices {
    pub table: PriceTable,
    pub synthetic: bool,
}

/// Fetch every requested ticker and align them into one price table.
///
/// The request is validated before any provider call. The first failing
/// ticker aborts the whole fetch; a ticker with no usable prices in range is
/// an error rather than an all-missing column.
pub fn fetch_prices(
    provider: &dyn DataProvider,
    request: &FetchRequest,
    progress: &dyn FetchProgress,
) -> Result<FetchedPrices, DataError> {
    validate_tickers(&request.tickers)?;
    validate_date_range(request.start, request.end)?;

    if !provider.is_available() {
        return Err(DataError::CircuitBreakerTripped {
            cooldown_secs: provider.cooldown_remaining().as_secs(),
        });
    }

    info!(
        provider = provider.name(),
        tickers = request.tickers.len(),
        start = %request.start,
        end = %request.end,
        "fetching prices"
    );
    progress.on_begin(&request.tickers);

    let total = request.tickers.len();
    let mut fetched = Vec::with_capacity(total);
    let mut synthetic = false;

    for (i, symbol) in request.tickers.iter().enumerate() {
        let result = provider
            .fetch(symbol, request.start, request.end)
            .and_then(|res| {
                let usable = res
                    .bars
                    .iter()
                    .filter(|b| request.field.select(b).is_finite())
                    .count();
                if usable == 0 {
                    return Err(DataError::EmptyResult {
                        symbol: symbol.clone(),
                        start: request.start,
                        end: request.end,
                    });
                }
                Ok(res)
            });

        let report = result.as_ref().map(|res| res.bars.len()).map_err(clone_for_report);
        progress.on_complete(symbol, i, total, &report);

        let res = result?;
        debug!(symbol = %symbol, rows = res.bars.len(), source = ?res.source, "fetched");
        synthetic |= res.source == DataSource::Synthetic;
        fetched.push((symbol.clone(), res.bars));
    }

    let table = align_prices(&fetched, request.field)
        .map_err(|e| DataError::ResponseFormatChanged(e.to_string()))?;

    info!(rows = table.row_count(), columns = table.column_count(), "aligned price table");
    Ok(FetchedPrices { table, synthetic })
}

/// Progress reporters only need the message, not the original error value.
fn clone_for_report(err: &DataError) -> DataError {
    DataError::Other(err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigError;
    use std::time::Duration;
    use crate::data::provider::{FetchResult, RawBar, SilentProgress};
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    struct CountingProvider {
        calls: AtomicUsize,
        empty_for: Option<&'static str>,
    }

    impl CountingProvider {
        fn new() -> Self {
            Self {
                calls: AtomicUsize::new(0),
                empty_for: None,
            }
        }
    }

    impl DataProvider for CountingProvider {
        fn name(&self) -> &str {
            "counting"
        }

        fn fetch(
            &self,
            symbol: &str,
            start: NaiveDate,
            _end: NaiveDate,
        ) -> Result<FetchResult, DataError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let close = if self.empty_for == Some(symbol) { f64::NAN } else { 10.0 };
            Ok(FetchResult {
                symbol: symbol.to_string(),
                bars: vec![RawBar {
                    date: start,
                    open: close,
                    high: close,
                    low: close,
                    close,
                    volume: 1,
                    adj_close: close,
                }],
                source: DataSource::YahooFinance,
            })
        }

        fn is_available(&self) -> bool {
            true
        }
    }

    #[test]
    fn empty_ticker_set_fails_before_any_call() {
        let provider = CountingProvider::new();
        let req = FetchRequest::new(vec![], d("2025-01-01"), d("2025-02-01"));
        let err = fetch_prices(&provider, &req, &SilentProgress).unwrap_err();
        assert!(matches!(err, DataError::InvalidRequest(ConfigError::EmptyTickers)));
        assert_eq!(provider.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn reversed_dates_fail_before_any_call() {
        let provider = CountingProvider::new();
        let req = FetchRequest::new(vec!["A".into()], d("2025-02-01"), d("2025-01-01"));
        let err = fetch_prices(&provider, &req, &SilentProgress).unwrap_err();
        assert!(matches!(
            err,
            DataError::InvalidRequest(ConfigError::InvalidDateRange { .. })
        ));
        assert_eq!(provider.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn all_missing_ticker_is_empty_result() {
        let provider = CountingProvider {
            calls: AtomicUsize::new(0),
            empty_for: Some("B"),
        };
        let req = FetchRequest::new(vec!["A".into(), "B".into()], d("2025-01-01"), d("2025-02-01"));
        let err = fetch_prices(&provider, &req, &SilentProgress).unwrap_err();
        assert!(matches!(err, DataError::EmptyResult { symbol, .. } if symbol == "B"));
    }

    #[test]
    fn columns_follow_request_order() {
        let provider = CountingProvider::new();
        let req = FetchRequest::new(vec!["B".into(), "A".into()], d("2025-01-01"), d("2025-02-01"));
        let fetched = fetch_prices(&provider, &req, &SilentProgress).unwrap();
        assert_eq!(fetched.table.symbols(), ["B", "A"]);
        assert!(!fetched.synthetic);
        assert_eq!(provider.calls.load(Ordering::SeqCst), 2);
    }

    struct BlockedProvider;

    impl DataProvider for BlockedProvider {
        fn name(&self) -> &str {
            "blocked"
        }

        fn fetch(&self, symbol: &str, _: NaiveDate, _: NaiveDate) -> Result<FetchResult, DataError> {
            Err(DataError::SymbolNotFound {
                symbol: symbol.to_string(),
            })
        }

        fn is_available(&self) -> bool {
            false
        }

        fn cooldown_remaining(&self) -> Duration {
            Duration::from_secs(90)
        }
    }

    #[test]
    fn blocked_provider_reports_cooldown() {
        let req = FetchRequest::new(vec!["A".into()], d("2025-01-01"), d("2025-02-01"));
        let err = fetch_prices(&BlockedProvider, &req, &SilentProgress).unwrap_err();
        assert!(matches!(err, DataError::CircuitBreakerTripped { cooldown_secs: 90 }));
        assert!(err.to_string().contains("90s cooldown left"));
    }
}
