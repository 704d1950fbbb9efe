//! Yahoo Finance data provider.
//!
//! Fetches daily bars from Yahoo's v8 chart API. Handles rate limiting,
//! retries with exponential backoff, response parsing, and the circuit breaker.
//!
//! Yahoo Finance has no official API and is subject to unannounced format changes.
//! `SyntheticProvider` is the offline fallback when Yahoo is unavailable.

use super::circuit_breaker::CircuitBreaker;
use super::provider::{DataError, DataProvider, DataSource, FetchResult, RawBar};
use crate::config::FetchConfig;
use chrono::NaiveDate;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";

#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: ChartResult,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    result: Option<Vec<ChartData>>,
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct ChartData {
    meta: Option<ChartMeta>,
    timestamp: Option<Vec<i64>>,
    indicators: Indicators,
}

/// Exchange metadata; only the UTC offset is needed to date bars correctly.
#[derive(Debug, Deserialize)]
struct ChartMeta {
    gmtoffset: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    quote: Vec<QuoteData>,
    adjclose: Option<Vec<AdjCloseData>>,
}

#[derive(Debug, Deserialize)]
struct QuoteData {
    #[serde(default)]
    open: Vec<Option<f64>>,
    #[serde(default)]
    high: Vec<Option<f64>>,
    #[serde(default)]
    low: Vec<Option<f64>>,
    #[serde(default)]
    close: Vec<Option<f64>>,
    #[serde(default)]
    volume: Vec<Option<u64>>,
}

#[derive(Debug, Deserialize)]
struct AdjCloseData {
    adjclose: Vec<Option<f64>>,
}

const BASE_URL: &str = "https://query2.finance.yahoo.com";

/// Longest `Retry-After` honoured between attempts.
const MAX_RETRY_AFTER: Duration = Duration::from_secs(60);

/// Yahoo Finance data provider.
pub struct YahooProvider {
    client: reqwest::blocking::Client,
    circuit_breaker: Arc<CircuitBreaker>,
    base_url: String,
    timeout: Duration,
    max_retries: u32,
    base_delay: Duration,
}

impl YahooProvider {
    /// `config.timeout_secs` bounds each attempt (connect, headers and body).
    /// A ticker can take up to `max_retries + 1` attempts plus backoff.
    pub fn new(circuit_breaker: Arc<CircuitBreaker>, config: &FetchConfig) -> Result<Self, DataError> {
        let timeout = Duration::from_secs(config.timeout_secs);
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| DataError::Other(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            circuit_breaker,
            base_url: BASE_URL.to_string(),
            timeout,
            max_retries: config.max_retries,
            base_delay: Duration::from_millis(500),
        })
    }

    /// Chart API URL covering `[start, end)` in UTC.
    fn chart_url(base_url: &str, symbol: &str, start: NaiveDate, end: NaiveDate) -> String {
        let start_ts = start.and_time(chrono::NaiveTime::MIN).and_utc().timestamp();
        let end_ts = end.and_time(chrono::NaiveTime::MIN).and_utc().timestamp();
        format!(
            "{base_url}/v8/finance/chart/{symbol}\
             ?period1={start_ts}&period2={end_ts}&interval=1d\
             &includeAdjustedClose=true"
        )
    }

    fn tripped(&self) -> DataError {
        DataError::CircuitBreakerTripped {
            cooldown_secs: self.circuit_breaker.remaining_cooldown().as_secs(),
        }
    }

    /// Error from sending the request or reading its body.
    ///
    /// Timeouts and refused connections count against the breaker and are
    /// returned as `Ok` for the retry loop; anything else is fatal.
    fn on_transport_error(&self, err: &reqwest::Error, symbol: &str) -> Result<DataError, DataError> {
        match classify_transport(err, self.timeout, symbol) {
            Attempt::Retry(e) => {
                self.circuit_breaker.record_failure();
                Ok(e)
            }
            Attempt::Fail(e) => Err(e),
        }
    }

    /// Execute the request with retry and circuit breaker logic.
    fn fetch_with_retry(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<RawBar>, DataError> {
        if !self.circuit_breaker.is_allowed() {
            return Err(self.tripped());
        }

        let url = Self::chart_url(&self.base_url, symbol, start, end);
        let mut last_error = None;

        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                let delay = retry_delay(self.base_delay, attempt, last_error.as_ref());
                warn!(symbol, attempt, ?delay, "retrying Yahoo request");
                std::thread::sleep(delay);
            }

            if !self.circuit_breaker.is_allowed() {
                return Err(self.tripped());
            }

            let resp = match self.client.get(&url).send() {
                Ok(resp) => resp,
                Err(e) => {
                    last_error = Some(self.on_transport_error(&e, symbol)?);
                    continue;
                }
            };

            let status = resp.status();

            if status == reqwest::StatusCode::FORBIDDEN {
                warn!(symbol, "Yahoo returned 403, tripping circuit breaker");
                self.circuit_breaker.trip();
                return Err(self.tripped());
            }

            if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
                self.circuit_breaker.record_failure();
                let retry_after = resp
                    .headers()
                    .get(reqwest::header::RETRY_AFTER)
                    .and_then(|v| v.to_str().ok())
                    .and_then(|v| v.trim().parse::<u64>().ok())
                    .unwrap_or(0);
                last_error = Some(DataError::RateLimited {
                    retry_after_secs: retry_after,
                });
                continue;
            }

            if status == reqwest::StatusCode::UNAUTHORIZED {
                return Err(DataError::AuthenticationRequired(
                    "Yahoo Finance requires authentication".into(),
                ));
            }

            // Yahoo answers unknown symbols with 404 and a JSON error body.
            if status == reqwest::StatusCode::NOT_FOUND {
                return Err(DataError::SymbolNotFound {
                    symbol: symbol.to_string(),
                });
            }

            if !status.is_success() {
                self.circuit_breaker.record_failure();
                last_error = Some(DataError::Other(format!("HTTP {status} for {symbol}")));
                continue;
            }

            // The client timeout also covers the body, so a stalled body is a timeout too.
            let body = match resp.text() {
                Ok(body) => body,
                Err(e) => {
                    last_error = Some(self.on_transport_error(&e, symbol)?);
                    continue;
                }
            };

            let bars = parse_chart(symbol, &body, start, end)?;
            self.circuit_breaker.record_success();
            debug!(symbol, rows = bars.len(), "parsed Yahoo chart");
            return Ok(bars);
        }

        Err(last_error.unwrap_or_else(|| DataError::Other("max retries exceeded".into())))
    }
}

/// What the retry loop does with a failed attempt.
#[derive(Debug)]
enum Attempt {
    Retry(DataError),
    Fail(DataError),
}

fn classify_transport(err: &reqwest::Error, timeout: Duration, symbol: &str) -> Attempt {
    if err.is_timeout() {
        Attempt::Retry(DataError::Timeout {
            timeout_secs: timeout.as_secs(),
        })
    } else if err.is_connect() {
        Attempt::Retry(DataError::NetworkUnreachable(err.to_string()))
    } else if err.is_body() || err.is_decode() {
        Attempt::Fail(DataError::ResponseFormatChanged(format!(
            "failed to read body for {symbol}: {err}"
        )))
    } else {
        Attempt::Fail(DataError::NetworkUnreachable(err.to_string()))
    }
}

/// Exponential backoff, stretched to the provider's `Retry-After` when it
/// asked for longer (capped at [`MAX_RETRY_AFTER`]).
fn retry_delay(base: Duration, attempt: u32, last_error: Option<&DataError>) -> Duration {
    let backoff = base * 2u32.pow(attempt.saturating_sub(1));
    match last_error {
        Some(DataError::RateLimited { retry_after_secs }) => {
            backoff.max(Duration::from_secs(*retry_after_secs).min(MAX_RETRY_AFTER))
        }
        _ => backoff,
    }
}

/// Parse a chart API body into bars dated within `[start, end)`.
///
/// Timestamps are shifted by the exchange's UTC offset before taking the
/// date, so a Tokyo or Istanbul session lands on its local trading day.
fn parse_chart(
    symbol: &str,
    body: &str,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<Vec<RawBar>, DataError> {
    let resp: ChartResponse = serde_json::from_str(body).map_err(|e| {
        DataError::ResponseFormatChanged(format!("failed to parse response for {symbol}: {e}"))
    })?;

    let result = resp.chart.result.ok_or_else(|| match resp.chart.error {
        Some(err) if err.code == "Not Found" => DataError::SymbolNotFound {
            symbol: symbol.to_string(),
        },
        Some(err) => DataError::ResponseFormatChanged(format!("{}: {}", err.code, err.description)),
        None => DataError::ResponseFormatChanged("empty result with no error".into()),
    })?;

    let data = result
        .into_iter()
        .next()
        .ok_or_else(|| DataError::ResponseFormatChanged("result array is empty".into()))?;

    let gmtoffset = data.meta.and_then(|m| m.gmtoffset).unwrap_or(0);

    // A valid symbol with no sessions in range comes back without timestamps.
    let Some(timestamps) = data.timestamp else {
        return Ok(Vec::new());
    };

    let quote = data
        .indicators
        .quote
        .into_iter()
        .next()
        .ok_or_else(|| DataError::ResponseFormatChanged("no quote data".into()))?;

    let adj_closes = data
        .indicators
        .adjclose
        .and_then(|v| v.into_iter().next())
        .map(|a| a.adjclose);

    let mut bars = Vec::with_capacity(timestamps.len());

    for (i, &ts) in timestamps.iter().enumerate() {
        let date = chrono::DateTime::from_timestamp(ts + gmtoffset, 0)
            .map(|dt| dt.naive_utc().date())
            .ok_or_else(|| DataError::ResponseFormatChanged(format!("invalid timestamp: {ts}")))?;

        if date < start || date >= end {
            continue;
        }

        let open = quote.open.get(i).copied().flatten();
        let high = quote.high.get(i).copied().flatten();
        let low = quote.low.get(i).copied().flatten();
        let close = quote.close.get(i).copied().flatten();
        let volume = quote.volume.get(i).copied().flatten();
        let adj_close = adj_closes.as_ref().and_then(|v| v.get(i).copied().flatten());

        // Rows with nothing reported are holidays, not gaps.
        if open.is_none() && high.is_none() && low.is_none() && close.is_none() && volume.is_none() {
            continue;
        }

        // Intraday snapshots can repeat the last session's date.
        if bars.last().is_some_and(|b: &RawBar| b.date == date) {
            bars.pop();
        }

        bars.push(RawBar {
            date,
            open: open.unwrap_or(f64::NAN),
            high: high.unwrap_or(f64::NAN),
            low: low.unwrap_or(f64::NAN),
            close: close.unwrap_or(f64::NAN),
            volume: volume.unwrap_or(0),
            adj_close: adj_close.unwrap_or(f64::NAN),
        });
    }

    Ok(bars)
}

impl DataProvider for YahooProvider {
    fn name(&self) -> &str {
        "yahoo_finance"
    }

    fn fetch(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<FetchResult, DataError> {
        let bars = self.fetch_with_retry(symbol, start, end)?;
        Ok(FetchResult {
            symbol: symbol.to_string(),
            bars,
            source: DataSource::YahooFinance,
        })
    }

    fn is_available(&self) -> bool {
        self.circuit_breaker.is_allowed()
    }

    fn cooldown_remaining(&self) -> Duration {
        self.circuit_breaker.remaining_cooldown()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Read, Write};
    use std::net::TcpListener;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    // 2025-01-02, 2025-01-03, 2025-01-06 at 07:00 UTC (10:00 Istanbul)
    const BODY: &str = r#"{
        "chart": {
            "result": [{
                "meta": {"gmtoffset": 10800},
                "timestamp": [1735801200, 1735887600, 1736146800],
                "indicators": {
                    "quote": [{
                        "open":   [300.0, 305.0, null],
                        "high":   [310.0, 312.0, null],
                        "low":    [295.0, 301.0, null],
                        "close":  [305.0, 308.5, null],
                        "volume": [1000, 1200, null]
                    }],
                    "adjclose": [{"adjclose": [304.0, 307.5, null]}]
                }
            }],
            "error": null
        }
    }"#;

    #[test]
    fn chart_url_uses_exclusive_end_midnight() {
        let url = YahooProvider::chart_url(BASE_URL, "THYAO.IS", d("2025-01-01"), d("2025-01-02"));
        assert!(url.contains("/chart/THYAO.IS?"));
        assert!(url.contains("period1=1735689600"));
        assert!(url.contains("period2=1735776000"));
    }

    #[test]
    fn parses_bars_and_skips_holidays() {
        let bars = parse_chart("THYAO.IS", BODY, d("2025-01-01"), d("2025-02-01")).unwrap();
        assert_eq!(bars.len(), 2);
        assert_eq!(bars[0].date, d("2025-01-02"));
        assert_eq!(bars[0].close, 305.0);
        assert_eq!(bars[0].adj_close, 304.0);
        assert_eq!(bars[1].date, d("2025-01-03"));
        assert_eq!(bars[1].volume, 1200);
    }

    #[test]
    fn drops_rows_outside_half_open_range() {
        let bars = parse_chart("THYAO.IS", BODY, d("2025-01-01"), d("2025-01-03")).unwrap();
        assert_eq!(bars.len(), 1);
        assert_eq!(bars[0].date, d("2025-01-02"));
    }

    #[test]
    fn not_found_error_maps_to_symbol_not_found() {
        let body = r#"{"chart":{"result":null,"error":{"code":"Not Found","description":"No data found, symbol may be delisted"}}}"#;
        let err = parse_chart("NOPE", body, d("2025-01-01"), d("2025-02-01")).unwrap_err();
        assert!(matches!(err, DataError::SymbolNotFound { symbol } if symbol == "NOPE"));
    }

    #[test]
    fn other_api_error_is_format_error() {
        let body = r#"{"chart":{"result":null,"error":{"code":"Bad Request","description":"Invalid input"}}}"#;
        let err = parse_chart("X", body, d("2025-01-01"), d("2025-02-01")).unwrap_err();
        assert!(matches!(err, DataError::ResponseFormatChanged(_)));
    }

    #[test]
    fn missing_timestamps_yield_no_bars() {
        let body = r#"{"chart":{"result":[{"meta":{"gmtoffset":0},"indicators":{"quote":[{}]}}],"error":null}}"#;
        let bars = parse_chart("SPY", body, d("2025-01-01"), d("2025-02-01")).unwrap();
        assert!(bars.is_empty());
    }

    #[test]
    fn garbage_body_is_format_error() {
        let err = parse_chart("SPY", "<html>", d("2025-01-01"), d("2025-02-01")).unwrap_err();
        assert!(matches!(err, DataError::ResponseFormatChanged(_)));
    }

    #[test]
    fn provider_builds_with_configured_timeout() {
        let provider = YahooProvider::new(
            Arc::new(CircuitBreaker::default_provider()),
            &FetchConfig {
                timeout_secs: 7,
                max_retries: 1,
            },
        )
        .unwrap();
        assert_eq!(provider.timeout, Duration::from_secs(7));
        assert_eq!(provider.name(), "yahoo_finance");
        assert!(provider.is_available());
    }

    /// Local HTTP server answering every connection with `response`, then
    /// holding the socket open for `hold`. Returns the base URL and a hit counter.
    fn serve(response: &'static str, hold: Duration) -> (String, Arc<AtomicUsize>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&hits);
        std::thread::spawn(move || {
            for stream in listener.incoming() {
                let Ok(mut stream) = stream else { break };
                counter.fetch_add(1, Ordering::SeqCst);
                std::thread::spawn(move || {
                    let mut request = Vec::new();
                    let mut buf = [0u8; 1024];
                    while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                        match stream.read(&mut buf) {
                            Ok(0) | Err(_) => return,
                            Ok(n) => request.extend_from_slice(&buf[..n]),
                        }
                    }
                    let _ = stream.write_all(response.as_bytes());
                    let _ = stream.flush();
                    std::thread::sleep(hold);
                });
            }
        });
        (format!("http://{addr}"), hits)
    }

    fn local_provider(base_url: String, max_retries: u32) -> YahooProvider {
        let timeout = Duration::from_secs(1);
        YahooProvider {
            client: reqwest::blocking::Client::builder()
                .timeout(timeout)
                .no_proxy()
                .build()
                .unwrap(),
            circuit_breaker: Arc::new(CircuitBreaker::default_provider()),
            base_url,
            timeout,
            max_retries,
            base_delay: Duration::from_millis(10),
        }
    }

    #[test]
    fn stalled_body_is_a_retried_timeout() {
        let (url, hits) = serve(
            "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: 1000\r\n\r\n{\"chart\":",
            Duration::from_secs(3),
        );
        let provider = local_provider(url, 1);
        let err = provider
            .fetch_with_retry("SPY", d("2025-01-01"), d("2025-02-01"))
            .unwrap_err();
        assert!(matches!(err, DataError::Timeout { timeout_secs: 1 }), "{err:?}");
        assert_eq!(hits.load(Ordering::SeqCst), 2);
        assert!(provider.is_available());
    }

    #[test]
    fn rate_limit_is_retried_then_reported() {
        let (url, hits) = serve(
            "HTTP/1.1 429 Too Many Requests\r\nRetry-After: 0\r\nContent-Length: 0\r\n\r\n",
            Duration::ZERO,
        );
        let provider = local_provider(url, 1);
        let err = provider
            .fetch_with_retry("SPY", d("2025-01-01"), d("2025-02-01"))
            .unwrap_err();
        assert!(matches!(err, DataError::RateLimited { retry_after_secs: 0 }), "{err:?}");
        assert_eq!(hits.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn forbidden_trips_breaker_with_cooldown() {
        let (url, hits) = serve(
            "HTTP/1.1 403 Forbidden\r\nContent-Length: 0\r\n\r\n",
            Duration::ZERO,
        );
        let provider = local_provider(url, 2);
        let err = provider
            .fetch_with_retry("SPY", d("2025-01-01"), d("2025-02-01"))
            .unwrap_err();
        assert!(err.to_string().contains("cooldown left"));
        let DataError::CircuitBreakerTripped { cooldown_secs } = err else {
            panic!("expected breaker error, got {err:?}");
        };
        assert!(cooldown_secs > 29 * 60);
        assert_eq!(hits.load(Ordering::SeqCst), 1);
        assert!(!provider.is_available());
        assert!(provider.cooldown_remaining() > Duration::ZERO);
    }

    #[test]
    fn retry_delay_backs_off_exponentially() {
        let base = Duration::from_millis(500);
        assert_eq!(retry_delay(base, 1, None), Duration::from_millis(500));
        assert_eq!(retry_delay(base, 3, None), Duration::from_secs(2));
        let timeout = DataError::Timeout { timeout_secs: 30 };
        assert_eq!(retry_delay(base, 2, Some(&timeout)), Duration::from_secs(1));
    }

    #[test]
    fn retry_delay_honours_retry_after() {
        let base = Duration::from_millis(500);
        let limited = |secs| DataError::RateLimited { retry_after_secs: secs };
        assert_eq!(retry_delay(base, 1, Some(&limited(5))), Duration::from_secs(5));
        assert_eq!(retry_delay(base, 1, Some(&limited(0))), Duration::from_millis(500));
        assert_eq!(retry_delay(base, 1, Some(&limited(3600))), MAX_RETRY_AFTER);
    }
}
