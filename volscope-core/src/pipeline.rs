//! End-to-end analysis run: validate → fetch → compute → render.
//!
//! Strictly linear and single pass. The first failure stops the run and is
//! reported with the stage it came from; there is no partial report.

use crate::config::{AnalysisConfig, ConfigError};
use crate::data::{fetch_prices, DataError, DataProvider, FetchProgress, FetchRequest};
use crate::render::{render_correlation, render_volatility, RenderError, RenderOptions};
use crate::risk::{compute_volatility, summarize, VolatilitySummary};
use crate::table::{CorrelationMatrix, PriceTable, ReturnTable, VolatilityTable};
use serde::Serialize;
use std::path::PathBuf;
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("fetch failed: {0}")]
    Fetch(DataError),

    #[error("invalid configuration: {0}")]
    InvalidConfiguration(#[from] ConfigError),

    #[error("render failed: {0}")]
    Render(#[from] RenderError),
}

impl From<DataError> for AnalysisError {
    /// Request validation inside the fetcher is a configuration problem.
    fn from(err: DataError) -> Self {
        match err {
            DataError::InvalidRequest(e) => AnalysisError::InvalidConfiguration(e),
            other => AnalysisError::Fetch(other),
        }
    }
}

impl AnalysisError {
    /// Which pipeline stage failed.
    pub fn stage(&self) -> &'static str {
        match self {
            AnalysisError::Fetch(_) => "fetch",
            AnalysisError::InvalidConfiguration(_) => "config",
            AnalysisError::Render(_) => "render",
        }
    }
}

/// Computed takeaway printed at the end of a run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Insight {
    /// Least correlated pair, the best hedging candidate.
    pub hedge_pair: Option<(String, String, f64)>,
    /// Ticker with the highest latest volatility.
    pub riskiest: Option<(String, f64)>,
}

impl Insight {
    pub fn from_results(correlation: &CorrelationMatrix, summaries: &[VolatilitySummary]) -> Self {
        let hedge_pair = correlation
            .min_pair()
            .map(|(a, b, rho)| (a.to_string(), b.to_string(), rho));
        let riskiest = summaries
            .iter()
            .filter_map(|s| s.latest.map(|(_, v)| (s.symbol.clone(), v)))
            .max_by(|a, b| a.1.total_cmp(&b.1));
        Self {
            hedge_pair,
            riskiest,
        }
    }

    /// One-line console summary.
    pub fn headline(&self) -> String {
        match &self.hedge_pair {
            Some((a, b, rho)) => format!(
                "Top Correlation Insight: {a} vs {b} is the least correlated pair (rho = {rho:.2}); check it for hedging opportunities."
            ),
            None => "Top Correlation Insight: not enough overlapping history to compare tickers.".to_string(),
        }
    }

    /// Ticker carrying the most risk right now, if any has a latest value.
    pub fn risk_line(&self) -> Option<String> {
        self.riskiest.as_ref().map(|(symbol, vol)| {
            format!(
                "Highest Current Volatility: {symbol} ({:.2}% annualized)",
                vol * 100.0
            )
        })
    }
}

/// Everything a run produced.
#[derive(Debug, Clone)]
pub struct AnalysisReport {
    pub prices: PriceTable,
    pub returns: ReturnTable,
    pub volatility: VolatilityTable,
    pub correlation: CorrelationMatrix,
    pub summaries: Vec<VolatilitySummary>,
    pub volatility_chart: PathBuf,
    pub correlation_chart: PathBuf,
    pub window: usize,
    pub synthetic: bool,
    pub insight: Insight,
}

/// Observer for stage boundaries, so the driver can print section headers.
pub trait StageObserver {
    fn on_stage(&self, stage: Stage);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Fetch,
    Compute,
    RenderVolatility,
    RenderCorrelation,
}

impl StageObserver for () {
    fn on_stage(&self, _stage: Stage) {}
}

/// Run the whole analysis described by `config` against `provider`.
pub fn run_analysis(
    config: &AnalysisConfig,
    provider: &dyn DataProvider,
    progress: &dyn FetchProgress,
    observer: &dyn StageObserver,
) -> Result<AnalysisReport, AnalysisError> {
    config.validate()?;

    observer.on_stage(Stage::Fetch);
    let request = FetchRequest::new(config.tickers.clone(), config.start_date, config.end_date)
        .with_field(config.price_field);
    let fetched = fetch_prices(provider, &request, progress)?;

    observer.on_stage(Stage::Compute);
    let (volatility, returns) = compute_volatility(&fetched.table, config.window)?;
    let summaries = summarize(&volatility);
    info!(window = config.window, "computed rolling volatility");

    let mut options = RenderOptions::new(&config.output.dir);
    options.title_prefix = config.output.title_prefix.clone();

    observer.on_stage(Stage::RenderVolatility);
    let volatility_chart = render_volatility(&volatility, &options)?;

    observer.on_stage(Stage::RenderCorrelation);
    let (correlation, correlation_chart) = render_correlation(&returns, &options)?;

    let insight = Insight::from_results(&correlation, &summaries);

    Ok(AnalysisReport {
        prices: fetched.table,
        returns,
        volatility,
        correlation,
        summaries,
        volatility_chart,
        correlation_chart,
        window: config.window,
        synthetic: fetched.synthetic,
        insight,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_request_is_reported_as_configuration() {
        let err: AnalysisError = DataError::InvalidRequest(ConfigError::EmptyTickers).into();
        assert!(matches!(
            err,
            AnalysisError::InvalidConfiguration(ConfigError::EmptyTickers)
        ));
        assert_eq!(err.stage(), "config");

        let err: AnalysisError = DataError::SymbolNotFound {
            symbol: "X".into(),
        }
        .into();
        assert_eq!(err.stage(), "fetch");
    }

    #[test]
    fn headline_names_the_pair() {
        let insight = Insight {
            hedge_pair: Some(("TUPRS.IS".into(), "GARAN.IS".into(), 0.12)),
            riskiest: None,
        };
        assert!(insight.headline().contains("TUPRS.IS vs GARAN.IS"));
        assert!(insight.headline().contains("0.12"));
        assert_eq!(insight.risk_line(), None);
    }

    #[test]
    fn risk_line_names_the_most_volatile_ticker() {
        let summary = |symbol: &str, latest: Option<f64>| VolatilitySummary {
            symbol: symbol.into(),
            latest: latest.map(|v| (chrono::NaiveDate::MIN, v)),
            mean: latest,
            peak: None,
        };
        let matrix = CorrelationMatrix::from_parts(vec!["A".into()], vec![1.0]);
        let insight = Insight::from_results(
            &matrix,
            &[
                summary("A", Some(0.21)),
                summary("B", Some(0.3456)),
                summary("C", None),
            ],
        );
        assert_eq!(insight.riskiest, Some(("B".to_string(), 0.3456)));
        assert_eq!(
            insight.risk_line().as_deref(),
            Some("Highest Current Volatility: B (34.56% annualized)")
        );
    }
}
