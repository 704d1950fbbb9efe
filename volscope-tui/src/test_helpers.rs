//! Test helpers for building reports without the network or disk.

use chrono::NaiveDate;
use std::path::PathBuf;
use volscope_core::data::{align_prices, synthetic::generate_synthetic_bars, PriceField};
use volscope_core::risk::{compute_volatility, correlation_matrix, summarize};
use volscope_core::{AnalysisReport, Insight};

pub fn sample_report(symbols: &[&str]) -> AnalysisReport {
    let start = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
    let end = NaiveDate::from_ymd_opt(2025, 4, 1).unwrap();
    let bars: Vec<_> = symbols
        .iter()
        .map(|s| (s.to_string(), generate_synthetic_bars(s, start, end)))
        .collect();
    let prices = align_prices(&bars, PriceField::Close).unwrap();
    let (volatility, returns) = compute_volatility(&prices, 21).unwrap();
    let correlation = correlation_matrix(&returns);
    let summaries = summarize(&volatility);
    let insight = Insight::from_results(&correlation, &summaries);

    AnalysisReport {
        prices,
        returns,
        volatility,
        correlation,
        summaries,
        volatility_chart: PathBuf::from("charts/volatility.svg"),
        correlation_chart: PathBuf::from("charts/correlation.svg"),
        window: 21,
        synthetic: true,
        insight,
    }
}
