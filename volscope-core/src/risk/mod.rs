//! Risk calculator: log returns, annualized rolling volatility, correlation.
//!
//! Every function here is a pure transformation of its input table.

pub mod correlation;
pub mod returns;
pub mod rolling;

pub use correlation::{correlation_matrix, pearson};
pub use returns::log_returns;
pub use rolling::{annualization_factor, rolling_std, rolling_volatility, TRADING_DAYS_PER_YEAR};

use crate::config::ConfigError;
use crate::table::{PriceTable, ReturnTable, VolatilityTable};
use chrono::NaiveDate;
use serde::Serialize;

/// Log returns and their annualized rolling volatility over `window` days.
///
/// `window` below 2 is rejected. A window longer than the available history
/// leaves that column entirely missing.
pub fn compute_volatility(
    prices: &PriceTable,
    window: usize,
) -> Result<(VolatilityTable, ReturnTable), ConfigError> {
    let returns = log_returns(prices);
    let volatility = rolling_volatility(&returns, window)?;
    Ok((volatility, returns))
}

/// Headline volatility figures for one ticker.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VolatilitySummary {
    pub symbol: String,
    /// Most recent defined value and its date.
    pub latest: Option<(NaiveDate, f64)>,
    pub mean: Option<f64>,
    pub peak: Option<(NaiveDate, f64)>,
}

pub fn summarize(volatility: &VolatilityTable) -> Vec<VolatilitySummary> {
    volatility
        .iter_columns()
        .map(|(symbol, col)| {
            let defined: Vec<(NaiveDate, f64)> = volatility
                .dates()
                .iter()
                .copied()
                .zip(col.iter().copied())
                .filter(|(_, v)| !v.is_nan())
                .collect();

            let mean = if defined.is_empty() {
                None
            } else {
                Some(defined.iter().map(|(_, v)| v).sum::<f64>() / defined.len() as f64)
            };

            VolatilitySummary {
                symbol: symbol.to_string(),
                latest: defined.last().copied(),
                mean,
                peak: defined.iter().copied().max_by(|a, b| a.1.total_cmp(&b.1)),
            }
        })
        .collect()
}

/// Assert two f64 values are approximately equal (within epsilon).
#[cfg(test)]
pub fn assert_approx(actual: f64, expected: f64, epsilon: f64) {
    assert!(
        (actual - expected).abs() < epsilon,
        "assert_approx failed: actual={actual}, expected={expected}, diff={}, epsilon={epsilon}",
        (actual - expected).abs()
    );
}

#[cfg(test)]
pub const DEFAULT_EPSILON: f64 = 1e-10;
