//! Log returns.

use crate::table::{PriceTable, ReturnTable};

/// `ln(p[t] / p[t-1])` per column.
///
/// Row 0 is missing. A row is also missing when either price is missing,
/// non-finite, or non-positive.
pub fn log_returns(prices: &PriceTable) -> ReturnTable {
    ReturnTable::new(prices.map_columns(log_return_series))
}

pub(crate) fn log_return_series(prices: &[f64]) -> Vec<f64> {
    let mut out = vec![f64::NAN; prices.len()];
    for t in 1..prices.len() {
        let (prev, cur) = (prices[t - 1], prices[t]);
        if usable(prev) && usable(cur) {
            out[t] = (cur / prev).ln();
        }
    }
    out
}

fn usable(price: f64) -> bool {
    price.is_finite() && price > 0.0
}
