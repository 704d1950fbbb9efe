//! Rolling sample standard deviation and annualized volatility.
//!
//! Sliding accumulator over count, sum and sum of squares: each step adds the
//! entering cell and removes the leaving one, O(n) per column. A window
//! yields a value only when all of its cells are defined.
//!
//! Uses sample stddev (divide by N-1).

use crate::config::{validate_window, ConfigError};
use crate::table::{ReturnTable, VolatilityTable};

/// Assumed trading days per year. Not derived from any exchange calendar.
pub const TRADING_DAYS_PER_YEAR: f64 = 252.0;

/// `sqrt(252)`: scales a daily standard deviation to a yearly one.
pub fn annualization_factor() -> f64 {
    TRADING_DAYS_PER_YEAR.sqrt()
}

/// Trailing sample std over `window` cells; NaN until a full window of
/// defined cells is available. `window` must be at least 2.
pub fn rolling_std(values: &[f64], window: usize) -> Result<Vec<f64>, ConfigError> {
    validate_window(window)?;

    let n = values.len();
    let mut out = vec![f64::NAN; n];
    let mut count = 0usize;
    let mut sum = 0.0;
    let mut sum_sq = 0.0;

    for i in 0..n {
        let entering = values[i];
        if !entering.is_nan() {
            count += 1;
            sum += entering;
            sum_sq += entering * entering;
        }

        if i >= window {
            let leaving = values[i - window];
            if !leaving.is_nan() {
                count -= 1;
                sum -= leaving;
                sum_sq -= leaving * leaving;
            }
        }

        // Re-seed after a gap clears so rounding from earlier windows does
        // not leak into later ones.
        if count == 0 {
            sum = 0.0;
            sum_sq = 0.0;
        }

        if count == window {
            let w = window as f64;
            let mean = sum / w;
            let variance = ((sum_sq - w * mean * mean) / (w - 1.0)).max(0.0);
            out[i] = variance.sqrt();
        }
    }

    Ok(out)
}

/// Annualized rolling volatility of every return column.
pub fn rolling_volatility(
    returns: &ReturnTable,
    window: usize,
) -> Result<VolatilityTable, ConfigError> {
    validate_window(window)?;

    let factor = annualization_factor();
    let mut first_error = None;
    let table = returns.map_columns(|col| match rolling_std(col, window) {
        Ok(stds) => stds.into_iter().map(|s| s * factor).collect(),
        Err(e) => {
            first_error.get_or_insert(e);
            vec![f64::NAN; col.len()]
        }
    });

    match first_error {
        Some(e) => Err(e),
        None => Ok(VolatilityTable::new(table)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::risk::{assert_approx, DEFAULT_EPSILON};

    fn naive_std(values: &[f64]) -> f64 {
        let n = values.len() as f64;
        let mean = values.iter().sum::<f64>() / n;
        let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0);
        var.sqrt()
    }

    #[test]
    fn matches_naive_sample_std() {
        let values = [0.01, -0.02, 0.015, 0.003, -0.007, 0.021, -0.011];
        let out = rolling_std(&values, 3).unwrap();
        assert!(out[0].is_nan());
        assert!(out[1].is_nan());
        for i in 2..values.len() {
            assert_approx(out[i], naive_std(&values[i - 2..=i]), 1e-12);
        }
    }

    #[test]
    fn two_point_window_known_value() {
        // std of {1, 3} with N-1 is sqrt(2)
        let out = rolling_std(&[1.0, 3.0], 2).unwrap();
        assert_approx(out[1], 2.0_f64.sqrt(), DEFAULT_EPSILON);
    }

    #[test]
    fn constant_series_is_exactly_zero() {
        let out = rolling_std(&[0.0; 10], 4).unwrap();
        assert!(out[3..].iter().all(|&v| v == 0.0));
    }

    #[test]
    fn gap_blanks_every_window_that_contains_it() {
        let values = [0.01, 0.02, f64::NAN, 0.03, 0.04, 0.05];
        let out = rolling_std(&values, 2).unwrap();
        assert!(!out[1].is_nan());
        assert!(out[2].is_nan());
        assert!(out[3].is_nan());
        assert!(!out[4].is_nan());
        assert_approx(out[5], naive_std(&[0.04, 0.05]), 1e-12);
    }

    #[test]
    fn window_longer_than_series_is_all_missing() {
        let out = rolling_std(&[0.01, 0.02, 0.03], 5).unwrap();
        assert!(out.iter().all(|v| v.is_nan()));
    }

    #[test]
    fn window_below_two_is_rejected() {
        assert_eq!(
            rolling_std(&[0.01, 0.02], 1),
            Err(ConfigError::WindowTooSmall { window: 1 })
        );
        assert_eq!(
            rolling_std(&[0.01, 0.02], 0),
            Err(ConfigError::WindowTooSmall { window: 0 })
        );
    }

    #[test]
    fn annualization_factor_is_sqrt_252() {
        assert_approx(annualization_factor() * annualization_factor(), 252.0, 1e-9);
    }
}
