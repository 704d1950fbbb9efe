//! Pairwise-complete Pearson correlation.

use crate::table::{CorrelationMatrix, ReturnTable};

/// Correlation of every pair of return columns.
///
/// Each pair uses only the rows where both columns are defined. With fewer
/// than two such rows, or zero variance on either side, the coefficient is
/// NaN. The diagonal is 1.0 for every column that is not degenerate. The
/// matrix is filled from the upper triangle so it is exactly symmetric.
pub fn correlation_matrix(returns: &ReturnTable) -> CorrelationMatrix {
    let symbols: Vec<String> = returns.symbols().to_vec();
    let columns: Vec<&[f64]> = returns.iter_columns().map(|(_, col)| col).collect();
    let n = symbols.len();
    let mut values = vec![f64::NAN; n * n];

    for i in 0..n {
        values[i * n + i] = if pearson(columns[i], columns[i]).is_nan() {
            f64::NAN
        } else {
            1.0
        };
        for j in (i + 1)..n {
            let rho = pearson(columns[i], columns[j]);
            values[i * n + j] = rho;
            values[j * n + i] = rho;
        }
    }

    CorrelationMatrix::from_parts(symbols, values)
}

/// Pearson coefficient over rows where both inputs are defined.
pub fn pearson(xs: &[f64], ys: &[f64]) -> f64 {
    let pairs: Vec<(f64, f64)> = xs
        .iter()
        .zip(ys)
        .filter(|(x, y)| !x.is_nan() && !y.is_nan())
        .map(|(&x, &y)| (x, y))
        .collect();

    if pairs.len() < 2 {
        return f64::NAN;
    }

    let n = pairs.len() as f64;
    let mean_x = pairs.iter().map(|p| p.0).sum::<f64>() / n;
    let mean_y = pairs.iter().map(|p| p.1).sum::<f64>() / n;

    let mut cov = 0.0;
    let mut var_x = 0.0;
    let mut var_y = 0.0;
    for (x, y) in &pairs {
        let dx = x - mean_x;
        let dy = y - mean_y;
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }

    if var_x == 0.0 || var_y == 0.0 {
        return f64::NAN;
    }

    // sqrt(v * v) == v exactly, so identical series give exactly 1.0.
    (cov / (var_x * var_y).sqrt()).clamp(-1.0, 1.0)
}
