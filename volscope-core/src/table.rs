//! Date-indexed tables that flow through the pipeline.
//!
//! Every stage produces one table and hands it to the next:
//! prices → log returns → rolling volatility, plus a ticker × ticker
//! correlation matrix. Missing cells are `f64::NAN`, the same convention
//! aligned market data uses for void bars.

use chrono::NaiveDate;
use std::ops::Deref;
use thiserror::Error;

/// Structural problems detected while building a table.
#[derive(Debug, Error, PartialEq)]
pub enum TableError {
    #[error("column '{symbol}' has {actual} cells but the index has {expected} dates")]
    LengthMismatch {
        symbol: String,
        expected: usize,
        actual: usize,
    },

    #[error("dates are not strictly increasing at {date}")]
    UnorderedDates { date: NaiveDate },

    #[error("duplicate column '{symbol}'")]
    DuplicateColumn { symbol: String },

    #[error("{symbols} column names for {columns} columns")]
    ColumnCountMismatch { symbols: usize, columns: usize },
}

/// Rows keyed by trading date, columns keyed by ticker.
///
/// Storage is column-major: `columns[c][r]` is the cell for ticker
/// `symbols[c]` on `dates[r]`.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeTable {
    dates: Vec<NaiveDate>,
    symbols: Vec<String>,
    columns: Vec<Vec<f64>>,
}

impl TimeTable {
    pub fn new(
        dates: Vec<NaiveDate>,
        symbols: Vec<String>,
        columns: Vec<Vec<f64>>,
    ) -> Result<Self, TableError> {
        if symbols.len() != columns.len() {
            return Err(TableError::ColumnCountMismatch {
                symbols: symbols.len(),
                columns: columns.len(),
            });
        }

        for pair in dates.windows(2) {
            if pair[0] >= pair[1] {
                return Err(TableError::UnorderedDates { date: pair[1] });
            }
        }

        for (i, symbol) in symbols.iter().enumerate() {
            if symbols[..i].contains(symbol) {
                return Err(TableError::DuplicateColumn {
                    symbol: symbol.clone(),
                });
            }
            if columns[i].len() != dates.len() {
                return Err(TableError::LengthMismatch {
                    symbol: symbol.clone(),
                    expected: dates.len(),
                    actual: columns[i].len(),
                });
            }
        }

        Ok(Self {
            dates,
            symbols,
            columns,
        })
    }

    /// A table with the same index and columns as `self`, every cell produced by `f`.
    pub(crate) fn map_columns(&self, mut f: impl FnMut(&[f64]) -> Vec<f64>) -> Self {
        let columns = self
            .columns
            .iter()
            .map(|col| {
                let out = f(col);
                debug_assert_eq!(out.len(), col.len());
                out
            })
            .collect();
        Self {
            dates: self.dates.clone(),
            symbols: self.symbols.clone(),
            columns,
        }
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn symbols(&self) -> &[String] {
        &self.symbols
    }

    pub fn row_count(&self) -> usize {
        self.dates.len()
    }

    pub fn column_count(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty() || self.symbols.is_empty()
    }

    /// Cells for one ticker, in date order.
    pub fn column(&self, symbol: &str) -> Option<&[f64]> {
        self.symbols
            .iter()
            .position(|s| s == symbol)
            .map(|i| self.columns[i].as_slice())
    }

    /// Iterate `(symbol, cells)` in column order.
    pub fn iter_columns(&self) -> impl Iterator<Item = (&str, &[f64])> {
        self.symbols
            .iter()
            .map(String::as_str)
            .zip(self.columns.iter().map(Vec::as_slice))
    }

    pub fn get(&self, row: usize, symbol: &str) -> Option<f64> {
        self.column(symbol).and_then(|col| col.get(row).copied())
    }

    /// Number of defined (non-NaN) cells in a column.
    pub fn valid_count(&self, symbol: &str) -> usize {
        self.column(symbol)
            .map(|col| col.iter().filter(|v| !v.is_nan()).count())
            .unwrap_or(0)
    }

    /// Most recent defined cell of a column, with its date.
    pub fn last_valid(&self, symbol: &str) -> Option<(NaiveDate, f64)> {
        let col = self.column(symbol)?;
        col.iter()
            .enumerate()
            .rev()
            .find(|(_, v)| !v.is_nan())
            .map(|(i, v)| (self.dates[i], *v))
    }

    /// True when no column holds a single defined cell.
    pub fn is_all_missing(&self) -> bool {
        self.columns.iter().flatten().all(|v| v.is_nan())
    }
}

macro_rules! stage_table {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Debug, Clone, PartialEq)]
        pub struct $name(TimeTable);

        impl $name {
            pub fn new(table: TimeTable) -> Self {
                Self(table)
            }

            pub fn into_inner(self) -> TimeTable {
                self.0
            }
        }

        impl Deref for $name {
            type Target = TimeTable;

            fn deref(&self) -> &TimeTable {
                &self.0
            }
        }
    };
}

stage_table!(
    /// Daily closing prices. Cells are positive or missing.
    PriceTable
);
stage_table!(
    /// `ln(price[t] / price[t-1])`; row 0 is always missing.
    ReturnTable
);
stage_table!(
    /// Annualized trailing standard deviation of log returns.
    VolatilityTable
);

/// Symmetric ticker × ticker matrix of Pearson coefficients.
///
/// Undefined coefficients (too few paired observations, zero variance) are NaN.
#[derive(Debug, Clone, PartialEq)]
pub struct CorrelationMatrix {
    symbols: Vec<String>,
    values: Vec<f64>,
}

impl CorrelationMatrix {
    /// `values` is row-major, `symbols.len()²` long.
    pub(crate) fn from_parts(symbols: Vec<String>, values: Vec<f64>) -> Self {
        debug_assert_eq!(values.len(), symbols.len() * symbols.len());
        Self { symbols, values }
    }

    pub fn symbols(&self) -> &[String] {
        &self.symbols
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    pub fn at(&self, row: usize, col: usize) -> f64 {
        self.values[row * self.symbols.len() + col]
    }

    pub fn get(&self, a: &str, b: &str) -> Option<f64> {
        let i = self.symbols.iter().position(|s| s == a)?;
        let j = self.symbols.iter().position(|s| s == b)?;
        Some(self.at(i, j))
    }

    /// True when no coefficient, diagonal included, is defined.
    pub fn is_all_missing(&self) -> bool {
        self.values.iter().all(|v| v.is_nan())
    }

    /// Upper-triangle pairs `(a, b, rho)` with `a` before `b` in column order.
    pub fn pairs(&self) -> impl Iterator<Item = (&str, &str, f64)> + '_ {
        let n = self.symbols.len();
        (0..n).flat_map(move |i| {
            ((i + 1)..n).map(move |j| (self.symbols[i].as_str(), self.symbols[j].as_str(), self.at(i, j)))
        })
    }

    /// Least correlated defined pair — the best diversification candidate.
    pub fn min_pair(&self) -> Option<(&str, &str, f64)> {
        self.pairs()
            .filter(|(_, _, rho)| !rho.is_nan())
            .min_by(|a, b| a.2.total_cmp(&b.2))
    }

    /// Most correlated defined pair.
    pub fn max_pair(&self) -> Option<(&str, &str, f64)> {
        self.pairs()
            .filter(|(_, _, rho)| !rho.is_nan())
            .max_by(|a, b| a.2.total_cmp(&b.2))
    }
}
