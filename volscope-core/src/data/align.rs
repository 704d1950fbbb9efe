//! Multi-symbol time alignment.
//!
//! Given bars for several symbols, lay them out on the union of their
//! trading dates. A symbol without a bar on some date gets a missing cell
//! (no forward-fill of prices).

use super::provider::{PriceField, RawBar};
use crate::table::{PriceTable, TableError, TimeTable};
use chrono::NaiveDate;
use std::collections::{BTreeSet, HashMap};

/// Align `(symbol, bars)` pairs into a price table.
///
/// Column order follows the input order. Later bars for a repeated date
/// overwrite earlier ones.
pub fn align_prices(
    symbol_bars: &[(String, Vec<RawBar>)],
    field: PriceField,
) -> Result<PriceTable, TableError> {
    let dates: Vec<NaiveDate> = symbol_bars
        .iter()
        .flat_map(|(_, bars)| bars.iter().map(|b| b.date))
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();

    let row_of: HashMap<NaiveDate, usize> =
        dates.iter().enumerate().map(|(i, d)| (*d, i)).collect();

    let mut symbols = Vec::with_capacity(symbol_bars.len());
    let mut columns = Vec::with_capacity(symbol_bars.len());

    for (symbol, bars) in symbol_bars {
        let mut column = vec![f64::NAN; dates.len()];
        for bar in bars {
            column[row_of[&bar.date]] = field.select(bar);
        }
        symbols.push(symbol.clone());
        columns.push(column);
    }

    TimeTable::new(dates, symbols, columns).map(PriceTable::new)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bar(date: &str, close: f64) -> RawBar {
        RawBar {
            date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
            open: close - 1.0,
            high: close + 1.0,
            low: close - 2.0,
            close,
            volume: 1000,
            adj_close: close * 0.5,
        }
    }

    #[test]
    fn align_fills_missing_with_nan() {
        let input = vec![
            (
                "SPY".to_string(),
                vec![
                    bar("2024-01-02", 100.0),
                    bar("2024-01-03", 101.0),
                    bar("2024-01-04", 102.0),
                ],
            ),
            (
                "QQQ".to_string(),
                vec![bar("2024-01-02", 200.0), bar("2024-01-04", 202.0)],
            ),
        ];

        let table = align_prices(&input, PriceField::Close).unwrap();

        assert_eq!(table.row_count(), 3);
        assert_eq!(table.symbols(), ["SPY", "QQQ"]);
        assert_eq!(table.get(1, "SPY"), Some(101.0));
        assert!(table.get(1, "QQQ").unwrap().is_nan());
        assert_eq!(table.get(2, "QQQ"), Some(202.0));
    }

    #[test]
    fn selects_requested_field() {
        let input = vec![("SPY".to_string(), vec![bar("2024-01-02", 100.0)])];
        let table = align_prices(&input, PriceField::AdjClose).unwrap();
        assert_eq!(table.get(0, "SPY"), Some(50.0));
    }

    #[test]
    fn unsorted_input_produces_ascending_index() {
        let input = vec![(
            "SPY".to_string(),
            vec![bar("2024-01-04", 102.0), bar("2024-01-02", 100.0)],
        )];
        let table = align_prices(&input, PriceField::Close).unwrap();
        assert!(table.dates()[0] < table.dates()[1]);
        assert_eq!(table.get(0, "SPY"), Some(100.0));
    }
}
