//! Criterion benchmarks for the risk calculator.
//!
//! Benchmarks:
//! 1. Log returns + rolling volatility over 1, 5 and 10 years of daily prices
//! 2. Pairwise correlation matrix for a 10-ticker universe

use chrono::NaiveDate;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use volscope_core::data::{align_prices, synthetic::generate_synthetic_bars, PriceField};
use volscope_core::risk::{compute_volatility, correlation_matrix, log_returns};
use volscope_core::PriceTable;

// ── Helpers ──────────────────────────────────────────────────────────

fn make_prices(tickers: usize, years: i32) -> PriceTable {
    let start = NaiveDate::from_ymd_opt(2015, 1, 1).unwrap();
    let end = NaiveDate::from_ymd_opt(2015 + years, 1, 1).unwrap();
    let symbol_bars: Vec<_> = (0..tickers)
        .map(|i| {
            let symbol = format!("T{i:02}");
            let bars = generate_synthetic_bars(&symbol, start, end);
            (symbol, bars)
        })
        .collect();
    align_prices(&symbol_bars, PriceField::Close).unwrap()
}

// ── 1. Rolling volatility ───────────────────────────────────────────

fn bench_volatility(c: &mut Criterion) {
    let mut group = c.benchmark_group("rolling_volatility");

    for &years in &[1, 5, 10] {
        let prices = make_prices(3, years);
        group.bench_with_input(BenchmarkId::new("window_21", years), &years, |b, _| {
            b.iter(|| compute_volatility(black_box(&prices), black_box(21)))
        });
        group.bench_with_input(BenchmarkId::new("window_126", years), &years, |b, _| {
            b.iter(|| compute_volatility(black_box(&prices), black_box(126)))
        });
    }

    group.finish();
}

// ── 2. Correlation ──────────────────────────────────────────────────

fn bench_correlation(c: &mut Criterion) {
    let mut group = c.benchmark_group("correlation_matrix");

    for &years in &[1, 10] {
        let returns = log_returns(&make_prices(10, years));
        group.bench_with_input(BenchmarkId::new("tickers_10", years), &years, |b, _| {
            b.iter(|| correlation_matrix(black_box(&returns)))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_volatility, bench_correlation);
criterion_main!(benches);
