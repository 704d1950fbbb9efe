//! Volscope Core — price history, log returns, rolling volatility, correlation.
//!
//! This crate holds the whole analysis pipeline:
//! - Date-indexed tables (prices, returns, volatility) and the correlation matrix
//! - Price providers (Yahoo Finance, synthetic) behind a common trait
//! - Risk calculator: log returns, annualized rolling volatility, Pearson correlation
//! - SVG chart rendering
//! - TOML configuration and the end-to-end pipeline
//!
//! Nothing here runs at load time; the `volscope` binary drives it.

pub mod config;
pub mod data;
pub mod pipeline;
pub mod render;
pub mod risk;
pub mod table;

pub use config::{AnalysisConfig, ConfigError};
pub use pipeline::{run_analysis, AnalysisError, AnalysisReport, Insight, Stage, StageObserver};
pub use table::{CorrelationMatrix, PriceTable, ReturnTable, TimeTable, VolatilityTable};
