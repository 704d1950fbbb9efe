//! Price data: providers, fetch orchestration, alignment

pub mod align;
pub mod circuit_breaker;
pub mod fetch;
pub mod provider;
pub mod synthetic;
pub mod yahoo;

pub use align::align_prices;
pub use circuit_breaker::CircuitBreaker;
pub use fetch::{fetch_prices, FetchRequest, FetchedPrices};
pub use provider::{
    DataError, DataProvider, DataSource, FetchProgress, FetchResult, PriceField, RawBar,
    SilentProgress, StdoutProgress,
};
pub use synthetic::SyntheticProvider;
pub use yahoo::YahooProvider;
