//! Market data sources and the screened universe.

pub mod circuit_breaker;
pub mod provider;
pub mod synthetic;
pub mod universe;
pub mod yahoo;

pub use circuit_breaker::CircuitBreaker;
pub use provider::{DataError, MarketDataProvider, SOURCE_INTERVAL_MINUTES};
pub use synthetic::SyntheticProvider;
pub use universe::{Universe, UniverseError, NSE_SUFFIX};
pub use yahoo::YahooProvider;
