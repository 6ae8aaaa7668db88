//! Market data provider trait and structured error types.
//!
//! The MarketDataProvider trait abstracts over intraday sources (Yahoo
//! Finance, the synthetic generator) so the runner can swap implementations
//! and mock them in tests.

use crate::domain::Bar;
use chrono::NaiveDate;
use thiserror::Error;

/// Default bar granularity requested from providers, in minutes.
pub const SOURCE_INTERVAL_MINUTES: u32 = 5;

/// Structured error types for data operations.
///
/// Every variant is recoverable per instrument: the caller treats the fetch
/// as absent and carries on with the rest of the universe.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("no bars returned for {symbol}")]
    NoData { symbol: String },

    #[error("network unreachable: {0}")]
    NetworkUnreachable(String),

    #[error("rate limited by provider (retry after {retry_after_secs}s)")]
    RateLimited { retry_after_secs: u64 },

    #[error("response format changed: {0}")]
    ResponseFormatChanged(String),

    #[error("missing column '{column}' for {symbol}")]
    MissingColumn { symbol: String, column: String },

    #[error("unsupported bar interval: {0}m")]
    UnsupportedInterval(u32),

    #[error("symbol not found: {symbol}")]
    SymbolNotFound { symbol: String },

    #[error("hard stop: data provider has blocked requests (circuit breaker tripped)")]
    CircuitBreakerTripped,

    #[error("data error: {0}")]
    Other(String),
}

/// Source of intraday bars at a fixed granularity.
///
/// `fetch` covers `[start, end)` in exchange-local calendar dates and
/// returns bars sorted by timestamp, localized to the exchange zone. When
/// the primary close is missing the adjusted close stands in for it.
pub trait MarketDataProvider: Send + Sync {
    /// Human-readable name of this provider.
    fn name(&self) -> &str;

    /// Fetch intraday bars for a symbol over a half-open date range.
    fn fetch(&self, symbol: &str, start: NaiveDate, end: NaiveDate) -> Result<Vec<Bar>, DataError>;

    /// Check if the provider is currently available (not rate-limited, not blocked).
    fn is_available(&self) -> bool;

    /// Width of the bars `fetch` returns, in minutes.
    fn interval_minutes(&self) -> u32 {
        SOURCE_INTERVAL_MINUTES
    }
}
