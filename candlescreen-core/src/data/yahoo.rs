//! Yahoo Finance intraday provider.
//!
//! Fetches intraday OHLCV bars (5-minute by default) from Yahoo's v8 chart API. Handles rate
//! limiting, retries with exponential backoff, response parsing, and the
//! circuit breaker. Timestamps arrive as UTC epoch seconds and are localized
//! to the exchange zone before anything else looks at them.
//!
//! Yahoo only serves sub-hourly history for roughly the last 60 days; older
//! target dates come back empty and screen as No Data.

use super::circuit_breaker::CircuitBreaker;
use super::provider::{DataError, MarketDataProvider, SOURCE_INTERVAL_MINUTES};
use crate::domain::Bar;
use chrono::{DateTime, NaiveDate, TimeZone};
use chrono_tz::Tz;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Yahoo Finance v8 chart API response.
#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: ChartResult,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    result: Option<Vec<ChartData>>,
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct ChartData {
    timestamp: Option<Vec<i64>>,
    indicators: Indicators,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    quote: Vec<QuoteData>,
    adjclose: Option<Vec<AdjCloseData>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct QuoteData {
    open: Option<Vec<Option<f64>>>,
    high: Option<Vec<Option<f64>>>,
    low: Option<Vec<Option<f64>>>,
    close: Option<Vec<Option<f64>>>,
    volume: Option<Vec<Option<u64>>>,
}

#[derive(Debug, Deserialize)]
struct AdjCloseData {
    adjclose: Vec<Option<f64>>,
}

fn column<'a, T>(
    symbol: &str,
    name: &str,
    values: &'a Option<Vec<T>>,
) -> Result<&'a [T], DataError> {
    values.as_deref().ok_or_else(|| DataError::MissingColumn {
        symbol: symbol.to_string(),
        column: name.to_string(),
    })
}

/// Intraday intervals the chart API accepts, in minutes.
pub const YAHOO_INTERVALS: [u32; 7] = [1, 2, 5, 15, 30, 60, 90];

/// Yahoo Finance intraday provider.
pub struct YahooProvider {
    client: reqwest::blocking::Client,
    circuit_breaker: Arc<CircuitBreaker>,
    timezone: Tz,
    interval_minutes: u32,
    max_retries: u32,
    base_delay: Duration,
}

impl YahooProvider {
    pub fn new(circuit_breaker: Arc<CircuitBreaker>, timezone: Tz) -> Result<Self, DataError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent("Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36")
            .build()
            .map_err(|e| DataError::Other(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            circuit_breaker,
            timezone,
            interval_minutes: SOURCE_INTERVAL_MINUTES,
            max_retries: 3,
            base_delay: Duration::from_millis(500),
        })
    }

    /// Request bars of `minutes` width instead of the default.
    pub fn with_interval_minutes(mut self, minutes: u32) -> Result<Self, DataError> {
        if !YAHOO_INTERVALS.contains(&minutes) {
            return Err(DataError::UnsupportedInterval(minutes));
        }
        self.interval_minutes = minutes;
        Ok(self)
    }

    pub fn timezone(&self) -> Tz {
        self.timezone
    }

    /// Epoch seconds of local midnight on `date` in the exchange zone.
    fn local_midnight(&self, date: NaiveDate) -> Result<i64, DataError> {
        let naive = date
            .and_hms_opt(0, 0, 0)
            .ok_or_else(|| DataError::Other(format!("invalid date {date}")))?;
        self.timezone
            .from_local_datetime(&naive)
            .earliest()
            .map(|dt| dt.timestamp())
            .ok_or_else(|| DataError::Other(format!("no local midnight on {date}")))
    }

    /// Build the chart API URL for a symbol and half-open local date range.
    fn chart_url(&self, symbol: &str, start: NaiveDate, end: NaiveDate) -> Result<String, DataError> {
        let start_ts = self.local_midnight(start)?;
        let end_ts = self.local_midnight(end)?;
        let interval = self.interval_minutes;
        Ok(format!(
            "https://query2.finance.yahoo.com/v8/finance/chart/{symbol}\
             ?period1={start_ts}&period2={end_ts}&interval={interval}m\
             &includePrePost=false&includeAdjustedClose=true"
        ))
    }

    /// Parse a chart API body into localized bars within `[start, end)`.
    pub fn parse_chart(
        symbol: &str,
        body: &str,
        timezone: Tz,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<Bar>, DataError> {
        let resp: ChartResponse = serde_json::from_str(body).map_err(|e| {
            DataError::ResponseFormatChanged(format!("failed to parse response for {symbol}: {e}"))
        })?;

        let result = resp.chart.result.ok_or_else(|| match resp.chart.error {
            Some(err) if err.code == "Not Found" => DataError::SymbolNotFound {
                symbol: symbol.to_string(),
            },
            Some(err) => {
                DataError::ResponseFormatChanged(format!("{}: {}", err.code, err.description))
            }
            None => DataError::ResponseFormatChanged("empty result with no error".into()),
        })?;

        let data = result
            .into_iter()
            .next()
            .ok_or_else(|| DataError::ResponseFormatChanged("result array is empty".into()))?;

        // No timestamps at all means no trading in the requested range.
        let Some(timestamps) = data.timestamp else {
            return Err(DataError::NoData {
                symbol: symbol.to_string(),
            });
        };

        let quote = data.indicators.quote.into_iter().next().unwrap_or_default();
        let adj_closes = data
            .indicators
            .adjclose
            .and_then(|v| v.into_iter().next())
            .map(|a| a.adjclose);

        let open = column(symbol, "open", &quote.open)?;
        let high = column(symbol, "high", &quote.high)?;
        let low = column(symbol, "low", &quote.low)?;
        let volume = column(symbol, "volume", &quote.volume)?;
        let close = match (&quote.close, &adj_closes) {
            (Some(close), _) => close.as_slice(),
            (None, Some(adj)) => adj.as_slice(),
            (None, None) => {
                return Err(DataError::MissingColumn {
                    symbol: symbol.to_string(),
                    column: "close".into(),
                })
            }
        };

        let mut bars = Vec::with_capacity(timestamps.len());
        let mut skipped = 0usize;
        for (i, &ts) in timestamps.iter().enumerate() {
            let utc = DateTime::from_timestamp(ts, 0).ok_or_else(|| {
                DataError::ResponseFormatChanged(format!("invalid timestamp: {ts}"))
            })?;
            let local = utc.with_timezone(&timezone);
            let date = local.date_naive();
            if date < start || date >= end {
                continue;
            }

            let o = open.get(i).copied().flatten();
            let h = high.get(i).copied().flatten();
            let l = low.get(i).copied().flatten();
            let c = close.get(i).copied().flatten().or_else(|| {
                adj_closes
                    .as_ref()
                    .and_then(|adj| adj.get(i).copied().flatten())
            });
            let v = volume.get(i).copied().flatten();

            // A row without a full price is a halt or padding; volume alone may be null
            let (Some(open), Some(high), Some(low), Some(close)) = (o, h, l, c) else {
                skipped += 1;
                continue;
            };

            bars.push(Bar {
                timestamp: local.fixed_offset(),
                open,
                high,
                low,
                close,
                volume: v.map_or(0.0, |v| v as f64),
            });
        }

        if skipped > 0 {
            debug!(symbol, skipped, "dropped rows with missing prices");
        }
        if bars.is_empty() {
            return Err(DataError::NoData {
                symbol: symbol.to_string(),
            });
        }
        bars.sort_by_key(|b| b.timestamp);
        Ok(bars)
    }

    /// Execute a single HTTP request with retry and circuit breaker logic.
    fn fetch_with_retry(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<Bar>, DataError> {
        if !self.circuit_breaker.is_allowed() {
            return Err(DataError::CircuitBreakerTripped);
        }

        let url = self.chart_url(symbol, start, end)?;
        let mut last_error = None;

        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                let delay = self.base_delay * 2u32.pow(attempt - 1);
                debug!(symbol, attempt, ?delay, "retrying");
                std::thread::sleep(delay);
            }

            if !self.circuit_breaker.is_allowed() {
                return Err(DataError::CircuitBreakerTripped);
            }

            let resp = match self.client.get(&url).send() {
                Ok(resp) => resp,
                Err(e) if e.is_connect() || e.is_timeout() => {
                    last_error = Some(DataError::NetworkUnreachable(e.to_string()));
                    continue;
                }
                Err(e) => return Err(DataError::NetworkUnreachable(e.to_string())),
            };

            let status = resp.status();
            if status == reqwest::StatusCode::FORBIDDEN {
                self.circuit_breaker.trip();
                return Err(DataError::CircuitBreakerTripped);
            }

            if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
                self.circuit_breaker.record_failure();
                let retry_after = resp
                    .headers()
                    .get("retry-after")
                    .and_then(|v| v.to_str().ok())
                    .and_then(|v| v.parse::<u64>().ok())
                    .unwrap_or(60);
                warn!(symbol, retry_after, "rate limited");
                last_error = Some(DataError::RateLimited {
                    retry_after_secs: retry_after,
                });
                continue;
            }

            if status == reqwest::StatusCode::NOT_FOUND {
                return Err(DataError::SymbolNotFound {
                    symbol: symbol.to_string(),
                });
            }

            if !status.is_success() {
                self.circuit_breaker.record_failure();
                last_error = Some(DataError::Other(format!("HTTP {status} for {symbol}")));
                continue;
            }

            let body = resp
                .text()
                .map_err(|e| DataError::NetworkUnreachable(e.to_string()))?;
            let bars = Self::parse_chart(symbol, &body, self.timezone, start, end)?;
            self.circuit_breaker.record_success();
            debug!(symbol, bars = bars.len(), "fetched");
            return Ok(bars);
        }

        Err(last_error.unwrap_or_else(|| DataError::Other("max retries exceeded".into())))
    }
}

impl MarketDataProvider for YahooProvider {
    fn name(&self) -> &str {
        "yahoo_finance"
    }

    fn fetch(&self, symbol: &str, start: NaiveDate, end: NaiveDate) -> Result<Vec<Bar>, DataError> {
        self.fetch_with_retry(symbol, start, end)
    }

    fn is_available(&self) -> bool {
        self.circuit_breaker.is_allowed()
    }

    fn interval_minutes(&self) -> u32 {
        self.interval_minutes
    }
}
