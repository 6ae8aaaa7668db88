//! Screening run: fetch, screen every instrument in parallel, rank, order.
//!
//! A run is stateless. It takes the configuration, a provider, and the
//! current exchange-local date, and returns a complete report. Scheduling
//! repeated runs belongs to the caller.

use std::sync::{Mutex, PoisonError};

use chrono::{DateTime, NaiveDate, Utc};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

use candlescreen_core::data::MarketDataProvider;
use candlescreen_core::domain::{Bar, ResultRecord, Signal};
use candlescreen_core::screen::{
    assemble, screen_instrument, FetchPlan, InstrumentOutcome, SessionInputs,
};

use crate::config::{ConfigError, Mode, ScreenerConfig};

/// Errors from the runner.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("provider '{provider}' serves {served}m bars but the screen expects {expected}m")]
    IntervalMismatch {
        provider: String,
        served: u32,
        expected: u32,
    },
    #[error("failed to build worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

/// Current schema version for persisted reports.
pub const SCHEMA_VERSION: u32 = 1;

/// Complete result of one screening run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScreenReport {
    /// Schema version for forward-compatible deserialization.
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
    pub target_date: NaiveDate,
    pub mode: Mode,
    pub provider: String,
    pub generated_at: DateTime<Utc>,
    /// Records in presentation order.
    pub records: Vec<ResultRecord>,
    pub completed: usize,
    pub total: usize,
    /// BLAKE3 over every fetched bar, in universe order.
    pub dataset_hash: String,
}

fn default_schema_version() -> u32 {
    SCHEMA_VERSION
}

impl ScreenReport {
    /// Instruments whose record carries a directional signal.
    pub fn signal_count(&self) -> usize {
        self.records
            .iter()
            .filter(|r| r.signal.is_bullish() || r.signal.is_bearish())
            .count()
    }

    pub fn no_data_count(&self) -> usize {
        self.records
            .iter()
            .filter(|r| r.signal == Signal::NoData)
            .count()
    }
}

/// Run one screen over the configured universe.
///
/// `today` is the current date in the exchange zone; it is only used in
/// live mode. `progress` is called with (completed, total) after each
/// instrument finishes, from whichever worker finished it. Calls are
/// serialized, so the completed count strictly increases.
pub fn run_screen<F>(
    config: &ScreenerConfig,
    provider: &dyn MarketDataProvider,
    today: NaiveDate,
    progress: F,
) -> Result<ScreenReport, RunError>
where
    F: Fn(usize, usize) + Send + Sync,
{
    config.validate()?;
    let target = config.target_date(today)?;
    let params = &config.params;
    if provider.interval_minutes() != params.source_interval_minutes {
        return Err(RunError::IntervalMismatch {
            provider: provider.name().to_string(),
            served: provider.interval_minutes(),
            expected: params.source_interval_minutes,
        });
    }
    let plan = FetchPlan::for_date(target, params.lookback_days);
    let symbols = config.universe.symbols();
    let total = symbols.len();

    info!(
        %target,
        mode = %config.mode,
        provider = provider.name(),
        instruments = total,
        "starting screen"
    );
    if !provider.is_available() {
        warn!(provider = provider.name(), "provider unavailable; instruments will screen as No Data");
    }

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(config.max_parallel)
        .build()?;

    let completed = Mutex::new(0usize);
    let screened: Vec<(InstrumentOutcome, blake3::Hash)> = pool.install(|| {
        symbols
            .par_iter()
            .map(|symbol| {
                let inputs = fetch_inputs(provider, symbol, &plan);
                let digest = hash_inputs(symbol, &inputs);
                let outcome = screen_instrument(symbol, target, &inputs, params);
                let mut done = completed.lock().unwrap_or_else(PoisonError::into_inner);
                *done += 1;
                progress(*done, total);
                drop(done);
                (outcome, digest)
            })
            .collect()
    });

    let mut hasher = blake3::Hasher::new();
    let mut outcomes = Vec::with_capacity(screened.len());
    for (outcome, digest) in screened {
        hasher.update(digest.as_bytes());
        outcomes.push(outcome);
    }

    let records = assemble(outcomes, params.rank_size);
    let report = ScreenReport {
        schema_version: SCHEMA_VERSION,
        target_date: target,
        mode: config.mode,
        provider: provider.name().to_string(),
        generated_at: Utc::now(),
        records,
        completed: completed.into_inner().unwrap_or_else(PoisonError::into_inner),
        total,
        dataset_hash: hasher.finalize().to_hex().to_string(),
    };

    info!(
        %target,
        signals = report.signal_count(),
        no_data = report.no_data_count(),
        "screen complete"
    );
    Ok(report)
}

/// Fetch the three ranges one instrument needs. A failed fetch is absent.
fn fetch_inputs(provider: &dyn MarketDataProvider, symbol: &str, plan: &FetchPlan) -> SessionInputs {
    let fetch = |range: (NaiveDate, NaiveDate), what: &str| -> Option<Vec<Bar>> {
        match provider.fetch(symbol, range.0, range.1) {
            Ok(bars) if bars.is_empty() => None,
            Ok(bars) => Some(bars),
            Err(e) => {
                warn!(symbol, range = what, error = %e, "fetch failed");
                None
            }
        }
    };

    let inputs = SessionInputs {
        day: fetch(plan.day, "day"),
        ma_history: fetch(plan.ma_history, "ma_history"),
        volume_history: fetch(plan.volume_history, "volume_history"),
    };
    debug!(
        symbol,
        day = inputs.day.as_ref().map_or(0, Vec::len),
        ma_history = inputs.ma_history.as_ref().map_or(0, Vec::len),
        volume_history = inputs.volume_history.as_ref().map_or(0, Vec::len),
        "fetched"
    );
    inputs
}

/// Deterministic BLAKE3 digest of one instrument's fetched bars.
fn hash_inputs(symbol: &str, inputs: &SessionInputs) -> blake3::Hash {
    let mut hasher = blake3::Hasher::new();
    hasher.update(symbol.as_bytes());
    for series in [&inputs.day, &inputs.ma_history, &inputs.volume_history] {
        // Separator distinguishes an absent fetch from an empty one
        hasher.update(&[u8::from(series.is_some())]);
        for bar in series.iter().flatten() {
            hasher.update(bar.timestamp.to_rfc3339().as_bytes());
            hasher.update(&bar.open.to_le_bytes());
            hasher.update(&bar.high.to_le_bytes());
            hasher.update(&bar.low.to_le_bytes());
            hasher.update(&bar.close.to_le_bytes());
            hasher.update(&bar.volume.to_le_bytes());
        }
    }
    hasher.finalize()
}

#[cfg(test)]
mod tests {
    use super::*;
    use candlescreen_core::data::SyntheticProvider;

    #[test]
    fn same_inputs_hash_identically() {
        let provider = SyntheticProvider::new(chrono_tz::Asia::Kolkata, 1);
        let plan = FetchPlan::for_date(NaiveDate::from_ymd_opt(2024, 6, 3).unwrap(), 5);
        let a = fetch_inputs(&provider, "ABB.NS", &plan);
        let b = fetch_inputs(&provider, "ABB.NS", &plan);
        assert_eq!(hash_inputs("ABB.NS", &a), hash_inputs("ABB.NS", &b));
        assert_ne!(hash_inputs("ABB.NS", &a), hash_inputs("ACC.NS", &a));
        assert_ne!(
            hash_inputs("ABB.NS", &a),
            hash_inputs("ABB.NS", &SessionInputs::default())
        );
    }

    #[test]
    fn weekend_target_fetches_nothing_for_the_day() {
        let provider = SyntheticProvider::new(chrono_tz::Asia::Kolkata, 1);
        // 2024-06-02 is a Sunday
        let plan = FetchPlan::for_date(NaiveDate::from_ymd_opt(2024, 6, 2).unwrap(), 5);
        let inputs = fetch_inputs(&provider, "ABB.NS", &plan);
        assert!(inputs.day.is_none());
        assert!(inputs.ma_history.is_some());
    }
}
