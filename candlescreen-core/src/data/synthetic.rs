//! Synthetic intraday provider for offline runs and tests.
//!
//! Produces a seeded random walk of intraday bars (5-minute by default) on
//! the exchange session schedule (09:15 to 15:30 local, weekdays only). Each session is generated
//! from its own seed derived from the symbol and date, so overlapping fetch
//! ranges always agree on the bars they share.

use super::provider::{DataError, MarketDataProvider, SOURCE_INTERVAL_MINUTES};
use crate::domain::Bar;
use chrono::{Datelike, Duration, NaiveDate, NaiveTime, TimeZone, Weekday};
use chrono_tz::Tz;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

pub struct SyntheticProvider {
    timezone: Tz,
    seed: u64,
    interval_minutes: u32,
    session_open: NaiveTime,
    session_close: NaiveTime,
}

impl SyntheticProvider {
    pub fn new(timezone: Tz, seed: u64) -> Self {
        Self {
            timezone,
            seed,
            interval_minutes: SOURCE_INTERVAL_MINUTES,
            session_open: NaiveTime::from_hms_opt(9, 15, 0).unwrap_or(NaiveTime::MIN),
            session_close: NaiveTime::from_hms_opt(15, 30, 0).unwrap_or(NaiveTime::MIN),
        }
    }

    /// Generate bars of `minutes` width instead of the default.
    pub fn with_interval_minutes(mut self, minutes: u32) -> Self {
        self.interval_minutes = minutes.max(1);
        self
    }

    fn session_rng(&self, symbol: &str, date: NaiveDate) -> StdRng {
        let mut hasher = blake3::Hasher::new();
        hasher.update(symbol.as_bytes());
        hasher.update(&self.seed.to_le_bytes());
        hasher.update(date.to_string().as_bytes());
        StdRng::from_seed(*hasher.finalize().as_bytes())
    }

    /// Bars for one session; empty on weekends.
    pub fn session(&self, symbol: &str, date: NaiveDate) -> Vec<Bar> {
        if matches!(date.weekday(), Weekday::Sat | Weekday::Sun) {
            return Vec::new();
        }

        let mut rng = self.session_rng(symbol, date);
        let step = Duration::minutes(i64::from(self.interval_minutes));
        let mut price: f64 = 100.0 * (1.0 + rng.gen_range(-0.2..0.2));
        let base_volume: f64 = rng.gen_range(5_000.0..50_000.0);

        let mut bars = Vec::new();
        let mut time = self.session_open;
        while time < self.session_close {
            let Some(local) = self
                .timezone
                .from_local_datetime(&date.and_time(time))
                .earliest()
            else {
                break;
            };

            let ret: f64 = rng.gen_range(-0.004..0.004);
            let open = price;
            let close = price * (1.0 + ret);
            let high = open.max(close) * (1.0 + rng.gen_range(0.0..0.002));
            let low = open.min(close) * (1.0 - rng.gen_range(0.0..0.002));
            let volume = (base_volume * rng.gen_range(0.3..3.0)).round();

            bars.push(Bar {
                timestamp: local.fixed_offset(),
                open,
                high,
                low,
                close,
                volume,
            });
            price = close;
            time += step;
        }
        bars
    }
}

impl MarketDataProvider for SyntheticProvider {
    fn name(&self) -> &str {
        "synthetic"
    }

    fn fetch(&self, symbol: &str, start: NaiveDate, end: NaiveDate) -> Result<Vec<Bar>, DataError> {
        let bars: Vec<Bar> = start
            .iter_days()
            .take_while(|d| *d < end)
            .flat_map(|d| self.session(symbol, d))
            .collect();
        if bars.is_empty() {
            return Err(DataError::NoData {
                symbol: symbol.to_string(),
            });
        }
        Ok(bars)
    }

    fn is_available(&self) -> bool {
        true
    }

    fn interval_minutes(&self) -> u32 {
        self.interval_minutes
    }
}
