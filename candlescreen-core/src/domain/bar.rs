//! Bar: the fundamental market data unit.

use chrono::{DateTime, FixedOffset, NaiveDate};
use serde::{Deserialize, Serialize};

/// OHLCV bar for one instrument over a fixed intraday interval.
///
/// The timestamp is the bar's left edge in exchange-local time. The session
/// a bar belongs to is the local calendar date of that timestamp.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub timestamp: DateTime<FixedOffset>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl Bar {
    /// Local calendar date of the bar (its session).
    pub fn session_date(&self) -> NaiveDate {
        self.timestamp.date_naive()
    }

    /// Close strictly above open.
    pub fn is_green(&self) -> bool {
        self.close > self.open
    }

    /// Open strictly above close.
    pub fn is_red(&self) -> bool {
        self.open > self.close
    }

    /// Absolute high-low span.
    pub fn range(&self) -> f64 {
        (self.high - self.low).abs()
    }

    /// Absolute open-close span.
    pub fn body(&self) -> f64 {
        (self.close - self.open).abs()
    }

    /// Returns true if any OHLCV field is NaN.
    pub fn is_void(&self) -> bool {
        self.open.is_nan()
            || self.high.is_nan()
            || self.low.is_nan()
            || self.close.is_nan()
            || self.volume.is_nan()
    }

    /// Basic OHLCV sanity check: high >= low, high >= open, high >= close, etc.
    pub fn is_sane(&self) -> bool {
        if self.is_void() {
            return false;
        }
        self.high >= self.low
            && self.high >= self.open
            && self.high >= self.close
            && self.low <= self.open
            && self.low <= self.close
            && self.volume >= 0.0
    }
}

/// Bars of `bars` whose session date equals `date`, in order.
pub fn session_bars(bars: &[Bar], date: NaiveDate) -> Vec<Bar> {
    bars.iter()
        .filter(|b| b.session_date() == date)
        .cloned()
        .collect()
}

/// Bars of `bars` whose session date precedes `date`, in order.
pub fn bars_before(bars: &[Bar], date: NaiveDate) -> Vec<Bar> {
    bars.iter()
        .filter(|b| b.session_date() < date)
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn ist() -> FixedOffset {
        FixedOffset::east_opt(5 * 3600 + 1800).unwrap()
    }

    fn sample_bar() -> Bar {
        Bar {
            timestamp: ist().with_ymd_and_hms(2024, 6, 3, 9, 15, 0).unwrap(),
            open: 100.0,
            high: 105.0,
            low: 98.0,
            close: 103.0,
            volume: 50_000.0,
        }
    }

    #[test]
    fn bar_is_sane() {
        assert!(sample_bar().is_sane());
    }

    #[test]
    fn bar_detects_void() {
        let mut bar = sample_bar();
        bar.open = f64::NAN;
        assert!(bar.is_void());
        assert!(!bar.is_sane());
    }

    #[test]
    fn bar_detects_insane_high_low() {
        let mut bar = sample_bar();
        bar.high = 97.0; // below low
        assert!(!bar.is_sane());
    }

    #[test]
    fn colour_and_geometry() {
        let bar = sample_bar();
        assert!(bar.is_green());
        assert!(!bar.is_red());
        assert_eq!(bar.range(), 7.0);
        assert_eq!(bar.body(), 3.0);
    }

    #[test]
    fn doji_is_neither_green_nor_red() {
        let mut bar = sample_bar();
        bar.close = bar.open;
        assert!(!bar.is_green());
        assert!(!bar.is_red());
    }

    #[test]
    fn session_date_uses_local_calendar() {
        // 00:10 IST on June 4th is still June 3rd in UTC.
        let mut bar = sample_bar();
        bar.timestamp = ist().with_ymd_and_hms(2024, 6, 4, 0, 10, 0).unwrap();
        assert_eq!(bar.session_date(), NaiveDate::from_ymd_opt(2024, 6, 4).unwrap());
    }

    #[test]
    fn partitions_by_session() {
        let mut prior = sample_bar();
        prior.timestamp = ist().with_ymd_and_hms(2024, 5, 31, 15, 20, 0).unwrap();
        let bars = vec![prior, sample_bar()];
        let date = NaiveDate::from_ymd_opt(2024, 6, 3).unwrap();
        assert_eq!(session_bars(&bars, date).len(), 1);
        assert_eq!(bars_before(&bars, date).len(), 1);
        assert_eq!(bars_before(&bars, date)[0].session_date().to_string(), "2024-05-31");
    }
}
