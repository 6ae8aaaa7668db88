//! Resampling of fine intraday bars onto a coarser offset grid.
//!
//! Bin edges are anchored to local midnight plus an offset, so a 10-minute
//! grid with a 15-minute offset has edges at hh:05, hh:15, hh:25, ... and the
//! 09:15 session open starts a fresh bin instead of straddling a clock edge.
//! Empty bins are dropped: no forward-fill, no synthetic zero-volume bars.

use crate::domain::Bar;
use chrono::{Duration, NaiveDate, Timelike};
use serde::{Deserialize, Serialize};

/// Target bin width and anchor offset, in minutes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResampleSpec {
    pub width_minutes: u32,
    pub offset_minutes: u32,
}

impl Default for ResampleSpec {
    fn default() -> Self {
        Self {
            width_minutes: 10,
            offset_minutes: 15,
        }
    }
}

impl ResampleSpec {
    /// Left edge of the bin containing `minute_of_day`, in minutes since local
    /// midnight. May be negative for minutes before the day's first edge.
    fn bin_start(&self, minute_of_day: i64) -> i64 {
        let width = i64::from(self.width_minutes.max(1));
        let offset = i64::from(self.offset_minutes);
        offset + (minute_of_day - offset).div_euclid(width) * width
    }

    /// Bin key for a bar: (local date, bin start minute) and the label timestamp.
    fn bin_of(&self, bar: &Bar) -> (NaiveDate, i64, chrono::DateTime<chrono::FixedOffset>) {
        let ts = bar.timestamp;
        let minute_of_day = i64::from(ts.hour() * 60 + ts.minute());
        let start = self.bin_start(minute_of_day);
        let label = ts
            - Duration::minutes(minute_of_day - start)
            - Duration::seconds(i64::from(ts.second()))
            - Duration::nanoseconds(i64::from(ts.nanosecond()));
        (ts.date_naive(), start, label)
    }
}

/// Aggregate `bars` into coarse bins.
///
/// Per bin: first open, max high, min low, last close, summed volume. Returns
/// `None` when the input is empty. Input must be chronologically ordered.
pub fn resample(bars: &[Bar], spec: &ResampleSpec) -> Option<Vec<Bar>> {
    if bars.is_empty() {
        return None;
    }

    let mut out: Vec<Bar> = Vec::new();
    let mut current_key: Option<(NaiveDate, i64)> = None;

    for bar in bars {
        let (date, start, label) = spec.bin_of(bar);
        let key = (date, start);

        match (current_key, out.last_mut()) {
            (Some(k), Some(agg)) if k == key => {
                agg.high = agg.high.max(bar.high);
                agg.low = agg.low.min(bar.low);
                agg.close = bar.close;
                agg.volume += bar.volume;
            }
            _ => {
                out.push(Bar {
                    timestamp: label,
                    ..bar.clone()
                });
                current_key = Some(key);
            }
        }
    }

    Some(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, TimeZone};

    fn bar_at(hour: u32, minute: u32, open: f64, close: f64, volume: f64) -> Bar {
        let tz = FixedOffset::east_opt(19_800).unwrap();
        Bar {
            timestamp: tz.with_ymd_and_hms(2024, 6, 3, hour, minute, 0).unwrap(),
            open,
            high: open.max(close) + 0.5,
            low: open.min(close) - 0.5,
            close,
            volume,
        }
    }

    #[test]
    fn empty_input_is_absent() {
        assert!(resample(&[], &ResampleSpec::default()).is_none());
    }

    #[test]
    fn session_open_starts_a_bin() {
        let spec = ResampleSpec::default();
        assert_eq!(spec.bin_start(9 * 60 + 15), 9 * 60 + 15);
        assert_eq!(spec.bin_start(9 * 60 + 20), 9 * 60 + 15);
        assert_eq!(spec.bin_start(9 * 60 + 25), 9 * 60 + 25);
        // Before the first edge of the day
        assert_eq!(spec.bin_start(2), -5);
    }

    #[test]
    fn pairs_of_five_minute_bars_merge() {
        let bars = vec![
            bar_at(9, 15, 100.0, 101.0, 10.0),
            bar_at(9, 20, 101.0, 99.0, 20.0),
            bar_at(9, 25, 99.0, 102.0, 30.0),
            bar_at(9, 30, 102.0, 103.0, 40.0),
        ];
        let out = resample(&bars, &ResampleSpec::default()).unwrap();
        assert_eq!(out.len(), 2);

        let first = &out[0];
        assert_eq!(first.timestamp.minute(), 15);
        assert_eq!(first.open, 100.0);
        assert_eq!(first.close, 99.0);
        assert_eq!(first.high, 101.5);
        assert_eq!(first.low, 98.5);
        assert_eq!(first.volume, 30.0);

        let second = &out[1];
        assert_eq!(second.timestamp.minute(), 25);
        assert_eq!(second.open, 99.0);
        assert_eq!(second.close, 103.0);
        assert_eq!(second.volume, 70.0);
    }

    #[test]
    fn gaps_are_dropped_not_filled() {
        let bars = vec![
            bar_at(9, 15, 100.0, 101.0, 10.0),
            // 09:25 bin has no source bars
            bar_at(9, 35, 101.0, 102.0, 10.0),
        ];
        let out = resample(&bars, &ResampleSpec::default()).unwrap();
        assert_eq!(out.len(), 2);
        assert_eq!(out[1].timestamp.minute(), 35);
    }

    #[test]
    fn trailing_partial_bin_is_kept() {
        let bars = vec![
            bar_at(15, 15, 100.0, 101.0, 10.0),
            bar_at(15, 20, 101.0, 100.5, 10.0),
            bar_at(15, 25, 100.5, 100.0, 10.0),
        ];
        let out = resample(&bars, &ResampleSpec::default()).unwrap();
        assert_eq!(out.len(), 2);
        assert_eq!(out[1].volume, 10.0);
    }

    #[test]
    fn bins_do_not_cross_sessions() {
        let tz = FixedOffset::east_opt(19_800).unwrap();
        let mut late = bar_at(15, 25, 100.0, 101.0, 10.0);
        late.timestamp = tz.with_ymd_and_hms(2024, 5, 31, 15, 25, 0).unwrap();
        let early = bar_at(9, 15, 101.0, 102.0, 10.0);
        let out = resample(&[late, early], &ResampleSpec::default()).unwrap();
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].session_date().to_string(), "2024-05-31");
        assert_eq!(out[1].session_date().to_string(), "2024-06-03");
    }
}
