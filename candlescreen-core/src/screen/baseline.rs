//! Baseline windows: the trailing bars the moving average and the volume
//! average are computed over.
//!
//! The MA window is the tail of every session before the target date followed
//! immediately by the head of the target session. The two opening bars being
//! tested are always the last entries, with prior-day context directly in
//! front of them.

use super::resample::{resample, ResampleSpec};
use crate::domain::{bars_before, session_bars, Bar};
use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

/// Bars taken from before the target session.
pub const CANDLES_BEFORE: usize = 50;
/// Bars taken from the start of the target session.
pub const CANDLES_START: usize = 2;
/// Calendar days of history fetched behind the target date.
pub const LOOKBACK_DAYS: i64 = 5;

/// Sizes of the MA window's two halves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowSizes {
    pub candles_before: usize,
    pub candles_start: usize,
}

impl Default for WindowSizes {
    fn default() -> Self {
        Self {
            candles_before: CANDLES_BEFORE,
            candles_start: CANDLES_START,
        }
    }
}

impl WindowSizes {
    pub fn max_len(&self) -> usize {
        self.candles_before + self.candles_start
    }
}

/// Prior-session tail concatenated with current-session head.
#[derive(Debug, Clone, PartialEq)]
pub struct BaselineWindow {
    pub bars: Vec<Bar>,
    /// Number of leading bars from sessions before the target date.
    pub prior_len: usize,
    /// Number of trailing bars from the target session.
    pub current_len: usize,
}

impl BaselineWindow {
    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.close).collect()
    }
}

/// Date ranges (start inclusive, end exclusive) to fetch for one target date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchPlan {
    pub target: NaiveDate,
    /// The target session alone: [target, target + 1).
    pub day: (NaiveDate, NaiveDate),
    /// MA history including the target session: [target − lookback, target + 1).
    pub ma_history: (NaiveDate, NaiveDate),
    /// Volume history excluding the target session: [target − lookback, target).
    pub volume_history: (NaiveDate, NaiveDate),
}

impl FetchPlan {
    pub fn for_date(target: NaiveDate, lookback_days: i64) -> Self {
        let next = target + Duration::days(1);
        let back = target - Duration::days(lookback_days);
        Self {
            target,
            day: (target, next),
            ma_history: (back, next),
            volume_history: (back, target),
        }
    }
}

/// Build the MA window from raw bars fetched over the MA history range.
///
/// Returns `None` when the fetch produced nothing. Short history yields a
/// shorter window, never padding.
pub fn build_ma_window(
    raw: Option<&[Bar]>,
    target: NaiveDate,
    spec: &ResampleSpec,
    sizes: &WindowSizes,
) -> Option<BaselineWindow> {
    let resampled = resample(raw?, spec)?;
    Some(ma_window_from_resampled(&resampled, target, sizes))
}

/// Same as [`build_ma_window`] for an already resampled series.
pub fn ma_window_from_resampled(
    resampled: &[Bar],
    target: NaiveDate,
    sizes: &WindowSizes,
) -> BaselineWindow {
    let before = bars_before(resampled, target);
    let current = session_bars(resampled, target);

    let tail_start = before.len().saturating_sub(sizes.candles_before);
    let mut bars: Vec<Bar> = before[tail_start..].to_vec();
    let prior_len = bars.len();
    bars.extend(current.into_iter().take(sizes.candles_start));
    let current_len = bars.len() - prior_len;

    BaselineWindow {
        bars,
        prior_len,
        current_len,
    }
}

/// Build the volume window from raw bars fetched over the volume history range.
///
/// Only resampled bars from sessions strictly before `target` are kept.
pub fn build_volume_window(
    raw: Option<&[Bar]>,
    target: NaiveDate,
    spec: &ResampleSpec,
) -> Option<Vec<Bar>> {
    let resampled = resample(raw?, spec)?;
    Some(bars_before(&resampled, target))
}

/// Mean volume of a window; `None` for an empty window.
pub fn mean_volume(window: &[Bar]) -> Option<f64> {
    if window.is_empty() {
        return None;
    }
    Some(window.iter().map(|b| b.volume).sum::<f64>() / window.len() as f64)
}
