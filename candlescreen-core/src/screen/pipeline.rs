//! Per-instrument screening pipeline and the universe-wide ranking barrier.
//!
//! `screen_instrument` is pure: raw bars in, a partial record out. Nothing is
//! shared between instruments, so callers may run it for the whole universe
//! in parallel. `assemble` needs every outcome before it can rank.

use super::baseline::{
    build_ma_window, build_volume_window, mean_volume, BaselineWindow, WindowSizes,
    LOOKBACK_DAYS,
};
use super::classify::{classify_signal, ClassifierParams};
use super::ranking::{assign_membership, order_records, pct_change, RANK_SIZE};
use super::resample::{resample, ResampleSpec};
use super::volume::classify_volume;
use crate::domain::{session_bars, Bar, ResultRecord};
use crate::indicators::{last_two, Sma};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Every tunable of the pipeline. Defaults reproduce the standard screen.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineParams {
    pub ma_window: usize,
    pub candles_before: usize,
    pub candles_start: usize,
    pub lookback_days: i64,
    pub source_interval_minutes: u32,
    pub target_interval_minutes: u32,
    pub bin_offset_minutes: u32,
    pub rank_size: usize,
    pub body_ratio: f64,
    pub close_band: f64,
}

impl Default for PipelineParams {
    fn default() -> Self {
        let sizes = WindowSizes::default();
        let spec = ResampleSpec::default();
        let classifier = ClassifierParams::default();
        Self {
            ma_window: crate::indicators::sma::BASELINE_MA_PERIOD,
            candles_before: sizes.candles_before,
            candles_start: sizes.candles_start,
            lookback_days: LOOKBACK_DAYS,
            source_interval_minutes: crate::data::SOURCE_INTERVAL_MINUTES,
            target_interval_minutes: spec.width_minutes,
            bin_offset_minutes: spec.offset_minutes,
            rank_size: RANK_SIZE,
            body_ratio: classifier.body_ratio,
            close_band: classifier.close_band,
        }
    }
}

impl PipelineParams {
    pub fn resample_spec(&self) -> ResampleSpec {
        ResampleSpec {
            width_minutes: self.target_interval_minutes,
            offset_minutes: self.bin_offset_minutes,
        }
    }

    pub fn window_sizes(&self) -> WindowSizes {
        WindowSizes {
            candles_before: self.candles_before,
            candles_start: self.candles_start,
        }
    }

    pub fn classifier(&self) -> ClassifierParams {
        ClassifierParams {
            body_ratio: self.body_ratio,
            close_band: self.close_band,
        }
    }
}

/// Raw source-granularity bars for one instrument; `None` = fetch returned nothing.
#[derive(Debug, Clone, Default)]
pub struct SessionInputs {
    /// Bars over [target, target + 1).
    pub day: Option<Vec<Bar>>,
    /// Bars over [target − lookback, target + 1).
    pub ma_history: Option<Vec<Bar>>,
    /// Bars over [target − lookback, target).
    pub volume_history: Option<Vec<Bar>>,
}

/// One instrument's result before ranking.
#[derive(Debug, Clone, PartialEq)]
pub struct InstrumentOutcome {
    pub record: ResultRecord,
}

impl InstrumentOutcome {
    pub fn pct_change(&self) -> Option<f64> {
        self.record.pct_change
    }
}

/// Run resample → windows → SMA → classifiers for one instrument.
pub fn screen_instrument(
    symbol: &str,
    target: NaiveDate,
    inputs: &SessionInputs,
    params: &PipelineParams,
) -> InstrumentOutcome {
    let day = inputs.day.as_deref().filter(|bars| !bars.is_empty());
    let Some(day) = day else {
        debug!(symbol, %target, "no bars for session");
        return InstrumentOutcome {
            record: ResultRecord::no_data(symbol),
        };
    };

    let spec = params.resample_spec();
    let resampled = resample(day, &spec);
    let session = resampled.as_deref().map(|bars| session_bars(bars, target));

    let volume_window = build_volume_window(inputs.volume_history.as_deref(), target, &spec);
    let avg_volume = volume_window.as_deref().and_then(mean_volume);
    let volume_status = classify_volume(session.as_deref(), avg_volume);

    let sizes = params.window_sizes();
    let ma_tail = build_ma_window(inputs.ma_history.as_deref(), target, &spec, &sizes)
        .filter(|window| {
            let paired = pairs_with_session(window, session.as_deref(), sizes.candles_start);
            if !paired {
                debug!(
                    symbol,
                    %target,
                    current = window.current_len,
                    "MA window does not end on the opening bars"
                );
            }
            paired
        })
        .and_then(|window| {
            let ma = Sma::new(params.ma_window.max(1)).compute_closes(&window.closes());
            last_two(&ma)
        });

    let signal = classify_signal(session.as_deref(), ma_tail, &params.classifier());
    let pct = pct_change(day, target);

    if let Some(session) = &session {
        debug!(
            symbol,
            first = ?session.first().map(|b| (b.open, b.high, b.low, b.close)),
            second = ?session.get(1).map(|b| (b.open, b.high, b.low, b.close)),
            ma = ?ma_tail,
            %signal,
            %volume_status,
            "classified"
        );
    }

    let record = ResultRecord {
        signal,
        volume_status,
        pct_change: pct,
        ..ResultRecord::no_data(symbol)
    }
    .with_opening_bars(session.as_deref().unwrap_or_default());

    InstrumentOutcome { record }
}

/// True when the window's current-session bars are exactly the session's
/// opening bars, so the trailing MA values pair 1:1 with the bars being tested.
fn pairs_with_session(
    window: &BaselineWindow,
    session: Option<&[Bar]>,
    candles_start: usize,
) -> bool {
    let Some(session) = session else {
        return false;
    };
    window.current_len == candles_start
        && session.len() >= candles_start
        && window.bars[window.prior_len..]
            .iter()
            .zip(&session[..candles_start])
            .all(|(w, s)| w.timestamp == s.timestamp)
}

/// Ranking barrier: assign membership over the whole universe, then order.
///
/// `outcomes` must be in universe order; ties in the final ordering keep it.
pub fn assemble(outcomes: Vec<InstrumentOutcome>, rank_size: usize) -> Vec<ResultRecord> {
    let changes: Vec<Option<f64>> = outcomes.iter().map(InstrumentOutcome::pct_change).collect();
    let membership = assign_membership(&changes, rank_size);

    let mut records: Vec<ResultRecord> = outcomes
        .into_iter()
        .zip(membership)
        .map(|(o, rank)| ResultRecord { rank, ..o.record })
        .collect();
    order_records(&mut records);
    records
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Signal, VolumeStatus};
    use chrono::{Duration, FixedOffset, TimeZone};

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, day).unwrap()
    }

    /// Five-minute bars for one session, closes drifting by `step` per bar.
    fn five_minute_session(date: NaiveDate, count: usize, start: f64, step: f64, volume: f64) -> Vec<Bar> {
        let tz = FixedOffset::east_opt(19_800).unwrap();
        let open_ts = tz
            .from_local_datetime(&date.and_hms_opt(9, 15, 0).unwrap())
            .unwrap();
        (0..count)
            .map(|i| {
                let open = start + step * i as f64;
                let close = open + step;
                Bar {
                    timestamp: open_ts + Duration::minutes(5 * i as i64),
                    open,
                    high: open.max(close) + 0.01,
                    low: open.min(close) - 0.01,
                    close,
                    volume,
                }
            })
            .collect()
    }

    #[test]
    fn absent_day_is_no_data() {
        let out = screen_instrument("X.NS", d(3), &SessionInputs::default(), &PipelineParams::default());
        assert_eq!(out.record.signal, Signal::NoData);
        assert_eq!(out.record.volume_status, VolumeStatus::NoData);
        assert!(out.record.first_open.is_none());
        assert!(out.pct_change().is_none());
    }

    #[test]
    fn empty_day_is_no_data() {
        let inputs = SessionInputs {
            day: Some(Vec::new()),
            ..SessionInputs::default()
        };
        let out = screen_instrument("X.NS", d(3), &inputs, &PipelineParams::default());
        assert_eq!(out.record.signal, Signal::NoData);
    }

    #[test]
    fn missing_history_is_not_enough_data() {
        let day = five_minute_session(d(3), 10, 100.0, 0.5, 1_000.0);
        let inputs = SessionInputs {
            day: Some(day),
            ..SessionInputs::default()
        };
        let out = screen_instrument("X.NS", d(3), &inputs, &PipelineParams::default());
        assert_eq!(out.record.signal, Signal::NotEnoughData);
        assert_eq!(out.record.volume_status, VolumeStatus::NoAvgVol);
        assert_eq!(out.record.first_open, Some(100.0));
        assert!(out.pct_change().is_some());
    }

    #[test]
    fn steady_uptrend_is_confirmed_bullish() {
        // Two prior sessions of gentle rise, then a gap-up session far above the MA.
        let mut history = five_minute_session(
            NaiveDate::from_ymd_opt(2024, 5, 30).unwrap(),
            74,
            100.0,
            0.05,
            1_000.0,
        );
        history.extend(five_minute_session(
            NaiveDate::from_ymd_opt(2024, 5, 31).unwrap(),
            74,
            104.0,
            0.05,
            1_000.0,
        ));
        let day = five_minute_session(d(3), 74, 120.0, 0.5, 5_000.0);
        let mut ma_history = history.clone();
        ma_history.extend(day.clone());

        let inputs = SessionInputs {
            day: Some(day),
            ma_history: Some(ma_history),
            volume_history: Some(history),
        };
        let out = screen_instrument("UP.NS", d(3), &inputs, &PipelineParams::default());
        assert_eq!(out.record.signal, Signal::ConfirmedBullish);
        // 2 × 5k per 10-minute bin vs 2 × 1k average
        assert_eq!(out.record.volume_status, VolumeStatus::HighVolume);
        assert_eq!(out.record.first_open, Some(120.0));
        assert_eq!(out.record.second_open, Some(121.0));
    }

    /// Two gently rising sessions before the target date.
    fn rising_history() -> Vec<Bar> {
        let mut history = five_minute_session(
            NaiveDate::from_ymd_opt(2024, 5, 30).unwrap(),
            74,
            100.0,
            0.05,
            1_000.0,
        );
        history.extend(five_minute_session(
            NaiveDate::from_ymd_opt(2024, 5, 31).unwrap(),
            74,
            104.0,
            0.05,
            1_000.0,
        ));
        history
    }

    #[test]
    fn ma_history_short_of_the_opening_pair_is_not_enough_data() {
        let history = rising_history();
        // Day fetch has two 10-minute bins; the MA fetch only saw the first.
        let day = five_minute_session(d(3), 4, 120.0, 0.5, 5_000.0);
        let mut ma_history = history.clone();
        ma_history.extend(day[..2].iter().cloned());

        let inputs = SessionInputs {
            day: Some(day),
            ma_history: Some(ma_history),
            volume_history: Some(history),
        };
        let out = screen_instrument("LAG.NS", d(3), &inputs, &PipelineParams::default());
        assert_eq!(out.record.signal, Signal::NotEnoughData);
        // The opening pair itself is still reported
        assert_eq!(out.record.second_open, Some(121.0));
    }

    #[test]
    fn ma_history_on_other_bins_is_not_enough_data() {
        let history = rising_history();
        let day = five_minute_session(d(3), 8, 120.0, 0.5, 5_000.0);
        // MA fetch missed the 09:15 bin, so its two target bins are 09:25 and 09:35.
        let mut ma_history = history.clone();
        ma_history.extend(day[2..].iter().cloned());

        let inputs = SessionInputs {
            day: Some(day),
            ma_history: Some(ma_history),
            volume_history: Some(history),
        };
        let out = screen_instrument("GAP.NS", d(3), &inputs, &PipelineParams::default());
        assert_eq!(out.record.signal, Signal::NotEnoughData);
    }

    #[test]
    fn assemble_ranks_then_orders() {
        let mk = |sym: &str, signal: Signal, vol: VolumeStatus, pct: Option<f64>| InstrumentOutcome {
            record: ResultRecord {
                signal,
                volume_status: vol,
                pct_change: pct,
                ..ResultRecord::no_data(sym)
            },
        };
        let outcomes = vec![
            mk("A", Signal::NoSignal, VolumeStatus::LowVolume, Some(0.1)),
            mk("B", Signal::NoData, VolumeStatus::NoData, None),
            mk("C", Signal::Bullish, VolumeStatus::HighVolume, Some(3.0)),
        ];
        let records = assemble(outcomes, 1);
        let order: Vec<&str> = records.iter().map(|r| r.symbol.as_str()).collect();
        assert_eq!(order, vec!["C", "A", "B"]);
        assert_eq!(records[0].rank, Some(crate::domain::RankMembership::Gainer));
        assert_eq!(records[1].rank, Some(crate::domain::RankMembership::Loser));
        assert_eq!(records[2].rank, None);
    }
}
