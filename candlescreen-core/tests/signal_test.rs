//! End-to-end scenarios through the public screening API.
//!
//! Tests:
//! 1. The canonical confirmed-bullish opening pair.
//! 2. A zero-range bar can never confirm.
//! 3. Missing mean volume beats any bar volume.
//! 4. A 25-instrument universe splits into 10 gainers and 10 losers.
//! 5. An instrument with no data stays out of ranking and sorts last.
//! 6. Synthetic sessions flow through the whole pipeline.

use candlescreen_core::data::{MarketDataProvider, SyntheticProvider};
use candlescreen_core::domain::{Bar, RankMembership, ResultRecord, Signal, VolumeStatus};
use candlescreen_core::screen::{
    assemble, assign_membership, classify_signal, classify_volume, screen_instrument,
    ClassifierParams, FetchPlan, InstrumentOutcome, PipelineParams, SessionInputs,
};
use chrono::{FixedOffset, NaiveDate, TimeZone};

// ──────────────────────────────────────────────
// Helpers
// ──────────────────────────────────────────────

fn bar(minute: u32, open: f64, high: f64, low: f64, close: f64, volume: f64) -> Bar {
    let tz = FixedOffset::east_opt(19_800).unwrap();
    Bar {
        timestamp: tz.with_ymd_and_hms(2024, 6, 3, 9, minute, 0).unwrap(),
        open,
        high,
        low,
        close,
        volume,
    }
}

fn target() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, 3).unwrap()
}

fn outcome(symbol: &str, pct: Option<f64>) -> InstrumentOutcome {
    InstrumentOutcome {
        record: ResultRecord {
            signal: Signal::NoSignal,
            volume_status: VolumeStatus::LowVolume,
            pct_change: pct,
            ..ResultRecord::no_data(symbol)
        },
    }
}

// ──────────────────────────────────────────────
// Classifier scenarios
// ──────────────────────────────────────────────

#[test]
fn canonical_confirmed_bullish_pair() {
    let pair = [
        bar(15, 107.0, 115.0, 105.0, 113.0, 1.0),
        bar(25, 109.5, 116.0, 106.0, 115.5, 1.0),
    ];
    for b in &pair {
        assert!((b.body() / b.range() - 0.6).abs() < 1e-12);
    }
    let sig = classify_signal(
        Some(&pair),
        Some([Some(100.0), Some(101.0)]),
        &ClassifierParams::default(),
    );
    assert_eq!(sig, Signal::ConfirmedBullish);
}

#[test]
fn zero_range_bar_never_confirms() {
    let flat = bar(15, 110.0, 110.0, 110.0, 110.0, 1.0);
    let strong = bar(25, 109.5, 116.0, 106.0, 115.5, 1.0);
    for ma in [[100.0, 101.0], [120.0, 119.0], [100.0, 99.0]] {
        let sig = classify_signal(
            Some(&[flat.clone(), strong.clone()]),
            Some([Some(ma[0]), Some(ma[1])]),
            &ClassifierParams::default(),
        );
        assert!(!sig.is_confirmed(), "{sig} with MA {ma:?}");
    }
}

#[test]
fn missing_mean_volume_is_no_avg_vol() {
    for volume in [0.0, 1.0, 1e12] {
        let pair = [
            bar(15, 1.0, 2.0, 0.5, 1.5, volume),
            bar(25, 1.5, 2.5, 1.0, 2.0, volume),
        ];
        assert_eq!(classify_volume(Some(&pair), None), VolumeStatus::NoAvgVol);
    }
}

// ──────────────────────────────────────────────
// Ranking and assembly
// ──────────────────────────────────────────────

#[test]
fn twenty_five_instruments_rank_ten_each_way() {
    // Distinct changes in a shuffled order
    let changes: Vec<Option<f64>> = (0..25).map(|i| Some(((i * 7) % 25) as f64 - 12.5)).collect();
    let membership = assign_membership(&changes, 10);

    let mut by_change: Vec<usize> = (0..25).collect();
    by_change.sort_by(|&a, &b| changes[b].unwrap().total_cmp(&changes[a].unwrap()));
    let top: Vec<usize> = by_change[..10].to_vec();
    let bottom: Vec<usize> = by_change[15..].to_vec();

    for i in 0..25 {
        let expected = if top.contains(&i) {
            Some(RankMembership::Gainer)
        } else if bottom.contains(&i) {
            Some(RankMembership::Loser)
        } else {
            None
        };
        assert_eq!(membership[i], expected, "instrument {i}");
    }
}

#[test]
fn no_data_instrument_stays_out_of_ranking() {
    let empty = screen_instrument("GONE.NS", target(), &SessionInputs::default(), &PipelineParams::default());
    assert_eq!(empty.record.signal, Signal::NoData);
    assert_eq!(empty.record.volume_status, VolumeStatus::NoData);
    assert!(empty.record.first_open.is_none());
    assert!(empty.record.first_close.is_none());
    assert!(empty.record.second_open.is_none());
    assert!(empty.record.second_close.is_none());

    let outcomes = vec![empty, outcome("A.NS", Some(1.0)), outcome("B.NS", Some(-1.0))];
    let records = assemble(outcomes, 10);
    let gone = records.iter().find(|r| r.symbol == "GONE.NS").unwrap();
    assert_eq!(gone.rank, None);
    assert_eq!(records.last().unwrap().symbol, "GONE.NS");
}

// ──────────────────────────────────────────────
// Full pipeline on synthetic data
// ──────────────────────────────────────────────

#[test]
fn synthetic_sessions_screen_fully() {
    let provider = SyntheticProvider::new(chrono_tz::Asia::Kolkata, 11);
    let params = PipelineParams::default();
    let plan = FetchPlan::for_date(target(), params.lookback_days);

    let outcomes: Vec<InstrumentOutcome> = ["ABB.NS", "TCS.NS", "INFY.NS"]
        .iter()
        .map(|symbol| {
            let inputs = SessionInputs {
                day: provider.fetch(symbol, plan.day.0, plan.day.1).ok(),
                ma_history: provider.fetch(symbol, plan.ma_history.0, plan.ma_history.1).ok(),
                volume_history: provider
                    .fetch(symbol, plan.volume_history.0, plan.volume_history.1)
                    .ok(),
            };
            screen_instrument(symbol, target(), &inputs, &params)
        })
        .collect();

    for o in &outcomes {
        // Three full prior weekday sessions sit inside the lookback
        assert_ne!(o.record.signal, Signal::NoData);
        assert_ne!(o.record.signal, Signal::NotEnoughData);
        assert!(matches!(
            o.record.volume_status,
            VolumeStatus::HighVolume | VolumeStatus::LowVolume
        ));
        assert!(o.record.first_open.is_some() && o.record.second_close.is_some());
        assert!(o.pct_change().is_some());
    }

    let records = assemble(outcomes, 10);
    assert_eq!(records.len(), 3);
    // Three instruments overlap both sets
    assert!(records.iter().all(|r| r.rank == Some(RankMembership::Both)));
}
