//! Universe ranking: intraday percentage change, gainer/loser membership,
//! and the presentation order.

use crate::domain::{Bar, RankMembership, ResultRecord, Signal, VolumeStatus};
use chrono::NaiveDate;

/// Members in each of the top and bottom sets.
pub const RANK_SIZE: usize = 10;

/// Bucket for combinations the precedence table does not list.
pub const UNRANKED_BUCKET: u8 = 20;

/// Percentage move from the first open to the last close of `date`.
///
/// Computed over source-granularity bars so a partial trailing bin that the
/// resampler would fold away still counts. `None` when the session is empty
/// or the first open is zero or non-finite.
pub fn pct_change(raw: &[Bar], date: NaiveDate) -> Option<f64> {
    let mut session = raw.iter().filter(|b| b.session_date() == date);
    let first = session.next()?;
    let last = session.last().unwrap_or(first);
    let open = first.open;
    if open == 0.0 || !open.is_finite() || !last.close.is_finite() {
        return None;
    }
    Some((last.close - open) / open * 100.0)
}

/// Assign gainer/loser membership across the universe.
///
/// `changes[i]` is instrument i's percentage change. Defined changes are
/// sorted descending (ties keep universe order); the first `rank_size` are
/// gainers and the last `rank_size` are losers. With fewer than twice
/// `rank_size` defined changes the sets overlap and overlapping members are
/// `Both`.
pub fn assign_membership(changes: &[Option<f64>], rank_size: usize) -> Vec<Option<RankMembership>> {
    let mut ranked: Vec<(usize, f64)> = changes
        .iter()
        .enumerate()
        .filter_map(|(i, c)| c.filter(|v| v.is_finite()).map(|v| (i, v)))
        .collect();
    ranked.sort_by(|a, b| b.1.total_cmp(&a.1));

    let mut gainer = vec![false; changes.len()];
    let mut loser = vec![false; changes.len()];
    for &(i, _) in ranked.iter().take(rank_size) {
        gainer[i] = true;
    }
    for &(i, _) in ranked.iter().rev().take(rank_size) {
        loser[i] = true;
    }

    gainer
        .into_iter()
        .zip(loser)
        .map(|(g, l)| RankMembership::from_flags(g, l))
        .collect()
}

/// Presentation bucket for a record, lower sorts first.
///
/// High volume directional records come first (confirmed before plain, rank
/// matching the direction before unmatched, bullish before bearish), then the
/// same eight with low volume, then No Signal with high volume, No Signal,
/// Not enough data, No Data, and finally anything else.
pub fn precedence(signal: Signal, rank: Option<RankMembership>, volume: VolumeStatus) -> u8 {
    let volume_base = match volume {
        VolumeStatus::HighVolume => Some(0),
        VolumeStatus::LowVolume => Some(8),
        _ => None,
    };

    if signal.is_bullish() || signal.is_bearish() {
        let Some(base) = volume_base else {
            return UNRANKED_BUCKET;
        };
        let matches_rank = rank.is_some_and(|r| {
            if signal.is_bullish() {
                r.is_gainer()
            } else {
                r.is_loser()
            }
        });
        let confirmed_offset = if signal.is_confirmed() { 0 } else { 4 };
        let rank_offset = if matches_rank { 0 } else { 2 };
        let side_offset = if signal.is_bullish() { 0 } else { 1 };
        return base + confirmed_offset + rank_offset + side_offset;
    }

    match signal {
        Signal::NoSignal if volume == VolumeStatus::HighVolume => 16,
        Signal::NoSignal => 17,
        Signal::NotEnoughData => 18,
        Signal::NoData => 19,
        _ => UNRANKED_BUCKET,
    }
}

/// Stable sort of records by presentation bucket.
pub fn order_records(records: &mut [ResultRecord]) {
    records.sort_by_key(|r| precedence(r.signal, r.rank, r.volume_status));
}
