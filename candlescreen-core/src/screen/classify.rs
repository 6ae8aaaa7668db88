//! Signal classification of a session's opening pair against the baseline MA.
//!
//! Each of the two opening bars is tested against its own MA value (the MA
//! evaluated at that bar's position in the baseline window). A directional
//! candidate needs both bars on the same side; confirmation additionally
//! needs strong bodies, an MA sloping the same way, and a second close in the
//! outer band of its range.

use crate::domain::{Bar, Signal};
use serde::{Deserialize, Serialize};

/// Thresholds for the confirmation upgrade.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClassifierParams {
    /// Minimum body/range ratio (exclusive) for a strong body.
    pub body_ratio: f64,
    /// Fraction of the range the second close must sit within, from the extreme.
    pub close_band: f64,
}

impl Default for ClassifierParams {
    fn default() -> Self {
        Self {
            body_ratio: 0.4,
            close_band: 0.15,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    Up,
    Down,
}

/// Classify the opening pair.
///
/// `session` is the target session's resampled bars (only the first two are
/// read); `ma_tail` is the last two MA values of the baseline window.
/// Missing or undefined inputs classify as `NotEnoughData`.
pub fn classify_signal(
    session: Option<&[Bar]>,
    ma_tail: Option<[Option<f64>; 2]>,
    params: &ClassifierParams,
) -> Signal {
    let (Some(session), Some(ma_tail)) = (session, ma_tail) else {
        return Signal::NotEnoughData;
    };
    let [first, second, ..] = session else {
        return Signal::NotEnoughData;
    };
    let [Some(ma0), Some(ma1)] = ma_tail else {
        return Signal::NotEnoughData;
    };
    let pair = [first, second];
    if pair.iter().any(|b| b.is_void()) || !ma0.is_finite() || !ma1.is_finite() {
        return Signal::NotEnoughData;
    }

    let mas = [ma0, ma1];
    let direction = if pair.iter().all(|b| b.is_green())
        && pair.iter().zip(mas).all(|(b, ma)| b.low > ma)
    {
        Direction::Up
    } else if pair.iter().all(|b| b.is_red()) && pair.iter().zip(mas).all(|(b, ma)| b.high < ma)
    {
        Direction::Down
    } else {
        return Signal::NoSignal;
    };

    let confirmed = strong_bodies(&pair, params.body_ratio)
        && slope_agrees(direction, ma0, ma1)
        && close_in_band(direction, second, params.close_band);

    match (direction, confirmed) {
        (Direction::Up, true) => Signal::ConfirmedBullish,
        (Direction::Up, false) => Signal::Bullish,
        (Direction::Down, true) => Signal::ConfirmedBearish,
        (Direction::Down, false) => Signal::Bearish,
    }
}

/// Both bars have body/range above `ratio`. A zero-range bar fails.
fn strong_bodies(pair: &[&Bar; 2], ratio: f64) -> bool {
    pair.iter().all(|b| {
        let range = b.range();
        range > 0.0 && b.body() / range > ratio
    })
}

fn slope_agrees(direction: Direction, ma0: f64, ma1: f64) -> bool {
    match direction {
        Direction::Up => ma1 > ma0,
        Direction::Down => ma1 < ma0,
    }
}

/// Second close within `band` of the range from the breakout-side extreme.
fn close_in_band(direction: Direction, bar: &Bar, band: f64) -> bool {
    let limit = band * (bar.high - bar.low);
    match direction {
        Direction::Up => (bar.close - bar.high).abs() < limit,
        Direction::Down => (bar.close - bar.low).abs() < limit,
    }
}
