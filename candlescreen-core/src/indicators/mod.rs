//! Indicator trait and the moving average used for the baseline.
//!
//! Indicators are pure functions: bar history in, one value per bar out.
//! Positions without enough history carry `None`, never a placeholder number.

pub mod sma;

pub use sma::Sma;

use crate::domain::Bar;

/// Trait for indicators.
///
/// Implementations take a full bar series and produce an output series of the
/// same length. The first `lookback()` values are `None` (warmup).
///
/// No value at position t may depend on bars after t.
pub trait Indicator: Send + Sync {
    /// Human-readable name (e.g., "sma_44").
    fn name(&self) -> &str;

    /// Number of bars needed before the indicator produces valid output.
    fn lookback(&self) -> usize;

    /// Compute the indicator for the entire bar series.
    fn compute(&self, bars: &[Bar]) -> Vec<Option<f64>>;
}

/// The trailing pair of an indicator series, if both exist as positions.
///
/// The values themselves may still be `None` (undefined).
pub fn last_two(values: &[Option<f64>]) -> Option<[Option<f64>; 2]> {
    match values {
        [.., a, b] => Some([*a, *b]),
        _ => None,
    }
}

/// Create synthetic 10-minute bars from close prices for testing.
///
/// open = prev_close (or close for first bar), high = max(open,close) + 1.0,
/// low = min(open,close) - 1.0, volume = 1000.
#[cfg(test)]
pub fn make_bars(closes: &[f64]) -> Vec<Bar> {
    use chrono::{FixedOffset, TimeZone};
    let tz = FixedOffset::east_opt(19_800).unwrap();
    let base = tz.with_ymd_and_hms(2024, 6, 3, 9, 15, 0).unwrap();
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| {
            let open = if i == 0 { close } else { closes[i - 1] };
            Bar {
                timestamp: base + chrono::Duration::minutes(10 * i as i64),
                open,
                high: open.max(close) + 1.0,
                low: open.min(close) - 1.0,
                close,
                volume: 1000.0,
            }
        })
        .collect()
}

/// Assert two f64 values are approximately equal (within epsilon).
#[cfg(test)]
pub fn assert_approx(actual: f64, expected: f64, epsilon: f64) {
    assert!(
        (actual - expected).abs() < epsilon,
        "assert_approx failed: actual={actual}, expected={expected}, diff={}, epsilon={epsilon}",
        (actual - expected).abs()
    );
}

/// Default epsilon for indicator tests.
#[cfg(test)]
pub const DEFAULT_EPSILON: f64 = 1e-10;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn last_two_needs_two_positions() {
        assert!(last_two(&[]).is_none());
        assert!(last_two(&[Some(1.0)]).is_none());
        assert_eq!(
            last_two(&[Some(1.0), None, Some(3.0)]),
            Some([None, Some(3.0)])
        );
    }
}
