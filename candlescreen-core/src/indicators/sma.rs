//! Simple Moving Average (SMA).
//!
//! Rolling mean of close prices over a lookback window.
//! Lookback: period - 1 (first valid value at index period-1).

use super::Indicator;
use crate::domain::Bar;

/// Period of the baseline moving average.
pub const BASELINE_MA_PERIOD: usize = 44;

#[derive(Debug, Clone)]
pub struct Sma {
    period: usize,
    name: String,
}

impl Sma {
    pub fn new(period: usize) -> Self {
        assert!(period >= 1, "SMA period must be >= 1");
        Self {
            period,
            name: format!("sma_{period}"),
        }
    }

    /// The 44-period baseline average.
    pub fn baseline() -> Self {
        Self::new(BASELINE_MA_PERIOD)
    }

    pub fn period(&self) -> usize {
        self.period
    }

    /// Rolling mean over a plain close series.
    ///
    /// A window containing a non-finite close yields `None` at that position.
    pub fn compute_closes(&self, closes: &[f64]) -> Vec<Option<f64>> {
        let n = closes.len();
        let mut result = vec![None; n];
        if n < self.period {
            return result;
        }

        for i in (self.period - 1)..n {
            result[i] = window_mean(&closes[(i + 1 - self.period)..=i]);
        }

        result
    }
}

/// Mean of one window; a flat window returns its value unchanged.
fn window_mean(window: &[f64]) -> Option<f64> {
    if window.iter().any(|c| !c.is_finite()) {
        return None;
    }
    let first = *window.first()?;
    if window.iter().all(|&c| c == first) {
        return Some(first);
    }
    Some(window.iter().sum::<f64>() / window.len() as f64)
}

impl Indicator for Sma {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.period.saturating_sub(1)
    }

    fn compute(&self, bars: &[Bar]) -> Vec<Option<f64>> {
        let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
        self.compute_closes(&closes)
    }
}
