//! ResultRecord: one screened instrument, ready for presentation.

use super::bar::Bar;
use super::signal::{RankMembership, Signal, VolumeStatus};
use serde::{Deserialize, Serialize};

/// The unit handed to the presentation layer.
///
/// Opening prices are `None` when the session has fewer bars than the slot
/// needs; presentation renders those as blank cells.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultRecord {
    pub symbol: String,

    // ── Session-open pair ──
    pub first_open: Option<f64>,
    pub first_close: Option<f64>,
    pub second_open: Option<f64>,
    pub second_close: Option<f64>,

    // ── Classification ──
    pub signal: Signal,
    pub rank: Option<RankMembership>,
    pub volume_status: VolumeStatus,

    /// Intraday percentage change used for ranking (None = excluded from ranking).
    pub pct_change: Option<f64>,
}

impl ResultRecord {
    /// Record for an instrument with no usable data at all.
    pub fn no_data(symbol: &str) -> Self {
        Self {
            symbol: symbol.to_string(),
            first_open: None,
            first_close: None,
            second_open: None,
            second_close: None,
            signal: Signal::NoData,
            rank: None,
            volume_status: VolumeStatus::NoData,
            pct_change: None,
        }
    }

    /// Fill the opening-price slots from the session's first bars.
    pub fn with_opening_bars(mut self, session: &[Bar]) -> Self {
        if let Some(first) = session.first() {
            self.first_open = Some(first.open);
            self.first_close = Some(first.close);
        }
        if let Some(second) = session.get(1) {
            self.second_open = Some(second.open);
            self.second_close = Some(second.close);
        }
        self
    }
}
