//! Classification labels produced for each (instrument, date).

use serde::{Deserialize, Serialize};
use std::fmt;

/// Directional label from comparing the session's opening bars to the baseline MA.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Signal {
    ConfirmedBullish,
    Bullish,
    ConfirmedBearish,
    Bearish,
    NoSignal,
    NotEnoughData,
    NoData,
}

impl Signal {
    pub const ALL: [Signal; 7] = [
        Signal::ConfirmedBullish,
        Signal::Bullish,
        Signal::ConfirmedBearish,
        Signal::Bearish,
        Signal::NoSignal,
        Signal::NotEnoughData,
        Signal::NoData,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Signal::ConfirmedBullish => "Confirmed Bullish",
            Signal::Bullish => "Bullish",
            Signal::ConfirmedBearish => "Confirmed Bearish",
            Signal::Bearish => "Bearish",
            Signal::NoSignal => "No Signal",
            Signal::NotEnoughData => "Not enough data",
            Signal::NoData => "No Data",
        }
    }

    pub fn is_bullish(self) -> bool {
        matches!(self, Signal::ConfirmedBullish | Signal::Bullish)
    }

    pub fn is_bearish(self) -> bool {
        matches!(self, Signal::ConfirmedBearish | Signal::Bearish)
    }

    pub fn is_confirmed(self) -> bool {
        matches!(self, Signal::ConfirmedBullish | Signal::ConfirmedBearish)
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Opening-bar volume compared to the trailing average.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VolumeStatus {
    HighVolume,
    LowVolume,
    NoTwoCandles,
    NoAvgVol,
    NoData,
}

impl VolumeStatus {
    pub fn label(self) -> &'static str {
        match self {
            VolumeStatus::HighVolume => "High Volume",
            VolumeStatus::LowVolume => "Low Volume",
            VolumeStatus::NoTwoCandles => "No 2 Candles",
            VolumeStatus::NoAvgVol => "No Avg Vol",
            VolumeStatus::NoData => "No Data",
        }
    }
}

impl fmt::Display for VolumeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Top/bottom membership by intraday percentage change.
///
/// Small universes can put one instrument in both sets; that is kept as `Both`
/// rather than resolved to one side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RankMembership {
    Gainer,
    Loser,
    Both,
}

impl RankMembership {
    pub fn from_flags(gainer: bool, loser: bool) -> Option<Self> {
        match (gainer, loser) {
            (true, true) => Some(RankMembership::Both),
            (true, false) => Some(RankMembership::Gainer),
            (false, true) => Some(RankMembership::Loser),
            (false, false) => None,
        }
    }

    pub fn is_gainer(self) -> bool {
        matches!(self, RankMembership::Gainer | RankMembership::Both)
    }

    pub fn is_loser(self) -> bool {
        matches!(self, RankMembership::Loser | RankMembership::Both)
    }

    pub fn label(self) -> &'static str {
        match self {
            RankMembership::Gainer => "Gainer",
            RankMembership::Loser => "Loser",
            RankMembership::Both => "Gainer/Loser",
        }
    }
}

impl fmt::Display for RankMembership {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
