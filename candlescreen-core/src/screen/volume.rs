//! Volume classification of the session's opening pair.

use crate::domain::{Bar, VolumeStatus};

/// Compare the first two session bars' volume to the historical mean.
///
/// `session` is `None` when resampling produced nothing at all for the
/// instrument; that is reported before any other condition.
pub fn classify_volume(session: Option<&[Bar]>, mean_volume: Option<f64>) -> VolumeStatus {
    let Some(session) = session else {
        return VolumeStatus::NoData;
    };
    let [first, second, ..] = session else {
        return VolumeStatus::NoTwoCandles;
    };
    let Some(mean) = mean_volume.filter(|m| m.is_finite()) else {
        return VolumeStatus::NoAvgVol;
    };

    if first.volume > mean && second.volume > mean {
        VolumeStatus::HighVolume
    } else {
        VolumeStatus::LowVolume
    }
}
