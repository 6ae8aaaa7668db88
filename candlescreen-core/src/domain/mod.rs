//! Domain types for candlescreen

pub mod bar;
pub mod record;
pub mod signal;

pub use bar::{bars_before, session_bars, Bar};
pub use record::ResultRecord;
pub use signal::{RankMembership, Signal, VolumeStatus};

/// Symbol type alias
pub type Symbol = String;
