//! The screening pipeline: resample, baseline windows, classification, ranking.

pub mod baseline;
pub mod classify;
pub mod pipeline;
pub mod ranking;
pub mod resample;
pub mod volume;

pub use baseline::{
    build_ma_window, build_volume_window, ma_window_from_resampled, mean_volume, BaselineWindow,
    FetchPlan, WindowSizes, CANDLES_BEFORE, CANDLES_START, LOOKBACK_DAYS,
};
pub use classify::{classify_signal, ClassifierParams};
pub use pipeline::{assemble, screen_instrument, InstrumentOutcome, PipelineParams, SessionInputs};
pub use ranking::{assign_membership, order_records, pct_change, precedence, RANK_SIZE, UNRANKED_BUCKET};
pub use resample::{resample, ResampleSpec};
pub use volume::classify_volume;
