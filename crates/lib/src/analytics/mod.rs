//! # Temporal Analytics
//!
//! Grouped counts over time buckets, trailing-window smoothing on a gap-free
//! grid, publication-lag cutoffs, and the summary reports derived from them.

pub mod grouping;
pub mod lag;
pub mod reports;
pub mod rolling;

pub use grouping::{
    aggregate, AggregateRequest, GroupKey, TimeBucket, TimeGranularity, TimeSeriesTable,
};
pub use lag::{lag_cutoffs, months_before, CutoffMarker, LagCutoffs};
pub use rolling::{rolling, RollingStat, RollingWindow};
