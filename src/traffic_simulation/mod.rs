//! Simulated live pedestrian feed.
//!
//! Counts for every bucket of the simulated window are drawn once at startup
//! into a [`time_series::TimeSeriesStore`]. Requests only read that store
//! together with the current time through [`snapshot::LiveSnapshotEngine`].

pub mod congestion;
pub mod poisson;
pub mod snapshot;
pub mod time_series;

pub use congestion::{CongestionLadder, CongestionLevel};
pub use poisson::CountGenerator;
pub use snapshot::{LiveSnapshot, LiveSnapshotEngine};
pub use time_series::{LocationSeries, TimeSeriesStore};
