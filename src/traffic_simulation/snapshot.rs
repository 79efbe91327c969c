use crate::locations::Location;
use crate::traffic_simulation::congestion::{CongestionLadder, CongestionLevel};
use crate::traffic_simulation::time_series::TimeSeriesStore;
use chrono::{DateTime, Utc};
use std::sync::Arc;

/// Counts for one location at the current bucket.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LiveSnapshot {
    pub location: Location,
    pub in_count: u32,
    pub out_count: u32,
    pub total_in: u64,
    pub total_out: u64,
    /// Can go negative when more people have left than arrived.
    pub net_count: i64,
    pub congestion: CongestionLevel,
}

/// Maps wall-clock time onto the precomputed series. Holds no mutable state.
pub struct LiveSnapshotEngine {
    store: Arc<TimeSeriesStore>,
    ladder: CongestionLadder,
}

impl LiveSnapshotEngine {
    pub fn new(store: Arc<TimeSeriesStore>, ladder: CongestionLadder) -> Self {
        Self { store, ladder }
    }

    pub fn store(&self) -> &TimeSeriesStore {
        &self.store
    }

    pub fn ladder(&self) -> &CongestionLadder {
        &self.ladder
    }

    /// Bucket containing `now`, clamped into the simulated window.
    pub fn bucket_index(&self, now: DateTime<Utc>) -> usize {
        let elapsed_seconds = now
            .signed_duration_since(self.store.start_time())
            .num_seconds();

        if elapsed_seconds <= 0 {
            return 0;
        }

        let index = (elapsed_seconds / self.store.bucket_seconds()) as usize;

        index.min(self.store.steps() - 1)
    }

    /// One entry per location, ordered by location id.
    pub fn snapshot(&self, now: DateTime<Utc>) -> Vec<LiveSnapshot> {
        let index = self.bucket_index(now);

        self.store
            .all_series()
            .iter()
            .map(|series| {
                let total_in = series.total_inbound_through(index).unwrap_or(0);
                let total_out = series.total_outbound_through(index).unwrap_or(0);
                let net_count = total_in as i64 - total_out as i64;

                LiveSnapshot {
                    location: series.location,
                    in_count: series.inbound()[index],
                    out_count: series.outbound()[index],
                    total_in,
                    total_out,
                    net_count,
                    congestion: self.ladder.classify(net_count),
                }
            })
            .collect()
    }
}
