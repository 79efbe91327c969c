use crate::errors::TrafficError;
use crate::locations::Location;
use crate::simulation_config::SimulationConfig;
use crate::traffic_simulation::poisson::CountGenerator;
use chrono::{DateTime, TimeDelta, Utc};
use rand::Rng;
use tracing::debug;

/// Precomputed bucket counts for one location.
#[derive(Clone, Debug)]
pub struct LocationSeries {
    pub location: Location,
    inbound: Vec<u32>,
    outbound: Vec<u32>,
    //inclusive running totals, same length as the counts
    inbound_totals: Vec<u64>,
    outbound_totals: Vec<u64>,
}

fn running_totals(counts: &[u32]) -> Vec<u64> {
    counts
        .iter()
        .scan(0_u64, |total, count| {
            *total += *count as u64;
            Some(*total)
        })
        .collect()
}

impl LocationSeries {
    fn new(location: Location, inbound: Vec<u32>, outbound: Vec<u32>) -> Self {
        let inbound_totals = running_totals(&inbound);
        let outbound_totals = running_totals(&outbound);

        Self {
            location,
            inbound,
            outbound,
            inbound_totals,
            outbound_totals,
        }
    }

    pub fn inbound(&self) -> &[u32] {
        &self.inbound
    }

    pub fn outbound(&self) -> &[u32] {
        &self.outbound
    }

    /// Sum of inbound counts for buckets `0..=index`.
    pub fn total_inbound_through(&self, index: usize) -> Option<u64> {
        self.inbound_totals.get(index).copied()
    }

    /// Sum of outbound counts for buckets `0..=index`.
    pub fn total_outbound_through(&self, index: usize) -> Option<u64> {
        self.outbound_totals.get(index).copied()
    }
}

/// The simulated counts for every location, built once at startup and
/// read-only afterwards.
#[derive(Debug)]
pub struct TimeSeriesStore {
    start_time: DateTime<Utc>,
    steps: usize,
    bucket_seconds: i64,
    // ordered like Location::ALL
    series: Vec<LocationSeries>,
}

impl TimeSeriesStore {
    pub fn generate<R: Rng>(
        config: &SimulationConfig,
        start_time: DateTime<Utc>,
        rng: R,
    ) -> Result<Self, TrafficError> {
        config.validate()?;

        let mut generator = CountGenerator::new(rng);

        let series = Location::ALL
            .iter()
            .map(|location| {
                let rates = config.rates_for(*location);

                let inbound: Vec<u32> = (0..config.steps)
                    .map(|_| generator.sample(rates.inbound))
                    .collect();
                let outbound: Vec<u32> = (0..config.steps)
                    .map(|_| generator.sample(rates.outbound))
                    .collect();

                let series = LocationSeries::new(*location, inbound, outbound);

                debug!(
                    "Simulated {}: {} in / {} out over {} buckets",
                    location,
                    series.total_inbound_through(config.steps - 1).unwrap_or(0),
                    series.total_outbound_through(config.steps - 1).unwrap_or(0),
                    config.steps
                );

                series
            })
            .collect::<Vec<LocationSeries>>();

        Ok(Self {
            start_time,
            steps: config.steps,
            bucket_seconds: config.bucket_seconds,
            series,
        })
    }

    pub fn start_time(&self) -> DateTime<Utc> {
        self.start_time
    }

    pub fn steps(&self) -> usize {
        self.steps
    }

    pub fn bucket_seconds(&self) -> i64 {
        self.bucket_seconds
    }

    /// Total simulated time covered by the store.
    pub fn span(&self) -> TimeDelta {
        TimeDelta::seconds(self.bucket_seconds * self.steps as i64)
    }

    pub fn series(&self, location: Location) -> &LocationSeries {
        &self.series[location.index()]
    }

    pub fn all_series(&self) -> &[LocationSeries] {
        &self.series
    }

    pub fn inbound(&self, location: Location, index: usize) -> Option<u32> {
        self.series(location).inbound.get(index).copied()
    }

    pub fn outbound(&self, location: Location, index: usize) -> Option<u32> {
        self.series(location).outbound.get(index).copied()
    }
}
