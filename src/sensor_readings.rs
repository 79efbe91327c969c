use ahash::AHashMap;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::{PoisonError, RwLock};

/// One environmental sample from a weather station.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SensorReading {
    pub device_id: i32,
    pub temperature: f64,
    pub humidity: f64,
    pub pressure: f64,
    pub timestamp: DateTime<Utc>,
}

/// Newest reading of every weather station, held in memory.
#[derive(Debug, Default)]
pub struct SensorReadingStore {
    latest_by_device: RwLock<AHashMap<i32, SensorReading>>,
}

impl SensorReadingStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keeps `reading` unless the device already has a strictly newer one.
    /// Of two readings with the same timestamp the one inserted later wins.
    pub fn insert(&self, reading: SensorReading) {
        let mut latest_by_device = self
            .latest_by_device
            .write()
            .unwrap_or_else(PoisonError::into_inner);

        let replaces_stored = latest_by_device
            .get(&reading.device_id)
            .is_none_or(|stored| stored.timestamp <= reading.timestamp);

        if replaces_stored {
            latest_by_device.insert(reading.device_id, reading);
        }
    }

    /// Number of devices that have reported.
    pub fn len(&self) -> usize {
        self.latest_by_device
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Ordered by device id.
    pub fn latest_per_device(&self) -> Vec<SensorReading> {
        let mut latest: Vec<SensorReading> = self
            .latest_by_device
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .cloned()
            .collect();

        latest.sort_by_key(|reading| reading.device_id);

        latest
    }
}
