//! Recorded hourly counts per location, read from one csv file per direction.

pub mod aggregator;
pub mod loader;
pub mod source;

pub use aggregator::{DayHours, HistoricalAggregator, MonthTotals};
pub use loader::HistoricalRecordLoader;
pub use source::{CsvDirectorySource, InMemorySource, TabularSource};

use crate::HOURS_PER_DAY;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Direction {
    #[serde(rename = "in")]
    Inbound,
    #[serde(rename = "out")]
    Outbound,
}

impl Direction {
    pub fn as_str(self) -> &'static str {
        match self {
            Direction::Inbound => "in",
            Direction::Outbound => "out",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One day row of a source file.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayRecord {
    pub day: u32,
    /// Index 0 is hour 1.
    pub hours: [u32; HOURS_PER_DAY],
    /// Daily total as written in the source; not recomputed from `hours`.
    pub total: u32,
}
