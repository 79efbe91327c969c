use crate::historical::Direction;
use crate::locations::Location;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TrafficError {
    #[error("invalid request: {0}")]
    Validation(String),
    #[error("no traffic data for {location} ({direction}), expected file '{path}'")]
    SourceNotFound {
        location: Location,
        direction: Direction,
        path: PathBuf,
    },
    #[error("malformed day row in {location} ({direction}) data at line {line}: {reason}")]
    Parse {
        location: Location,
        direction: Direction,
        line: u64,
        reason: String,
    },
    #[error(
        "inbound and outbound days differ for {location}: inbound {inbound_days:?}, outbound {outbound_days:?}"
    )]
    MismatchedDaySets {
        location: Location,
        inbound_days: Vec<u32>,
        outbound_days: Vec<u32>,
    },
    #[error("I/O error reading '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

impl TrafficError {
    /// Errors caused by the caller rather than by the data or the server.
    pub fn is_client_error(&self) -> bool {
        matches!(self, TrafficError::Validation(_))
    }
}
