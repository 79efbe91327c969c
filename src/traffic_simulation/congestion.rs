use crate::errors::TrafficError;
use serde::{Deserialize, Serialize};
use std::fmt;

pub const DEFAULT_CONGESTION_THRESHOLDS: [i64; 3] = [10, 25, 40];

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum CongestionLevel {
    #[serde(rename = "No Crowding")]
    None,
    #[serde(rename = "Minimal Crowding")]
    Minimal,
    #[serde(rename = "Moderate Crowding")]
    Moderate,
    #[serde(rename = "Heavy Crowding")]
    Heavy,
}

impl CongestionLevel {
    pub const ALL: [CongestionLevel; 4] = [
        CongestionLevel::None,
        CongestionLevel::Minimal,
        CongestionLevel::Moderate,
        CongestionLevel::Heavy,
    ];

    pub fn label(self) -> &'static str {
        match self {
            CongestionLevel::None => "No Crowding",
            CongestionLevel::Minimal => "Minimal Crowding",
            CongestionLevel::Moderate => "Moderate Crowding",
            CongestionLevel::Heavy => "Heavy Crowding",
        }
    }
}

impl fmt::Display for CongestionLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Ascending net count thresholds. `thresholds[i]` is the lowest net count
/// classified as `CongestionLevel::ALL[i + 1]`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CongestionLadder {
    thresholds: [i64; 3],
}

impl CongestionLadder {
    pub fn new(thresholds: [i64; 3]) -> Result<Self, TrafficError> {
        if thresholds.windows(2).any(|pair| pair[0] >= pair[1]) {
            return Err(TrafficError::Validation(format!(
                "congestion thresholds must be strictly ascending, got {:?}",
                thresholds
            )));
        }

        Ok(Self { thresholds })
    }

    pub fn classify(&self, net_count: i64) -> CongestionLevel {
        let passed = self
            .thresholds
            .iter()
            .take_while(|threshold| net_count >= **threshold)
            .count();

        CongestionLevel::ALL[passed]
    }
}

impl Default for CongestionLadder {
    fn default() -> Self {
        Self {
            thresholds: DEFAULT_CONGESTION_THRESHOLDS,
        }
    }
}
