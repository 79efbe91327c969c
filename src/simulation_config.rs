use crate::errors::TrafficError;
use crate::locations::Location;
use crate::traffic_simulation::congestion::{CongestionLadder, DEFAULT_CONGESTION_THRESHOLDS};
use crate::{BUCKET_SECONDS, SIM_STEPS};
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Rates above this would make the multiplicative Poisson sampler underflow.
pub const MAX_BUCKET_RATE: f64 = 50.0;

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ArrivalRates {
    pub inbound: f64,
    pub outbound: f64,
}

/// Tunables for the simulated live feed, optionally read from a RON file.
///
/// ```ron
/// (
///     steps: 180,
///     bucket_seconds: 30,
///     congestion_thresholds: (10, 25, 40),
///     rate_overrides: {
///         "jordanpond": (inbound: 1.2, outbound: 0.9),
///     },
/// )
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub steps: usize,
    pub bucket_seconds: i64,
    pub congestion_thresholds: [i64; 3],
    /// Keyed by location short name.
    pub rate_overrides: BTreeMap<String, ArrivalRates>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            steps: SIM_STEPS,
            bucket_seconds: BUCKET_SECONDS,
            congestion_thresholds: DEFAULT_CONGESTION_THRESHOLDS,
            rate_overrides: BTreeMap::new(),
        }
    }
}

impl SimulationConfig {
    pub fn from_ron_str(input: &str) -> anyhow::Result<Self> {
        let config: SimulationConfig =
            ron::from_str(input).context("Failed to parse simulation config")?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read simulation config {}", path.display()))?;
        Self::from_ron_str(&contents)
    }

    pub fn rates_for(&self, location: Location) -> ArrivalRates {
        match self.rate_overrides.get(location.short_name()) {
            Some(rates) => *rates,
            None => {
                let info = location.info();
                ArrivalRates {
                    inbound: info.inbound_rate,
                    outbound: info.outbound_rate,
                }
            }
        }
    }

    pub fn congestion_ladder(&self) -> Result<CongestionLadder, TrafficError> {
        CongestionLadder::new(self.congestion_thresholds)
    }

    pub fn validate(&self) -> Result<(), TrafficError> {
        if self.steps == 0 {
            return Err(TrafficError::Validation(
                "simulation needs at least one step".to_string(),
            ));
        }

        if self.bucket_seconds <= 0 {
            return Err(TrafficError::Validation(format!(
                "bucket width must be positive, got {} seconds",
                self.bucket_seconds
            )));
        }

        self.congestion_ladder()?;

        if let Some(unknown) = self
            .rate_overrides
            .keys()
            .find(|name| Location::from_short_name(name).is_none())
        {
            return Err(TrafficError::Validation(format!(
                "rate override for unknown location '{}'",
                unknown
            )));
        }

        for location in Location::ALL {
            let rates = self.rates_for(location);
            for (direction, rate) in [("inbound", rates.inbound), ("outbound", rates.outbound)] {
                if !rate.is_finite() || rate < 0.0 || rate > MAX_BUCKET_RATE {
                    return Err(TrafficError::Validation(format!(
                        "{} rate for {} must be within 0..={}, got {}",
                        direction, location, MAX_BUCKET_RATE, rate
                    )));
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = SimulationConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.steps, 180);
        assert_eq!(config.bucket_seconds, 30);
    }

    #[test]
    fn ron_overrides_merge_with_defaults() {
        let config = SimulationConfig::from_ron_str(
            r#"(
                congestion_thresholds: (2, 5, 7),
                rate_overrides: {
                    "sandbeach": (inbound: 0.25, outbound: 0.0),
                },
            )"#,
        )
        .unwrap();

        assert_eq!(config.steps, SIM_STEPS);
        assert_eq!(config.congestion_thresholds, [2, 5, 7]);
        assert_eq!(
            config.rates_for(Location::SandBeach),
            ArrivalRates {
                inbound: 0.25,
                outbound: 0.0
            }
        );
        assert_eq!(config.rates_for(Location::JordanPond).inbound, 0.9);
    }

    #[test]
    fn rejects_unknown_location_override() {
        let result = SimulationConfig::from_ron_str(
            r#"(rate_overrides: { "bubblerock": (inbound: 1.0, outbound: 1.0) })"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn rejects_negative_and_non_finite_rates() {
        let mut config = SimulationConfig::default();
        config.rate_overrides.insert(
            "oceanpath".to_string(),
            ArrivalRates {
                inbound: -0.5,
                outbound: 0.5,
            },
        );
        assert!(matches!(config.validate(), Err(TrafficError::Validation(_))));

        config.rate_overrides.insert(
            "oceanpath".to_string(),
            ArrivalRates {
                inbound: f64::NAN,
                outbound: 0.5,
            },
        );
        assert!(matches!(config.validate(), Err(TrafficError::Validation(_))));
    }

    #[test]
    fn rejects_non_ascending_thresholds() {
        let config = SimulationConfig {
            congestion_thresholds: [5, 5, 7],
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(TrafficError::Validation(_))));
    }

    #[test]
    fn rejects_zero_steps_and_bucket_width() {
        let config = SimulationConfig {
            steps: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = SimulationConfig {
            bucket_seconds: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
