use crate::HOURS_PER_DAY;
use crate::errors::TrafficError;
use crate::historical::loader::HistoricalRecordLoader;
use crate::historical::source::TabularSource;
use crate::historical::{DayRecord, Direction};
use crate::locations::Location;
use itertools::Itertools;
use serde::Serialize;
use std::sync::Arc;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct DayHours {
    pub inbound: [u32; HOURS_PER_DAY],
    pub outbound: [u32; HOURS_PER_DAY],
}

/// Daily totals ordered by day; `inbound[i]` and `outbound[i]` belong to `days[i]`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct MonthTotals {
    pub days: Vec<u32>,
    pub inbound: Vec<u32>,
    pub outbound: Vec<u32>,
}

pub struct HistoricalAggregator {
    loader: HistoricalRecordLoader,
}

fn hours_for_day(records: &[DayRecord], day: u32) -> [u32; HOURS_PER_DAY] {
    records
        .iter()
        .find(|record| record.day == day)
        .map(|record| record.hours)
        .unwrap_or([0; HOURS_PER_DAY])
}

fn sorted_by_day(records: &[DayRecord]) -> Vec<&DayRecord> {
    records.iter().sorted_by_key(|record| record.day).collect()
}

impl HistoricalAggregator {
    pub fn new(source: Arc<dyn TabularSource>) -> Self {
        Self {
            loader: HistoricalRecordLoader::new(source),
        }
    }

    pub fn loader(&self) -> &HistoricalRecordLoader {
        &self.loader
    }

    /// Hourly counts for one day. A day missing from a direction's table
    /// reads as all zeros for that direction.
    pub fn day_hours(&self, location: Location, day: u32) -> Result<DayHours, TrafficError> {
        let inbound = self.loader.load(location, Direction::Inbound)?;
        let outbound = self.loader.load(location, Direction::Outbound)?;

        Ok(DayHours {
            inbound: hours_for_day(&inbound, day),
            outbound: hours_for_day(&outbound, day),
        })
    }

    /// Fails with `MismatchedDaySets` when the inbound and outbound tables do
    /// not cover the same days.
    pub fn month_totals(&self, location: Location) -> Result<MonthTotals, TrafficError> {
        let inbound = self.loader.load(location, Direction::Inbound)?;
        let outbound = self.loader.load(location, Direction::Outbound)?;

        let inbound = sorted_by_day(&inbound);
        let outbound = sorted_by_day(&outbound);

        let inbound_days: Vec<u32> = inbound.iter().map(|record| record.day).collect();
        let outbound_days: Vec<u32> = outbound.iter().map(|record| record.day).collect();

        if inbound_days != outbound_days {
            return Err(TrafficError::MismatchedDaySets {
                location,
                inbound_days,
                outbound_days,
            });
        }

        Ok(MonthTotals {
            days: inbound_days,
            inbound: inbound.iter().map(|record| record.total).collect(),
            outbound: outbound.iter().map(|record| record.total).collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::historical::source::InMemorySource;

    fn csv_day(label: &str, hours: &[u32], total: u32) -> String {
        let hours = hours.iter().map(|h| h.to_string()).join(",");
        format!("{},{},{}\n", label, hours, total)
    }

    fn inbound_csv() -> String {
        let mut csv = String::from("Jordan Pond,Inbound,,\nDay,H1,H2,...\n");
        csv.push_str(&csv_day("T 26", &(1..=24).collect::<Vec<u32>>(), 300));
        csv.push_str(&csv_day("M 25", &[0; 24], 0));
        csv.push_str(&csv_day("W 20", &[2; 24], 50));
        csv
    }

    fn outbound_csv() -> String {
        let mut csv = String::from("Jordan Pond,Outbound,,\n");
        csv.push_str(&csv_day("W 20", &[1; 24], 24));
        csv.push_str(&csv_day("T 26", &(101..=124).collect::<Vec<u32>>(), 2700));
        csv.push_str(&csv_day("M 25", &[3; 24], 72));
        csv
    }

    fn aggregator_with(inbound: &str, outbound: &str) -> (Arc<InMemorySource>, HistoricalAggregator) {
        let source = Arc::new(
            InMemorySource::new()
                .with_csv(Location::JordanPond, Direction::Inbound, inbound)
                .unwrap()
                .with_csv(Location::JordanPond, Direction::Outbound, outbound)
                .unwrap(),
        );
        let aggregator = HistoricalAggregator::new(source.clone());
        (source, aggregator)
    }

    #[test]
    fn day_hours_returns_sourced_values() {
        let (_, aggregator) = aggregator_with(&inbound_csv(), &outbound_csv());

        let day = aggregator.day_hours(Location::JordanPond, 26).unwrap();
        assert_eq!(day.inbound.to_vec(), (1..=24).collect::<Vec<u32>>());
        assert_eq!(day.outbound.to_vec(), (101..=124).collect::<Vec<u32>>());
    }

    #[test]
    fn absent_day_is_all_zeros() {
        let (_, aggregator) = aggregator_with(&inbound_csv(), &outbound_csv());

        let day = aggregator.day_hours(Location::JordanPond, 99).unwrap();
        assert_eq!(day.inbound, [0; 24]);
        assert_eq!(day.outbound, [0; 24]);
    }

    #[test]
    fn missing_day_falls_back_per_direction() {
        let outbound = csv_day("T 26", &[4; 24], 96);
        let (_, aggregator) = aggregator_with(&inbound_csv(), &outbound);

        let day = aggregator.day_hours(Location::JordanPond, 20).unwrap();
        assert_eq!(day.inbound, [2; 24]);
        assert_eq!(day.outbound, [0; 24]);
    }

    #[test]
    fn month_totals_are_sorted_and_aligned() {
        let (_, aggregator) = aggregator_with(&inbound_csv(), &outbound_csv());

        let month = aggregator.month_totals(Location::JordanPond).unwrap();
        assert_eq!(month.days, vec![20, 25, 26]);
        assert_eq!(month.inbound, vec![50, 0, 300]);
        assert_eq!(month.outbound, vec![24, 72, 2700]);
        assert!(month.days.windows(2).all(|pair| pair[0] < pair[1]));
    }

    #[test]
    fn mismatched_day_sets_are_reported() {
        let outbound = csv_day("T 26", &[4; 24], 96);
        let (_, aggregator) = aggregator_with(&inbound_csv(), &outbound);

        match aggregator.month_totals(Location::JordanPond) {
            Err(TrafficError::MismatchedDaySets {
                inbound_days,
                outbound_days,
                ..
            }) => {
                assert_eq!(inbound_days, vec![20, 25, 26]);
                assert_eq!(outbound_days, vec![26]);
            }
            other => panic!("expected MismatchedDaySets, got {:?}", other),
        }
    }

    #[test]
    fn repeated_queries_hit_the_cache() {
        let (source, aggregator) = aggregator_with(&inbound_csv(), &outbound_csv());

        aggregator.day_hours(Location::JordanPond, 26).unwrap();
        aggregator.day_hours(Location::JordanPond, 25).unwrap();
        aggregator.month_totals(Location::JordanPond).unwrap();

        assert_eq!(source.reads(), 2);
        assert_eq!(aggregator.loader().cached_tables(), 2);
    }

    #[test]
    fn missing_location_is_source_not_found() {
        let (_, aggregator) = aggregator_with(&inbound_csv(), &outbound_csv());

        assert!(matches!(
            aggregator.day_hours(Location::SandBeach, 1),
            Err(TrafficError::SourceNotFound { .. })
        ));
        assert!(matches!(
            aggregator.month_totals(Location::SandBeach),
            Err(TrafficError::SourceNotFound { .. })
        ));
    }

    #[test]
    fn malformed_row_surfaces_as_parse_error() {
        let outbound = csv_day("T 26", &[4; 20], 80);
        let (_, aggregator) = aggregator_with(&inbound_csv(), &outbound);

        assert!(matches!(
            aggregator.day_hours(Location::JordanPond, 26),
            Err(TrafficError::Parse {
                direction: Direction::Outbound,
                ..
            })
        ));
    }
}
