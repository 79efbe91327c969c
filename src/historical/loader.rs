use crate::HOURS_PER_DAY;
use crate::errors::TrafficError;
use crate::historical::source::TabularSource;
use crate::historical::{DayRecord, Direction};
use crate::locations::Location;
use csv::StringRecord;
use dashmap::DashMap;
use lazy_static::lazy_static;
use regex::Regex;
use std::sync::{Arc, Mutex, PoisonError};
use tracing::{info, trace};

lazy_static! {
    // "T 26": weekday letter (M T W T F S S), whitespace, day of month
    static ref DAY_ROW_REGEX: Regex = Regex::new(r"^[MTWFS]\s+([0-9]{1,2})$").unwrap();
}

type CacheSlot = Arc<Mutex<Option<Arc<Vec<DayRecord>>>>>;

/// Parses and memoizes day records per (location, direction).
///
/// Every key owns its own slot mutex, so concurrent first requests for the
/// same table wait on one read of the source, while other keys load in
/// parallel. Failed loads leave the slot empty.
pub struct HistoricalRecordLoader {
    source: Arc<dyn TabularSource>,
    cache: DashMap<(Location, Direction), CacheSlot>,
}

impl HistoricalRecordLoader {
    pub fn new(source: Arc<dyn TabularSource>) -> Self {
        Self {
            source,
            cache: DashMap::new(),
        }
    }

    pub fn load(
        &self,
        location: Location,
        direction: Direction,
    ) -> Result<Arc<Vec<DayRecord>>, TrafficError> {
        let slot: CacheSlot = self
            .cache
            .entry((location, direction))
            .or_default()
            .value()
            .clone();

        let mut cached = slot.lock().unwrap_or_else(PoisonError::into_inner);

        if let Some(records) = cached.as_ref() {
            return Ok(Arc::clone(records));
        }

        let rows = self.source.read_rows(location, direction)?;
        let records = Arc::new(parse_day_rows(location, direction, &rows)?);

        info!(
            "Loaded {} day records for {} ({})",
            records.len(),
            location,
            direction
        );

        *cached = Some(Arc::clone(&records));

        Ok(records)
    }

    /// Number of (location, direction) tables currently cached.
    pub fn cached_tables(&self) -> usize {
        self.cache
            .iter()
            .filter(|entry| {
                entry
                    .value()
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .is_some()
            })
            .count()
    }
}

fn parse_count(
    row: &StringRecord,
    column: usize,
    location: Location,
    direction: Direction,
    line: u64,
) -> Result<u32, TrafficError> {
    let cell = row.get(column).unwrap_or("").trim();

    cell.parse::<u32>().map_err(|_| TrafficError::Parse {
        location,
        direction,
        line,
        reason: format!("column {} is not a count: {:?}", column, cell),
    })
}

/// Non day rows are skipped; a day row that cannot be read is an error.
pub fn parse_day_rows(
    location: Location,
    direction: Direction,
    rows: &[StringRecord],
) -> Result<Vec<DayRecord>, TrafficError> {
    let mut records: Vec<DayRecord> = vec![];

    for (row_number, row) in rows.iter().enumerate() {
        let line = row
            .position()
            .map(|position| position.line())
            .unwrap_or(row_number as u64 + 1);

        let label = row.get(0).unwrap_or("").trim();

        let day = match DAY_ROW_REGEX.captures(label) {
            Some(captures) => captures[1].parse::<u32>().map_err(|_| TrafficError::Parse {
                location,
                direction,
                line,
                reason: format!("bad day number in {:?}", label),
            })?,
            None => {
                trace!("Skipping line {} of {} ({})", line, location, direction);
                continue;
            }
        };

        if records.iter().any(|record| record.day == day) {
            return Err(TrafficError::Parse {
                location,
                direction,
                line,
                reason: format!("day {} appears more than once", day),
            });
        }

        let values_after_label = row.len().saturating_sub(1);
        if values_after_label < HOURS_PER_DAY + 1 {
            return Err(TrafficError::Parse {
                location,
                direction,
                line,
                reason: format!(
                    "expected {} values after the day label, found {}",
                    HOURS_PER_DAY + 1,
                    values_after_label
                ),
            });
        }

        let mut hours = [0_u32; HOURS_PER_DAY];
        for (hour, slot) in hours.iter_mut().enumerate() {
            *slot = parse_count(row, hour + 1, location, direction, line)?;
        }

        let total = parse_count(row, HOURS_PER_DAY + 1, location, direction, line)?;

        records.push(DayRecord { day, hours, total });
    }

    Ok(records)
}
