use crate::errors::TrafficError;
use crate::historical::Direction;
use crate::locations::Location;
use ahash::AHashMap;
use csv::{ReaderBuilder, StringRecord};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::debug;

/// Raw rows of a historical count table.
pub trait TabularSource: Send + Sync {
    fn read_rows(
        &self,
        location: Location,
        direction: Direction,
    ) -> Result<Vec<StringRecord>, TrafficError>;
}

/// `jordanpond_in.csv`, `jordanpond_out.csv`, ...
pub fn source_file_name(location: Location, direction: Direction) -> String {
    format!("{}_{}.csv", location.short_name(), direction.as_str())
}

/// Header rows, blank lines and annotations are all kept; the loader decides
/// what a day row is.
fn read_records<R: Read>(reader: R) -> Result<Vec<StringRecord>, csv::Error> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(reader);

    let mut rows: Vec<StringRecord> = vec![];

    for record in rdr.records() {
        rows.push(record?);
    }

    Ok(rows)
}

/// Reads `<data_dir>/<short name>_<in|out>.csv`.
#[derive(Clone, Debug)]
pub struct CsvDirectorySource {
    data_dir: PathBuf,
}

impl CsvDirectorySource {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    pub fn path_for(&self, location: Location, direction: Direction) -> PathBuf {
        self.data_dir.join(source_file_name(location, direction))
    }
}

impl TabularSource for CsvDirectorySource {
    fn read_rows(
        &self,
        location: Location,
        direction: Direction,
    ) -> Result<Vec<StringRecord>, TrafficError> {
        let path = self.path_for(location, direction);

        if !path.exists() {
            return Err(TrafficError::SourceNotFound {
                location,
                direction,
                path,
            });
        }

        let file = File::open(&path).map_err(|source| TrafficError::Io {
            path: path.clone(),
            source,
        })?;

        let rows = read_records(BufReader::new(file))?;

        debug!("Read {} rows from {}", rows.len(), path.display());

        Ok(rows)
    }
}

/// Rows held in memory. Counts how often it is read, which makes cache
/// behaviour observable.
#[derive(Debug, Default)]
pub struct InMemorySource {
    tables: AHashMap<(Location, Direction), Vec<StringRecord>>,
    reads: AtomicUsize,
}

impl InMemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses `csv_text` the same way files are parsed.
    pub fn with_csv(
        mut self,
        location: Location,
        direction: Direction,
        csv_text: &str,
    ) -> Result<Self, TrafficError> {
        let rows = read_records(csv_text.as_bytes())?;
        self.tables.insert((location, direction), rows);
        Ok(self)
    }

    pub fn with_rows(
        mut self,
        location: Location,
        direction: Direction,
        rows: Vec<Vec<String>>,
    ) -> Self {
        let rows = rows.into_iter().map(StringRecord::from).collect();
        self.tables.insert((location, direction), rows);
        self
    }

    /// Number of `read_rows` calls so far, including misses.
    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }
}

impl TabularSource for InMemorySource {
    fn read_rows(
        &self,
        location: Location,
        direction: Direction,
    ) -> Result<Vec<StringRecord>, TrafficError> {
        self.reads.fetch_add(1, Ordering::SeqCst);

        match self.tables.get(&(location, direction)) {
            Some(rows) => Ok(rows.clone()),
            None => Err(TrafficError::SourceNotFound {
                location,
                direction,
                path: PathBuf::from(source_file_name(location, direction)),
            }),
        }
    }
}
