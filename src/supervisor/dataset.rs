// src/supervisor/dataset.rs
// Pre-recorded accelerometer capture, one tab-separated row per tick.

use csv::ReaderBuilder;
use log::{debug, error, info, warn};
use nalgebra::Vector3;
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// One accelerometer reading (x, y, z)
pub type AccelerometerSample = Vector3<f64>;

/// Accelerometer rows indexed by simulation tick
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    rows: Vec<Vec<f64>>,
}

impl Dataset {
    /// Wraps already-parsed rows
    pub fn from_rows(rows: Vec<Vec<f64>>) -> Self {
        Dataset { rows }
    }

    /// Parses tab-separated rows from `reader`.
    ///
    /// Empty fields (as left by a trailing tab) are ignored. A row containing
    /// a field that is not a number is kept as an empty row with a warning,
    /// so later rows stay on their tick.
    pub fn from_reader<R: Read>(reader: R) -> Self {
        let mut csv_reader = ReaderBuilder::new()
            .delimiter(b'\t')
            .has_headers(false)
            .flexible(true)
            .from_reader(reader);

        let mut rows = Vec::new();
        for (line, record) in csv_reader.records().enumerate() {
            let record = match record {
                Ok(record) => record,
                Err(e) => {
                    warn!("skipping unreadable row {}: {}", line + 1, e);
                    continue;
                }
            };
            if record.iter().all(|field| field.trim().is_empty()) {
                continue;
            }
            let parsed: Result<Vec<f64>, _> = record
                .iter()
                .map(str::trim)
                .filter(|field| !field.is_empty())
                .map(str::parse::<f64>)
                .collect();
            match parsed {
                Ok(row) => rows.push(row),
                Err(e) => {
                    warn!("row {} is not numeric ({}), it will replay empty", line + 1, e);
                    rows.push(Vec::new());
                }
            }
        }
        Dataset { rows }
    }

    /// Number of rows (ticks) available
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// True when there is nothing to replay
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Raw rows, in file order
    pub fn rows(&self) -> &[Vec<f64>] {
        &self.rows
    }

    /// The (x, y, z) sample for `tick`. `None` past the end of the data or
    /// when the row has fewer than three fields.
    pub fn sample(&self, tick: usize) -> Option<AccelerometerSample> {
        match self.rows.get(tick)?.as_slice() {
            [x, y, z, ..] => Some(Vector3::new(*x, *y, *z)),
            _ => None,
        }
    }

    /// Keeps only the first `limit` rows
    pub fn truncate(&mut self, limit: usize) {
        self.rows.truncate(limit);
    }
}

/// Reads the capture at `path`.
///
/// A file that cannot be opened is not fatal: the error is logged and an
/// empty dataset is returned.
pub fn read_accelerometer_data(path: &Path) -> Dataset {
    let file = match File::open(path) {
        Ok(file) => file,
        Err(e) => {
            error!("could not open {}: {}", path.display(), e);
            return Dataset::default();
        }
    };

    let dataset = Dataset::from_reader(file);
    if dataset.is_empty() {
        warn!("no data read from {}", path.display());
    } else {
        info!(
            "read accelerometer data with {} entries from {}",
            dataset.len(),
            path.display()
        );
        for (i, row) in dataset.rows().iter().enumerate() {
            debug!("entry {}: {:?}", i + 1, row);
        }
    }
    dataset
}
