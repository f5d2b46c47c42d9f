// src/supervisor/map.rs
// Pre-computed vibration field: the source capture attenuated for every
// integer cell of a square map, at every time step.

use super::attenuation::AttenuationModel;
use super::dataset::{AccelerometerSample, Dataset};
use log::info;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Vibration map parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapConfig {
    /// Cells per side
    pub size: u32,
    /// Vibration source cell
    pub source: [f64; 2],
    /// Rows of the capture to use; larger maps stall the simulator on import
    pub row_limit: usize,
    /// CSV output path
    pub output_path: PathBuf,
}

impl Default for MapConfig {
    fn default() -> Self {
        MapConfig {
            size: 10,
            source: [5.0, 5.0],
            row_limit: 1000,
            output_path: PathBuf::from("vibration_map.csv"),
        }
    }
}

/// One map cell at one instant
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct VibrationMapEntry {
    /// Time step
    #[serde(rename = "Time")]
    pub time: usize,
    /// Cell column
    #[serde(rename = "X")]
    pub x: u32,
    /// Cell row
    #[serde(rename = "Y")]
    pub y: u32,
    /// Attenuated acceleration, x axis
    #[serde(rename = "Vibration_X")]
    pub vibration_x: f64,
    /// Attenuated acceleration, y axis
    #[serde(rename = "Vibration_Y")]
    pub vibration_y: f64,
    /// Attenuated acceleration, z axis
    #[serde(rename = "Vibration_Z")]
    pub vibration_z: f64,
}

impl VibrationMapEntry {
    /// The entry's acceleration as a vector
    pub fn vibration(&self) -> AccelerometerSample {
        AccelerometerSample::new(self.vibration_x, self.vibration_y, self.vibration_z)
    }
}

/// Errors writing the map
#[derive(Debug, thiserror::Error)]
pub enum MapError {
    /// CSV encoding or file error
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    /// Flushing the output failed
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Attenuated vibration for every (time, x, y).
///
/// Entries are stored time-major, then by x, then by y.
#[derive(Debug, Clone)]
pub struct VibrationMap {
    size: u32,
    time_points: usize,
    entries: Vec<VibrationMapEntry>,
}

impl VibrationMap {
    /// Builds the map from the first `config.row_limit` complete rows of
    /// `dataset`
    pub fn generate(dataset: &Dataset, config: &MapConfig) -> Self {
        let model = AttenuationModel::new(config.source);
        let size = config.size;

        let cells: Vec<(u32, u32, f64)> = (0..size)
            .flat_map(|x| (0..size).map(move |y| (x, y)))
            .map(|(x, y)| (x, y, model.factor_at([f64::from(x), f64::from(y), 0.0])))
            .collect();

        let samples: Vec<AccelerometerSample> = (0..dataset.len())
            .filter_map(|tick| dataset.sample(tick))
            .take(config.row_limit)
            .collect();

        let mut entries = Vec::with_capacity(samples.len() * cells.len());
        for (time, sample) in samples.iter().enumerate() {
            for &(x, y, factor) in &cells {
                let felt = sample * factor;
                entries.push(VibrationMapEntry {
                    time,
                    x,
                    y,
                    vibration_x: felt.x,
                    vibration_y: felt.y,
                    vibration_z: felt.z,
                });
            }
        }

        info!(
            "generated {}x{} vibration map over {} time steps",
            size,
            size,
            samples.len()
        );
        VibrationMap {
            size,
            time_points: samples.len(),
            entries,
        }
    }

    /// Cells per side
    pub fn size(&self) -> u32 {
        self.size
    }

    /// Number of time steps covered
    pub fn time_points(&self) -> usize {
        self.time_points
    }

    /// All entries, in storage order
    pub fn entries(&self) -> &[VibrationMapEntry] {
        &self.entries
    }

    /// Vibration at cell (x, y) and `time`, if inside the map
    pub fn query(&self, x: u32, y: u32, time: usize) -> Option<&VibrationMapEntry> {
        if x >= self.size || y >= self.size || time >= self.time_points {
            return None;
        }
        let cells = (self.size as usize).pow(2);
        let index = time * cells + x as usize * self.size as usize + y as usize;
        self.entries.get(index)
    }

    /// Writes the map as CSV with a header row
    pub fn write_csv(&self, path: &Path) -> Result<(), MapError> {
        let mut writer = csv::Writer::from_path(path)?;
        for entry in &self.entries {
            writer.serialize(entry)?;
        }
        writer.flush()?;
        info!("vibration map saved to {}", path.display());
        Ok(())
    }
}
