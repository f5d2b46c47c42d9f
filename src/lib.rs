//! E-puck predictive maintenance controllers
//!
//! This library provides the controller logic for a simulated E-puck used in
//! a vibration-classification experiment, including heading-hold motion
//! control, lazily-enabled sensor access, and the supervisor that streams
//! distance-attenuated accelerometer data to the robot.
//!
//! The simulator is reached only through the capability traits in [`host`],
//! so all of the control and signal logic runs without it.

#![warn(missing_docs)]
#![warn(unused_extern_crates)]

pub mod heading;
pub mod host;
pub mod robot;
pub mod sensors;
pub mod supervisor;

// Re-export commonly used items for easier access
pub use heading::{HeadingConfig, HeadingController, HeadingState, MotionCommand};
pub use host::HostError;
pub use robot::{HighLevelState, RobotConfig, RobotController, WanderController};
pub use supervisor::{
    AttenuationModel, Batch, Dataset, FrameError, FrameMode, MapConfig, MapError, Supervisor,
    SupervisorConfig, VibrationMap,
};

use log::{info, warn};
use std::fs::File;
use std::path::Path;

/// Top-level configuration, one section per controller
#[derive(Debug, Clone, PartialEq, Default, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct ControllerConfig {
    /// Robot-side settings
    pub robot: RobotConfig,
    /// Heading-hold parameters
    pub heading: HeadingConfig,
    /// Supervisor replay settings
    pub supervisor: SupervisorConfig,
    /// Vibration map generation
    pub map: MapConfig,
}

impl ControllerConfig {
    /// Reads a YAML configuration file. Sections or keys left out take
    /// their default values.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let file = File::open(path).map_err(|source| ConfigError::Open {
            path: path.display().to_string(),
            source,
        })?;
        let config: ControllerConfig = serde_yaml::from_reader(file)?;
        config.validate()?;
        info!("loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Like [`load`](Self::load), but falls back to defaults when the file
    /// does not exist
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            warn!("{} not found, using default configuration", path.display());
            return Ok(Self::default());
        }
        Self::load(path)
    }

    /// Rejects values the controllers cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.robot.time_step_ms == 0 {
            return Err(ConfigError::Invalid("robot.time_step_ms must be positive".into()));
        }
        if !(self.heading.tolerance > 0.0) {
            return Err(ConfigError::Invalid("heading.tolerance must be positive".into()));
        }
        if self.supervisor.batch_size == 0 || self.supervisor.batch_size > supervisor::BATCH_SIZE {
            return Err(ConfigError::Invalid(format!(
                "supervisor.batch_size must be between 1 and {}",
                supervisor::BATCH_SIZE
            )));
        }
        if self.map.size == 0 {
            return Err(ConfigError::Invalid("map.size must be positive".into()));
        }
        Ok(())
    }
}

/// Configuration loading errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The file could not be opened
    #[error("cannot open {path}: {source}")]
    Open {
        /// File that failed to open
        path: String,
        /// Underlying error
        source: std::io::Error,
    },
    /// The file is not valid YAML for [`ControllerConfig`]
    #[error("invalid YAML: {0}")]
    Parse(#[from] serde_yaml::Error),
    /// A value is out of range
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Errors surfaced by the controller entry points
#[derive(Debug, thiserror::Error)]
pub enum ControllerError {
    /// Configuration problem
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// Vibration map output problem
    #[error(transparent)]
    Map(#[from] MapError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_yaml_keeps_defaults() {
        let yaml = "heading:\n  settle_ticks: 10\nsupervisor:\n  frame_mode: single\n";
        let config: ControllerConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.heading.settle_ticks, 10);
        assert_eq!(config.heading.tolerance, HeadingConfig::default().tolerance);
        assert_eq!(config.supervisor.frame_mode, FrameMode::Single);
        assert_eq!(config.robot, RobotConfig::default());
    }

    #[test]
    fn oversized_batch_is_rejected() {
        let mut config = ControllerConfig::default();
        config.supervisor.batch_size = 25;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let config = ControllerConfig::load_or_default(Path::new("/nonexistent/epuck.yaml")).unwrap();
        assert_eq!(config, ControllerConfig::default());
    }
}
