//! Heading-hold motion control
//!
//! This module drives the robot along a goal heading:
//! - Angle wrapping into (-π, π]
//! - A pure four-state transition function (straight, turn left, turn right, stop)
//! - A controller context that carries goal, state and settle counter between ticks

pub mod angle;
pub mod controller;
pub mod state;

pub use angle::{heading_error, normalize_angle};
pub use controller::HeadingController;
pub use state::{transition, HeadingState, MotionCommand, Transition};

use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// E-puck wheel top speed in rad/s
pub const EPUCK_MAX_SPEED: f64 = 6.28;

/// Heading controller parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeadingConfig {
    /// Largest heading error treated as "on heading", in radians
    pub tolerance: f64,
    /// Ticks on heading before the controller reports the move done
    pub settle_ticks: u32,
    /// Wheel speed for every motion primitive, in rad/s
    pub drive_speed: f64,
}

impl Default for HeadingConfig {
    fn default() -> Self {
        HeadingConfig {
            tolerance: PI / 20.0,
            settle_ticks: 75,
            drive_speed: EPUCK_MAX_SPEED,
        }
    }
}
