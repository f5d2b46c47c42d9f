//! Simulation host interface
//!
//! This module is the only place that knows about the simulator. It defines:
//! - Capability traits for every device the controllers touch
//! - The exact device names the host resolves to handles
//! - An offline host used when no simulator is attached

mod offline;

pub use offline::*;

/// Device names as resolved by the host's device lookup
pub mod devices {
    /// Left drive motor
    pub const LEFT_MOTOR: &str = "left motor";
    /// Right drive motor
    pub const RIGHT_MOTOR: &str = "right motor";
    /// Drive motor names, indexed by [`super::Side`]
    pub const MOTORS: [&str; 2] = [LEFT_MOTOR, RIGHT_MOTOR];
    /// Left distance sensor
    pub const LEFT_DISTANCE_SENSOR: &str = "left distance sensor";
    /// Right distance sensor
    pub const RIGHT_DISTANCE_SENSOR: &str = "right distance sensor";
    /// Distance sensor names, indexed by [`super::Side`]
    pub const DISTANCE_SENSORS: [&str; 2] = [LEFT_DISTANCE_SENSOR, RIGHT_DISTANCE_SENSOR];
    /// Bumper
    pub const TOUCH_SENSOR: &str = "touch sensor";
    /// Position sensor
    pub const GPS: &str = "gps";
    /// Orientation sensor
    pub const IMU: &str = "imu";
    /// Payload electromagnet, driven like a motor
    pub const ELECTROMAGNET: &str = "electromagnet";
    /// Outbound message channel
    pub const EMITTER: &str = "emitter";
    /// Inbound message channel
    pub const RECEIVER: &str = "receiver";
    /// E-puck ring of proximity sensors, clockwise from front-right
    pub const PROXIMITY_SENSORS: [&str; 8] = ["ps0", "ps1", "ps2", "ps3", "ps4", "ps5", "ps6", "ps7"];
}

/// Wheel side, used to index paired devices
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    /// Left wheel
    Left = 0,
    /// Right wheel
    Right = 1,
}

/// A distance sensor. Sampling period 0 means the device is disabled.
#[cfg_attr(test, mockall::automock)]
pub trait DistanceSource {
    /// Current sampling period in milliseconds
    fn sampling_period(&self) -> u32;
    /// Start sampling every `period_ms`
    fn enable(&mut self, period_ms: u32);
    /// Last sampled value
    fn value(&self) -> f64;
}

/// A touch (bumper) sensor
#[cfg_attr(test, mockall::automock)]
pub trait TouchSource {
    /// Current sampling period in milliseconds
    fn sampling_period(&self) -> u32;
    /// Start sampling every `period_ms`
    fn enable(&mut self, period_ms: u32);
    /// Last sampled value, non-zero when pressed
    fn value(&self) -> i32;
}

/// A GPS receiver
#[cfg_attr(test, mockall::automock)]
pub trait GpsSource {
    /// Current sampling period in milliseconds
    fn sampling_period(&self) -> u32;
    /// Start sampling every `period_ms`
    fn enable(&mut self, period_ms: u32);
    /// Last sampled position (x, y, z) in metres
    fn values(&self) -> [f64; 3];
}

/// An inertial unit
#[cfg_attr(test, mockall::automock)]
pub trait ImuSource {
    /// Current sampling period in milliseconds
    fn sampling_period(&self) -> u32;
    /// Start sampling every `period_ms`
    fn enable(&mut self, period_ms: u32);
    /// Last sampled roll, pitch and yaw in radians
    fn roll_pitch_yaw(&self) -> [f64; 3];
}

/// A rotational actuator (drive motor or electromagnet)
#[cfg_attr(test, mockall::automock)]
pub trait Actuator {
    /// Target position in radians; `f64::INFINITY` switches to velocity control
    fn set_position(&mut self, position: f64);
    /// Target velocity in rad/s
    fn set_velocity(&mut self, velocity: f64);
}

/// Outbound end of the host message channel
#[cfg_attr(test, mockall::automock)]
pub trait MessageSink {
    /// Queue `payload` for delivery on the next step
    fn send(&mut self, payload: &[u8]) -> Result<(), HostError>;
}

/// Inbound end of the host message channel
#[cfg_attr(test, mockall::automock)]
pub trait MessageSource {
    /// Number of packets waiting
    fn queue_length(&self) -> usize;
    /// Head packet, if any
    fn data(&self) -> Option<Vec<u8>>;
    /// Drop the head packet
    fn next_packet(&mut self);
}

/// World position of a node, as read by the supervisor
#[cfg_attr(test, mockall::automock)]
pub trait PositionSource {
    /// Translation (x, y, z) in metres
    fn position(&self) -> [f64; 3];
}

/// The host's step call. Blocks until the next tick is ready.
#[cfg_attr(test, mockall::automock)]
pub trait StepClock {
    /// Advance the simulation by `time_step_ms`. Returns -1 once the
    /// simulation is stopping.
    fn step(&mut self, time_step_ms: u32) -> i32;
}

/// Errors reported across the host boundary
#[derive(Debug, thiserror::Error)]
pub enum HostError {
    /// The host refused or could not queue a packet
    #[error("send failed: {0}")]
    SendFailed(String),
}
