//! Robot-side controllers
//!
//! Two controllers run on the E-puck:
//! - [`RobotController`]: heading-hold driving for motion primitives issued by a planner
//! - [`WanderController`]: reactive random walk that listens to the supervisor's frames

pub mod wander;

pub use wander::{avoid_obstacles, WanderController, WanderDevices};

use crate::heading::{HeadingConfig, HeadingController, Transition};
use crate::host::{devices, Actuator, DistanceSource, ImuSource, Side, StepClock};
use crate::sensors::{read_distance, read_orientation, Orientation};
use log::{debug, info};
use serde::{Deserialize, Serialize};

/// Robot-side parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RobotConfig {
    /// Host time step and sensor sampling period, in milliseconds
    pub time_step_ms: u32,
    /// Proximity reading above which an obstacle is assumed
    pub obstacle_threshold: f64,
    /// Fraction of top speed used while wandering
    pub cruise_fraction: f64,
}

impl Default for RobotConfig {
    fn default() -> Self {
        RobotConfig {
            time_step_ms: 64,
            obstacle_threshold: 80.0,
            cruise_fraction: 0.5,
        }
    }
}

/// Task status shared with the high-level planner
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HighLevelState {
    /// No motion primitive issued yet
    #[default]
    Idle,
    /// A steering command is being executed
    Executing,
    /// The low level reached and held the goal heading
    LowLevelDone,
}

/// Devices the heading-hold controller drives
pub struct RobotDevices<M, D, I> {
    /// Drive motors, indexed by [`Side`]
    pub motors: [M; 2],
    /// Front distance sensors, indexed by [`Side`]
    pub distance_sensors: [D; 2],
    /// Inertial unit
    pub imu: I,
    /// Payload electromagnet
    pub electromagnet: M,
}

/// Heading-hold robot controller context
pub struct RobotController<M, D, I> {
    config: RobotConfig,
    heading: HeadingController,
    devices: RobotDevices<M, D, I>,
    high_level: HighLevelState,
    pending_steering: Option<f64>,
}

impl<M, D, I> RobotController<M, D, I>
where
    M: Actuator,
    D: DistanceSource,
    I: ImuSource,
{
    /// Wraps the devices; call [`setup`](Self::setup) before the first tick
    pub fn new(config: RobotConfig, heading: HeadingConfig, devices: RobotDevices<M, D, I>) -> Self {
        RobotController {
            config,
            heading: HeadingController::new(heading),
            devices,
            high_level: HighLevelState::Idle,
            pending_steering: None,
        }
    }

    /// Puts the motors in velocity mode, starts the sensors and energises
    /// the electromagnet
    pub fn setup(&mut self) {
        let period = self.config.time_step_ms;
        for side in [Side::Left, Side::Right] {
            let i = side as usize;
            self.devices.motors[i].set_position(f64::INFINITY);
            self.devices.distance_sensors[i].enable(period);
            debug!(
                "{} in velocity mode, {} sampling every {} ms",
                devices::MOTORS[i],
                devices::DISTANCE_SENSORS[i],
                period
            );
        }
        self.devices.imu.enable(period);

        self.devices.electromagnet.set_position(f64::INFINITY);
        self.devices.electromagnet.set_velocity(1.0);

        self.heading = HeadingController::new(*self.heading.config());
        self.pending_steering = None;
        info!("{} ready, {} energised", devices::IMU, devices::ELECTROMAGNET);
    }

    /// Current orientation, with the IMU's backwards mounting corrected.
    /// `None` while the IMU warms up.
    pub fn orientation(&mut self) -> Option<Orientation> {
        read_orientation(&mut self.devices.imu, self.config.time_step_ms)
    }

    /// Front distance readings, left then right
    pub fn distances(&mut self) -> [f64; 2] {
        let period = self.config.time_step_ms;
        let [left, right] = &mut self.devices.distance_sensors;
        [read_distance(left, period), read_distance(right, period)]
    }

    /// Issues a steering command relative to the current heading.
    ///
    /// Without a heading yet, the command is held and applied on the first
    /// tick the IMU reports one.
    pub fn set_angle(&mut self, steering: f64) {
        match self.orientation() {
            Some(o) => {
                self.heading.set_angle(steering, o.yaw);
                self.pending_steering = None;
            }
            None => {
                debug!("no heading yet, holding steering {}", steering);
                self.pending_steering = Some(steering);
            }
        }
        self.high_level = HighLevelState::Executing;
    }

    /// Runs one control tick: update the heading state, then drive the motors.
    ///
    /// Returns `None` and leaves the motors alone while the IMU warms up.
    pub fn tick(&mut self) -> Option<Transition> {
        let Some(orientation) = self.orientation() else {
            debug!("{} warming up, skipping heading update", devices::IMU);
            return None;
        };
        if let Some(steering) = self.pending_steering.take() {
            self.heading.set_angle(steering, orientation.yaw);
        }
        let t = self.heading.update(orientation.yaw);
        if t.completed {
            self.high_level = HighLevelState::LowLevelDone;
        }
        let [left, right] = &mut self.devices.motors;
        self.heading.perform(left, right);
        Some(t)
    }

    /// Steps until the host stops the simulation; returns the ticks run
    pub fn run<C: StepClock + ?Sized>(&mut self, clock: &mut C) -> u64 {
        let mut ticks = 0;
        while clock.step(self.config.time_step_ms) != -1 {
            self.tick();
            ticks += 1;
        }
        ticks
    }

    /// Planner-facing task status
    pub fn high_level(&self) -> HighLevelState {
        self.high_level
    }

    /// Acknowledges a finished task
    pub fn clear_high_level(&mut self) {
        self.high_level = HighLevelState::Idle;
    }

    /// The heading controller
    pub fn heading(&self) -> &HeadingController {
        &self.heading
    }

    /// The devices
    pub fn devices(&self) -> &RobotDevices<M, D, I> {
        &self.devices
    }
}
