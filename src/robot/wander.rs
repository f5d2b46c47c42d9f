// src/robot/wander.rs
// Random-walk controller: cruise, turn away from anything the proximity ring
// sees, and log the attenuated vibration frames the supervisor sends.

use super::RobotConfig;
use crate::heading::MotionCommand;
use crate::host::{devices, Actuator, DistanceSource, MessageSource, Side, StepClock};
use crate::sensors::{is_distance_ready, read_distance};
use crate::supervisor::{decode_frame, AccelerometerSample};
use log::{debug, info, warn};

/// Wheel command for one set of proximity readings.
///
/// Sensors 0-2 cover the front-right, 5-7 the front-left. An obstacle on
/// the left turns the robot right in place; otherwise one on the right
/// turns it left; otherwise it cruises straight. Sensors still warming up
/// see nothing.
pub fn avoid_obstacles(readings: &[f64; 8], threshold: f64, cruise_speed: f64) -> MotionCommand {
    let sees = |&r: &f64| is_distance_ready(r) && r > threshold;
    let right_obstacle = readings[0..3].iter().any(sees);
    let left_obstacle = readings[5..8].iter().any(sees);

    if left_obstacle {
        MotionCommand { left: cruise_speed, right: -cruise_speed }
    } else if right_obstacle {
        MotionCommand { left: -cruise_speed, right: cruise_speed }
    } else {
        MotionCommand { left: cruise_speed, right: cruise_speed }
    }
}

/// Devices the random-walk controller uses
pub struct WanderDevices<M, D, R> {
    /// Proximity ring, ps0 to ps7
    pub proximity: [D; 8],
    /// Drive motors, indexed by [`Side`]
    pub motors: [M; 2],
    /// Channel from the supervisor
    pub receiver: R,
}

/// Random-walk controller context
pub struct WanderController<M, D, R> {
    config: RobotConfig,
    max_speed: f64,
    devices: WanderDevices<M, D, R>,
    last_samples: Vec<AccelerometerSample>,
    frames_received: u64,
}

impl<M, D, R> WanderController<M, D, R>
where
    M: Actuator,
    D: DistanceSource,
    R: MessageSource,
{
    /// Wraps the devices; `max_speed` is the wheels' top speed in rad/s
    pub fn new(config: RobotConfig, max_speed: f64, devices: WanderDevices<M, D, R>) -> Self {
        WanderController {
            config,
            max_speed,
            devices,
            last_samples: Vec::new(),
            frames_received: 0,
        }
    }

    /// Starts the proximity ring and parks the wheels in velocity mode
    pub fn setup(&mut self) {
        for (sensor, name) in self.devices.proximity.iter_mut().zip(devices::PROXIMITY_SENSORS) {
            sensor.enable(self.config.time_step_ms);
            debug!("{} sampling every {} ms", name, self.config.time_step_ms);
        }
        for motor in &mut self.devices.motors {
            motor.set_position(f64::INFINITY);
            motor.set_velocity(0.0);
        }
    }

    /// Takes at most one frame off the receiver and decodes it
    pub fn receive(&mut self) -> Option<&[AccelerometerSample]> {
        if self.devices.receiver.queue_length() == 0 {
            return None;
        }
        let decoded = self.devices.receiver.data().map(|payload| decode_frame(&payload));
        self.devices.receiver.next_packet();

        match decoded? {
            Ok(samples) => {
                self.frames_received += 1;
                if let Some(first) = samples.first() {
                    info!(
                        "received {} samples, first attenuated acceleration x={} y={} z={}",
                        samples.len(),
                        first.x,
                        first.y,
                        first.z
                    );
                }
                self.last_samples = samples;
                Some(self.last_samples.as_slice())
            }
            Err(e) => {
                warn!("discarding frame: {}", e);
                None
            }
        }
    }

    /// Current proximity readings
    pub fn proximity(&mut self) -> [f64; 8] {
        let period = self.config.time_step_ms;
        let mut readings = [0.0; 8];
        for (reading, sensor) in readings.iter_mut().zip(self.devices.proximity.iter_mut()) {
            *reading = read_distance(sensor, period);
        }
        readings
    }

    /// Runs one tick: drain the inbox, look around, drive
    pub fn tick(&mut self) -> MotionCommand {
        self.receive();
        let readings = self.proximity();
        let command = avoid_obstacles(
            &readings,
            self.config.obstacle_threshold,
            self.config.cruise_fraction * self.max_speed,
        );
        self.devices.motors[Side::Left as usize].set_velocity(command.left);
        self.devices.motors[Side::Right as usize].set_velocity(command.right);
        command
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

    /// Samples from the most recent good frame
    pub fn last_samples(&self) -> &[AccelerometerSample] {
        &self.last_samples
    }

    /// Good frames received so far
    pub fn frames_received(&self) -> u64 {
        self.frames_received
    }
}
