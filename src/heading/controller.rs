// src/heading/controller.rs
// Holds the heading goal and low-level state between ticks and turns the
// state machine's output into wheel commands.

use super::angle::{heading_error, normalize_angle};
use super::state::{transition, HeadingState, MotionCommand, Transition};
use super::HeadingConfig;
use crate::host::Actuator;
use log::{debug, info};

/// Heading-hold controller context.
///
/// Owns everything the control tick mutates: the goal angle, the
/// low-level state and the settle counter.
#[derive(Debug, Clone)]
pub struct HeadingController {
    config: HeadingConfig,
    goal: f64,
    state: HeadingState,
    settle_counter: u32,
    command: MotionCommand,
}

impl HeadingController {
    /// Starts driving straight toward heading 0
    pub fn new(config: HeadingConfig) -> Self {
        HeadingController {
            config,
            goal: 0.0,
            state: HeadingState::Straight,
            settle_counter: 0,
            command: MotionCommand::for_state(HeadingState::Straight, config.drive_speed),
        }
    }

    /// Steers by `steering` radians relative to the current `yaw`
    pub fn set_angle(&mut self, steering: f64, yaw: f64) {
        self.set_goal(steering + yaw);
    }

    /// Sets an absolute goal heading
    pub fn set_goal(&mut self, angle: f64) {
        self.goal = normalize_angle(angle);
        info!("heading goal set to {:.3} rad", self.goal);
    }

    /// Current goal heading, in (-π, π]
    pub fn goal(&self) -> f64 {
        self.goal
    }

    /// Current low-level state
    pub fn state(&self) -> HeadingState {
        self.state
    }

    /// Ticks spent on heading since the last turn or stop
    pub fn settle_counter(&self) -> u32 {
        self.settle_counter
    }

    /// Wheel command produced by the last update
    pub fn command(&self) -> MotionCommand {
        self.command
    }

    /// Controller parameters
    pub fn config(&self) -> &HeadingConfig {
        &self.config
    }

    /// Runs one control tick against the measured `yaw`
    pub fn update(&mut self, yaw: f64) -> Transition {
        let error = heading_error(self.goal, yaw);
        let t = transition(self.state, error, self.settle_counter, &self.config);

        if t.state != self.state {
            debug!(
                "heading {:?} -> {:?} (error {:.3} rad, settle {})",
                self.state, t.state, error, self.settle_counter
            );
        }
        if t.completed {
            info!("heading {:.3} rad reached", self.goal);
        }

        self.state = t.state;
        self.settle_counter = t.settle_counter;
        self.command = t.command;
        t
    }

    /// Writes the current command to the drive motors
    pub fn perform<L, R>(&self, left: &mut L, right: &mut R)
    where
        L: Actuator + ?Sized,
        R: Actuator + ?Sized,
    {
        left.set_velocity(self.command.left);
        right.set_velocity(self.command.right);
    }
}

impl Default for HeadingController {
    fn default() -> Self {
        Self::new(HeadingConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    #[derive(Default)]
    struct Wheel {
        velocity: f64,
    }

    impl Actuator for Wheel {
        fn set_position(&mut self, _position: f64) {}
        fn set_velocity(&mut self, velocity: f64) {
            self.velocity = velocity;
        }
    }

    #[test]
    fn relative_steering_is_normalized() {
        let mut controller = HeadingController::default();
        controller.set_angle(PI / 2.0, 3.0 * PI / 4.0);
        assert!((controller.goal() - (-3.0 * PI / 4.0)).abs() < 1e-12);
    }

    #[test]
    fn perform_writes_current_command() {
        let mut controller = HeadingController::default();
        controller.set_goal(1.0);
        controller.update(0.0);
        let (mut left, mut right) = (Wheel::default(), Wheel::default());
        controller.perform(&mut left, &mut right);
        let speed = controller.config().drive_speed;
        assert_eq!(left.velocity, -speed);
        assert_eq!(right.velocity, speed);
    }

    #[test]
    fn full_cycle_turn_settle_stop_resume() {
        let mut controller = HeadingController::default();
        controller.set_goal(0.5);

        // goal is to the left: rotate
        assert_eq!(controller.update(0.0).state, HeadingState::TurningLeft);
        // yaw has swung just past the goal
        assert_eq!(controller.update(0.51).state, HeadingState::Straight);

        let settle = controller.config().settle_ticks;
        for _ in 0..=settle {
            let t = controller.update(0.5);
            assert_eq!(t.state, HeadingState::Straight);
        }
        assert_eq!(controller.settle_counter(), settle + 1);

        let stop = controller.update(0.5);
        assert_eq!(stop.state, HeadingState::Stop);
        assert_eq!(controller.settle_counter(), 0);
        assert_eq!(controller.command(), MotionCommand::STOP);

        let resume = controller.update(0.5);
        assert!(resume.completed);
        assert_eq!(controller.state(), HeadingState::Straight);
    }
}
