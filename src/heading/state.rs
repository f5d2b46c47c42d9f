// src/heading/state.rs
// Low-level heading state machine. A pure transition function, kept apart
// from any motor or sensor I/O so it can be driven tick by tick in tests.

use super::HeadingConfig;
use serde::{Deserialize, Serialize};

/// Low-level motion state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum HeadingState {
    /// Heading held long enough; wheels stopped for one tick
    Stop,
    /// Driving forward on heading
    #[default]
    Straight,
    /// Rotating counter-clockwise in place
    TurningLeft,
    /// Rotating clockwise in place
    TurningRight,
}

/// Wheel velocities in rad/s
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MotionCommand {
    /// Left wheel velocity
    pub left: f64,
    /// Right wheel velocity
    pub right: f64,
}

impl MotionCommand {
    /// Both wheels stopped
    pub const STOP: MotionCommand = MotionCommand { left: 0.0, right: 0.0 };

    /// The motion primitive for `state` at a fixed `speed`.
    ///
    /// There is no ramping: every state change jumps straight to the new
    /// wheel speeds (bang-bang control), so motion is not smooth.
    pub fn for_state(state: HeadingState, speed: f64) -> Self {
        match state {
            HeadingState::Straight => MotionCommand { left: speed, right: speed },
            HeadingState::TurningLeft => MotionCommand { left: -speed, right: speed },
            HeadingState::TurningRight => MotionCommand { left: speed, right: -speed },
            HeadingState::Stop => MotionCommand::STOP,
        }
    }
}

/// Outcome of one tick of the state machine
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transition {
    /// State after this tick
    pub state: HeadingState,
    /// Ticks spent on heading so far
    pub settle_counter: u32,
    /// Wheel command for the new state
    pub command: MotionCommand,
    /// True on the tick that leaves `Stop`; the caller's task is done
    pub completed: bool,
}

/// Advances the heading state machine by one tick.
///
/// `error` is the normalized heading error (goal minus yaw), positive when
/// the goal is to the left.
pub fn transition(
    state: HeadingState,
    error: f64,
    settle_counter: u32,
    config: &HeadingConfig,
) -> Transition {
    let tolerance = config.tolerance;
    let mut counter = settle_counter;
    let mut completed = false;

    let next = match state {
        HeadingState::Stop => {
            completed = true;
            HeadingState::Straight
        }
        HeadingState::Straight => {
            if counter > config.settle_ticks {
                counter = 0;
                HeadingState::Stop
            } else if error.abs() < tolerance {
                counter += 1;
                HeadingState::Straight
            } else if error < 0.0 {
                HeadingState::TurningRight
            } else {
                HeadingState::TurningLeft
            }
        }
        HeadingState::TurningLeft => {
            if error <= 0.0 && error > -tolerance {
                counter = 0;
                HeadingState::Straight
            } else if error < 0.0 {
                HeadingState::TurningRight
            } else {
                HeadingState::TurningLeft
            }
        }
        HeadingState::TurningRight => {
            if error >= 0.0 && error < tolerance {
                counter = 0;
                HeadingState::Straight
            } else if error > 0.0 {
                HeadingState::TurningLeft
            } else {
                HeadingState::TurningRight
            }
        }
    };

    Transition {
        state: next,
        settle_counter: counter,
        command: MotionCommand::for_state(next, config.drive_speed),
        completed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};
    use std::f64::consts::PI;

    #[fixture]
    fn config() -> HeadingConfig {
        HeadingConfig::default()
    }

    #[rstest]
    #[case(HeadingState::Straight, 1.0, 1.0)]
    #[case(HeadingState::TurningLeft, -1.0, 1.0)]
    #[case(HeadingState::TurningRight, 1.0, -1.0)]
    #[case(HeadingState::Stop, 0.0, 0.0)]
    fn primitives_follow_state(#[case] state: HeadingState, #[case] left: f64, #[case] right: f64) {
        let cmd = MotionCommand::for_state(state, 1.0);
        assert_eq!(cmd, MotionCommand { left, right });
    }

    #[rstest]
    fn straight_within_tolerance_counts_up(config: HeadingConfig) {
        let t = transition(HeadingState::Straight, 0.01, 5, &config);
        assert_eq!(t.state, HeadingState::Straight);
        assert_eq!(t.settle_counter, 6);
        assert!(!t.completed);
    }

    #[rstest]
    #[case(-0.5, HeadingState::TurningRight)]
    #[case(0.5, HeadingState::TurningLeft)]
    fn straight_off_heading_turns_toward_error(
        config: HeadingConfig,
        #[case] error: f64,
        #[case] expected: HeadingState,
    ) {
        let t = transition(HeadingState::Straight, error, 3, &config);
        assert_eq!(t.state, expected);
        // counter is kept while correcting
        assert_eq!(t.settle_counter, 3);
    }

    #[rstest]
    #[case(-1.0, HeadingState::TurningRight)]
    #[case(1.0, HeadingState::TurningLeft)]
    fn straight_at_exact_tolerance_turns(
        config: HeadingConfig,
        #[case] sign: f64,
        #[case] expected: HeadingState,
    ) {
        let t = transition(HeadingState::Straight, sign * config.tolerance, 7, &config);
        assert_eq!(t.state, expected);
        assert_eq!(t.settle_counter, 7);
    }

    #[rstest]
    #[case(HeadingState::TurningLeft, -1.0, HeadingState::TurningRight)]
    #[case(HeadingState::TurningRight, 1.0, HeadingState::TurningLeft)]
    fn turning_at_exact_tolerance_reverses(
        config: HeadingConfig,
        #[case] state: HeadingState,
        #[case] sign: f64,
        #[case] expected: HeadingState,
    ) {
        let t = transition(state, sign * config.tolerance, 9, &config);
        assert_eq!(t.state, expected);
        assert_eq!(t.settle_counter, 9);
    }

    #[rstest]
    fn straight_past_threshold_stops_and_resets(config: HeadingConfig) {
        let t = transition(HeadingState::Straight, 0.0, config.settle_ticks + 1, &config);
        assert_eq!(t.state, HeadingState::Stop);
        assert_eq!(t.settle_counter, 0);
        assert_eq!(t.command, MotionCommand::STOP);
    }

    #[rstest]
    fn stop_completes_and_resumes_straight(config: HeadingConfig) {
        let t = transition(HeadingState::Stop, 2.0, 0, &config);
        assert!(t.completed);
        assert_eq!(t.state, HeadingState::Straight);
    }

    #[rstest]
    #[case(0.0)]
    #[case(-0.01)]
    #[case(-PI / 20.0 + 1e-9)]
    fn turning_left_settles_once_error_crosses_zero(config: HeadingConfig, #[case] error: f64) {
        let t = transition(HeadingState::TurningLeft, error, 40, &config);
        assert_eq!(t.state, HeadingState::Straight);
        assert_eq!(t.settle_counter, 0);
    }

    #[rstest]
    fn turning_left_overshoot_switches_right(config: HeadingConfig) {
        let t = transition(HeadingState::TurningLeft, -0.5, 0, &config);
        assert_eq!(t.state, HeadingState::TurningRight);
    }

    #[rstest]
    fn turning_left_keeps_turning_while_goal_is_left(config: HeadingConfig) {
        let t = transition(HeadingState::TurningLeft, 0.5, 0, &config);
        assert_eq!(t.state, HeadingState::TurningLeft);
    }

    #[rstest]
    #[case(0.0)]
    #[case(0.01)]
    #[case(PI / 20.0 - 1e-9)]
    fn turning_right_settles_once_error_crosses_zero(config: HeadingConfig, #[case] error: f64) {
        let t = transition(HeadingState::TurningRight, error, 12, &config);
        assert_eq!(t.state, HeadingState::Straight);
        assert_eq!(t.settle_counter, 0);
    }

    #[rstest]
    fn turning_right_overshoot_switches_left(config: HeadingConfig) {
        let t = transition(HeadingState::TurningRight, 0.5, 0, &config);
        assert_eq!(t.state, HeadingState::TurningLeft);
    }

    #[rstest]
    fn turning_right_keeps_turning_while_goal_is_right(config: HeadingConfig) {
        let t = transition(HeadingState::TurningRight, -0.5, 0, &config);
        assert_eq!(t.state, HeadingState::TurningRight);
    }
}
