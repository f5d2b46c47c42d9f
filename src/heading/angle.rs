// src/heading/angle.rs
// Angle wrapping shared by the heading controller and the IMU adapter.

use std::f64::consts::{PI, TAU};

/// Wraps `angle` into (-π, π].
///
/// Uses a Euclidean remainder, so negative inputs wrap the same way as
/// positive ones instead of being truncated toward zero.
pub fn normalize_angle(angle: f64) -> f64 {
    let wrapped = PI - (PI - angle).rem_euclid(TAU);
    // rem_euclid may round up to TAU for inputs just past a multiple of 2π
    if wrapped <= -PI { wrapped + TAU } else { wrapped }
}

/// Signed heading error from `yaw` to `goal`, in (-π, π].
/// Positive means the goal lies to the left (counter-clockwise).
pub fn heading_error(goal: f64, yaw: f64) -> f64 {
    normalize_angle(goal - yaw)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    const EPS: f64 = 1e-12;

    #[rstest]
    #[case(0.0, 0.0)]
    #[case(PI, PI)]
    #[case(-PI, PI)]
    #[case(1.5 * PI, -0.5 * PI)]
    #[case(-1.5 * PI, 0.5 * PI)]
    #[case(TAU + 0.25, 0.25)]
    #[case(-TAU - 0.25, -0.25)]
    fn wraps_into_half_open_range(#[case] input: f64, #[case] expected: f64) {
        let out = normalize_angle(input);
        assert!((out - expected).abs() < EPS, "{} -> {}, want {}", input, out, expected);
    }

    #[test]
    fn error_stays_in_range_over_a_sweep() {
        let steps = 400;
        for i in 0..=steps {
            for j in 0..=steps / 20 {
                let goal = -10.0 * PI + 20.0 * PI * i as f64 / steps as f64;
                let yaw = -4.0 * PI + 8.0 * PI * j as f64 / (steps / 20) as f64;
                let err = heading_error(goal, yaw);
                assert!(err > -PI && err <= PI, "goal={} yaw={} err={}", goal, yaw, err);
            }
        }
    }

    #[test]
    fn error_sign_points_toward_goal() {
        assert!(heading_error(0.5, 0.0) > 0.0);
        assert!(heading_error(-0.5, 0.0) < 0.0);
        // shortest way round crosses the ±π seam
        assert!(heading_error(-3.0, 3.0) > 0.0);
    }
}
