//! Sensor accessors
//!
//! Every accessor enables its device on first use instead of failing: if the
//! device is not sampling yet, it is switched on at the requested period and
//! a known "not ready" value is returned for that tick. Real readings start
//! on the next tick.

use crate::heading::normalize_angle;
use crate::host::{DistanceSource, GpsSource, ImuSource, TouchSource};
use log::debug;
use std::f64::consts::PI;

/// Distance reported while a distance sensor warms up
pub const DISTANCE_NOT_READY: f64 = 9999.9;
/// Touch value reported while a touch sensor warms up
pub const TOUCH_NOT_READY: i32 = 0;
/// Position reported while the GPS warms up
pub const GPS_NOT_READY: [f64; 3] = [f64::NAN; 3];

/// Roll, pitch and yaw in radians
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Orientation {
    /// Rotation about the forward axis
    pub roll: f64,
    /// Rotation about the lateral axis
    pub pitch: f64,
    /// Heading, in (-π, π]
    pub yaw: f64,
}


/// Reads a distance sensor, enabling it on first use
pub fn read_distance<D: DistanceSource + ?Sized>(sensor: &mut D, period_ms: u32) -> f64 {
    if sensor.sampling_period() == 0 {
        debug!("enabling distance sensor at {} ms", period_ms);
        sensor.enable(period_ms);
        return DISTANCE_NOT_READY;
    }
    sensor.value()
}

/// Reads a touch sensor, enabling it on first use
pub fn read_touch<T: TouchSource + ?Sized>(sensor: &mut T, period_ms: u32) -> i32 {
    if sensor.sampling_period() == 0 {
        debug!("enabling touch sensor at {} ms", period_ms);
        sensor.enable(period_ms);
        return TOUCH_NOT_READY;
    }
    sensor.value()
}

/// Reads the GPS position, enabling it on first use
pub fn read_gps<G: GpsSource + ?Sized>(gps: &mut G, period_ms: u32) -> [f64; 3] {
    if gps.sampling_period() == 0 {
        debug!("enabling gps at {} ms", period_ms);
        gps.enable(period_ms);
        return GPS_NOT_READY;
    }
    gps.values()
}

/// Reads the IMU, enabling it on first use.
///
/// Returns `None` on the warm-up read: a zero yaw is a valid heading, so
/// there is no value that could stand in for "not ready".
///
/// The E-puck's inertial unit is mounted facing backwards, so the raw yaw
/// is turned by π before wrapping.
pub fn read_orientation<I: ImuSource + ?Sized>(imu: &mut I, period_ms: u32) -> Option<Orientation> {
    if imu.sampling_period() == 0 {
        debug!("enabling imu at {} ms", period_ms);
        imu.enable(period_ms);
        return None;
    }
    let [roll, pitch, yaw] = imu.roll_pitch_yaw();
    Some(Orientation {
        roll,
        pitch,
        yaw: normalize_angle(PI + yaw),
    })
}

/// Whether `value` is the warm-up distance rather than a reading
pub fn is_distance_ready(value: f64) -> bool {
    value != DISTANCE_NOT_READY
}
