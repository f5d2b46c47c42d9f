// src/supervisor/attenuation.rs
// Distance-based damping of the vibration signal around a fixed source.

use super::dataset::AccelerometerSample;
use log::warn;
use nalgebra::Point2;

/// Damping factor for a point `distance` metres from the source:
/// 1 / (1 + d). Equals 1 at the source and falls toward 0 with distance.
/// A NaN distance gives NaN.
pub fn attenuation(distance: f64) -> f64 {
    let distance = if distance < 0.0 { 0.0 } else { distance };
    1.0 / (1.0 + distance)
}

/// Fixed vibration source on the ground plane
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AttenuationModel {
    source: Point2<f64>,
}

impl AttenuationModel {
    /// Source at `(x, y)`
    pub fn new(source: [f64; 2]) -> Self {
        AttenuationModel {
            source: Point2::new(source[0], source[1]),
        }
    }

    /// Source location
    pub fn source(&self) -> Point2<f64> {
        self.source
    }

    /// Planar distance from the cell containing `position` (x and y floored,
    /// z ignored) to the source
    pub fn distance_from(&self, position: [f64; 3]) -> f64 {
        let cell = Point2::new(position[0].floor(), position[1].floor());
        nalgebra::distance(&cell, &self.source)
    }

    /// Attenuation factor at `position`. NaN when the position is unknown.
    pub fn factor_at(&self, position: [f64; 3]) -> f64 {
        let distance = self.distance_from(position);
        if distance.is_nan() {
            warn!("robot position {:?} is not a number, sample will be NaN", position);
        }
        attenuation(distance)
    }

    /// `sample` as felt at `position`
    pub fn attenuate(&self, sample: &AccelerometerSample, position: [f64; 3]) -> AccelerometerSample {
        sample * self.factor_at(position)
    }
}

impl Default for AttenuationModel {
    fn default() -> Self {
        AttenuationModel::new([5.0, 5.0])
    }
}
