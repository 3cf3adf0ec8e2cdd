use std::f64::consts::PI;

use gpuviz_protocol::Vec3;
use serde::{Deserialize, Serialize};

use super::{CameraRig, PerspectiveCamera};

/// Drag-to-orbit and scroll-to-zoom around the camera's look-at target.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OrbitControls {
    /// Polar angle limits, radians from +Y.
    pub min_polar: f64,
    pub max_polar: f64,
    pub min_distance: f64,
    pub max_distance: f64,
}

impl Default for OrbitControls {
    fn default() -> Self {
        Self {
            min_polar: PI / 4.0,
            max_polar: PI / 1.5,
            min_distance: 1.0,
            max_distance: 60.0,
        }
    }
}

impl OrbitControls {
    /// Rotate around the target by the given azimuth/polar deltas (radians).
    pub fn rotate(&self, camera: &mut PerspectiveCamera, d_azimuth: f64, d_polar: f64) {
        let pivot = camera.target();
        let offset = camera.position() - pivot;
        let radius = offset.length();
        if radius <= f64::EPSILON {
            return;
        }
        let polar = (offset.y / radius).clamp(-1.0, 1.0).acos();
        let azimuth = offset.x.atan2(offset.z);

        let polar = (polar + d_polar).clamp(self.min_polar, self.max_polar);
        let azimuth = azimuth + d_azimuth;
        camera.set_position(pivot + spherical(radius, polar, azimuth));
        camera.look_at(pivot);
    }

    /// Scale the distance to the target by `factor` (< 1 zooms in).
    pub fn dolly(&self, camera: &mut PerspectiveCamera, factor: f64) {
        let pivot = camera.target();
        let offset = camera.position() - pivot;
        let Some(direction) = offset.try_normalize() else {
            return;
        };
        let radius = (offset.length() * factor).clamp(self.min_distance, self.max_distance);
        camera.set_position(pivot + direction * radius);
        camera.look_at(pivot);
    }
}

fn spherical(radius: f64, polar: f64, azimuth: f64) -> Vec3 {
    Vec3::new(
        radius * polar.sin() * azimuth.sin(),
        radius * polar.cos(),
        radius * polar.sin() * azimuth.cos(),
    )
}
