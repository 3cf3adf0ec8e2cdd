//! Camera pose ownership and animation.
//!
//! The rendering host owns exactly one camera. Everything in this module
//! talks to it through [`CameraRig`], so the animator never holds a shared
//! reference and tests can substitute a recording rig.

pub mod animator;
pub mod ease;
pub mod orbit;

pub use animator::{CameraAnimator, TransitionState};
pub use ease::ease_in_out_cubic;
pub use orbit::OrbitControls;

use gpuviz_protocol::{Pose, Vec3};
use serde::{Deserialize, Serialize};

/// How far along the view direction the "current look-at point" is taken.
pub const FORWARD_PROJECTION_DISTANCE: f64 = 100.0;

/// A mutable camera with a position and an orientation.
pub trait CameraRig {
    fn position(&self) -> Vec3;

    /// Unit view direction.
    fn direction(&self) -> Vec3;

    fn set_position(&mut self, position: Vec3);

    /// Orient the camera toward `target`. Looking at the camera's own
    /// position leaves the orientation unchanged.
    fn look_at(&mut self, target: Vec3);

    /// Point straight ahead of the camera, [`FORWARD_PROJECTION_DISTANCE`]
    /// units out. Used as the start target of a transition because the
    /// camera itself does not remember what it was last pointed at.
    fn forward_point(&self) -> Vec3 {
        self.position() + self.direction() * FORWARD_PROJECTION_DISTANCE
    }

    fn set_pose(&mut self, pose: Pose) {
        self.set_position(pose.position);
        self.look_at(pose.target);
    }
}

/// Perspective camera as used by the scene renderers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PerspectiveCamera {
    position: Vec3,
    direction: Vec3,
    /// Last explicit look-at target. Orbit controls pivot around it.
    target: Vec3,
    pub up: Vec3,
    /// Vertical field of view, degrees.
    pub fov_deg: f64,
    pub near: f64,
    pub far: f64,
}

impl PerspectiveCamera {
    pub const DEFAULT_FOV_DEG: f64 = 50.0;

    pub fn new(position: Vec3) -> Self {
        Self {
            position,
            direction: Vec3::NEG_Z,
            target: position + Vec3::NEG_Z,
            up: Vec3::Y,
            fov_deg: Self::DEFAULT_FOV_DEG,
            near: 0.1,
            far: 2000.0,
        }
    }

    pub fn target(&self) -> Vec3 {
        self.target
    }

    pub fn pose(&self) -> Pose {
        Pose::new(self.position, self.target)
    }

    /// Camera basis `(right, up, forward)`.
    pub fn basis(&self) -> (Vec3, Vec3, Vec3) {
        let forward = self.direction;
        let right = forward
            .cross(self.up)
            .try_normalize()
            .unwrap_or(Vec3::new(1.0, 0.0, 0.0));
        let up = right.cross(forward);
        (right, up, forward)
    }
}

impl Default for PerspectiveCamera {
    fn default() -> Self {
        Self::new(Vec3::new(0.0, 2.0, 5.0))
    }
}

impl CameraRig for PerspectiveCamera {
    fn position(&self) -> Vec3 {
        self.position
    }

    fn direction(&self) -> Vec3 {
        self.direction
    }

    fn set_position(&mut self, position: Vec3) {
        self.position = position;
    }

    fn look_at(&mut self, target: Vec3) {
        if let Some(direction) = (target - self.position).try_normalize() {
            self.direction = direction;
            self.target = target;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forward_point_projects_along_view_direction() {
        let mut camera = PerspectiveCamera::new(Vec3::new(0.0, 0.0, 5.0));
        camera.look_at(Vec3::ZERO);
        let p = camera.forward_point();
        assert!(p.distance(Vec3::new(0.0, 0.0, -95.0)) < 1e-9);
    }

    #[test]
    fn look_at_own_position_keeps_orientation() {
        let mut camera = PerspectiveCamera::new(Vec3::new(1.0, 1.0, 1.0));
        camera.look_at(Vec3::ZERO);
        let before = camera.direction();
        camera.look_at(Vec3::new(1.0, 1.0, 1.0));
        assert_eq!(camera.direction(), before);
    }

    #[test]
    fn basis_is_orthonormal() {
        let mut camera = PerspectiveCamera::new(Vec3::new(10.0, 5.0, 10.0));
        camera.look_at(Vec3::ZERO);
        let (right, up, forward) = camera.basis();
        assert!(right.dot(up).abs() < 1e-9);
        assert!(right.dot(forward).abs() < 1e-9);
        assert!((up.length() - 1.0).abs() < 1e-9);
        assert!(up.y > 0.0);
    }
}
