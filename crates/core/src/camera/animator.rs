use gpuviz_protocol::{Pose, Vec3};
use serde::Serialize;

use super::CameraRig;
use super::ease::ease_in_out_cubic;
use crate::view::ViewRegistry;

/// Default wall-clock length of a view transition, seconds.
pub const DEFAULT_TRANSITION_SECS: f64 = 1.5;

/// Animator state. `Transitioning` always starts from the pose the camera
/// had when the transition was requested, never from a stored destination.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum TransitionState {
    Idle,
    Transitioning {
        /// Host clock, seconds.
        start_time: f64,
        start: Pose,
        end: Pose,
    },
}

/// Eases the camera between named views.
///
/// Time is supplied by the caller (seconds on any monotonic clock), once per
/// rendered frame via [`CameraAnimator::update`]. A transition finishes in
/// bounded time regardless of frame rate because progress is clamped to 1.
#[derive(Debug, Clone)]
pub struct CameraAnimator {
    views: ViewRegistry,
    duration: f64,
    current_view: Option<String>,
    state: TransitionState,
}

impl CameraAnimator {
    pub fn new(views: ViewRegistry, duration_secs: f64) -> Self {
        Self {
            views,
            duration: duration_secs,
            current_view: None,
            state: TransitionState::Idle,
        }
    }

    pub fn views(&self) -> &ViewRegistry {
        &self.views
    }

    pub fn duration(&self) -> f64 {
        self.duration
    }

    /// Key of the most recently selected (or mounted) view.
    pub fn current_view(&self) -> Option<&str> {
        self.current_view.as_deref()
    }

    pub fn state(&self) -> TransitionState {
        self.state
    }

    pub fn is_transitioning(&self) -> bool {
        matches!(self.state, TransitionState::Transitioning { .. })
    }

    /// Place the camera at `view` instantly. Used on first display so the
    /// first frame is never animated. Unknown keys are ignored.
    pub fn mount(&mut self, camera: &mut impl CameraRig, view: &str) {
        let Some(target) = self.views.get(view) else {
            tracing::debug!(view, "mount ignored: view not registered");
            return;
        };
        camera.set_pose(target.pose());
        self.current_view = Some(view.to_string());
        self.state = TransitionState::Idle;
    }

    /// Start easing from the camera's current pose toward `view`.
    ///
    /// Any transition in progress is replaced; re-selecting the current view
    /// restarts from wherever the camera is now. Unknown keys are ignored.
    pub fn select_view(&mut self, camera: &impl CameraRig, view: &str, now: f64) {
        let Some(target) = self.views.get(view) else {
            tracing::debug!(view, "transition ignored: view not registered");
            return;
        };
        let start = Pose::new(camera.position(), camera.forward_point());
        let end = target.pose();
        tracing::debug!(
            view,
            from = ?start.position,
            to = ?end.position,
            duration = self.duration,
            "camera transition started"
        );
        self.current_view = Some(view.to_string());
        self.state = TransitionState::Transitioning {
            start_time: now,
            start,
            end,
        };
    }

    /// Advance the active transition to time `now`.
    ///
    /// Returns `true` when the camera was moved. Once progress reaches 1 the
    /// animator goes idle and further calls do nothing.
    pub fn update(&mut self, camera: &mut impl CameraRig, now: f64) -> bool {
        let TransitionState::Transitioning {
            start_time,
            start,
            end,
        } = self.state
        else {
            return false;
        };

        let progress = self.progress_at(start_time, now);
        let t = ease_in_out_cubic(progress);
        camera.set_position(Vec3::lerp(start.position, end.position, t));
        camera.look_at(Vec3::lerp(start.target, end.target, t));

        if progress >= 1.0 {
            self.state = TransitionState::Idle;
            tracing::debug!(view = self.current_view.as_deref(), "camera transition finished");
        }
        true
    }

    fn progress_at(&self, start_time: f64, now: f64) -> f64 {
        if self.duration <= 0.0 {
            return 1.0;
        }
        ((now - start_time) / self.duration).clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::PerspectiveCamera;

    /// Rig that counts mutations.
    #[derive(Default)]
    struct RecordingRig {
        inner: PerspectiveCamera,
        writes: usize,
    }

    impl CameraRig for RecordingRig {
        fn position(&self) -> Vec3 {
            self.inner.position()
        }

        fn direction(&self) -> Vec3 {
            self.inner.direction()
        }

        fn set_position(&mut self, position: Vec3) {
            self.writes += 1;
            self.inner.set_position(position);
        }

        fn look_at(&mut self, target: Vec3) {
            self.writes += 1;
            self.inner.look_at(target);
        }
    }

    fn animator() -> CameraAnimator {
        CameraAnimator::new(ViewRegistry::visualize_defaults(), DEFAULT_TRANSITION_SECS)
    }

    #[test]
    fn mount_sets_pose_without_animating() {
        let mut anim = animator();
        let mut camera = PerspectiveCamera::new(Vec3::new(50.0, 50.0, 50.0));
        anim.mount(&mut camera, "server");
        assert_eq!(camera.position(), Vec3::new(5.0, 2.0, 5.0));
        assert_eq!(camera.target(), Vec3::ZERO);
        assert!(!anim.is_transitioning());
        assert_eq!(anim.current_view(), Some("server"));
    }

    #[test]
    fn halfway_is_midpoint_of_positions() {
        let mut anim = animator();
        let mut camera = PerspectiveCamera::default();
        anim.mount(&mut camera, "overview");
        anim.select_view(&camera, "warehouse", 10.0);
        assert!(anim.update(&mut camera, 10.75));
        // ease(0.5) == 0.5
        assert!(camera.position().distance(Vec3::new(5.0, 3.5, 7.5)) < 1e-9);
        assert!(anim.is_transitioning());
    }

    #[test]
    fn completes_at_target_and_goes_idle() {
        let mut anim = animator();
        let mut camera = PerspectiveCamera::default();
        anim.mount(&mut camera, "overview");
        anim.select_view(&camera, "warehouse", 0.0);
        anim.update(&mut camera, 0.4);
        anim.update(&mut camera, 2.0);
        assert!(camera.position().distance(Vec3::new(10.0, 5.0, 10.0)) < 1e-9);
        assert!(camera.target().distance(Vec3::ZERO) < 1e-9);
        assert_eq!(anim.state(), TransitionState::Idle);
    }

    #[test]
    fn update_after_completion_is_inert() {
        let mut anim = animator();
        let mut rig = RecordingRig::default();
        anim.mount(&mut rig, "overview");
        anim.select_view(&rig, "server", 0.0);
        assert!(anim.update(&mut rig, 5.0));
        let writes = rig.writes;
        let parked = rig.position();

        assert!(!anim.update(&mut rig, 6.0));
        assert!(!anim.update(&mut rig, 100.0));
        assert_eq!(rig.writes, writes);
        assert_eq!(rig.position(), parked);
        assert!(!anim.is_transitioning());
    }

    #[test]
    fn unknown_view_is_ignored() {
        let mut anim = animator();
        let mut rig = RecordingRig::default();
        anim.mount(&mut rig, "overview");
        let writes = rig.writes;

        anim.select_view(&rig, "moon-base", 0.0);
        anim.mount(&mut rig, "moon-base");
        assert!(!anim.is_transitioning());
        assert!(!anim.update(&mut rig, 1.0));
        assert_eq!(rig.writes, writes);
        assert_eq!(anim.current_view(), Some("overview"));
    }

    #[test]
    fn retarget_mid_transition_starts_from_interpolated_pose() {
        let mut anim = animator();
        let mut camera = PerspectiveCamera::default();
        anim.mount(&mut camera, "overview");
        anim.select_view(&camera, "warehouse", 0.0);
        anim.update(&mut camera, 0.75);
        let mid = camera.position();
        assert!(mid.distance(Vec3::new(0.0, 2.0, 5.0)) > 1.0);

        anim.select_view(&camera, "server", 0.75);
        let TransitionState::Transitioning { start, .. } = anim.state() else {
            panic!("expected an active transition");
        };
        assert_eq!(start.position, mid);

        // First frame of the new transition does not jump.
        anim.update(&mut camera, 0.75);
        assert!(camera.position().distance(mid) < 1e-9);
    }

    #[test]
    fn reselecting_current_view_restarts_from_current_pose() {
        let mut anim = animator();
        let mut camera = PerspectiveCamera::default();
        anim.mount(&mut camera, "overview");
        anim.select_view(&camera, "overview", 3.0);
        assert!(anim.is_transitioning());
        anim.update(&mut camera, 3.5);
        assert!(camera.position().distance(Vec3::new(0.0, 2.0, 5.0)) < 1e-9);
    }

    #[test]
    fn zero_duration_snaps_on_first_frame() {
        let mut anim = CameraAnimator::new(ViewRegistry::visualize_defaults(), 0.0);
        let mut camera = PerspectiveCamera::default();
        anim.select_view(&camera, "warehouse", 1.0);
        assert!(anim.update(&mut camera, 1.0));
        assert!(camera.position().distance(Vec3::new(10.0, 5.0, 10.0)) < 1e-9);
        assert!(!anim.is_transitioning());
    }

    #[test]
    fn clock_going_backwards_clamps_to_start() {
        let mut anim = animator();
        let mut camera = PerspectiveCamera::default();
        anim.mount(&mut camera, "overview");
        anim.select_view(&camera, "warehouse", 5.0);
        anim.update(&mut camera, 4.0);
        assert!(camera.position().distance(Vec3::new(0.0, 2.0, 5.0)) < 1e-9);
        assert!(anim.is_transitioning());
    }
}
