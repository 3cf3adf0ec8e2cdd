//! Integration test: drive the camera animator frame by frame across every
//! registered view, the way a host render loop does.

use gpuviz_core::camera::{CameraAnimator, CameraRig, PerspectiveCamera, TransitionState};
use gpuviz_core::config::AppConfig;
use gpuviz_core::scene::{self, SceneParams};
use gpuviz_core::thermal::ThermalSimulation;
use gpuviz_core::view::ViewRegistry;
use gpuviz_protocol::Vec3;

const FRAME: f64 = 1.0 / 60.0;

/// Run frames until the animator goes idle. Returns the frame count.
fn run_to_rest(anim: &mut CameraAnimator, camera: &mut PerspectiveCamera, clock: &mut f64) -> u32 {
    let mut frames = 0;
    while anim.is_transitioning() {
        *clock += FRAME;
        anim.update(camera, *clock);
        frames += 1;
        assert!(frames < 10_000, "transition never finished");
    }
    frames
}

#[test]
fn tour_every_default_view() {
    let views = ViewRegistry::visualize_defaults();
    let mut anim = CameraAnimator::new(views.clone(), 1.5);
    let mut camera = PerspectiveCamera::default();
    let mut clock = 0.0;

    anim.mount(&mut camera, "overview");
    for (key, view) in views.iter() {
        anim.select_view(&camera, key, clock);
        let frames = run_to_rest(&mut anim, &mut camera, &mut clock);
        // 1.5 s at 60 fps, give or take a frame of rounding.
        assert!((90..=91).contains(&frames), "{key}: {frames} frames");
        assert!(camera.position().distance(view.position) < 1e-9, "{key}");
        assert!(camera.target().distance(view.target) < 1e-6, "{key}");
        assert_eq!(anim.state(), TransitionState::Idle);
    }
}

#[test]
fn path_stays_between_endpoints() {
    let views = ViewRegistry::visualize_defaults();
    let mut anim = CameraAnimator::new(views, 1.5);
    let mut camera = PerspectiveCamera::default();
    anim.mount(&mut camera, "overview");

    let start = camera.position();
    let end = Vec3::new(10.0, 5.0, 10.0);
    let span = start.distance(end);
    anim.select_view(&camera, "warehouse", 0.0);

    let mut clock = 0.0;
    let mut last = 0.0;
    while anim.is_transitioning() {
        clock += FRAME;
        anim.update(&mut camera, clock);
        let travelled = start.distance(camera.position());
        assert!(travelled + 1e-9 >= last, "camera moved backwards");
        assert!(travelled <= span + 1e-9);
        last = travelled;
    }
}

#[test]
fn configured_views_drive_the_animator() {
    let config = AppConfig::from_json(include_str!("fixtures/showroom-config.json")).unwrap();
    assert_eq!(config.transition_duration_secs, 2.0);

    let views = config.view_registry();
    assert_eq!(views.keys().collect::<Vec<_>>(), ["front", "aisle", "roof"]);

    let mut anim = CameraAnimator::new(views, config.transition_duration_secs);
    let mut camera = PerspectiveCamera::default();
    anim.mount(&mut camera, &config.initial_view);
    assert_eq!(camera.position(), Vec3::new(0.0, 1.5, 6.0));

    // Built-in keys are not registered in this config.
    anim.select_view(&camera, "overview", 0.0);
    assert!(!anim.is_transitioning());

    anim.select_view(&camera, "aisle", 0.0);
    anim.update(&mut camera, 1.0);
    // Halfway in time is halfway in space for a symmetric ease.
    assert!(camera.position().distance(Vec3::new(-3.0, 1.75, 3.0)) < 1e-9);
    anim.update(&mut camera, 2.0);
    assert!(camera.position().distance(Vec3::new(-6.0, 2.0, 0.0)) < 1e-9);
}

#[test]
fn scene_follows_the_selected_view() {
    let params = SceneParams::default();
    let mut thermal = ThermalSimulation::new();
    let mut anim = CameraAnimator::new(ViewRegistry::visualize_defaults(), 1.5);
    let mut camera = PerspectiveCamera::default();
    anim.mount(&mut camera, "overview");

    let mut clock = 0.0;
    for key in ["server", "warehouse", "comparison", "idle"] {
        anim.select_view(&camera, key, clock);
        while anim.is_transitioning() {
            clock += FRAME;
            anim.update(&mut camera, clock);
            thermal.step(params.load, FRAME);
        }
        let Some(current) = anim.current_view() else {
            panic!("no current view after selecting {key}");
        };
        let commands = scene::compose(current, &params, &thermal);
        assert!(scene::is_balanced(&commands), "{key}");
    }
}
