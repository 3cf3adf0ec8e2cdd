//! JS host bridge.
//!
//! The JS side owns the WebGL scene and the animation frame loop. It keeps
//! integer handles to animator sessions held here and calls [`tick`] and
//! [`render_scene`] once per frame with its own clock. Structured results
//! cross the boundary as JSON strings.

use std::sync::{Mutex, MutexGuard};

use gpuviz_core::camera::{CameraAnimator, CameraRig, PerspectiveCamera};
use gpuviz_core::config::{AppConfig, ConfigError};
use gpuviz_core::hardware::{GpuModel, UnknownModel};
use gpuviz_core::metrics::{self, RackMetrics};
use gpuviz_core::placement::{PlacementGrid, PlacementKind};
use gpuviz_core::scene::{self, SceneParams};
use gpuviz_core::thermal::{self, ThermalSimulation};
use gpuviz_core::view::ViewRegistry;
use gpuviz_protocol::Vec3;
use serde::Serialize;
use thiserror::Error;
use wasm_bindgen::prelude::*;

/// One mounted visualization: a camera, its animator and the per-frame
/// simulation state.
struct Session {
    camera: PerspectiveCamera,
    animator: CameraAnimator,
    thermal: ThermalSimulation,
    params: SceneParams,
    grid: PlacementGrid,
    config: AppConfig,
    last_tick: Option<f64>,
}

/// Session slots indexed by handle. A destroyed session leaves `None` behind
/// so its handle never aliases a newer session.
static SESSIONS: Mutex<Vec<Option<Session>>> = Mutex::new(Vec::new());

#[derive(Debug, Error)]
pub enum BridgeError {
    #[error("invalid session handle {0}")]
    UnknownHandle(usize),
    #[error("session state poisoned by an earlier panic")]
    Poisoned,
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Model(#[from] UnknownModel),
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Camera state reported to the host after each tick.
#[derive(Debug, Clone, Serialize)]
pub struct CameraFrame {
    pub position: Vec3,
    pub target: Vec3,
    pub fov_deg: f64,
    pub view: Option<String>,
    pub transitioning: bool,
}

fn sessions() -> Result<MutexGuard<'static, Vec<Option<Session>>>, BridgeError> {
    SESSIONS.lock().map_err(|_| BridgeError::Poisoned)
}

fn with_session<T>(
    handle: usize,
    f: impl FnOnce(&mut Session) -> Result<T, BridgeError>,
) -> Result<T, BridgeError> {
    let mut sessions = sessions()?;
    let session = sessions
        .get_mut(handle)
        .and_then(Option::as_mut)
        .ok_or(BridgeError::UnknownHandle(handle))?;
    f(session)
}

fn frame(session: &Session) -> CameraFrame {
    CameraFrame {
        position: session.camera.position(),
        target: session.camera.target(),
        fov_deg: session.camera.fov_deg,
        view: session.animator.current_view().map(str::to_string),
        transitioning: session.animator.is_transitioning(),
    }
}

// ── Plain Rust API (what the exports wrap) ───────────────────────────────

pub fn views_json(config_json: &str) -> Result<String, BridgeError> {
    let views: ViewRegistry = parse_config(config_json)?.view_registry();
    Ok(serde_json::to_string(&views)?)
}

fn parse_config(config_json: &str) -> Result<AppConfig, BridgeError> {
    if config_json.trim().is_empty() {
        return Ok(AppConfig::default());
    }
    Ok(AppConfig::from_json(config_json)?)
}

/// Create a session and mount its initial view. Returns the handle.
pub fn create_session(config_json: &str) -> Result<usize, BridgeError> {
    let config = parse_config(config_json)?;
    let mut camera = PerspectiveCamera::default();
    let mut animator =
        CameraAnimator::new(config.view_registry(), config.transition_duration_secs);
    animator.mount(&mut camera, &config.initial_view);

    let session = Session {
        camera,
        animator,
        thermal: ThermalSimulation::new(),
        params: SceneParams::from_config(&config),
        grid: PlacementGrid::new(config.grid_size),
        config,
        last_tick: None,
    };
    let mut sessions = sessions()?;
    sessions.push(Some(session));
    let handle = sessions.len() - 1;
    tracing::debug!(handle, "animator session created");
    Ok(handle)
}

/// Release a session. Later calls with `handle` fail with
/// [`BridgeError::UnknownHandle`].
pub fn destroy(handle: usize) -> Result<(), BridgeError> {
    let mut sessions = sessions()?;
    sessions
        .get_mut(handle)
        .and_then(Option::take)
        .ok_or(BridgeError::UnknownHandle(handle))?;
    tracing::debug!(handle, "animator session destroyed");
    Ok(())
}

pub fn mount(handle: usize, view: &str) -> Result<CameraFrame, BridgeError> {
    with_session(handle, |s| {
        s.animator.mount(&mut s.camera, view);
        Ok(frame(s))
    })
}

pub fn select(handle: usize, view: &str, now: f64) -> Result<(), BridgeError> {
    with_session(handle, |s| {
        s.animator.select_view(&s.camera, view, now);
        Ok(())
    })
}

/// Advance the thermal simulation and the camera transition to `now`.
pub fn advance(handle: usize, now: f64) -> Result<CameraFrame, BridgeError> {
    with_session(handle, |s| {
        let delta = thermal::frame_delta(s.last_tick, now);
        s.last_tick = Some(now);
        s.params.time = now;
        s.thermal.step(s.params.load, delta);
        s.animator.update(&mut s.camera, now);
        Ok(frame(s))
    })
}

/// Compose the current view. A non-empty `params_json` is a JSON object whose
/// fields overwrite the session's scene parameters first; fields it omits keep
/// their current values and everything is pulled into the control ranges.
pub fn compose(handle: usize, params_json: &str) -> Result<String, BridgeError> {
    with_session(handle, |s| {
        if !params_json.trim().is_empty() {
            let time = s.params.time;
            s.params.apply_json(params_json)?;
            s.params.time = time;
        }
        let view = s
            .animator
            .current_view()
            .unwrap_or(&s.config.initial_view)
            .to_string();
        let commands = scene::compose(&view, &s.params, &s.thermal);
        Ok(serde_json::to_string(&commands)?)
    })
}

pub fn rack(model: &str, gpu_count: u32, load: f64) -> Result<RackMetrics, BridgeError> {
    let model: GpuModel = model.parse()?;
    let config = AppConfig::default();
    Ok(RackMetrics::compute(
        model,
        gpu_count,
        load.clamp(0.0, 1.0),
        config.rack_power_capacity_w,
        config.near_capacity_threshold,
    ))
}

pub fn place(handle: usize, kind_json: &str, x: i32, y: i32) -> Result<Option<u32>, BridgeError> {
    let kind: PlacementKind = serde_json::from_str(kind_json)?;
    with_session(handle, |s| Ok(s.grid.place(kind, x, y)))
}

// ── wasm-bindgen exports ─────────────────────────────────────────────────

/// Registered views as a JSON object in tab order. `config_json` may be
/// empty for the built-in registry.
#[wasm_bindgen]
pub fn list_views(config_json: &str) -> Result<String, JsError> {
    Ok(views_json(config_json)?)
}

/// Create an animator session from a config document (empty for defaults).
/// Returns a handle for later calls.
#[wasm_bindgen]
pub fn create_animator(config_json: &str) -> Result<usize, JsError> {
    Ok(create_session(config_json)?)
}

/// Release a session created by [`create_animator`].
#[wasm_bindgen]
pub fn destroy_animator(handle: usize) -> Result<(), JsError> {
    Ok(destroy(handle)?)
}

/// Place the camera at `view` without animating. Returns the camera frame as
/// JSON.
#[wasm_bindgen]
pub fn mount_view(handle: usize, view: &str) -> Result<String, JsError> {
    let frame = mount(handle, view)?;
    Ok(serde_json::to_string(&frame)?)
}

/// Start a transition toward `view` at host time `now` (seconds).
#[wasm_bindgen]
pub fn select_view(handle: usize, view: &str, now: f64) -> Result<(), JsError> {
    Ok(select(handle, view, now)?)
}

/// Per-frame update. Returns the camera frame as JSON.
#[wasm_bindgen]
pub fn tick(handle: usize, now: f64) -> Result<String, JsError> {
    let frame = advance(handle, now)?;
    Ok(serde_json::to_string(&frame)?)
}

/// Scene commands for the session's current view as JSON.
#[wasm_bindgen]
pub fn render_scene(handle: usize, params_json: &str) -> Result<String, JsError> {
    Ok(compose(handle, params_json)?)
}

/// Rack figures for `gpu_count` GPUs of `model` ("A100", "H100", "MI300X").
#[wasm_bindgen]
pub fn rack_metrics(model: &str, gpu_count: u32, load: f64) -> Result<String, JsError> {
    let metrics = rack(model, gpu_count, load)?;
    Ok(serde_json::to_string(&metrics)?)
}

/// Leading number of a display string such as `"312 TFLOPS (FP16)"`; 0 when
/// there is none.
#[wasm_bindgen]
pub fn parse_number(s: &str) -> f64 {
    metrics::parse_leading_number(s)
}

#[wasm_bindgen]
pub fn can_place(
    handle: usize,
    x: i32,
    y: i32,
    width: u32,
    height: u32,
) -> Result<bool, JsError> {
    Ok(with_session(handle, |s| Ok(s.grid.can_place(x, y, width, height)))?)
}

/// Place a component (`"gpu_server"`, `"storage"`, ... as a JSON string) on
/// the session's floor plan. Returns the new id, or `undefined` when the
/// footprint does not fit.
#[wasm_bindgen]
pub fn place_component(
    handle: usize,
    kind_json: &str,
    x: i32,
    y: i32,
) -> Result<Option<u32>, JsError> {
    Ok(place(handle, kind_json, x, y)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_views_list_in_tab_order() {
        let json = views_json("").unwrap();
        let overview = json.find("\"overview\"").unwrap();
        let idle = json.find("\"idle\"").unwrap();
        assert!(overview < idle);
    }

    #[test]
    fn session_mounts_initial_view() {
        let handle = create_session("").unwrap();
        let frame = advance(handle, 0.0).unwrap();
        assert_eq!(frame.view.as_deref(), Some("overview"));
        assert!(!frame.transitioning);
        assert!(frame.position.distance(Vec3::new(0.0, 2.0, 5.0)) < 1e-9);
    }

    #[test]
    fn transition_completes_after_duration() {
        let handle = create_session(r#"{"transition_duration_secs": 1.0}"#).unwrap();
        select(handle, "warehouse", 10.0).unwrap();
        assert!(advance(handle, 10.5).unwrap().transitioning);
        let done = advance(handle, 11.0).unwrap();
        assert!(!done.transitioning);
        assert!(done.position.distance(Vec3::new(10.0, 5.0, 10.0)) < 1e-9);
    }

    #[test]
    fn unknown_view_is_ignored() {
        let handle = create_session("").unwrap();
        select(handle, "datacenter", 0.0).unwrap();
        let frame = advance(handle, 0.1).unwrap();
        assert_eq!(frame.view.as_deref(), Some("overview"));
        assert!(!frame.transitioning);
    }

    #[test]
    fn render_scene_serializes_commands() {
        let handle = create_session("").unwrap();
        let json = compose(handle, r#"{"show_performance": true}"#).unwrap();
        assert!(json.starts_with('['));
        assert!(json.contains("DrawTorus"));
    }

    #[test]
    fn bad_inputs_are_errors() {
        assert!(matches!(
            create_session("{"),
            Err(BridgeError::Json(_) | BridgeError::Config(_))
        ));
        assert!(matches!(rack("V100", 8, 0.5), Err(BridgeError::Model(_))));
        assert!(matches!(
            mount(usize::MAX, "overview"),
            Err(BridgeError::UnknownHandle(_))
        ));
    }

    #[test]
    fn rack_figures_for_h100() {
        let metrics = rack("h100", 8, 0.5).unwrap();
        assert!((metrics.power_kw - 2.8).abs() < 1e-9);
        assert!(!metrics.near_capacity);
    }

    #[test]
    fn placement_through_the_session_grid() {
        let handle = create_session("").unwrap();
        assert_eq!(place(handle, "\"storage\"", 0, 0).unwrap(), Some(1));
        assert_eq!(place(handle, "\"storage\"", 0, 0).unwrap(), None);
        let fits = with_session(handle, |s| Ok(s.grid.can_place(1, 0, 1, 1))).unwrap();
        assert!(fits);
        assert_eq!(parse_number("312 TFLOPS (FP16)"), 312.0);
    }

    #[test]
    fn partial_params_keep_session_config() {
        let handle = create_session(
            r#"{"rack_power_capacity_w": 30000, "rack_height_u": 20, "default_load": 0.9}"#,
        )
        .unwrap();
        compose(handle, r#"{"show_thermal": true}"#).unwrap();
        let params = with_session(handle, |s| Ok(s.params.clone())).unwrap();
        assert!(params.show_thermal);
        assert_eq!(params.rack_power_capacity_w, 30_000.0);
        assert_eq!(params.rack_height_u, 20);
        assert_eq!(params.load, 0.9);
    }

    #[test]
    fn host_params_are_clamped() {
        let handle = create_session("").unwrap();
        mount(handle, "server").unwrap();
        compose(handle, r#"{"gpu_count": 4000000000, "load": 5}"#).unwrap();
        let params = with_session(handle, |s| Ok(s.params.clone())).unwrap();
        assert_eq!(params.gpu_count, scene::MAX_RACK_GPUS);
        assert_eq!(params.load, 1.0);
    }

    #[test]
    fn stalled_host_advances_one_capped_step() {
        let handle = create_session(r#"{"default_load": 1.0}"#).unwrap();
        advance(handle, 0.0).unwrap();
        advance(handle, 600.0).unwrap();
        let temperature = with_session(handle, |s| {
            Ok(s.thermal.state(GpuModel::H100).temperature_c)
        })
        .unwrap();
        // One 0.1 s step from 40 toward 90.
        assert!((temperature - 45.0).abs() < 1e-9);
    }

    #[test]
    fn destroyed_handles_are_rejected() {
        let handle = create_session("").unwrap();
        destroy(handle).unwrap();
        assert!(matches!(
            advance(handle, 0.0),
            Err(BridgeError::UnknownHandle(h)) if h == handle
        ));
        assert!(matches!(destroy(handle), Err(BridgeError::UnknownHandle(_))));
        assert!(matches!(destroy(usize::MAX), Err(BridgeError::UnknownHandle(_))));
    }
}
