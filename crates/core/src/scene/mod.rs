//! Scene composition: stateless functions from view state to
//! [`SceneCommand`] lists.
//!
//! Each call rebuilds the whole scene. Animated parts (fan spin, thermal
//! colors, contribution particles) read their per-frame values from
//! [`ThermalSimulation`] and [`SceneParams::time`], so composition itself
//! holds no state.

pub mod comparison;
pub mod gpu;
pub mod idle;
pub mod rack;
pub mod stage;
pub mod warehouse;

use std::f64::consts::FRAC_PI_6;

use gpuviz_protocol::{SceneCommand, Vec3};
use serde::{Deserialize, Serialize};

use crate::config::AppConfig;
use crate::hardware::{ContributionKind, GpuModel};
use crate::metrics::DEFAULT_RACK_POWER_CAPACITY_W;
use crate::thermal::ThermalSimulation;

pub use gpu::GpuStyle;

/// Most GPUs the server view will mount in one rack.
pub const MAX_RACK_GPUS: u32 = 16;

/// Everything the visualize page's controls feed into composition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneParams {
    /// Model shown in the server view.
    pub gpu_model: GpuModel,
    /// GPUs in the server view's rack.
    pub gpu_count: u32,
    /// Load fraction in `[0, 1]`.
    pub load: f64,
    pub show_thermal: bool,
    pub show_performance: bool,
    pub rack_height_u: u32,
    pub rack_power_capacity_w: f64,
    pub near_capacity_threshold: f64,
    /// Index into the cluster presets for the warehouse view.
    pub cluster: usize,
    /// Index into the consumer devices for the idle view.
    pub device: usize,
    pub contribution: ContributionKind,
    pub show_contribution: bool,
    /// Idle hours per day.
    pub idle_hours: f64,
    /// Host clock, seconds. Drives particle animation.
    pub time: f64,
}

impl Default for SceneParams {
    fn default() -> Self {
        Self::from_config(&AppConfig::default())
    }
}

impl SceneParams {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            gpu_model: GpuModel::H100,
            gpu_count: 8,
            load: config.default_load,
            show_thermal: false,
            show_performance: false,
            rack_height_u: config.rack_height_u,
            rack_power_capacity_w: config.rack_power_capacity_w,
            near_capacity_threshold: config.near_capacity_threshold,
            cluster: 0,
            device: 0,
            contribution: ContributionKind::Inference,
            show_contribution: true,
            idle_hours: 12.0,
            time: 0.0,
        }
    }

    /// Pull every field back into the range the visualize controls allow.
    /// Out-of-range preset indices are left alone; lookups fall back to the
    /// first preset.
    pub fn clamped(self) -> Self {
        let unit = |v: f64| if v.is_nan() { 0.0 } else { v.clamp(0.0, 1.0) };
        Self {
            gpu_count: self.gpu_count.clamp(1, MAX_RACK_GPUS),
            load: unit(self.load),
            rack_height_u: self.rack_height_u.max(1),
            rack_power_capacity_w: if self.rack_power_capacity_w > 0.0 {
                self.rack_power_capacity_w
            } else {
                DEFAULT_RACK_POWER_CAPACITY_W
            },
            near_capacity_threshold: unit(self.near_capacity_threshold),
            idle_hours: if self.idle_hours.is_nan() {
                0.0
            } else {
                self.idle_hours.clamp(0.0, 24.0)
            },
            time: if self.time.is_finite() { self.time } else { 0.0 },
            ..self
        }
    }

    /// Overlay the fields present in the JSON object `patch`. Fields it omits
    /// keep their current values; the result is [`clamped`](Self::clamped).
    pub fn apply_json(&mut self, patch: &str) -> Result<(), serde_json::Error> {
        let patch: serde_json::Map<String, serde_json::Value> = serde_json::from_str(patch)?;
        let mut merged = serde_json::to_value(&*self)?;
        if let serde_json::Value::Object(fields) = &mut merged {
            fields.extend(patch);
        }
        *self = serde_json::from_value::<Self>(merged)?.clamped();
        Ok(())
    }

    pub(crate) fn gpu_style(&self, thermal: &ThermalSimulation, model: GpuModel) -> GpuStyle {
        GpuStyle {
            load: self.load,
            show_thermal: self.show_thermal,
            show_performance: self.show_performance,
            thermal: thermal.state(model),
            time: self.time,
        }
    }
}

/// Overview GPUs: model and x offset, all yawed by π/6.
const OVERVIEW_LINEUP: [(GpuModel, f64); 3] = [
    (GpuModel::A100, -2.5),
    (GpuModel::H100, 0.0),
    (GpuModel::Mi300x, 2.5),
];

/// Full scene for `view`: stage plus the view's content. An unregistered
/// view key yields the empty stage.
pub fn compose(view: &str, params: &SceneParams, thermal: &ThermalSimulation) -> Vec<SceneCommand> {
    let mut commands = stage::stage();
    match view {
        "overview" => commands.extend(overview(params, thermal)),
        "server" => commands.extend(rack::server_rack(
            "rack-0",
            Vec3::ZERO,
            Vec3::ZERO,
            params.gpu_model,
            params.gpu_count,
            params,
            thermal,
        )),
        "warehouse" => commands.extend(warehouse::warehouse(params, thermal)),
        "comparison" => commands.extend(comparison::hardware_comparison()),
        "idle" => commands.extend(idle::idle_compute(params)),
        other => tracing::debug!(view = other, "no scene content for view"),
    }
    commands
}

pub fn overview(params: &SceneParams, thermal: &ThermalSimulation) -> Vec<SceneCommand> {
    let mut commands = Vec::new();
    for (model, x) in OVERVIEW_LINEUP {
        commands.extend(gpu::gpu(
            &format!("gpu-{}", model.key()),
            model,
            Vec3::new(x, 0.0, 0.0),
            Vec3::new(0.0, FRAC_PI_6, 0.0),
            &params.gpu_style(thermal, model),
        ));
    }
    commands
}

/// Verify `PushTransform`/`PopTransform` and `BeginGroup`/`EndGroup` pair up.
pub fn is_balanced(commands: &[SceneCommand]) -> bool {
    let mut transforms = 0usize;
    let mut groups = 0usize;
    for cmd in commands {
        match cmd {
            SceneCommand::PushTransform { .. } => transforms += 1,
            SceneCommand::PopTransform => {
                let Some(n) = transforms.checked_sub(1) else {
                    return false;
                };
                transforms = n;
            }
            SceneCommand::BeginGroup { .. } => groups += 1,
            SceneCommand::EndGroup => {
                let Some(n) = groups.checked_sub(1) else {
                    return false;
                };
                groups = n;
            }
            _ => {}
        }
    }
    transforms == 0 && groups == 0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::view::ViewRegistry;

    fn group_ids(commands: &[SceneCommand]) -> Vec<&str> {
        commands
            .iter()
            .filter_map(|c| match c {
                SceneCommand::BeginGroup { id, .. } => Some(id.as_str()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn every_registered_view_composes_balanced() {
        let params = SceneParams {
            show_thermal: true,
            show_performance: true,
            ..SceneParams::default()
        };
        let thermal = ThermalSimulation::new();
        for key in ViewRegistry::visualize_defaults().keys() {
            let commands = compose(key, &params, &thermal);
            assert!(is_balanced(&commands), "{key} is unbalanced");
            assert!(commands.len() > stage::stage().len(), "{key} is empty");
        }
    }

    #[test]
    fn unknown_view_is_just_the_stage() {
        let commands = compose("moon-base", &SceneParams::default(), &ThermalSimulation::new());
        assert_eq!(commands.len(), stage::stage().len());
    }

    #[test]
    fn overview_shows_three_models_in_order() {
        let commands = compose("overview", &SceneParams::default(), &ThermalSimulation::new());
        assert_eq!(group_ids(&commands), ["gpu-A100", "gpu-H100", "gpu-MI300X"]);

        let yaws: Vec<Vec3> = commands
            .iter()
            .filter_map(|c| match c {
                SceneCommand::PushTransform {
                    translate,
                    rotation,
                    ..
                } if rotation.y != 0.0 => Some(*translate),
                _ => None,
            })
            .collect();
        assert_eq!(
            yaws,
            [
                Vec3::new(-2.5, 0.0, 0.0),
                Vec3::ZERO,
                Vec3::new(2.5, 0.0, 0.0)
            ]
        );
    }

    #[test]
    fn server_view_follows_selected_model_and_count() {
        let params = SceneParams {
            gpu_model: GpuModel::A100,
            gpu_count: 4,
            ..SceneParams::default()
        };
        let commands = compose("server", &params, &ThermalSimulation::new());
        let gpus = group_ids(&commands)
            .into_iter()
            .filter(|id| id.starts_with("rack-0/gpu"))
            .count();
        assert_eq!(gpus, 4);
        assert!(commands.iter().any(|c| matches!(
            c,
            SceneCommand::DrawText { text, .. } if text.starts_with("4x A100")
        )));
    }

    #[test]
    fn params_are_pulled_into_control_ranges() {
        let params = SceneParams {
            gpu_count: 4_000_000_000,
            load: 5.0,
            idle_hours: -3.0,
            rack_height_u: 0,
            rack_power_capacity_w: -1.0,
            time: f64::NAN,
            ..SceneParams::default()
        }
        .clamped();
        assert_eq!(params.gpu_count, MAX_RACK_GPUS);
        assert_eq!(params.load, 1.0);
        assert_eq!(params.idle_hours, 0.0);
        assert_eq!(params.rack_height_u, 1);
        assert_eq!(params.rack_power_capacity_w, DEFAULT_RACK_POWER_CAPACITY_W);
        assert_eq!(params.time, 0.0);

        let zero = SceneParams {
            gpu_count: 0,
            load: f64::NAN,
            ..SceneParams::default()
        }
        .clamped();
        assert_eq!(zero.gpu_count, 1);
        assert_eq!(zero.load, 0.0);
    }

    #[test]
    fn json_patch_keeps_configured_fields() {
        let config = AppConfig {
            rack_power_capacity_w: 30_000.0,
            rack_height_u: 20,
            default_load: 0.9,
            ..AppConfig::default()
        };
        let mut params = SceneParams::from_config(&config);
        params
            .apply_json(r#"{"show_thermal": true, "gpu_model": "A100", "gpu_count": 999}"#)
            .unwrap();
        assert!(params.show_thermal);
        assert_eq!(params.gpu_model, GpuModel::A100);
        assert_eq!(params.gpu_count, MAX_RACK_GPUS);
        assert_eq!(params.rack_power_capacity_w, 30_000.0);
        assert_eq!(params.rack_height_u, 20);
        assert_eq!(params.load, 0.9);

        assert!(params.apply_json("[1, 2]").is_err());
        assert!(params.apply_json(r#"{"load": "high"}"#).is_err());
        assert_eq!(params.load, 0.9);
    }

    #[test]
    fn unbalanced_lists_are_detected() {
        assert!(!is_balanced(&[SceneCommand::PopTransform]));
        assert!(!is_balanced(&[SceneCommand::push_translate(Vec3::ZERO)]));
        assert!(is_balanced(&[]));
    }
}
