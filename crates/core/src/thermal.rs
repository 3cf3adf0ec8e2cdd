//! Per-frame thermal and fan simulation for the GPU visuals.
//!
//! Purely cosmetic: temperatures chase a load-derived target and fans spin
//! at a load-scaled fraction of their rated RPM.

use std::collections::BTreeMap;
use std::f64::consts::TAU;

use gpuviz_protocol::Color;
use serde::Serialize;

use crate::hardware::{GpuModel, GpuSpec};

/// Idle temperature, °C. Also the cold end of the thermal color ramp.
pub const BASELINE_TEMP_C: f64 = 40.0;

pub fn target_temperature(spec: &GpuSpec, load: f64) -> f64 {
    BASELINE_TEMP_C + (spec.power.max_temp_c - BASELINE_TEMP_C) * load
}

/// Longest step, in seconds, a single frame may feed the simulation. A
/// backgrounded host resumes from where it stalled instead of jumping to
/// steady state.
pub const MAX_FRAME_DELTA: f64 = 0.1;

/// Seconds elapsed since the previous frame at `last`, floored at zero and
/// capped at [`MAX_FRAME_DELTA`]. The first frame has no delta.
pub fn frame_delta(last: Option<f64>, now: f64) -> f64 {
    last.map_or(0.0, |last| (now - last).clamp(0.0, MAX_FRAME_DELTA))
}

/// Blue (cold) to red (at `max_temp_c`) ramp.
pub fn thermal_color(spec: &GpuSpec, temperature_c: f64) -> Color {
    let span = spec.power.max_temp_c - BASELINE_TEMP_C;
    let t = if span > 0.0 {
        ((temperature_c - BASELINE_TEMP_C) / span).clamp(0.0, 1.0)
    } else {
        0.0
    };
    Color::from_hsl(0.6 - t * 0.6, 1.0, 0.5)
}

/// Fan angular velocity, rad/s.
pub fn fan_speed(spec: &GpuSpec, load: f64) -> f64 {
    load * spec.fans.max_rpm / 60.0 * TAU
}

/// Color of the performance indicator ring: red at idle, green at full load.
pub fn load_color(load: f64) -> Color {
    Color::from_hsl(load * 0.3, 1.0, 0.5)
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GpuThermalState {
    pub temperature_c: f64,
    /// Fan blade rotation, radians in `[0, 2π)`.
    pub fan_angle: f64,
}

impl Default for GpuThermalState {
    fn default() -> Self {
        Self {
            temperature_c: BASELINE_TEMP_C,
            fan_angle: 0.0,
        }
    }
}

impl GpuThermalState {
    /// Advance by `delta` seconds. `delta` is clamped to `[0, 1]` so a long
    /// stall never overshoots the target.
    pub fn step(&mut self, spec: &GpuSpec, load: f64, delta: f64) {
        let delta = delta.clamp(0.0, 1.0);
        let target = target_temperature(spec, load);
        self.temperature_c += (target - self.temperature_c) * delta;
        self.fan_angle = (self.fan_angle + fan_speed(spec, load) * delta).rem_euclid(TAU);
    }
}

/// Thermal state for every GPU model, shared by all instances of a model.
#[derive(Debug, Clone, Serialize)]
pub struct ThermalSimulation {
    states: BTreeMap<GpuModel, GpuThermalState>,
}

impl Default for ThermalSimulation {
    fn default() -> Self {
        Self {
            states: GpuModel::ALL
                .into_iter()
                .map(|m| (m, GpuThermalState::default()))
                .collect(),
        }
    }
}

impl ThermalSimulation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn step(&mut self, load: f64, delta: f64) {
        for (model, state) in &mut self.states {
            state.step(model.spec(), load, delta);
        }
    }

    pub fn state(&self, model: GpuModel) -> GpuThermalState {
        self.states.get(&model).copied().unwrap_or_default()
    }
}
