use std::f64::consts::FRAC_PI_2;

use gpuviz_protocol::{Color, Material, SceneCommand, Vec3};

use super::SceneParams;
use super::gpu;
use crate::hardware::GpuModel;
use crate::metrics::RackMetrics;
use crate::thermal::ThermalSimulation;

/// Height of one rack unit in scene units.
pub const RACK_UNIT: f64 = 0.05;
pub const RACK_WIDTH: f64 = 1.2;
/// Vertical pitch between GPUs in a rack.
pub const GPU_SPACING: f64 = 0.3;

const FRAME_COLOR: &str = "#2C2C2C";
const RAIL_COLOR: &str = "#4A4A4A";
const OK_COLOR: &str = "#10B981";
const WARN_COLOR: &str = "#EF4444";
/// Frame is see-through so the mounted cards stay visible.
const FRAME_OPACITY: f32 = 0.35;

/// Vertical offsets of `count` GPUs: `(i − n/2) × 0.3`.
pub fn gpu_offsets(count: u32) -> impl Iterator<Item = f64> {
    let half = f64::from(count) / 2.0;
    (0..count).map(move |i| (f64::from(i) - half) * GPU_SPACING)
}

/// A rack of `gpu_count` cards of `model` with its metric labels and power
/// bar.
pub fn server_rack(
    id: &str,
    position: Vec3,
    rotation: Vec3,
    model: GpuModel,
    gpu_count: u32,
    params: &SceneParams,
    thermal: &ThermalSimulation,
) -> Vec<SceneCommand> {
    let height = f64::from(params.rack_height_u) * RACK_UNIT;
    let metrics = RackMetrics::compute(
        model,
        gpu_count,
        params.load,
        params.rack_power_capacity_w,
        params.near_capacity_threshold,
    );
    let status = Color::hex_or_gray(if metrics.near_capacity {
        WARN_COLOR
    } else {
        OK_COLOR
    });

    let mut commands = Vec::new();
    commands.push(SceneCommand::BeginGroup {
        id: id.to_string(),
        label: Some(format!("{gpu_count}x {model}")),
    });
    commands.push(SceneCommand::PushTransform {
        translate: position,
        rotation,
        scale: 1.0,
    });

    commands.push(SceneCommand::DrawBox {
        center: Vec3::ZERO,
        size: Vec3::new(RACK_WIDTH, height, RACK_WIDTH),
        material: Material::solid(Color::hex_or_gray(FRAME_COLOR)).translucent(FRAME_OPACITY),
    });
    for x in [0.55, -0.55] {
        commands.push(SceneCommand::DrawBox {
            center: Vec3::new(x, 0.0, 0.0),
            size: Vec3::new(0.05, height, 0.05),
            material: Material::solid(Color::hex_or_gray(RAIL_COLOR)),
        });
    }

    let style = params.gpu_style(thermal, model);
    for (i, y) in gpu_offsets(gpu_count).enumerate() {
        commands.extend(gpu::gpu(
            &format!("{id}/gpu-{i}"),
            model,
            Vec3::new(0.0, y, 0.0),
            Vec3::ZERO,
            &style,
        ));
    }

    commands.push(SceneCommand::DrawText {
        position: Vec3::new(0.7, 0.6, 0.0),
        text: metrics.capacity_label(),
        color: Color::WHITE,
        font_size: 0.1,
    });
    commands.push(SceneCommand::DrawText {
        position: Vec3::new(0.7, 0.0, 0.0),
        text: metrics.power_label(),
        color: status,
        font_size: 0.1,
    });

    let bar = height * metrics.utilization;
    if bar > 0.0 {
        commands.push(SceneCommand::DrawBox {
            center: Vec3::new(0.6, -height / 2.0, 0.0),
            size: Vec3::new(0.05, bar, 0.05),
            material: Material::solid(status).glowing(status, 0.5),
        });
    }

    if params.show_thermal {
        let opacity = (0.2 + metrics.utilization * 0.3) as f32;
        commands.push(SceneCommand::PushTransform {
            translate: Vec3::new(0.0, 0.0, -0.6),
            rotation: Vec3::new(FRAC_PI_2, 0.0, 0.0),
            scale: 1.0,
        });
        commands.push(SceneCommand::DrawPlane {
            center: Vec3::ZERO,
            width: 1.0,
            depth: height,
            material: Material::solid(Color::hex_or_gray(WARN_COLOR)).translucent(opacity),
        });
        commands.push(SceneCommand::PopTransform);
    }

    commands.push(SceneCommand::PopTransform);
    commands.push(SceneCommand::EndGroup);
    commands
}
