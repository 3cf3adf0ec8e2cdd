use gpuviz_protocol::{Color, Material, SceneCommand, Vec3};

use crate::hardware::GpuModel;
use crate::thermal::{self, GpuThermalState};

const CONNECTOR_GOLD: &str = "#FFD700";
const MEMORY_CHIP: &str = "#1a1a1a";
const FAN_GLOW: Color = Color::rgb(0.267, 0.267, 1.0);
const MEMORY_GLOW: Color = Color::rgb(0.0, 1.0, 0.0);
/// Above this load the blades are drawn slightly transparent (motion blur).
const BLUR_LOAD: f64 = 0.8;
/// The shroud has cut-outs over each fan; drawing it translucent keeps the
/// fans visible without modelling the holes.
const SHROUD_OPACITY: f32 = 0.55;
/// Peak height of the idle float, world units.
const FLOAT_AMPLITUDE: f64 = 0.03;

/// Vertical float offset at host time `time`. Zero at `time = 0`.
pub fn float_offset(time: f64) -> f64 {
    FLOAT_AMPLITUDE * (1.0 - time.cos())
}

/// Per-instance presentation of a GPU card.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GpuStyle {
    pub load: f64,
    pub show_thermal: bool,
    pub show_performance: bool,
    pub thermal: GpuThermalState,
    /// Host clock, seconds. Drives the float.
    pub time: f64,
}

impl Default for GpuStyle {
    fn default() -> Self {
        Self {
            load: 0.5,
            show_thermal: false,
            show_performance: false,
            thermal: GpuThermalState::default(),
            time: 0.0,
        }
    }
}

/// One GPU card at `position`, rotated by the XYZ euler angles `rotation`
/// and scaled by the model's visual scale.
pub fn gpu(
    id: &str,
    model: GpuModel,
    position: Vec3,
    rotation: Vec3,
    style: &GpuStyle,
) -> Vec<SceneCommand> {
    let spec = model.spec();
    let dims = spec.dimensions;
    let sink = spec.heatsink;
    let load = style.load as f32;
    let mut commands = Vec::with_capacity(32);

    commands.push(SceneCommand::BeginGroup {
        id: id.to_string(),
        label: Some(spec.name.to_string()),
    });
    commands.push(SceneCommand::PushTransform {
        translate: position + Vec3::new(0.0, float_offset(style.time), 0.0),
        rotation,
        scale: spec.scale,
    });

    // PCB
    commands.push(SceneCommand::DrawBox {
        center: Vec3::ZERO,
        size: Vec3::new(dims.width, dims.height, dims.length),
        material: Material::metallic(Color::hex_or_gray(spec.pcb.color), 0.0, 0.6)
            .with_normal_map(spec.pcb.texture),
    });

    // PCIe edge connector
    commands.push(SceneCommand::DrawBox {
        center: Vec3::new(0.0, -dims.height / 2.0, dims.length / 2.0 - 0.1),
        size: Vec3::new(0.4, 0.05, 0.15),
        material: Material::metallic(Color::hex_or_gray(CONNECTOR_GOLD), 0.7, 0.3),
    });

    let heatsink = if style.show_thermal {
        let hot = thermal::thermal_color(spec, style.thermal.temperature_c);
        Material::metallic(hot, 0.8, 0.2).glowing(hot, 0.5)
    } else {
        Material::metallic(Color::hex_or_gray(sink.color), 0.8, 0.2)
    };
    commands.push(SceneCommand::DrawBox {
        center: Vec3::new(0.0, dims.height + sink.height / 2.0, 0.0),
        size: Vec3::new(sink.width, sink.height, sink.length),
        material: heatsink,
    });

    commands.push(SceneCommand::DrawBox {
        center: Vec3::new(0.0, dims.height + sink.height * 1.5, 0.0),
        size: Vec3::new(sink.width + 0.05, sink.height, sink.length + 0.05),
        material: Material::metallic(Color::hex_or_gray(spec.shroud.color), 0.6, 0.3)
            .with_normal_map(spec.shroud.texture)
            .translucent(SHROUD_OPACITY),
    });

    let fan_radius = spec.fans.diameter / 2.0;
    let housing = Material::metallic(Color::hex_or_gray(spec.fans.color), 0.5, 0.5);
    let housing = if style.show_performance {
        housing.glowing(FAN_GLOW, load * 0.5)
    } else {
        housing
    };
    let blades = Material::metallic(Color::hex_or_gray(spec.fans.blade_color), 0.4, 0.6)
        .translucent(if style.load > BLUR_LOAD { 0.8 } else { 1.0 });
    let hub = Material::metallic(Color::hex_or_gray(spec.fans.color), 0.6, 0.4);
    for position in spec.fans.positions.iter().take(spec.fans.count as usize) {
        commands.push(SceneCommand::push_translate(*position));
        commands.push(SceneCommand::DrawCylinder {
            center: Vec3::ZERO,
            radius_top: fan_radius,
            radius_bottom: fan_radius,
            height: 0.05,
            spin: 0.0,
            material: housing,
        });
        commands.push(SceneCommand::DrawCylinder {
            center: Vec3::new(0.0, 0.01, 0.0),
            radius_top: fan_radius - 0.02,
            radius_bottom: fan_radius - 0.05,
            height: 0.02,
            spin: style.thermal.fan_angle,
            material: blades,
        });
        commands.push(SceneCommand::DrawCylinder {
            center: Vec3::new(0.0, 0.02, 0.0),
            radius_top: 0.05,
            radius_bottom: 0.05,
            height: 0.03,
            spin: 0.0,
            material: hub,
        });
        commands.push(SceneCommand::PopTransform);
    }

    let chip = Material::metallic(Color::hex_or_gray(MEMORY_CHIP), 0.6, 0.3);
    let chip = if style.show_performance {
        chip.glowing(MEMORY_GLOW, load * 0.5)
    } else {
        chip
    };
    for i in 0..4 {
        commands.push(SceneCommand::DrawBox {
            center: Vec3::new(
                -dims.width / 3.0 + f64::from(i) * dims.width / 2.0,
                dims.height,
                0.0,
            ),
            size: Vec3::new(0.15, 0.02, 0.15),
            material: chip,
        });
    }

    if style.show_performance {
        let ring = thermal::load_color(style.load);
        commands.push(SceneCommand::DrawTorus {
            center: Vec3::new(0.0, dims.height * 2.0, 0.0),
            radius: dims.width * 0.6,
            tube: 0.02,
            material: Material::solid(ring).glowing(ring, 0.5).translucent(0.8),
        });
    }

    commands.push(SceneCommand::PopTransform);
    commands.push(SceneCommand::EndGroup);
    commands
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::is_balanced;

    fn heatsink_color(commands: &[SceneCommand]) -> Option<Color> {
        // PCB, connector, heatsink
        commands
            .iter()
            .filter_map(|c| match c {
                SceneCommand::DrawBox { material, .. } => Some(material.color),
                _ => None,
            })
            .nth(2)
    }

    #[test]
    fn card_is_scaled_by_model() {
        let commands = gpu("g", GpuModel::H100, Vec3::ZERO, Vec3::ZERO, &GpuStyle::default());
        assert!(is_balanced(&commands));
        assert!(commands.iter().any(|c| matches!(
            c,
            SceneCommand::PushTransform { scale, .. } if *scale == 1.2
        )));
    }

    #[test]
    fn three_fans_with_three_parts_each() {
        let commands = gpu("g", GpuModel::A100, Vec3::ZERO, Vec3::ZERO, &GpuStyle::default());
        let cylinders = commands
            .iter()
            .filter(|c| matches!(c, SceneCommand::DrawCylinder { .. }))
            .count();
        assert_eq!(cylinders, 9);
    }

    #[test]
    fn thermal_view_recolors_heatsink() {
        let hot = GpuStyle {
            show_thermal: true,
            thermal: GpuThermalState {
                temperature_c: 85.0,
                fan_angle: 0.0,
            },
            ..GpuStyle::default()
        };
        let plain = gpu("g", GpuModel::A100, Vec3::ZERO, Vec3::ZERO, &GpuStyle::default());
        let thermal = gpu("g", GpuModel::A100, Vec3::ZERO, Vec3::ZERO, &hot);
        assert_eq!(heatsink_color(&plain).map(Color::to_hex).as_deref(), Some("#c0c0c0"));
        assert_eq!(heatsink_color(&thermal).map(Color::to_hex).as_deref(), Some("#ff0000"));
    }

    #[test]
    fn performance_ring_only_when_enabled() {
        let has_ring = |style: &GpuStyle| {
            gpu("g", GpuModel::Mi300x, Vec3::ZERO, Vec3::ZERO, style)
                .iter()
                .any(|c| matches!(c, SceneCommand::DrawTorus { .. }))
        };
        assert!(!has_ring(&GpuStyle::default()));
        assert!(has_ring(&GpuStyle {
            show_performance: true,
            ..GpuStyle::default()
        }));
    }

    #[test]
    fn card_floats_with_host_clock() {
        let lift = |time: f64| {
            let style = GpuStyle {
                time,
                ..GpuStyle::default()
            };
            gpu("g", GpuModel::H100, Vec3::new(1.0, 2.0, 0.0), Vec3::ZERO, &style)
                .iter()
                .find_map(|c| match c {
                    SceneCommand::PushTransform { translate, .. } => Some(translate.y),
                    _ => None,
                })
        };
        assert_eq!(lift(0.0), Some(2.0));
        let top = lift(std::f64::consts::PI).unwrap_or_default();
        assert!((top - 2.0 - 2.0 * FLOAT_AMPLITUDE).abs() < 1e-12);
    }

    #[test]
    fn blades_spin_with_simulated_angle() {
        let style = GpuStyle {
            thermal: GpuThermalState {
                temperature_c: 40.0,
                fan_angle: 1.25,
            },
            ..GpuStyle::default()
        };
        let commands = gpu("g", GpuModel::A100, Vec3::ZERO, Vec3::ZERO, &style);
        assert!(commands.iter().any(|c| matches!(
            c,
            SceneCommand::DrawCylinder { spin, .. } if *spin == 1.25
        )));
    }
}
