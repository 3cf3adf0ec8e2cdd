use std::f64::consts::FRAC_PI_2;

use gpuviz_protocol::{Color, Material, SceneCommand, Vec3};

use super::SceneParams;
use crate::hardware::DeviceKind;
use crate::metrics::{consumer_device, idle_contribution};

pub const PARTICLE_COUNT: u32 = 10;
/// Seconds for one particle to rise and fade out.
const PARTICLE_PERIOD: f64 = 2.0;
const PARTICLE_RADIUS: f64 = 0.1;
const PARTICLE_COLOR: &str = "#8B5CF6";

/// Rise fraction in `[0, 1)` of particle `index` at time `time`.
pub fn particle_phase(time: f64, index: u32) -> f64 {
    (time + f64::from(index) * 0.1).rem_euclid(PARTICLE_PERIOD) / PARTICLE_PERIOD
}

/// A consumer machine with its idle-time contribution rising off it.
pub fn idle_compute(params: &SceneParams) -> Vec<SceneCommand> {
    let device = consumer_device(params.device);
    let mut commands = Vec::new();
    commands.push(SceneCommand::BeginGroup {
        id: "idle".to_string(),
        label: Some(device.name.to_string()),
    });

    commands.push(SceneCommand::DrawBox {
        center: Vec3::ZERO,
        size: Vec3::new(0.8, 0.05, 0.6),
        material: Material::solid(Color::hex_or_gray("#2C2C2C")),
    });

    match device.kind {
        DeviceKind::Laptop => {
            commands.push(SceneCommand::DrawBox {
                center: Vec3::new(0.0, 0.025, 0.0),
                size: Vec3::new(0.6, 0.02, 0.4),
                material: Material::metallic(Color::hex_or_gray("#666666"), 0.8, 0.2),
            });
            commands.push(SceneCommand::PushTransform {
                translate: Vec3::new(0.0, 0.2, -0.15),
                rotation: Vec3::new(-0.3, 0.0, 0.0),
                scale: 1.0,
            });
            commands.push(SceneCommand::DrawBox {
                center: Vec3::ZERO,
                size: Vec3::new(0.6, 0.4, 0.02),
                material: Material::metallic(Color::hex_or_gray("#333333"), 0.5, 0.5),
            });
            commands.push(SceneCommand::PopTransform);
        }
        DeviceKind::Desktop | DeviceKind::Workstation => {
            commands.push(SceneCommand::DrawBox {
                center: Vec3::new(0.0, 0.3, 0.0),
                size: Vec3::new(0.3, 0.5, 0.4),
                material: Material::metallic(Color::hex_or_gray("#444444"), 0.6, 0.4),
            });
            // Front vent, stood upright to face +Z.
            commands.push(SceneCommand::PushTransform {
                translate: Vec3::new(0.0, 0.3, 0.201),
                rotation: Vec3::new(FRAC_PI_2, 0.0, 0.0),
                scale: 1.0,
            });
            commands.push(SceneCommand::DrawPlane {
                center: Vec3::ZERO,
                width: 0.25,
                depth: 0.45,
                material: Material::metallic(Color::hex_or_gray("#333333"), 0.7, 0.3)
                    .translucent(0.8),
            });
            commands.push(SceneCommand::PopTransform);
        }
    }

    if params.show_contribution {
        let glow = Color::hex_or_gray(PARTICLE_COLOR);
        for i in 0..PARTICLE_COUNT {
            let t = particle_phase(params.time, i);
            let fade = 1.0 - t;
            commands.push(SceneCommand::DrawSphere {
                center: Vec3::new(0.0, t * 2.0, 0.0),
                radius: PARTICLE_RADIUS * fade * 0.2,
                material: Material::solid(glow)
                    .glowing(glow, 0.5)
                    .translucent(fade as f32),
            });
        }
    }

    commands.push(SceneCommand::push_translate(Vec3::new(0.5, 0.3, 0.0)));
    commands.push(SceneCommand::DrawText {
        position: Vec3::new(0.0, 0.2, 0.0),
        text: device.name.to_string(),
        color: Color::WHITE,
        font_size: 0.08,
    });
    commands.push(SceneCommand::DrawText {
        position: Vec3::ZERO,
        text: format!(
            "{} TFLOPS\n{}GB Memory",
            device.specs.compute_tflops, device.specs.memory_gb
        ),
        color: Color::hex_or_gray("#A78BFA"),
        font_size: 0.06,
    });
    if params.show_contribution {
        let contribution = idle_contribution(device, params.contribution, params.idle_hours);
        commands.push(SceneCommand::DrawText {
            position: Vec3::new(0.0, -0.2, 0.0),
            text: format!(
                "Idle Contribution:\n{}\n({}h/day)",
                contribution.label, params.idle_hours
            ),
            color: Color::hex_or_gray("#10B981"),
            font_size: 0.06,
        });
    }
    commands.push(SceneCommand::PopTransform);

    commands.push(SceneCommand::EndGroup);
    commands
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hardware::ContributionKind;
    use crate::scene::is_balanced;

    fn texts(commands: &[SceneCommand]) -> Vec<&str> {
        commands
            .iter()
            .filter_map(|c| match c {
                SceneCommand::DrawText { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn laptop_defaults() {
        let commands = idle_compute(&SceneParams::default());
        assert!(is_balanced(&commands));
        assert_eq!(
            texts(&commands),
            [
                "MacBook Pro M2",
                "6.8 TFLOPS\n32GB Memory",
                "Idle Contribution:\n4.0 tokens/s\n(12h/day)",
            ]
        );
    }

    #[test]
    fn desktop_folding_contribution() {
        let params = SceneParams {
            device: 1,
            contribution: ContributionKind::Folding,
            idle_hours: 24.0,
            ..SceneParams::default()
        };
        let commands = idle_compute(&params);
        assert!(texts(&commands).contains(&"Idle Contribution:\n1200.0k points/day\n(24h/day)"));
        assert!(commands.iter().any(|c| matches!(c, SceneCommand::DrawPlane { .. })));
    }

    #[test]
    fn particles_hidden_without_contribution() {
        let params = SceneParams {
            show_contribution: false,
            ..SceneParams::default()
        };
        let commands = idle_compute(&params);
        assert!(!commands.iter().any(|c| matches!(c, SceneCommand::DrawSphere { .. })));
        assert_eq!(texts(&commands).len(), 2);
    }

    #[test]
    fn particle_phase_wraps_every_two_seconds() {
        assert_eq!(particle_phase(0.0, 0), 0.0);
        assert!((particle_phase(1.0, 0) - 0.5).abs() < 1e-12);
        assert!((particle_phase(2.5, 0) - 0.25).abs() < 1e-12);
        assert!((particle_phase(0.0, 5) - 0.25).abs() < 1e-12);
    }
}
