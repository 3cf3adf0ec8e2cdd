use gpuviz_protocol::{Color, Material, SceneCommand, Vec3};

pub const AMBIENT_INTENSITY: f32 = 0.5;
pub const SUN_POSITION: Vec3 = Vec3::new(2.5, 8.0, 5.0);
pub const SUN_INTENSITY: f32 = 1.5;
pub const GROUND_SIZE: f64 = 100.0;
/// Tailwind gray-100.
pub const GROUND_COLOR: &str = "#f3f4f6";

/// Lights and ground plane shared by every view.
pub fn stage() -> Vec<SceneCommand> {
    vec![
        SceneCommand::AmbientLight {
            intensity: AMBIENT_INTENSITY,
        },
        SceneCommand::DirectionalLight {
            position: SUN_POSITION,
            intensity: SUN_INTENSITY,
            cast_shadow: true,
        },
        SceneCommand::DrawPlane {
            center: Vec3::ZERO,
            width: GROUND_SIZE,
            depth: GROUND_SIZE,
            material: Material::solid(Color::hex_or_gray(GROUND_COLOR)),
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stage_has_lights_and_ground() {
        let commands = stage();
        assert!(matches!(
            commands[0],
            SceneCommand::AmbientLight { intensity } if intensity == 0.5
        ));
        let Some(SceneCommand::DrawPlane { material, width, .. }) = commands.last() else {
            panic!("stage must end with the ground plane");
        };
        assert_eq!(*width, 100.0);
        assert_eq!(material.color.to_hex(), "#f3f4f6");
    }
}
