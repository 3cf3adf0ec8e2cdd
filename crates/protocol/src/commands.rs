use serde::{Deserialize, Serialize};

use crate::types::{Color, Vec3};

/// Surface appearance of a primitive.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Material {
    pub color: Color,
    pub emissive: Option<Color>,
    pub emissive_intensity: f32,
    pub metalness: f32,
    pub roughness: f32,
    /// 1.0 = opaque.
    pub opacity: f32,
    /// Normal map reference, resolved by the host. Hosts that have not
    /// loaded the texture yet render the plain color.
    pub normal_map: Option<TextureRef>,
}

impl Material {
    pub fn solid(color: Color) -> Self {
        Self {
            color,
            emissive: None,
            emissive_intensity: 0.0,
            metalness: 0.0,
            roughness: 1.0,
            opacity: 1.0,
            normal_map: None,
        }
    }

    pub fn metallic(color: Color, metalness: f32, roughness: f32) -> Self {
        Self {
            metalness,
            roughness,
            ..Self::solid(color)
        }
    }

    pub fn glowing(self, emissive: Color, intensity: f32) -> Self {
        Self {
            emissive: Some(emissive),
            emissive_intensity: intensity,
            ..self
        }
    }

    pub fn translucent(self, opacity: f32) -> Self {
        Self { opacity, ..self }
    }

    pub fn with_normal_map(self, texture: Option<TextureRef>) -> Self {
        Self {
            normal_map: texture,
            ..self
        }
    }
}

/// Build-time texture assets shipped with the app.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TextureRef {
    PcbNormal,
    ShroudNormal,
}

impl TextureRef {
    pub fn path(self) -> &'static str {
        match self {
            Self::PcbNormal => "/textures/pcb-normal.png",
            Self::ShroudNormal => "/textures/shroud-normal.png",
        }
    }
}

/// A single, stateless 3D scene instruction.
///
/// Scene composition emits a `Vec<SceneCommand>` per frame. Positions are
/// local to the enclosing transform; renderers walk the list sequentially,
/// maintaining a transform stack.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum SceneCommand {
    /// Axis-aligned (in local space) box centered on `center`.
    DrawBox {
        center: Vec3,
        size: Vec3,
        material: Material,
    },

    /// Cylinder (or truncated cone) whose axis is local +Y.
    DrawCylinder {
        center: Vec3,
        radius_top: f64,
        radius_bottom: f64,
        height: f64,
        /// Rotation about the cylinder's own axis, radians.
        spin: f64,
        material: Material,
    },

    DrawSphere {
        center: Vec3,
        radius: f64,
        material: Material,
    },

    /// Ring lying in the local XZ plane.
    DrawTorus {
        center: Vec3,
        radius: f64,
        tube: f64,
        material: Material,
    },

    /// Horizontal rectangle in the local XZ plane.
    DrawPlane {
        center: Vec3,
        width: f64,
        depth: f64,
        material: Material,
    },

    /// Floor grid of `divisions × divisions` cells spanning `size` units.
    DrawGrid {
        center: Vec3,
        size: f64,
        divisions: u32,
        center_color: Color,
        line_color: Color,
    },

    /// Line segment between two local points.
    DrawLine {
        from: Vec3,
        to: Vec3,
        color: Color,
        width: f64,
    },

    /// Billboard text anchored at a local point. `\n` separates lines.
    DrawText {
        position: Vec3,
        text: String,
        color: Color,
        font_size: f64,
    },

    /// Push a transform (translate · rotate(XYZ euler) · uniform scale),
    /// composed with the current one, until the matching `PopTransform`.
    PushTransform {
        translate: Vec3,
        rotation: Vec3,
        scale: f64,
    },

    PopTransform,

    AmbientLight {
        intensity: f32,
    },

    DirectionalLight {
        position: Vec3,
        intensity: f32,
        cast_shadow: bool,
    },

    /// Begin a logical group (a GPU, a rack). Renderers may use this for
    /// picking or batching.
    BeginGroup {
        id: String,
        label: Option<String>,
    },

    EndGroup,
}

impl SceneCommand {
    pub fn push_translate(translate: Vec3) -> Self {
        Self::PushTransform {
            translate,
            rotation: Vec3::ZERO,
            scale: 1.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn material_builders_compose() {
        let m = Material::metallic(Color::WHITE, 0.8, 0.2)
            .glowing(Color::rgb(1.0, 0.0, 0.0), 0.5)
            .translucent(0.3);
        assert_eq!(m.metalness, 0.8);
        assert_eq!(m.emissive_intensity, 0.5);
        assert_eq!(m.opacity, 0.3);
        assert!(m.normal_map.is_none());
    }

    #[test]
    fn texture_paths() {
        assert_eq!(TextureRef::PcbNormal.path(), "/textures/pcb-normal.png");
        assert_eq!(TextureRef::ShroudNormal.path(), "/textures/shroud-normal.png");
    }

    #[test]
    fn commands_serialize_externally_tagged() {
        let cmd = SceneCommand::push_translate(Vec3::new(1.0, 2.0, 3.0));
        let json = serde_json::to_string(&cmd).unwrap_or_default();
        assert!(json.starts_with("{\"PushTransform\""));
        assert!(json.contains("\"translate\":[1.0,2.0,3.0]"));
    }
}
