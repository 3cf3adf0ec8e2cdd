pub mod commands;
pub mod theme;
pub mod types;

pub use commands::{Material, SceneCommand, TextureRef};
pub use theme::ThemeToken;
pub use types::{Color, Pose, Vec3};
