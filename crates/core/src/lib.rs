//! Core logic for gpuviz: static hardware tables, metric arithmetic, the
//! camera transition animator, builder grid placement, and scene
//! composition into [`gpuviz_protocol::SceneCommand`] lists.

pub mod builder;
pub mod camera;
pub mod config;
pub mod hardware;
pub mod metrics;
pub mod placement;
pub mod scene;
pub mod svg;
pub mod thermal;
pub mod view;
