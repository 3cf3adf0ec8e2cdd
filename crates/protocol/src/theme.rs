use serde::{Deserialize, Serialize};

/// Semantic color tokens resolved by the renderer's active theme.
///
/// Hardware colors come straight from the GPU catalog; these tokens cover the
/// chrome around the scene (panels, the builder floor plan, metric status).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ThemeToken {
    Background,
    Surface,
    Border,

    TextPrimary,
    TextSecondary,
    TextMuted,

    Accent,
    AccentMuted,

    // Metric status
    MetricOk,
    MetricWarning,

    // Builder floor plan
    GridBackground,
    GridLine,
    PlacementValid,
    PlacementInvalid,
    ComponentServer,
    ComponentStorage,
    ComponentNetwork,
    ComponentCooling,
    ComponentPower,
}
