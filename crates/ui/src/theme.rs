use gpuviz_protocol::{Color, ThemeToken};

/// Resolved RGBA color for egui rendering.
#[derive(Debug, Clone, Copy)]
pub struct ResolvedColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl ResolvedColor {
    const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub fn to_color32(self) -> egui::Color32 {
        egui::Color32::from_rgba_unmultiplied(self.r, self.g, self.b, self.a)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThemeMode {
    Dark,
    Light,
}

impl ThemeMode {
    pub fn is_dark(self) -> bool {
        self == ThemeMode::Dark
    }
}

pub fn resolve(token: ThemeToken, mode: ThemeMode) -> egui::Color32 {
    match mode {
        ThemeMode::Dark => resolve_dark(token),
        ThemeMode::Light => resolve_light(token),
    }
    .to_color32()
}

/// Scene colors are linear `[0, 1]` floats; egui wants bytes.
pub fn scene_color(color: Color) -> egui::Color32 {
    let byte = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
    egui::Color32::from_rgba_unmultiplied(
        byte(color.r),
        byte(color.g),
        byte(color.b),
        byte(color.a),
    )
}

fn resolve_dark(token: ThemeToken) -> ResolvedColor {
    // Catppuccin Mocha palette
    use ThemeToken::*;
    match token {
        Background => ResolvedColor::rgb(0x11, 0x11, 0x1b), // Crust
        Surface => ResolvedColor::rgb(0x18, 0x18, 0x25),    // Mantle
        Border => ResolvedColor::rgb(0x31, 0x32, 0x44),     // Surface0

        TextPrimary => ResolvedColor::rgb(0xcd, 0xd6, 0xf4), // Text
        TextSecondary => ResolvedColor::rgb(0xba, 0xc2, 0xde), // Subtext1
        TextMuted => ResolvedColor::rgb(0xa6, 0xad, 0xc8),   // Subtext0

        Accent => ResolvedColor::rgb(0xcb, 0xa6, 0xf7), // Mauve
        AccentMuted => ResolvedColor::rgba(0xcb, 0xa6, 0xf7, 60),

        MetricOk => ResolvedColor::rgb(0xa6, 0xe3, 0xa1),      // Green
        MetricWarning => ResolvedColor::rgb(0xf3, 0x8b, 0xa8), // Red

        GridBackground => ResolvedColor::rgb(0x1e, 0x1e, 0x2e), // Base
        GridLine => ResolvedColor::rgb(0x45, 0x47, 0x5a),       // Surface1
        PlacementValid => ResolvedColor::rgba(0xa6, 0xe3, 0xa1, 110),
        PlacementInvalid => ResolvedColor::rgba(0xf3, 0x8b, 0xa8, 110),

        ComponentServer => ResolvedColor::rgb(0xcb, 0xa6, 0xf7),  // Mauve
        ComponentStorage => ResolvedColor::rgb(0x89, 0xb4, 0xfa), // Blue
        ComponentNetwork => ResolvedColor::rgb(0xf9, 0xe2, 0xaf), // Yellow
        ComponentCooling => ResolvedColor::rgb(0x94, 0xe2, 0xd5), // Teal
        ComponentPower => ResolvedColor::rgb(0xfa, 0xb3, 0x87),   // Peach
    }
}

fn resolve_light(token: ThemeToken) -> ResolvedColor {
    use ThemeToken::*;
    match token {
        Background => ResolvedColor::rgb(255, 255, 255),
        Surface => ResolvedColor::rgb(245, 243, 255),
        Border => ResolvedColor::rgb(221, 214, 254),

        TextPrimary => ResolvedColor::rgb(59, 7, 100),
        TextSecondary => ResolvedColor::rgb(88, 28, 135),
        TextMuted => ResolvedColor::rgb(107, 114, 128),

        Accent => ResolvedColor::rgb(107, 33, 168),
        AccentMuted => ResolvedColor::rgba(107, 33, 168, 40),

        MetricOk => ResolvedColor::rgb(16, 185, 129),
        MetricWarning => ResolvedColor::rgb(239, 68, 68),

        GridBackground => ResolvedColor::rgb(250, 250, 252),
        GridLine => ResolvedColor::rgb(210, 210, 220),
        PlacementValid => ResolvedColor::rgba(16, 185, 129, 90),
        PlacementInvalid => ResolvedColor::rgba(239, 68, 68, 90),

        ComponentServer => ResolvedColor::rgb(139, 92, 246),
        ComponentStorage => ResolvedColor::rgb(59, 130, 246),
        ComponentNetwork => ResolvedColor::rgb(245, 158, 11),
        ComponentCooling => ResolvedColor::rgb(6, 182, 212),
        ComponentPower => ResolvedColor::rgb(236, 72, 153),
    }
}

// ── Typography scale ───────────────────────────────────────────────────────

pub const FONT_DISPLAY: f32 = 32.0;
pub const FONT_TITLE: f32 = 18.0;
pub const FONT_BODY: f32 = 12.0;
pub const FONT_CAPTION: f32 = 11.0;

// ── egui visual presets ────────────────────────────────────────────────────

/// Catppuccin Mocha dark visuals for egui widgets.
pub fn gpuviz_dark_visuals() -> egui::Visuals {
    let mut v = egui::Visuals::dark();
    v.panel_fill = egui::Color32::from_rgb(0x18, 0x18, 0x25);
    v.window_fill = egui::Color32::from_rgb(0x1e, 0x1e, 0x2e);
    v.extreme_bg_color = egui::Color32::from_rgb(0x11, 0x11, 0x1b);
    v.faint_bg_color = egui::Color32::from_rgb(0x1e, 0x1e, 0x2e);
    v.widgets.noninteractive.bg_fill = egui::Color32::from_rgb(0x31, 0x32, 0x44);
    v.widgets.noninteractive.fg_stroke =
        egui::Stroke::new(1.0, egui::Color32::from_rgb(0xba, 0xc2, 0xde));
    v.widgets.inactive.bg_fill = egui::Color32::from_rgb(0x45, 0x47, 0x5a);
    v.widgets.hovered.bg_fill = egui::Color32::from_rgb(0x58, 0x5b, 0x70);
    v.widgets.active.bg_fill = egui::Color32::from_rgb(0xcb, 0xa6, 0xf7);
    v.widgets.active.fg_stroke = egui::Stroke::new(1.0, egui::Color32::from_rgb(0x1e, 0x1e, 0x2e));
    v.selection.bg_fill = egui::Color32::from_rgba_unmultiplied(0xcb, 0xa6, 0xf7, 60);
    v.selection.stroke = egui::Stroke::new(1.0, egui::Color32::from_rgb(0xcb, 0xa6, 0xf7));
    v.window_corner_radius = egui::CornerRadius::same(6);
    v.menu_corner_radius = egui::CornerRadius::same(6);
    v.widgets.inactive.corner_radius = egui::CornerRadius::same(5);
    v.widgets.hovered.corner_radius = egui::CornerRadius::same(5);
    v.widgets.active.corner_radius = egui::CornerRadius::same(5);
    v.hyperlink_color = egui::Color32::from_rgb(0x89, 0xb4, 0xfa);
    v.warn_fg_color = egui::Color32::from_rgb(0xf9, 0xe2, 0xaf);
    v.error_fg_color = egui::Color32::from_rgb(0xf3, 0x8b, 0xa8);
    v
}

/// Light visuals with the purple accent of the marketing site.
pub fn gpuviz_light_visuals() -> egui::Visuals {
    let mut v = egui::Visuals::light();
    v.panel_fill = egui::Color32::from_rgb(250, 250, 252);
    v.window_fill = egui::Color32::from_rgb(255, 255, 255);
    v.extreme_bg_color = egui::Color32::from_rgb(255, 255, 255);
    v.faint_bg_color = egui::Color32::from_rgb(245, 243, 255);
    v.widgets.noninteractive.fg_stroke = egui::Stroke::new(1.0, egui::Color32::from_rgb(59, 7, 100));
    v.widgets.inactive.bg_fill = egui::Color32::from_rgb(237, 233, 254);
    v.widgets.hovered.bg_fill = egui::Color32::from_rgb(221, 214, 254);
    v.widgets.active.bg_fill = egui::Color32::from_rgb(107, 33, 168);
    v.widgets.active.fg_stroke = egui::Stroke::new(1.0, egui::Color32::WHITE);
    v.selection.bg_fill = egui::Color32::from_rgba_unmultiplied(107, 33, 168, 50);
    v.selection.stroke = egui::Stroke::new(1.0, egui::Color32::from_rgb(107, 33, 168));
    v.window_corner_radius = egui::CornerRadius::same(6);
    v.menu_corner_radius = egui::CornerRadius::same(6);
    v.widgets.inactive.corner_radius = egui::CornerRadius::same(5);
    v.widgets.hovered.corner_radius = egui::CornerRadius::same(5);
    v.widgets.active.corner_radius = egui::CornerRadius::same(5);
    v.hyperlink_color = egui::Color32::from_rgb(107, 33, 168);
    v.warn_fg_color = egui::Color32::from_rgb(230, 170, 0);
    v.error_fg_color = egui::Color32::from_rgb(211, 47, 47);
    v
}

pub fn visuals(mode: ThemeMode) -> egui::Visuals {
    match mode {
        ThemeMode::Dark => gpuviz_dark_visuals(),
        ThemeMode::Light => gpuviz_light_visuals(),
    }
}

/// Apply the project's typography scale to egui styles.
pub fn apply_typography(ctx: &egui::Context) {
    let mut style = (*ctx.style()).clone();
    style.text_styles.insert(
        egui::TextStyle::Heading,
        egui::FontId::proportional(FONT_TITLE),
    );
    style
        .text_styles
        .insert(egui::TextStyle::Body, egui::FontId::proportional(FONT_BODY));
    style.text_styles.insert(
        egui::TextStyle::Button,
        egui::FontId::proportional(FONT_BODY),
    );
    style.text_styles.insert(
        egui::TextStyle::Small,
        egui::FontId::proportional(FONT_CAPTION),
    );
    style.spacing.item_spacing = egui::vec2(8.0, 6.0);
    style.spacing.button_padding = egui::vec2(8.0, 4.0);
    style.spacing.interact_size.y = 24.0;
    ctx.set_style(style);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scene_colors_round_to_bytes() {
        let c = scene_color(Color::rgba(1.0, 0.5, 0.0, 0.25));
        assert_eq!(c, egui::Color32::from_rgba_unmultiplied(255, 128, 0, 64));
    }

    #[test]
    fn placement_feedback_is_translucent() {
        for mode in [ThemeMode::Dark, ThemeMode::Light] {
            assert!(resolve(ThemeToken::PlacementValid, mode).a() < 255);
            assert!(resolve(ThemeToken::PlacementInvalid, mode).a() < 255);
        }
    }
}
