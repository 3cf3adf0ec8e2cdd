//! SVG export of the server-builder floor plan.

use gpuviz_protocol::ThemeToken;

use crate::placement::PlacementGrid;

/// Render `grid` as a standalone SVG document, `cell_px` pixels per cell.
///
/// `dark` selects the color palette.
pub fn render_floor_plan(grid: &PlacementGrid, cell_px: f64, dark: bool) -> String {
    let side = f64::from(grid.size()) * cell_px;
    let mut svg = String::with_capacity(512 + grid.components().len() * 200);
    svg.push_str(&format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 {side} {side}" width="{side}" height="{side}" style="font-family:system-ui,-apple-system,sans-serif;font-size:11px">"#,
    ));

    let bg = resolve_color(ThemeToken::GridBackground, dark);
    svg.push_str(&format!(
        r#"<rect width="{side}" height="{side}" fill="{bg}"/>"#,
    ));

    let line = resolve_color(ThemeToken::GridLine, dark);
    for i in 0..=grid.size() {
        let p = f64::from(i) * cell_px;
        svg.push_str(&format!(
            r#"<line x1="{p}" y1="0" x2="{p}" y2="{side}" stroke="{line}" stroke-width="1"/>"#,
        ));
        svg.push_str(&format!(
            r#"<line x1="0" y1="{p}" x2="{side}" y2="{p}" stroke="{line}" stroke-width="1"/>"#,
        ));
    }

    let text_color = resolve_color(ThemeToken::TextPrimary, dark);
    for component in grid.components() {
        let x = f64::from(component.x) * cell_px;
        let y = f64::from(component.y) * cell_px;
        let w = f64::from(component.width) * cell_px;
        let h = f64::from(component.height) * cell_px;
        let fill = resolve_color(component.kind.theme_token(), dark);
        let label = component.kind.label();
        svg.push_str(&format!(
            r#"<rect x="{}" y="{}" width="{}" height="{}" fill="{fill}" rx="2">"#,
            x + 1.0,
            y + 1.0,
            (w - 2.0).max(0.0),
            (h - 2.0).max(0.0),
        ));
        svg.push_str(&format!("<title>{}</title>", escape_xml(label)));
        svg.push_str("</rect>");

        // Only label components wide enough to hold some text
        if w > 30.0 {
            let max_chars = (w / 7.0) as usize;
            let text = if label.chars().count() > max_chars && max_chars > 2 {
                let truncated: String = label.chars().take(max_chars - 1).collect();
                format!("{truncated}…")
            } else {
                label.to_string()
            };
            svg.push_str(&format!(
                r#"<text x="{}" y="{}" fill="{text_color}" style="pointer-events:none">{}</text>"#,
                x + 4.0,
                y + h / 2.0 + 4.0,
                escape_xml(&text),
            ));
        }
    }

    svg.push_str("</svg>");
    svg
}

pub fn resolve_color(token: ThemeToken, dark: bool) -> &'static str {
    if dark {
        match token {
            ThemeToken::Background | ThemeToken::GridBackground => "#181818",
            ThemeToken::Surface => "#232323",
            ThemeToken::Border | ThemeToken::GridLine => "#303030",
            ThemeToken::TextPrimary => "#ececec",
            ThemeToken::TextSecondary | ThemeToken::TextMuted => "#9e9e9e",
            ThemeToken::Accent => "#a78bfa",
            ThemeToken::AccentMuted => "#4c1d95",
            ThemeToken::MetricOk | ThemeToken::PlacementValid => "#4caf50",
            ThemeToken::MetricWarning | ThemeToken::PlacementInvalid => "#f44336",
            ThemeToken::ComponentServer => "#7c3aed",
            ThemeToken::ComponentStorage => "#0ea5e9",
            ThemeToken::ComponentNetwork => "#f59e0b",
            ThemeToken::ComponentCooling => "#06b6d4",
            ThemeToken::ComponentPower => "#ef4444",
        }
    } else {
        match token {
            ThemeToken::Background => "#ffffff",
            ThemeToken::GridBackground => "#f8f9fa",
            ThemeToken::Surface => "#f3f4f6",
            ThemeToken::Border | ThemeToken::GridLine => "#dee2e6",
            ThemeToken::TextPrimary => "#1a1a2e",
            ThemeToken::TextSecondary | ThemeToken::TextMuted => "#666677",
            ThemeToken::Accent => "#6b21a8",
            ThemeToken::AccentMuted => "#e9d5ff",
            ThemeToken::MetricOk | ThemeToken::PlacementValid => "#27ae60",
            ThemeToken::MetricWarning | ThemeToken::PlacementInvalid => "#e63946",
            ThemeToken::ComponentServer => "#8b5cf6",
            ThemeToken::ComponentStorage => "#38bdf8",
            ThemeToken::ComponentNetwork => "#fbbf24",
            ThemeToken::ComponentCooling => "#22d3ee",
            ThemeToken::ComponentPower => "#f87171",
        }
    }
}

fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::placement::PlacementKind;

    #[test]
    fn basic_svg_output() {
        let mut grid = PlacementGrid::new(8);
        grid.place(PlacementKind::GpuServer, 0, 0);
        let svg = render_floor_plan(&grid, 20.0, true);
        assert!(svg.starts_with("<svg"));
        assert!(svg.ends_with("</svg>"));
        assert!(svg.contains(r#"viewBox="0 0 160 160""#));
        assert!(svg.contains("GPU Server"));
        assert!(svg.contains("#7c3aed"));
    }

    #[test]
    fn draws_every_grid_line() {
        let grid = PlacementGrid::new(4);
        let svg = render_floor_plan(&grid, 10.0, false);
        assert_eq!(svg.matches("<line").count(), 10);
    }

    #[test]
    fn narrow_components_are_not_labelled() {
        let mut grid = PlacementGrid::new(8);
        grid.place(PlacementKind::Storage, 0, 0);
        let svg = render_floor_plan(&grid, 20.0, false);
        assert!(svg.contains("<title>Storage</title>"));
        assert!(!svg.contains("<text"));
    }

    #[test]
    fn escapes_xml_entities() {
        assert_eq!(escape_xml("a<b>&\"c\""), "a&lt;b&gt;&amp;&quot;c&quot;");
    }
}
