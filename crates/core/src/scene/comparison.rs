use gpuviz_protocol::{Color, Material, SceneCommand, Vec3};

use crate::metrics::{ComparisonMetric, comparison_bars};

const BAR_WIDTH: f64 = 0.5;
const GRID_SIZE: f64 = 20.0;
const GRID_DIVISIONS: u32 = 20;

/// Side-by-side metric bars for every GPU model over a floor grid.
pub fn hardware_comparison() -> Vec<SceneCommand> {
    let mut commands = Vec::new();
    commands.push(SceneCommand::BeginGroup {
        id: "comparison".to_string(),
        label: Some("Hardware comparison".to_string()),
    });

    for metric in ComparisonMetric::ALL {
        commands.push(SceneCommand::DrawText {
            position: Vec3::new(-4.0, 0.0, metric.row_z()),
            text: metric.title().to_string(),
            color: Color::WHITE,
            font_size: 0.5,
        });
    }

    for bar in comparison_bars() {
        let height = bar.height();
        commands.push(SceneCommand::push_translate(Vec3::new(bar.x, 0.0, bar.z)));
        if height > 0.0 {
            commands.push(SceneCommand::DrawBox {
                center: Vec3::new(0.0, height / 2.0, 0.0),
                size: Vec3::new(BAR_WIDTH, height, BAR_WIDTH),
                material: Material::solid(Color::hex_or_gray(bar.metric.color())),
            });
        }
        commands.push(SceneCommand::DrawText {
            position: Vec3::new(0.0, -0.5, 0.0),
            text: bar.label,
            color: Color::WHITE,
            font_size: 0.3,
        });
        commands.push(SceneCommand::PopTransform);
    }

    commands.push(SceneCommand::DrawGrid {
        center: Vec3::ZERO,
        size: GRID_SIZE,
        divisions: GRID_DIVISIONS,
        center_color: Color::hex_or_gray("#666666"),
        line_color: Color::hex_or_gray("#444444"),
    });
    commands.push(SceneCommand::EndGroup);
    commands
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::is_balanced;

    #[test]
    fn twelve_bars_four_titles_one_grid() {
        let commands = hardware_comparison();
        assert!(is_balanced(&commands));
        let bars = commands
            .iter()
            .filter(|c| matches!(c, SceneCommand::DrawBox { .. }))
            .count();
        let texts = commands
            .iter()
            .filter(|c| matches!(c, SceneCommand::DrawText { .. }))
            .count();
        assert_eq!(bars, 12);
        assert_eq!(texts, 16);
        assert!(commands.iter().any(|c| matches!(
            c,
            SceneCommand::DrawGrid { size, divisions, .. } if *size == 20.0 && *divisions == 20
        )));
    }

    #[test]
    fn bars_never_exceed_full_height() {
        for c in hardware_comparison() {
            if let SceneCommand::DrawBox { size, .. } = c {
                assert!(size.y <= 5.0, "bar of height {}", size.y);
            }
        }
    }
}
