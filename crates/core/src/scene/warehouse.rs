use std::f64::consts::FRAC_PI_2;

use gpuviz_protocol::{Color, Material, SceneCommand, Vec3};

use super::{SceneParams, rack};
use crate::hardware::{SUPERCOMPUTER_CONFIGS, SupercomputerConfig};
use crate::metrics::ClusterMetrics;
use crate::thermal::ThermalSimulation;

/// Distance between neighbouring racks on the warehouse floor.
pub const RACK_SPACING: f64 = 2.5;

const COOLING_COLOR: &str = "#60A5FA";
const NETWORK_COLOR: &str = "#8B5CF6";
const HEAT_COLOR: &str = "#EF4444";

/// Preset lookup that tolerates stale UI selections.
pub fn cluster_config(index: usize) -> &'static SupercomputerConfig {
    SUPERCOMPUTER_CONFIGS
        .get(index)
        .unwrap_or(&SUPERCOMPUTER_CONFIGS[0])
}

/// Floor position of the grid cell `(row, col)`.
fn cell(row: u32, col: u32, rows: u32, cols: u32, y: f64) -> Vec3 {
    Vec3::new(
        (f64::from(row) - f64::from(rows) / 2.0) * RACK_SPACING,
        y,
        (f64::from(col) - f64::from(cols) / 2.0) * RACK_SPACING,
    )
}

pub fn warehouse(params: &SceneParams, thermal: &ThermalSimulation) -> Vec<SceneCommand> {
    let config = cluster_config(params.cluster);
    let cluster = ClusterMetrics::compute(config, params.load);
    let (rows, cols) = (cluster.rows, cluster.cols);
    let load = params.load as f32;
    let mut commands = Vec::new();

    commands.push(SceneCommand::BeginGroup {
        id: "warehouse".to_string(),
        label: Some(config.name.to_string()),
    });

    for index in 0..config.rack_count {
        let (row, col) = (index / cols, index % cols);
        commands.extend(rack::server_rack(
            &format!("rack-{index}"),
            cell(row, col, rows, cols, 0.0),
            Vec3::new(0.0, FRAC_PI_2, 0.0),
            config.gpu_model,
            config.gpu_count,
            params,
            thermal,
        ));
    }

    commands.push(SceneCommand::push_translate(Vec3::new(
        f64::from(rows) * 1.5,
        2.0,
        0.0,
    )));
    let labels = [
        (0.6, config.name.to_string(), "#FFFFFF", 0.15),
        (
            0.3,
            format!(
                "{} Racks × {} {}\nTotal: {} GPUs",
                config.rack_count, config.gpu_count, config.gpu_model, cluster.total_gpus
            ),
            "#A78BFA",
            0.1,
        ),
        (
            0.0,
            format!(
                "Current Power: {:.1} kW\nPeak Performance: {:.1} PFLOPS",
                cluster.current_power_kw, cluster.current_compute_pflops
            ),
            "#10B981",
            0.1,
        ),
        (-0.3, config.ai_workload.to_string(), "#94A3B8", 0.08),
    ];
    for (y, text, color, font_size) in labels {
        commands.push(SceneCommand::DrawText {
            position: Vec3::new(0.0, y, 0.0),
            text,
            color: Color::hex_or_gray(color),
            font_size,
        });
    }
    commands.push(SceneCommand::PopTransform);

    if params.show_thermal {
        commands.push(SceneCommand::DrawPlane {
            center: Vec3::new(0.0, 0.1, 0.0),
            width: f64::from(rows) * RACK_SPACING,
            depth: f64::from(cols) * RACK_SPACING,
            material: Material::solid(Color::hex_or_gray(HEAT_COLOR)).translucent(0.1 + load * 0.2),
        });
        let cooling =
            Material::solid(Color::hex_or_gray(COOLING_COLOR)).translucent(0.3 + load * 0.4);
        for row in 0..rows {
            for col in 0..cols {
                commands.push(SceneCommand::DrawCylinder {
                    center: cell(row, col, rows, cols, 3.0),
                    radius_top: 0.2,
                    radius_bottom: 0.1,
                    height: 0.3,
                    spin: 0.0,
                    material: cooling,
                });
            }
        }
    }

    if params.show_performance {
        let network = Color::hex_or_gray(NETWORK_COLOR);
        let link = Material::solid(network)
            .translucent(0.3 + load * 0.5)
            .glowing(network, load * 0.5);
        for i in 0..config.rack_count.saturating_sub(1) {
            let (start_row, start_col) = (i / cols, i % cols);
            let (end_row, end_col) = ((i + 1) / cols, (i + 1) % cols);
            commands.push(SceneCommand::DrawBox {
                center: Vec3::new(
                    (f64::from(start_row + end_row) / 2.0 - f64::from(rows) / 2.0) * RACK_SPACING,
                    0.5,
                    (f64::from(start_col + end_col) / 2.0 - f64::from(cols) / 2.0) * RACK_SPACING,
                ),
                size: Vec3::new(0.05, 0.02, RACK_SPACING),
                material: link,
            });
        }
    }

    commands.push(SceneCommand::EndGroup);
    commands
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::is_balanced;

    fn rack_origins(commands: &[SceneCommand]) -> Vec<Vec3> {
        let mut origins = Vec::new();
        let mut in_rack = false;
        for c in commands {
            match c {
                SceneCommand::BeginGroup { id, .. } => {
                    in_rack = id.starts_with("rack-") && !id.contains('/');
                }
                SceneCommand::PushTransform { translate, .. } if in_rack => {
                    origins.push(*translate);
                    in_rack = false;
                }
                _ => {}
            }
        }
        origins
    }

    #[test]
    fn colossus_lays_out_twelve_racks_on_a_four_by_three_grid() {
        let commands = warehouse(&SceneParams::default(), &ThermalSimulation::new());
        assert!(is_balanced(&commands));
        let origins = rack_origins(&commands);
        assert_eq!(origins.len(), 12);
        // rows = 4, cols = 3: first rack at ((0 − 2) × 2.5, 0, (0 − 1.5) × 2.5)
        assert_eq!(origins[0], Vec3::new(-5.0, 0.0, -3.75));
        assert_eq!(origins[11], Vec3::new(2.5, 0.0, 1.25));
    }

    #[test]
    fn cluster_labels_show_current_figures() {
        let params = SceneParams {
            load: 1.0,
            ..SceneParams::default()
        };
        let commands = warehouse(&params, &ThermalSimulation::new());
        assert!(commands.iter().any(|c| matches!(
            c,
            SceneCommand::DrawText { text, .. }
                if text == "Current Power: 67.2 kW\nPeak Performance: 189.7 PFLOPS"
        )));
        assert!(commands.iter().any(|c| matches!(
            c,
            SceneCommand::DrawText { text, .. } if text.ends_with("Total: 96 GPUs")
        )));
    }

    #[test]
    fn network_links_join_consecutive_racks() {
        let params = SceneParams {
            cluster: 1,
            show_performance: true,
            ..SceneParams::default()
        };
        let commands = warehouse(&params, &ThermalSimulation::new());
        let links = commands
            .iter()
            .filter(|c| matches!(
                c,
                SceneCommand::DrawBox { size, .. } if size.z == RACK_SPACING
            ))
            .count();
        assert_eq!(links, 7);
    }

    #[test]
    fn stale_cluster_index_falls_back_to_first_preset() {
        assert_eq!(cluster_config(99).name, "Colossus AI-1");
        assert_eq!(cluster_config(2).name, "Vision Forge");
    }
}
