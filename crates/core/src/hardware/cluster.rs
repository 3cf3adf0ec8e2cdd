use serde::Serialize;

use super::GpuModel;

/// A warehouse-scale cluster preset.
///
/// Totals are recorded figures at full load (power in kW, compute in
/// PFLOPS), not derived from the per-GPU display strings.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct SupercomputerConfig {
    pub name: &'static str,
    pub description: &'static str,
    pub gpu_model: GpuModel,
    /// GPUs per rack.
    pub gpu_count: u32,
    pub rack_count: u32,
    pub total_power_kw: f64,
    pub total_compute_pflops: f64,
    pub ai_workload: &'static str,
}

impl SupercomputerConfig {
    pub fn total_gpus(&self) -> u32 {
        self.rack_count * self.gpu_count
    }
}

pub static SUPERCOMPUTER_CONFIGS: [SupercomputerConfig; 3] = [
    SupercomputerConfig {
        name: "Colossus AI-1",
        description: "Large language model training cluster",
        gpu_model: GpuModel::H100,
        gpu_count: 8,
        rack_count: 12,
        // 12 racks × 8 GPUs × 700 W
        total_power_kw: 67.2,
        // 12 racks × 8 GPUs × 1.98 PFLOPS
        total_compute_pflops: 189.7,
        ai_workload: "Training foundation models up to 1T parameters",
    },
    SupercomputerConfig {
        name: "DeepSeek Cluster",
        description: "High-throughput inference setup",
        gpu_model: GpuModel::A100,
        gpu_count: 8,
        rack_count: 8,
        total_power_kw: 25.6,
        total_compute_pflops: 20.0,
        ai_workload: "Serving DeepSeek-70B with 4K requests/s",
    },
    SupercomputerConfig {
        name: "Vision Forge",
        description: "Multi-modal AI processing center",
        gpu_model: GpuModel::Mi300x,
        gpu_count: 4,
        rack_count: 16,
        total_power_kw: 48.0,
        total_compute_pflops: 102.4,
        ai_workload: "Stable Diffusion XL and multi-modal model training",
    },
];
