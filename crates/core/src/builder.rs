//! "Build your own server" state: a list of rack configurations, the load
//! slider and the floor-plan grid. Everything is in memory only.

use serde::{Deserialize, Serialize};

use crate::config::AppConfig;
use crate::hardware::GpuModel;
use crate::metrics::{self, RackMetrics};
use crate::placement::PlacementGrid;
use crate::svg;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerConfiguration {
    pub name: String,
    pub gpu_model: GpuModel,
    /// GPUs per rack.
    pub gpu_count: u32,
    pub rack_count: u32,
}

impl Default for ServerConfiguration {
    fn default() -> Self {
        Self {
            name: "New server".to_string(),
            gpu_model: GpuModel::H100,
            gpu_count: 8,
            rack_count: 1,
        }
    }
}

impl ServerConfiguration {
    pub fn total_gpus(&self) -> u32 {
        self.gpu_count.saturating_mul(self.rack_count)
    }
}

/// Derived figures for one configuration at the builder's load.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BuildSummary {
    pub total_gpus: u32,
    pub total_tflops: f64,
    pub total_memory_gb: f64,
    pub total_power_kw: f64,
    /// Per-rack utilization; every rack in a configuration is identical.
    pub rack: RackMetrics,
}

#[derive(Debug, Clone)]
pub struct ServerBuilder {
    configurations: Vec<ServerConfiguration>,
    selected: Option<usize>,
    load: f64,
    rack_power_capacity_w: f64,
    near_capacity_threshold: f64,
    pub grid: PlacementGrid,
}

impl Default for ServerBuilder {
    fn default() -> Self {
        Self::from_config(&AppConfig::default())
    }
}

impl ServerBuilder {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            configurations: Vec::new(),
            selected: None,
            load: config.default_load,
            rack_power_capacity_w: config.rack_power_capacity_w,
            near_capacity_threshold: config.near_capacity_threshold,
            grid: PlacementGrid::new(config.grid_size),
        }
    }

    pub fn configurations(&self) -> &[ServerConfiguration] {
        &self.configurations
    }

    pub fn load(&self) -> f64 {
        self.load
    }

    pub fn set_load(&mut self, load: f64) {
        self.load = load.clamp(0.0, 1.0);
    }

    /// Append a configuration and select it. Returns its index.
    pub fn add(&mut self, config: ServerConfiguration) -> usize {
        tracing::debug!(name = %config.name, model = %config.gpu_model, "configuration added");
        self.configurations.push(config);
        let index = self.configurations.len() - 1;
        self.selected = Some(index);
        index
    }

    /// Replace the configuration at `index`. Returns `false` if out of range.
    pub fn update(&mut self, index: usize, config: ServerConfiguration) -> bool {
        let Some(slot) = self.configurations.get_mut(index) else {
            return false;
        };
        tracing::debug!(index, name = %config.name, "configuration updated");
        *slot = config;
        true
    }

    /// Remove the configuration at `index`, keeping the selection on the
    /// same entry where it still exists.
    pub fn remove(&mut self, index: usize) -> Option<ServerConfiguration> {
        if index >= self.configurations.len() {
            return None;
        }
        let removed = self.configurations.remove(index);
        tracing::debug!(index, name = %removed.name, "configuration removed");
        self.selected = match self.selected {
            Some(s) if s == index => {
                if self.configurations.is_empty() {
                    None
                } else {
                    Some(index.min(self.configurations.len() - 1))
                }
            }
            Some(s) if s > index => Some(s - 1),
            other => other,
        };
        Some(removed)
    }

    /// Select the configuration at `index`; out-of-range clears the
    /// selection.
    pub fn select(&mut self, index: usize) {
        self.selected = (index < self.configurations.len()).then_some(index);
    }

    pub fn selected_index(&self) -> Option<usize> {
        self.selected
    }

    pub fn selected(&self) -> Option<&ServerConfiguration> {
        self.selected.and_then(|i| self.configurations.get(i))
    }

    pub fn summary(&self, config: &ServerConfiguration) -> BuildSummary {
        let spec = config.gpu_model.spec();
        let total_gpus = config.total_gpus();
        BuildSummary {
            total_gpus,
            total_tflops: metrics::total_compute(spec, total_gpus, self.load),
            total_memory_gb: metrics::total_memory(spec, total_gpus),
            total_power_kw: metrics::total_power(spec, total_gpus, self.load),
            rack: RackMetrics::compute(
                config.gpu_model,
                config.gpu_count,
                self.load,
                self.rack_power_capacity_w,
                self.near_capacity_threshold,
            ),
        }
    }

    pub fn floor_plan_svg(&self, cell_px: f64, dark: bool) -> String {
        svg::render_floor_plan(&self.grid, cell_px, dark)
    }
}
