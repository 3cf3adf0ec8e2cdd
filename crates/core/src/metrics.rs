//! Illustrative performance and power arithmetic.
//!
//! Every function here is pure. Display strings from the hardware table are
//! parsed with [`parse_leading_number`], which degrades to `0.0` instead of
//! failing so that a malformed table entry shows a wrong number rather than
//! breaking the page.

use serde::Serialize;

use crate::hardware::{
    CONSUMER_DEVICES, ConsumerDevice, ContributionKind, GpuModel, GpuSpec, SupercomputerConfig,
};

/// Utilization above this ratio is shown as near capacity.
pub const NEAR_CAPACITY_THRESHOLD: f64 = 0.8;

/// Default rack power budget (watts) for a standard 42U rack.
pub const DEFAULT_RACK_POWER_CAPACITY_W: f64 = 15_000.0;

/// Extract the first decimal numeral in `s` (`312 TFLOPS` → 312.0,
/// `3.9 TB/s` → 3.9). Returns 0.0 when `s` contains no digits.
pub fn parse_leading_number(s: &str) -> f64 {
    let bytes = s.as_bytes();
    let Some(start) = bytes.iter().position(u8::is_ascii_digit) else {
        return 0.0;
    };
    let mut end = start;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    if end + 1 < bytes.len() && bytes[end] == b'.' && bytes[end + 1].is_ascii_digit() {
        end += 1;
        while end < bytes.len() && bytes[end].is_ascii_digit() {
            end += 1;
        }
    }
    s[start..end].parse().unwrap_or(0.0)
}

/// Aggregate TFLOPS for `count` units.
///
/// Load does not scale compute: the figure is peak capability. The parameter
/// is kept so call sites read the same as [`total_power`].
pub fn total_compute(spec: &GpuSpec, count: u32, _load: f64) -> f64 {
    parse_leading_number(spec.compute.tflops) * f64::from(count)
}

/// Aggregate memory in GB for `count` units.
pub fn total_memory(spec: &GpuSpec, count: u32) -> f64 {
    parse_leading_number(spec.memory.capacity) * f64::from(count)
}

/// Power draw in kW for `count` units at the given load fraction.
pub fn total_power(spec: &GpuSpec, count: u32, load: f64) -> f64 {
    spec.power.tdp_watts * f64::from(count) * load / 1000.0
}

/// Ratio of power draw (kW) to a capacity given in watts.
pub fn power_utilization(total_power_kw: f64, capacity_w: f64) -> f64 {
    if capacity_w <= 0.0 {
        return 0.0;
    }
    total_power_kw * 1000.0 / capacity_w
}

pub fn is_near_capacity(utilization: f64, threshold: f64) -> bool {
    utilization > threshold
}

/// Everything the rack scene and the builder summary show for one rack.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RackMetrics {
    pub model: GpuModel,
    pub gpu_count: u32,
    pub total_tflops: f64,
    pub total_memory_gb: f64,
    pub power_kw: f64,
    pub utilization: f64,
    pub near_capacity: bool,
}

impl RackMetrics {
    pub fn compute(
        model: GpuModel,
        gpu_count: u32,
        load: f64,
        capacity_w: f64,
        threshold: f64,
    ) -> Self {
        let spec = model.spec();
        let power_kw = total_power(spec, gpu_count, load);
        let utilization = power_utilization(power_kw, capacity_w);
        Self {
            model,
            gpu_count,
            total_tflops: total_compute(spec, gpu_count, load),
            total_memory_gb: total_memory(spec, gpu_count),
            power_kw,
            utilization,
            near_capacity: is_near_capacity(utilization, threshold),
        }
    }

    /// `"8x H100\n7912 TFLOPS\n1128GB Memory"`
    pub fn capacity_label(&self) -> String {
        format!(
            "{}x {}\n{:.0} TFLOPS\n{:.0}GB Memory",
            self.gpu_count, self.model, self.total_tflops, self.total_memory_gb
        )
    }

    /// `"Power: 2.8kW\n19% Capacity"`
    pub fn power_label(&self) -> String {
        format!(
            "Power: {:.1}kW\n{:.0}% Capacity",
            self.power_kw,
            self.utilization * 100.0
        )
    }
}

/// Live figures for a cluster preset at a given load.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClusterMetrics {
    pub total_gpus: u32,
    pub current_power_kw: f64,
    pub current_compute_pflops: f64,
    /// Rack grid rows (x axis in the warehouse scene).
    pub rows: u32,
    /// Rack grid columns (z axis in the warehouse scene).
    pub cols: u32,
}

impl ClusterMetrics {
    pub fn compute(config: &SupercomputerConfig, load: f64) -> Self {
        let (rows, cols) = rack_grid(config.rack_count);
        Self {
            total_gpus: config.total_gpus(),
            current_power_kw: config.total_power_kw * load,
            current_compute_pflops: config.total_compute_pflops * load,
            rows,
            cols,
        }
    }
}

/// Near-square grid that fits `racks`: `rows = ceil(sqrt(n))`,
/// `cols = ceil(n / rows)`.
pub fn rack_grid(racks: u32) -> (u32, u32) {
    if racks == 0 {
        return (0, 0);
    }
    let rows = f64::from(racks).sqrt().ceil() as u32;
    let cols = racks.div_ceil(rows);
    (rows, cols)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ComparisonMetric {
    Compute,
    Memory,
    Bandwidth,
    Efficiency,
}

impl ComparisonMetric {
    pub const ALL: [ComparisonMetric; 4] = [
        ComparisonMetric::Compute,
        ComparisonMetric::Memory,
        ComparisonMetric::Bandwidth,
        ComparisonMetric::Efficiency,
    ];

    pub fn title(self) -> &'static str {
        match self {
            Self::Compute => "Compute (TFLOPS)",
            Self::Memory => "Memory (GB)",
            Self::Bandwidth => "Bandwidth (TB/s)",
            Self::Efficiency => "Efficiency (TFLOPS/W)",
        }
    }

    /// Value that maps to a full-height bar.
    pub fn max_value(self) -> f64 {
        match self {
            Self::Compute => 2000.0,
            Self::Memory => 200.0,
            Self::Bandwidth => 6.0,
            Self::Efficiency => 3.0,
        }
    }

    /// Row depth in the comparison scene.
    pub fn row_z(self) -> f64 {
        match self {
            Self::Compute => 0.0,
            Self::Memory => 2.0,
            Self::Bandwidth => 4.0,
            Self::Efficiency => 6.0,
        }
    }

    pub fn color(self) -> &'static str {
        match self {
            Self::Compute => "#8B5CF6",
            Self::Memory => "#10B981",
            Self::Bandwidth => "#3B82F6",
            Self::Efficiency => "#EC4899",
        }
    }
}

pub const BAR_MAX_HEIGHT: f64 = 5.0;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricBar {
    pub metric: ComparisonMetric,
    pub model: GpuModel,
    pub label: String,
    pub value: f64,
    pub max_value: f64,
    /// Base of the bar in scene space.
    pub x: f64,
    pub z: f64,
}

impl MetricBar {
    pub fn height(&self) -> f64 {
        if self.max_value <= 0.0 {
            return 0.0;
        }
        self.value / self.max_value * BAR_MAX_HEIGHT
    }
}

/// Normalized comparison bars for every model, grouped metric-major.
pub fn comparison_bars() -> Vec<MetricBar> {
    let mut bars = Vec::with_capacity(ComparisonMetric::ALL.len() * GpuModel::ALL.len());
    for metric in ComparisonMetric::ALL {
        for (index, model) in GpuModel::ALL.into_iter().enumerate() {
            let spec = model.spec();
            let (value, label) = match metric {
                ComparisonMetric::Compute => (
                    parse_leading_number(spec.compute.tflops),
                    format!("{}\n{}", spec.name, spec.compute.tflops),
                ),
                ComparisonMetric::Memory => (
                    parse_leading_number(spec.memory.capacity),
                    format!("{}\n{}", spec.memory.capacity, spec.memory.kind),
                ),
                ComparisonMetric::Bandwidth => (
                    parse_leading_number(spec.memory.bandwidth),
                    spec.memory.bandwidth.to_string(),
                ),
                ComparisonMetric::Efficiency => (
                    parse_leading_number(spec.performance.efficiency),
                    spec.performance.efficiency.to_string(),
                ),
            };
            bars.push(MetricBar {
                metric,
                model,
                label,
                value,
                max_value: metric.max_value(),
                x: (index as f64 - 1.0) * 2.0,
                z: metric.row_z(),
            });
        }
    }
    bars
}

/// Daily contribution of an idle consumer device.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IdleContribution {
    pub kind: ContributionKind,
    pub value: f64,
    pub label: String,
}

pub fn idle_contribution(
    device: &ConsumerDevice,
    kind: ContributionKind,
    idle_hours: f64,
) -> IdleContribution {
    let value = device.contribution.get(kind) * (idle_hours / 24.0);
    let label = match kind {
        ContributionKind::Mining => format!("{value:.1} H/s"),
        ContributionKind::Folding => format!("{:.1}k points/day", value / 1000.0),
        ContributionKind::Inference => format!("{value:.1} tokens/s"),
    };
    IdleContribution { kind, value, label }
}

/// Index lookup that tolerates stale UI selections.
pub fn consumer_device(index: usize) -> &'static ConsumerDevice {
    CONSUMER_DEVICES
        .get(index)
        .unwrap_or(&CONSUMER_DEVICES[0])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hardware::SUPERCOMPUTER_CONFIGS;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn parses_leading_integer() {
        assert_eq!(parse_leading_number("312 TFLOPS (FP16)"), 312.0);
    }

    #[test]
    fn parses_only_first_numeral() {
        assert_eq!(
            parse_leading_number("989 TFLOPS (FP16), 1.98 PFLOPS (FP8)"),
            989.0
        );
    }

    #[test]
    fn missing_number_degrades_to_zero() {
        assert_eq!(parse_leading_number("no digits here"), 0.0);
        assert_eq!(parse_leading_number(""), 0.0);
    }

    #[test]
    fn parses_decimals_and_embedded_numbers() {
        assert_eq!(parse_leading_number("3.9 TB/s"), 3.9);
        assert_eq!(parse_leading_number(">40 tokens/s"), 40.0);
        assert_eq!(parse_leading_number("141GB"), 141.0);
        // A trailing dot is not part of the numeral.
        assert_eq!(parse_leading_number("12. units"), 12.0);
    }

    #[test]
    fn every_table_string_parses_nonzero() {
        for model in GpuModel::ALL {
            let spec = model.spec();
            for s in [
                spec.compute.tflops,
                spec.memory.capacity,
                spec.memory.bandwidth,
                spec.performance.efficiency,
            ] {
                assert!(parse_leading_number(s) > 0.0, "{model}: {s:?}");
            }
        }
    }

    #[test]
    fn power_for_eight_h100_at_half_load() {
        let kw = total_power(GpuModel::H100.spec(), 8, 0.5);
        assert!(close(kw, 2.8));
    }

    #[test]
    fn compute_and_memory_scale_with_count() {
        let spec = GpuModel::A100.spec();
        assert!(close(total_compute(spec, 4, 0.1), 1248.0));
        assert!(close(total_memory(spec, 4), 320.0));
    }

    #[test]
    fn rack_metrics_labels() {
        let m = RackMetrics::compute(
            GpuModel::H100,
            8,
            0.5,
            DEFAULT_RACK_POWER_CAPACITY_W,
            NEAR_CAPACITY_THRESHOLD,
        );
        assert_eq!(m.capacity_label(), "8x H100\n7912 TFLOPS\n1128GB Memory");
        assert_eq!(m.power_label(), "Power: 2.8kW\n19% Capacity");
        assert!(!m.near_capacity);
    }

    #[test]
    fn near_capacity_is_strictly_above_threshold() {
        assert!(!is_near_capacity(0.8, NEAR_CAPACITY_THRESHOLD));
        assert!(is_near_capacity(0.81, NEAR_CAPACITY_THRESHOLD));
        // 24 × 750 W at full load is 18 kW against a 15 kW rack.
        let m = RackMetrics::compute(GpuModel::Mi300x, 24, 1.0, 15_000.0, 0.8);
        assert!(m.near_capacity);
        assert!(close(m.utilization, 1.2));
    }

    #[test]
    fn zero_capacity_is_not_a_division_by_zero() {
        assert_eq!(power_utilization(5.0, 0.0), 0.0);
    }

    #[test]
    fn rack_grid_shapes() {
        assert_eq!(rack_grid(12), (4, 3));
        assert_eq!(rack_grid(8), (3, 3));
        assert_eq!(rack_grid(16), (4, 4));
        assert_eq!(rack_grid(1), (1, 1));
        assert_eq!(rack_grid(0), (0, 0));
    }

    #[test]
    fn cluster_metrics_scale_with_load() {
        let m = ClusterMetrics::compute(&SUPERCOMPUTER_CONFIGS[0], 0.5);
        assert_eq!(m.total_gpus, 96);
        assert!(close(m.current_power_kw, 33.6));
        assert!(close(m.current_compute_pflops, 94.85));
    }

    #[test]
    fn comparison_bars_layout() {
        let bars = comparison_bars();
        assert_eq!(bars.len(), 12);
        let h100_compute = bars
            .iter()
            .find(|b| b.metric == ComparisonMetric::Compute && b.model == GpuModel::H100);
        let Some(bar) = h100_compute else {
            panic!("missing H100 compute bar");
        };
        assert_eq!(bar.x, 0.0);
        assert!(close(bar.height(), 989.0 / 2000.0 * 5.0));
        assert!(bars.iter().all(|b| b.x == -2.0 || b.x == 0.0 || b.x == 2.0));
    }

    #[test]
    fn idle_contribution_labels() {
        let desktop = consumer_device(1);
        let c = idle_contribution(desktop, ContributionKind::Inference, 12.0);
        assert!(close(c.value, 20.0));
        assert_eq!(c.label, "20.0 tokens/s");

        let f = idle_contribution(desktop, ContributionKind::Folding, 12.0);
        assert_eq!(f.label, "600.0k points/day");

        let m = idle_contribution(consumer_device(0), ContributionKind::Mining, 24.0);
        assert_eq!(m.label, "25.0 H/s");
    }

    #[test]
    fn stale_device_index_falls_back() {
        assert_eq!(consumer_device(99).name, "MacBook Pro M2");
    }
}
