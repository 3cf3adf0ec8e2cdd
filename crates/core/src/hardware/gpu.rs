use std::fmt;
use std::str::FromStr;

use gpuviz_protocol::{TextureRef, Vec3};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// GPU models shown by the app.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum GpuModel {
    #[serde(rename = "A100")]
    A100,
    #[serde(rename = "H100")]
    H100,
    #[serde(rename = "MI300X")]
    Mi300x,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown GPU model: {0:?}")]
pub struct UnknownModel(pub String);

impl GpuModel {
    /// Table order; also the left-to-right order of the overview scene.
    pub const ALL: [GpuModel; 3] = [GpuModel::A100, GpuModel::H100, GpuModel::Mi300x];

    pub fn key(self) -> &'static str {
        match self {
            Self::A100 => "A100",
            Self::H100 => "H100",
            Self::Mi300x => "MI300X",
        }
    }

    pub fn spec(self) -> &'static GpuSpec {
        match self {
            Self::A100 => &A100,
            Self::H100 => &H100,
            Self::Mi300x => &MI300X,
        }
    }
}

impl fmt::Display for GpuModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for GpuModel {
    type Err = UnknownModel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        GpuModel::ALL
            .into_iter()
            .find(|m| m.key().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownModel(s.to_string()))
    }
}

/// Physical and performance attributes of one GPU model.
///
/// Display strings (`memory.capacity`, `compute.tflops`, ...) keep the
/// vendor's formatting; numeric values are extracted from them on demand by
/// [`crate::metrics::parse_leading_number`].
#[derive(Debug, Clone, Serialize)]
pub struct GpuSpec {
    pub name: &'static str,
    /// PCB size in scene units (1 unit = 10 cm).
    pub dimensions: Dimensions,
    pub heatsink: Heatsink,
    pub pcb: Surface,
    pub shroud: Surface,
    pub fans: Fans,
    pub memory: Memory,
    pub compute: Compute,
    pub power: Power,
    pub performance: Performance,
    /// Uniform scale applied when drawing the card.
    pub scale: f64,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct Dimensions {
    pub width: f64,
    pub height: f64,
    pub length: f64,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct Heatsink {
    pub width: f64,
    pub height: f64,
    pub length: f64,
    pub color: &'static str,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct Surface {
    pub color: &'static str,
    pub texture: Option<TextureRef>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Fans {
    pub diameter: f64,
    pub count: u32,
    /// Fan centers relative to the PCB center.
    pub positions: [Vec3; 3],
    pub color: &'static str,
    pub blade_color: &'static str,
    pub max_rpm: f64,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct Memory {
    pub capacity: &'static str,
    pub kind: &'static str,
    pub bandwidth: &'static str,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct Compute {
    pub tflops: &'static str,
    pub architecture: &'static str,
    pub tensor_cores: u32,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct Power {
    pub tdp_watts: f64,
    pub max_temp_c: f64,
    pub cooling: &'static str,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct Performance {
    pub inference_speed: &'static str,
    pub training_capability: &'static str,
    pub efficiency: &'static str,
}

const PCB_GREEN: &str = "#006400";
const FAN_HOUSING: &str = "#2C2C2C";
const FAN_BLADES: &str = "#1A1A1A";

static A100: GpuSpec = GpuSpec {
    name: "NVIDIA A100",
    dimensions: Dimensions {
        width: 1.0,
        height: 0.15,
        length: 1.5,
    },
    heatsink: Heatsink {
        width: 0.9,
        height: 0.3,
        length: 1.4,
        color: "#C0C0C0",
    },
    pcb: Surface {
        color: PCB_GREEN,
        texture: Some(TextureRef::PcbNormal),
    },
    shroud: Surface {
        color: "#D4D4D4",
        texture: Some(TextureRef::ShroudNormal),
    },
    fans: Fans {
        diameter: 0.4,
        count: 3,
        positions: [
            Vec3::new(-0.4, 0.26, 0.0),
            Vec3::new(0.0, 0.26, 0.0),
            Vec3::new(0.4, 0.26, 0.0),
        ],
        color: FAN_HOUSING,
        blade_color: FAN_BLADES,
        max_rpm: 3000.0,
    },
    memory: Memory {
        capacity: "80GB",
        kind: "HBM2e",
        bandwidth: "2 TB/s",
    },
    compute: Compute {
        tflops: "312 TFLOPS (FP16)",
        architecture: "Ampere",
        tensor_cores: 432,
    },
    power: Power {
        tdp_watts: 400.0,
        max_temp_c: 85.0,
        cooling: "Passive + Active Fan Cooling",
    },
    performance: Performance {
        inference_speed: "20 tokens/s (FP16)",
        training_capability: "Suitable for models up to 175B parameters",
        efficiency: "0.78 TFLOPS/W",
    },
    scale: 1.0,
};

static H100: GpuSpec = GpuSpec {
    name: "NVIDIA H100",
    dimensions: Dimensions {
        width: 1.1,
        height: 0.15,
        length: 1.6,
    },
    heatsink: Heatsink {
        width: 1.0,
        height: 0.35,
        length: 1.5,
        color: "#B8B8B8",
    },
    pcb: Surface {
        color: PCB_GREEN,
        texture: Some(TextureRef::PcbNormal),
    },
    shroud: Surface {
        color: "#CCCCCC",
        texture: Some(TextureRef::ShroudNormal),
    },
    fans: Fans {
        diameter: 0.45,
        count: 3,
        positions: [
            Vec3::new(-0.45, 0.28, 0.0),
            Vec3::new(0.0, 0.28, 0.0),
            Vec3::new(0.45, 0.28, 0.0),
        ],
        color: FAN_HOUSING,
        blade_color: FAN_BLADES,
        max_rpm: 3500.0,
    },
    memory: Memory {
        capacity: "141GB",
        kind: "HBM3e",
        bandwidth: "3.9 TB/s",
    },
    compute: Compute {
        tflops: "989 TFLOPS (FP16), 1.98 PFLOPS (FP8)",
        architecture: "Hopper",
        tensor_cores: 528,
    },
    power: Power {
        tdp_watts: 700.0,
        max_temp_c: 90.0,
        cooling: "Advanced Vapor Chamber + Active Fan Cooling",
    },
    performance: Performance {
        inference_speed: "40 tokens/s (FP8)",
        training_capability: "Optimized for trillion-parameter models",
        efficiency: "1.41 TFLOPS/W",
    },
    scale: 1.2,
};

static MI300X: GpuSpec = GpuSpec {
    name: "AMD Instinct MI300X",
    dimensions: Dimensions {
        width: 1.05,
        height: 0.15,
        length: 1.55,
    },
    heatsink: Heatsink {
        width: 0.95,
        height: 0.32,
        length: 1.45,
        color: "#B8B8B8",
    },
    pcb: Surface {
        color: PCB_GREEN,
        texture: Some(TextureRef::PcbNormal),
    },
    shroud: Surface {
        color: "#C8C8C8",
        texture: Some(TextureRef::ShroudNormal),
    },
    fans: Fans {
        diameter: 0.42,
        count: 3,
        positions: [
            Vec3::new(-0.42, 0.27, 0.0),
            Vec3::new(0.0, 0.27, 0.0),
            Vec3::new(0.42, 0.27, 0.0),
        ],
        color: FAN_HOUSING,
        blade_color: FAN_BLADES,
        max_rpm: 3200.0,
    },
    memory: Memory {
        capacity: "192GB",
        kind: "HBM3",
        bandwidth: "5.3 TB/s",
    },
    compute: Compute {
        tflops: "1.6 PFLOPS (FP16)",
        architecture: "CDNA 3",
        tensor_cores: 584,
    },
    power: Power {
        tdp_watts: 750.0,
        max_temp_c: 95.0,
        cooling: "Advanced Vapor Chamber + Active Fan Cooling",
    },
    performance: Performance {
        inference_speed: ">40 tokens/s (FP16)",
        training_capability: "Optimized for large language models and multi-modal AI",
        efficiency: "2.13 TFLOPS/W",
    },
    scale: 1.1,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn model_keys_roundtrip() {
        for model in GpuModel::ALL {
            assert_eq!(model.key().parse::<GpuModel>(), Ok(model));
        }
        assert_eq!("mi300x".parse::<GpuModel>(), Ok(GpuModel::Mi300x));
        assert_eq!(
            "B200".parse::<GpuModel>(),
            Err(UnknownModel("B200".to_string()))
        );
    }

    #[test]
    fn fan_table_matches_count() {
        for model in GpuModel::ALL {
            let fans = &model.spec().fans;
            assert_eq!(fans.positions.len(), fans.count as usize);
        }
    }

    #[test]
    fn serde_uses_vendor_keys() {
        let json = serde_json::to_string(&GpuModel::Mi300x).unwrap_or_default();
        assert_eq!(json, "\"MI300X\"");
    }
}
