use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceKind {
    Laptop,
    Desktop,
    Workstation,
}

/// What an idle consumer machine could contribute to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContributionKind {
    Mining,
    Folding,
    Inference,
}

impl ContributionKind {
    pub const ALL: [ContributionKind; 3] = [
        ContributionKind::Mining,
        ContributionKind::Folding,
        ContributionKind::Inference,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::Mining => "Mining",
            Self::Folding => "Protein folding",
            Self::Inference => "ML inference",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct DeviceSpecs {
    pub gpu: &'static str,
    pub compute_tflops: f64,
    pub memory_gb: f64,
    pub power_watts: f64,
}

/// Full-day contribution figures at 100% idle time.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct Contribution {
    /// Hash rate, H/s.
    pub mining: f64,
    /// Folding@home points per day.
    pub folding: f64,
    /// Inference throughput, tokens/s.
    pub inference: f64,
}

impl Contribution {
    pub fn get(&self, kind: ContributionKind) -> f64 {
        match kind {
            ContributionKind::Mining => self.mining,
            ContributionKind::Folding => self.folding,
            ContributionKind::Inference => self.inference,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct ConsumerDevice {
    pub kind: DeviceKind,
    pub name: &'static str,
    pub specs: DeviceSpecs,
    pub contribution: Contribution,
}

pub static CONSUMER_DEVICES: [ConsumerDevice; 3] = [
    ConsumerDevice {
        kind: DeviceKind::Laptop,
        name: "MacBook Pro M2",
        specs: DeviceSpecs {
            gpu: "M2 Pro",
            compute_tflops: 6.8,
            memory_gb: 32.0,
            power_watts: 65.0,
        },
        contribution: Contribution {
            mining: 25.0,
            folding: 180_000.0,
            inference: 8.0,
        },
    },
    ConsumerDevice {
        kind: DeviceKind::Desktop,
        name: "Gaming PC",
        specs: DeviceSpecs {
            gpu: "RTX 4090",
            compute_tflops: 82.6,
            memory_gb: 24.0,
            power_watts: 450.0,
        },
        contribution: Contribution {
            mining: 150.0,
            folding: 1_200_000.0,
            inference: 40.0,
        },
    },
    ConsumerDevice {
        kind: DeviceKind::Workstation,
        name: "Creator Workstation",
        specs: DeviceSpecs {
            gpu: "RTX 6000 Ada",
            compute_tflops: 91.1,
            memory_gb: 48.0,
            power_watts: 300.0,
        },
        contribution: Contribution {
            mining: 130.0,
            folding: 1_500_000.0,
            inference: 45.0,
        },
    },
];
