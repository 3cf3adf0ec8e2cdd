//! Static hardware reference tables. Read-only; passed around by reference.

pub mod cluster;
pub mod consumer;
pub mod gpu;

pub use cluster::{SUPERCOMPUTER_CONFIGS, SupercomputerConfig};
pub use consumer::{CONSUMER_DEVICES, ConsumerDevice, ContributionKind, DeviceKind};
pub use gpu::{GpuModel, GpuSpec, UnknownModel};
