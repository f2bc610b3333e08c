//! Safety monitoring
//!
//! Guards against runs that never finish and against implausible recovery
//! data read back after power loss.

pub mod monitor;

pub use monitor::{SafetyMonitor, SafetyStatus};
