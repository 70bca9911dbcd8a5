//! Safety monitoring
//!
//! Independent checks run on their own cadence, separate from control.

pub mod monitor;

pub use monitor::{SafetyEvent, SafetyEvents, SafetyMonitor};
