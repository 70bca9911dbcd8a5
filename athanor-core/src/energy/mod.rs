//! Pulse-based energy metering

pub mod meter;

pub use meter::{EnergyCounters, EnergyMeter, PulseOutcome};
