//! Temperature history for charting

pub mod buffer;

pub use buffer::{TelemetryBuffer, TelemetryPoint};
