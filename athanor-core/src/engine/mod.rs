//! Profile engine
//!
//! Turns a firing profile and the latest sample into a moving setpoint and
//! the phase sequence ramp → hold → ... → cooldown.

pub mod profile_engine;

pub use profile_engine::{CommandError, EngineEvent, EngineEvents, ProfileEngine};
