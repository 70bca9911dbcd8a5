//! Firing state machine
//!
//! Phase transitions are explicit, finite and deterministic. The profile
//! engine owns the only [`ControlState`]; everything else reads it.

pub mod control;
pub mod events;
pub mod machine;

pub use control::{ControlState, RampDirection};
pub use events::Event;
pub use machine::{FaultKind, Phase};
