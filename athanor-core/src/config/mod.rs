//! Configuration types
//!
//! Board-agnostic configuration structures. Everything that differed between
//! historical firmware builds (thresholds, cadences, optional peripherals)
//! is expressed here instead of in code.

pub mod types;

pub use types::*;
