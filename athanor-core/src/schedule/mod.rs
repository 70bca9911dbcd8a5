//! Tick scheduling
//!
//! A fixed-capacity timer table implementing [`TickScheduler`]. The firmware
//! polls it from a hardware ticker; tests drive it with simulated time.
//!
//! [`TickScheduler`]: crate::traits::TickScheduler

pub mod table;

pub use table::{TimerTable, MAX_TIMERS};
