//! Heater relay control
//!
//! Bang-bang control with an asymmetric hysteresis differential. There is
//! deliberately no PID stage: kiln elements are switched by contactors that
//! must not chatter.

pub mod actuator;

pub use actuator::Actuator;
