//! Hardware driver implementations
//!
//! Concrete implementations of the collaborator traits defined in
//! athanor-core, written against the athanor-hal pin and bus traits:
//!
//! - Thermocouple amplifiers (MAX31855)
//! - Relay outputs (SSR / contactor on a GPIO)

#![no_std]
#![deny(unsafe_code)]

pub mod relay;
pub mod sensor;
