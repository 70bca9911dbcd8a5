//! Board-agnostic core logic for the kiln controller firmware
//!
//! This crate contains all firing logic that does not depend on specific
//! hardware implementations:
//!
//! - Collaborator traits (sensor, relay, tick scheduler, notifier)
//! - Firing profile types and the profile engine state machine
//! - Sampler, actuator and safety monitoring logic
//! - Interrupt-safe energy metering
//! - Telemetry history and the controller that ties it all together
//! - Configuration type definitions

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod config;
pub mod control;
pub mod controller;
pub mod energy;
pub mod engine;
pub mod profile;
pub mod safety;
pub mod sampler;
pub mod schedule;
pub mod state;
pub mod telemetry;
pub mod traits;

pub use controller::{Controller, StoreRequest};
