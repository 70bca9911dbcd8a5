//! RP2040-specific HAL for the kiln controller
//!
//! Implements the shared `athanor-hal` traits on top of `embassy-rp`:
//!
//! - GPIO outputs for the relays and the amplifier chip select
//! - Blocking SPI for the thermocouple amplifier
//! - Flash storage driver (implements `athanor_hal::FlashStorage`)

#![no_std]

pub mod flash;
pub mod gpio;
pub mod spi;

// Re-export shared traits from athanor-hal for convenience
pub use athanor_hal::{FlashStorage as FlashStorageTrait, StorageKey};
