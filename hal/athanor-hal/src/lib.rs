//! Athanor Hardware Abstraction Layer
//!
//! Hardware abstraction traits implemented by chip-specific HALs, so the
//! drivers and the firmware glue stay independent of the microcontroller.
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  athanor-firmware / athanor-drivers     │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  athanor-hal (this crate - traits)      │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  athanor-hal-rp2040                     │
//! └─────────────────────────────────────────┘
//! ```
//!
//! # Traits
//!
//! - [`gpio::OutputPin`] - Digital outputs (relays, chip selects)
//! - [`spi::SpiBus`] - SPI bus operations
//! - [`flash::FlashStorage`] - Persistent key-value storage

#![no_std]
#![deny(unsafe_code)]

pub mod flash;
pub mod gpio;
pub mod spi;

pub use flash::{FlashError, FlashStorage, StorageKey};
pub use gpio::OutputPin;
pub use spi::SpiBus;
