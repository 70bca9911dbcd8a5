//! Board wiring and built-in defaults
//!
//! Raspberry Pi Pico carrier:
//!
//! | Function            | Pin              |
//! |---------------------|------------------|
//! | MAX31855 SCK/SO/CS  | GP18 / GP16 / GP17 (SPI0) |
//! | Heater SSR          | GP15             |
//! | Contactor           | GP14             |
//! | S0 meter pulse      | GP22             |
//! | Start / abort       | GP20 / GP21      |
//! | Status LED          | GP25             |

use athanor_core::config::Capabilities;
use athanor_core::profile::Segment;

/// Peripherals fitted on this board
pub const CAPABILITIES: Capabilities = Capabilities {
    has_energy_meter: true,
    has_enable_relay: true,
    has_status_led: true,
};

/// Set when the SSR driver sinks current (GPIO low = heater on)
pub const HEATER_ACTIVE_LOW: bool = false;

/// Contactor driver polarity
pub const ENABLE_ACTIVE_LOW: bool = false;

/// MAX31855 maximum SCK is 5 MHz
pub const THERMOCOUPLE_SPI_HZ: u32 = 4_000_000;

/// Profile started by the start button
///
/// Slow dry-out soak, then up to 550°C for a short hold.
pub const DEFAULT_PROFILE: [Segment; 2] = [
    Segment::new(100.0, 80.0, 30),
    Segment::new(550.0, 150.0, 15),
];
