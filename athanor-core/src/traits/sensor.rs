//! Temperature sensor trait

/// Thermocouple shorted to ground
pub const FAULT_SHORT_TO_GROUND: u8 = 0b001;
/// Thermocouple shorted to supply
pub const FAULT_SHORT_TO_VCC: u8 = 0b010;
/// Thermocouple open circuit (probe missing or broken)
pub const FAULT_OPEN_CIRCUIT: u8 = 0b100;

/// Errors that can occur reading the thermocouple amplifier
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SensorError {
    /// Bus transfer failed
    Bus,
    /// Frame did not look like amplifier output
    InvalidFrame,
}

/// One raw read from the amplifier, before filtering
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RawReading {
    /// Thermocouple temperature (°C)
    pub celsius: f32,
    /// Amplifier cold-junction temperature (°C)
    pub internal_celsius: f32,
    /// `FAULT_*` bitmask
    pub fault_bits: u8,
}

impl RawReading {
    /// Reading with no fault bits set
    pub const fn new(celsius: f32, internal_celsius: f32) -> Self {
        Self {
            celsius,
            internal_celsius,
            fault_bits: 0,
        }
    }
}

/// Trait for thermocouple sensors
///
/// Implementations handle the specific amplifier (MAX31855, MAX31856, ...).
/// Takes `&mut self` because bus transfers require mutable access.
pub trait ThermocoupleSensor {
    /// Read process temperature, junction temperature and fault bits
    fn read(&mut self) -> Result<RawReading, SensorError>;
}
