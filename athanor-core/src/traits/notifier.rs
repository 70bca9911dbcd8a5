//! Alerting and live telemetry trait

use core::fmt;

use heapless::String;

/// Length of the short display string pushed with live telemetry
pub const DISPLAY_LEN: usize = 32;

/// User/ops alerts raised by the firing logic
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Notification {
    /// Firing started
    FiringStarted {
        /// Number of segments in the profile
        segments: u8,
    },
    /// Firing aborted by command
    FiringAborted,
    /// Thermocouple fault appeared (relay forced off)
    SensorFault {
        /// Non-ignored fault bits
        fault_code: u8,
    },
    /// Amplifier junction above its ceiling
    InternalOverTemperature {
        /// Measured junction temperature (°C)
        celsius: f32,
    },
    /// Process temperature above the absolute ceiling
    ProcessOverTemperature {
        /// Measured process temperature (°C)
        celsius: f32,
    },
    /// First ramp did not reach target in time (cycle faulted)
    RampTimeout,
    /// Controlled cooldown handed over to natural cooling
    CooldownFinished,
    /// Kiln below the safe threshold after a finished cycle
    CycleComplete,
}

impl fmt::Display for Notification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Notification::FiringStarted { segments } => {
                write!(f, "Firing started ({} segments)", segments)
            }
            Notification::FiringAborted => f.write_str("Firing aborted"),
            Notification::SensorFault { fault_code } => {
                write!(f, "Thermocouple fault 0x{:02x}, heater off", fault_code)
            }
            Notification::InternalOverTemperature { celsius } => {
                write!(f, "Controller too hot: {:.1}C", celsius)
            }
            Notification::ProcessOverTemperature { celsius } => {
                write!(f, "Kiln over temperature: {:.0}C", celsius)
            }
            Notification::RampTimeout => {
                f.write_str("Kiln not heating, cycle stopped (check elements)")
            }
            Notification::CooldownFinished => f.write_str("Cooldown finished"),
            Notification::CycleComplete => f.write_str("Firing complete"),
        }
    }
}

/// Live values pushed every control tick for event streams and displays
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LiveTelemetry {
    /// Latest filtered temperature (°C, NaN on sensor fault)
    pub temperature_c: f32,
    /// Instantaneous power from the energy meter (W)
    pub instant_power_w: f32,
    /// Pre-rendered one-line summary
    pub display: String<DISPLAY_LEN>,
}

/// Trait for the alerting collaborator
///
/// Implementations forward to MQTT, server-sent events, a buzzer, a log...
/// Calls are made from tick context and must not block.
pub trait Notifier {
    /// Deliver a user/ops alert
    fn notify(&mut self, notification: &Notification);

    /// Deliver live values
    fn push_live(&mut self, _live: &LiveTelemetry) {}

    /// Ask the platform to restart/reset after a completed cycle
    fn request_restart(&mut self);
}
