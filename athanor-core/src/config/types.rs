//! Configuration type definitions
//!
//! Configuration is stored in flash as postcard-serialized binary data, so
//! every type here derives `Serialize`/`Deserialize`.

use serde::{Deserialize, Serialize};

/// Highest segment target accepted by profile validation (°C)
pub const MAX_TARGET_C: f32 = 1320.0;

/// Default telemetry history length (24h at one point per minute)
pub const TELEMETRY_CAPACITY: usize = 1440;

/// Tick cadences in milliseconds
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TickIntervals {
    /// Sensor sampling cadence
    pub sample_ms: u32,
    /// Hysteresis control and state transition cadence
    pub control_ms: u32,
    /// Setpoint ramp cadence
    pub rate_ms: u32,
    /// Safety watchdog cadence (faster than control)
    pub safety_ms: u32,
}

impl Default for TickIntervals {
    fn default() -> Self {
        Self {
            sample_ms: 500,
            control_ms: 2_000,
            rate_ms: 60_000,
            safety_ms: 1_000,
        }
    }
}

/// Sensor filtering configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SamplerConfig {
    /// Number of samples accumulated before an averaged value is emitted
    pub window: u8,
    /// Fault bits that are never treated as a sensor fault
    ///
    /// Bit 0 (short-to-ground) is masked by default: the thermocouple
    /// amplifier reports it spuriously on grounded kiln shells.
    pub ignored_fault_mask: u8,
}

impl Default for SamplerConfig {
    fn default() -> Self {
        Self {
            window: 4,
            ignored_fault_mask: 0b0000_0001,
        }
    }
}

/// Safety watchdog thresholds
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SafetyConfig {
    /// Sensor cold-junction ceiling (°C)
    pub internal_ceiling_c: f32,
    /// Absolute process temperature ceiling (°C)
    pub process_ceiling_c: f32,
    /// Abort into Fault when the process ceiling is exceeded
    pub abort_on_overtemperature: bool,
    /// Maximum time to leave the first ramp before declaring a heater fault
    pub ramp_timeout_ms: u64,
    /// Temperature under which a finished cycle is reported complete (°C)
    pub safe_complete_c: f32,
}

impl Default for SafetyConfig {
    fn default() -> Self {
        Self {
            internal_ceiling_c: 60.0,
            process_ceiling_c: 570.0,
            abort_on_overtemperature: false,
            ramp_timeout_ms: 3 * 60 * 60 * 1000,
            safe_complete_c: 100.0,
        }
    }
}

/// Energy meter calibration
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MeterConfig {
    /// Energy represented by a single meter pulse (Wh)
    pub pulse_quantum_wh: f32,
    /// Pulses closer together than this are discarded
    pub debounce_ms: u64,
}

impl Default for MeterConfig {
    fn default() -> Self {
        // 1000 imp/kWh utility meter
        Self {
            pulse_quantum_wh: 1.0,
            debounce_ms: 100,
        }
    }
}

/// Complete firing configuration
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FiringConfig {
    /// Tick cadences
    pub ticks: TickIntervals,
    /// Sampler filtering
    pub sampler: SamplerConfig,
    /// Safety thresholds
    pub safety: SafetyConfig,
    /// Energy metering
    pub meter: MeterConfig,
    /// Hysteresis differential applied after the relay switches off (°C)
    pub hysteresis_c: f32,
    /// Setpoint decrease rate during cooldown (°C/h)
    pub cooldown_rate_c_per_hour: f32,
    /// Cooldown ends once the setpoint is this far below the final target (°C)
    pub cooldown_margin_c: f32,
    /// Cooldown ends once the measured temperature is below this (°C)
    pub cooldown_floor_c: f32,
    /// Minimum spacing between telemetry history points
    pub telemetry_interval_ms: u64,
}

impl Default for FiringConfig {
    fn default() -> Self {
        Self {
            ticks: TickIntervals::default(),
            sampler: SamplerConfig::default(),
            safety: SafetyConfig::default(),
            meter: MeterConfig::default(),
            hysteresis_c: 5.0,
            cooldown_rate_c_per_hour: 150.0,
            cooldown_margin_c: 500.0,
            cooldown_floor_c: 100.0,
            telemetry_interval_ms: 60_000,
        }
    }
}

/// Reasons a configuration is rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// A tick interval is zero
    ZeroInterval,
    /// The safety tick is not faster than the control tick
    SafetyTooSlow,
    /// Sampler window is zero
    EmptyWindow,
    /// A temperature or rate is not finite or out of range
    InvalidValue,
}

impl FiringConfig {
    /// Check internal consistency
    pub fn validate(&self) -> Result<(), ConfigError> {
        let t = &self.ticks;
        if t.sample_ms == 0 || t.control_ms == 0 || t.rate_ms == 0 || t.safety_ms == 0 {
            return Err(ConfigError::ZeroInterval);
        }
        if t.safety_ms >= t.control_ms {
            return Err(ConfigError::SafetyTooSlow);
        }
        if self.sampler.window == 0 {
            return Err(ConfigError::EmptyWindow);
        }

        let positive = [
            self.hysteresis_c,
            self.cooldown_rate_c_per_hour,
            self.meter.pulse_quantum_wh,
            self.safety.internal_ceiling_c,
            self.safety.process_ceiling_c,
        ];
        if positive.iter().any(|v| !v.is_finite() || *v <= 0.0) {
            return Err(ConfigError::InvalidValue);
        }

        let non_negative = [
            self.cooldown_margin_c,
            self.cooldown_floor_c,
            self.safety.safe_complete_c,
        ];
        if non_negative.iter().any(|v| !v.is_finite() || *v < 0.0) {
            return Err(ConfigError::InvalidValue);
        }

        Ok(())
    }

    /// Setpoint advance per rate tick for the given rate (°C)
    pub fn step_per_rate_tick(&self, rate_c_per_hour: f32) -> f32 {
        rate_c_per_hour * (self.ticks.rate_ms as f32 / 1000.0) / 3600.0
    }
}

/// Optional peripherals present on a board
///
/// Replaces the per-variant firmware builds: a board without an energy meter
/// or enable contactor simply leaves the flag off.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Capabilities {
    /// Utility meter pulse input wired
    pub has_energy_meter: bool,
    /// Separate contactor/fan enable relay wired
    pub has_enable_relay: bool,
    /// Status LED wired
    pub has_status_led: bool,
}
