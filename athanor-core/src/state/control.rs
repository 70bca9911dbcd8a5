//! Control state owned by the profile engine

use super::machine::{FaultKind, Phase};

/// Direction the setpoint moves in the current ramp
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RampDirection {
    /// Target above the setpoint at segment entry
    #[default]
    Up,
    /// Target below the setpoint at segment entry (controlled cool)
    Down,
}

/// Engine state for the running cycle
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ControlState {
    /// Current segment (meaningful while not Idle/Fault)
    pub segment_index: u8,
    /// Instantaneous setpoint (°C)
    pub setpoint_c: f32,
    /// Uptime at which the cycle started (ms)
    pub cycle_start_ms: u64,
    /// Uptime at which the current soak started (ms)
    pub hold_start_ms: Option<u64>,
    /// Current phase
    pub phase: Phase,
    /// Ramp direction of the current segment
    pub direction: RampDirection,
    /// Latched fault, if the phase is Fault
    pub fault: Option<FaultKind>,
}

impl ControlState {
    /// Milliseconds since the cycle started
    pub fn cycle_elapsed_ms(&self, now_ms: u64) -> u64 {
        now_ms.saturating_sub(self.cycle_start_ms)
    }

    /// Whole minutes spent soaking, or None when not holding
    pub fn hold_elapsed_minutes(&self, now_ms: u64) -> Option<u64> {
        self.hold_start_ms
            .map(|start| now_ms.saturating_sub(start) / 60_000)
    }
}
