//! Safety monitor implementation
//!
//! Watches the amplifier junction, the process ceiling and the first-ramp
//! timeout, and reports cycle completion once the kiln is cool enough.
//! Every condition is edge-triggered: it fires once, then stays latched until
//! the condition clears (or, for the ramp timeout, until the next cycle).

use heapless::Vec;

use crate::config::SafetyConfig;
use crate::sampler::SampleReading;
use crate::state::{ControlState, Phase};

/// Safety condition raised by a check
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SafetyEvent {
    /// Amplifier junction above its ceiling (°C)
    InternalOverTemperature(f32),
    /// Process temperature above the absolute ceiling (°C)
    ProcessOverTemperature(f32),
    /// First ramp failed to make progress in time
    RampTimeout,
    /// Finished cycle has cooled below the safe threshold
    CycleComplete,
}

/// Events raised by a single check
pub type SafetyEvents = Vec<SafetyEvent, 4>;

/// Safety monitor for fault detection
#[derive(Debug, Clone)]
pub struct SafetyMonitor {
    config: SafetyConfig,
    internal_latched: bool,
    process_latched: bool,
    ramp_timeout_latched: bool,
    awaiting_complete: bool,
}

impl SafetyMonitor {
    /// Create a new safety monitor
    pub fn new(config: SafetyConfig) -> Self {
        Self {
            config,
            internal_latched: false,
            process_latched: false,
            ramp_timeout_latched: false,
            awaiting_complete: false,
        }
    }

    /// Re-arm the per-cycle latches
    pub fn cycle_started(&mut self) {
        self.ramp_timeout_latched = false;
        self.awaiting_complete = false;
    }

    /// Start watching for the cool-enough condition
    pub fn cooldown_finished(&mut self) {
        self.awaiting_complete = true;
    }

    /// Check if the process ceiling alert is latched
    pub fn is_over_temperature(&self) -> bool {
        self.process_latched
    }

    /// Check if a completed cycle is still waiting to cool down
    pub fn is_awaiting_complete(&self) -> bool {
        self.awaiting_complete
    }

    /// Check all safety conditions
    pub fn check(&mut self, sample: &SampleReading, state: &ControlState, now_ms: u64) -> SafetyEvents {
        let mut events = SafetyEvents::new();

        if let Some(celsius) =
            edge(&mut self.internal_latched, sample.internal_c, self.config.internal_ceiling_c)
        {
            let _ = events.push(SafetyEvent::InternalOverTemperature(celsius));
        }

        if let Some(celsius) =
            edge(&mut self.process_latched, sample.temperature_c, self.config.process_ceiling_c)
        {
            let _ = events.push(SafetyEvent::ProcessOverTemperature(celsius));
        }

        let stuck_in_first_ramp = state.phase == Phase::Ramping
            && state.segment_index == 0
            && state.hold_start_ms.is_none()
            && state.cycle_elapsed_ms(now_ms) > self.config.ramp_timeout_ms;
        if stuck_in_first_ramp && !self.ramp_timeout_latched {
            self.ramp_timeout_latched = true;
            let _ = events.push(SafetyEvent::RampTimeout);
        }

        if self.awaiting_complete && sample.temperature_c < self.config.safe_complete_c {
            self.awaiting_complete = false;
            let _ = events.push(SafetyEvent::CycleComplete);
        }

        events
    }
}

/// Latch on the rising edge of `value > ceiling`; NaN leaves the latch alone
fn edge(latched: &mut bool, value: f32, ceiling: f32) -> Option<f32> {
    if value.is_nan() {
        return None;
    }
    if value > ceiling {
        if *latched {
            return None;
        }
        *latched = true;
        Some(value)
    } else {
        *latched = false;
        None
    }
}
