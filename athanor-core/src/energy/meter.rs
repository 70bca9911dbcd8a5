//! Energy meter fed from a pulse interrupt
//!
//! Utility meters blink an LED (or close an S0 contact) once per fixed quantum
//! of energy. The interval between two pulses gives the instantaneous power.
//!
//! # Concurrency
//!
//! [`EnergyMeter::on_pulse`] runs in interrupt (or interrupt-like task)
//! context while the controller reads [`EnergyMeter::snapshot`] from tick
//! context. Both go through `critical_section::with`, which on single-core
//! targets masks interrupts and on multi-core targets also takes a hardware
//! spinlock. Entering and leaving the critical section acts as a full
//! barrier, so a snapshot observes either all or none of a pulse update.

use core::cell::Cell;

use critical_section::Mutex;

use crate::config::MeterConfig;

const MS_PER_HOUR: f32 = 3_600_000.0;

/// Meter counters, always copied out as a whole
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct EnergyCounters {
    /// Accepted pulses since reset
    pub pulse_count: u64,
    /// Uptime of the last accepted pulse (ms)
    pub last_pulse_at_ms: Option<u64>,
    /// Power derived from the last pulse interval (W)
    pub instant_power_w: f32,
    /// Energy accumulated since reset (Wh)
    pub cumulative_energy_wh: f32,
}

impl EnergyCounters {
    const ZERO: Self = Self {
        pulse_count: 0,
        last_pulse_at_ms: None,
        instant_power_w: 0.0,
        cumulative_energy_wh: 0.0,
    };
}

/// What happened to a pulse edge
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PulseOutcome {
    /// First pulse since reset; no interval yet
    First,
    /// Pulse counted and power updated
    Counted,
    /// Glitch inside the debounce window, ignored
    Debounced,
}

/// Interrupt-safe pulse counter
///
/// Designed to live in a `static`:
///
/// ```
/// use athanor_core::energy::EnergyMeter;
///
/// static METER: EnergyMeter = EnergyMeter::new(1.0, 100);
/// ```
pub struct EnergyMeter {
    quantum_wh: f32,
    debounce_ms: u64,
    counters: Mutex<Cell<EnergyCounters>>,
}

impl EnergyMeter {
    /// Create a meter with the given pulse quantum (Wh) and debounce (ms)
    pub const fn new(quantum_wh: f32, debounce_ms: u64) -> Self {
        Self {
            quantum_wh,
            debounce_ms,
            counters: Mutex::new(Cell::new(EnergyCounters::ZERO)),
        }
    }

    /// Create a meter from its configuration block
    pub const fn from_config(config: &MeterConfig) -> Self {
        Self::new(config.pulse_quantum_wh, config.debounce_ms)
    }

    /// Record a pulse edge seen at `now_ms`
    pub fn on_pulse(&self, now_ms: u64) -> PulseOutcome {
        critical_section::with(|cs| {
            let cell = self.counters.borrow(cs);
            let mut counters = cell.get();

            let outcome = match counters.last_pulse_at_ms {
                None => {
                    counters.pulse_count = 1;
                    counters.instant_power_w = 0.0;
                    counters.last_pulse_at_ms = Some(now_ms);
                    PulseOutcome::First
                }
                Some(last) => {
                    let interval = now_ms.saturating_sub(last);
                    if interval < self.debounce_ms || interval == 0 {
                        PulseOutcome::Debounced
                    } else {
                        counters.pulse_count += 1;
                        counters.instant_power_w = self.quantum_wh * MS_PER_HOUR / interval as f32;
                        counters.cumulative_energy_wh += self.quantum_wh;
                        counters.last_pulse_at_ms = Some(now_ms);
                        PulseOutcome::Counted
                    }
                }
            };

            cell.set(counters);
            outcome
        })
    }

    /// Consistent copy of all counters
    pub fn snapshot(&self) -> EnergyCounters {
        critical_section::with(|cs| self.counters.borrow(cs).get())
    }

    /// Zero all counters
    pub fn reset(&self) {
        critical_section::with(|cs| self.counters.borrow(cs).set(EnergyCounters::ZERO));
    }
}
