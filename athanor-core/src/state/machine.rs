//! Phase definition
//!
//! Heater behavior is a function of the current phase; the engine only
//! changes phase through [`Phase::transition`].

use super::events::Event;

/// Firing phases
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Phase {
    /// No cycle running, heater off
    #[default]
    Idle,
    /// Setpoint moving toward the current segment target
    Ramping,
    /// Soaking at the current segment target
    Holding,
    /// Setpoint stepping down after the final segment
    CoolingDown,
    /// Safety fault latched; heater off until aborted
    Fault,
}

/// Faults that force the [`Phase::Fault`] phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FaultKind {
    /// First ramp never reached target within the timeout
    RampTimeout,
    /// Process ceiling exceeded with abort-on-overtemperature enabled
    OverTemperature,
}

impl Phase {
    /// Check if the heater may be energized in this phase
    pub fn heater_allowed(&self) -> bool {
        matches!(self, Phase::Ramping | Phase::Holding | Phase::CoolingDown)
    }

    /// Check if a firing cycle is in progress
    pub fn is_active(&self) -> bool {
        !matches!(self, Phase::Idle | Phase::Fault)
    }

    /// Short status label
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Idle => "Idle",
            Phase::Ramping => "Ramping",
            Phase::Holding => "Holding",
            Phase::CoolingDown => "Cooling",
            Phase::Fault => "Fault",
        }
    }

    /// Process an event and return the next phase
    pub fn transition(self, event: Event) -> Self {
        use Event::*;
        use Phase::*;

        match (self, event) {
            (Idle, Start) => Ramping,

            (Ramping, TargetReached) => Holding,
            (Holding, HoldElapsed) => Ramping,
            (Holding, FinalHoldElapsed) => CoolingDown,
            (CoolingDown, CooldownDone) => Idle,

            // Safety faults override every active phase
            (Ramping | Holding | CoolingDown, FaultDetected(_)) => Fault,

            // Abort from any non-idle phase, including Fault
            (Ramping | Holding | CoolingDown | Fault, Abort) => Idle,

            // Default: stay in current phase
            _ => self,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_firing_flow() {
        let ramping = Phase::Idle.transition(Event::Start);
        assert_eq!(ramping, Phase::Ramping);

        let holding = ramping.transition(Event::TargetReached);
        assert_eq!(holding, Phase::Holding);

        assert_eq!(holding.transition(Event::HoldElapsed), Phase::Ramping);

        let cooling = holding.transition(Event::FinalHoldElapsed);
        assert_eq!(cooling, Phase::CoolingDown);

        assert_eq!(cooling.transition(Event::CooldownDone), Phase::Idle);
    }

    #[test]
    fn test_fault_from_active_phases() {
        for phase in [Phase::Ramping, Phase::Holding, Phase::CoolingDown] {
            let next = phase.transition(Event::FaultDetected(FaultKind::RampTimeout));
            assert_eq!(next, Phase::Fault);
        }
        // Nothing to fault when idle
        let idle = Phase::Idle.transition(Event::FaultDetected(FaultKind::RampTimeout));
        assert_eq!(idle, Phase::Idle);
    }

    #[test]
    fn test_fault_requires_abort() {
        let fault = Phase::Fault;
        assert_eq!(fault.transition(Event::Start), Phase::Fault);
        assert_eq!(fault.transition(Event::CooldownDone), Phase::Fault);
        assert_eq!(fault.transition(Event::Abort), Phase::Idle);
    }

    #[test]
    fn test_abort_returns_to_idle() {
        for phase in [Phase::Ramping, Phase::Holding, Phase::CoolingDown, Phase::Fault] {
            assert_eq!(phase.transition(Event::Abort), Phase::Idle);
        }
        assert_eq!(Phase::Idle.transition(Event::Abort), Phase::Idle);
    }

    #[test]
    fn test_start_ignored_while_active() {
        assert_eq!(Phase::Holding.transition(Event::Start), Phase::Holding);
    }

    #[test]
    fn test_heater_allowed() {
        assert!(Phase::Ramping.heater_allowed());
        assert!(Phase::Holding.heater_allowed());
        assert!(Phase::CoolingDown.heater_allowed());
        assert!(!Phase::Idle.heater_allowed());
        assert!(!Phase::Fault.heater_allowed());
    }
}
