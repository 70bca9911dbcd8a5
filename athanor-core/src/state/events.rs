//! Events that trigger phase transitions

use super::machine::FaultKind;

/// Events that can trigger phase transitions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Event {
    // Commands
    /// Firing started with a valid profile
    Start,
    /// Operator or collaborator abort
    Abort,

    // Engine events
    /// Measured temperature passed the segment target
    TargetReached,
    /// Soak finished and another segment follows
    HoldElapsed,
    /// Soak of the final segment finished
    FinalHoldElapsed,
    /// Cooldown reached its cutover
    CooldownDone,

    // Safety events
    /// Fault raised by the safety monitor
    FaultDetected(FaultKind),
}
