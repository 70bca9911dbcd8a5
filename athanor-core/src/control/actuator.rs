//! Hysteresis actuator
//!
//! Turns the relay on as soon as the temperature is at or below the
//! setpoint. Once it switches off, the temperature must fall a further
//! `differential` below the setpoint before it comes back on.

use crate::state::Phase;
use crate::traits::RelayOutput;

/// Heater relay actuator
pub struct Actuator<H> {
    relay: H,
    differential_c: f32,
    /// Differential currently applied (0 while heating)
    diff_c: f32,
}

impl<H: RelayOutput> Actuator<H> {
    /// Create a new actuator; the relay is switched off immediately
    pub fn new(mut relay: H, differential_c: f32) -> Self {
        relay.set_on(false);
        Self {
            relay,
            differential_c,
            diff_c: 0.0,
        }
    }

    /// Get access to the underlying relay
    pub fn relay(&self) -> &H {
        &self.relay
    }

    /// Check if the relay is energized
    pub fn is_on(&self) -> bool {
        self.relay.is_on()
    }

    /// Differential currently applied to the on decision
    pub fn applied_differential(&self) -> f32 {
        self.diff_c
    }

    /// Forget the applied differential; the next update uses the plain rule
    pub fn reset(&mut self) {
        self.diff_c = 0.0;
    }

    /// Release the relay unconditionally
    pub fn force_off(&mut self) {
        if self.relay.is_on() {
            self.relay.set_on(false);
        }
    }

    /// Evaluate one control tick
    ///
    /// Returns the relay state after the update.
    pub fn update(&mut self, setpoint_c: f32, temperature_c: f32, phase: Phase) -> bool {
        if temperature_c.is_nan() || !phase.heater_allowed() {
            self.force_off();
            return false;
        }

        let delta = setpoint_c - temperature_c - self.diff_c;
        let on = self.relay.is_on();

        if delta >= 0.0 && !on {
            self.relay.set_on(true);
            self.diff_c = 0.0;
        } else if delta < 0.0 && on {
            self.relay.set_on(false);
            self.diff_c = self.differential_c;
        }

        self.relay.is_on()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    // Mock relay for testing
    struct MockRelay {
        on: bool,
        switches: u32,
    }

    impl MockRelay {
        fn new() -> Self {
            Self {
                on: false,
                switches: 0,
            }
        }
    }

    impl RelayOutput for MockRelay {
        fn set_on(&mut self, on: bool) {
            if on != self.on {
                self.switches += 1;
            }
            self.on = on;
        }

        fn is_on(&self) -> bool {
            self.on
        }
    }

    #[test]
    fn test_turns_on_below_setpoint() {
        let mut actuator = Actuator::new(MockRelay::new(), 5.0);
        assert!(actuator.update(550.0, 540.0, Phase::Ramping));
        // At setpoint still on (delta == 0)
        assert!(actuator.update(550.0, 550.0, Phase::Ramping));
    }

    #[test]
    fn test_hysteresis_differential() {
        let mut actuator = Actuator::new(MockRelay::new(), 5.0);
        actuator.update(550.0, 540.0, Phase::Holding);

        // Overshoot switches off and arms the differential
        assert!(!actuator.update(550.0, 551.0, Phase::Holding));
        assert_eq!(actuator.applied_differential(), 5.0);

        for temp in [550.0, 548.0, 546.0, 545.5] {
            assert!(!actuator.update(550.0, temp, Phase::Holding));
        }

        assert!(actuator.update(550.0, 545.0, Phase::Holding));
        assert_eq!(actuator.applied_differential(), 0.0);
    }

    #[test]
    fn test_reset_clears_differential() {
        let mut actuator = Actuator::new(MockRelay::new(), 5.0);
        actuator.update(550.0, 540.0, Phase::Ramping);
        actuator.update(550.0, 551.0, Phase::Ramping);
        actuator.force_off();
        assert_eq!(actuator.applied_differential(), 5.0);

        actuator.reset();
        assert_eq!(actuator.applied_differential(), 0.0);
        assert!(actuator.update(20.0, 20.0, Phase::Ramping));
    }

    #[test]
    fn test_nan_forces_off() {
        let mut actuator = Actuator::new(MockRelay::new(), 5.0);
        actuator.update(550.0, 400.0, Phase::Ramping);
        assert!(actuator.is_on());

        assert!(!actuator.update(550.0, f32::NAN, Phase::Ramping));
        assert!(!actuator.relay().on);
    }

    #[test]
    fn test_fault_and_idle_force_off() {
        let mut actuator = Actuator::new(MockRelay::new(), 5.0);
        actuator.update(550.0, 400.0, Phase::Ramping);

        assert!(!actuator.update(550.0, 400.0, Phase::Fault));
        actuator.update(550.0, 400.0, Phase::Ramping);
        assert!(!actuator.update(550.0, 400.0, Phase::Idle));
    }

    #[test]
    fn test_no_chatter_inside_band() {
        let mut actuator = Actuator::new(MockRelay::new(), 5.0);
        actuator.update(550.0, 540.0, Phase::Holding);
        actuator.update(550.0, 552.0, Phase::Holding);
        let switches = actuator.relay().switches;

        for temp in [549.0, 551.0, 547.0, 552.0, 546.0] {
            actuator.update(550.0, temp, Phase::Holding);
        }
        assert_eq!(actuator.relay().switches, switches);
    }

    fn phase_strategy() -> impl Strategy<Value = Phase> {
        prop_oneof![
            Just(Phase::Idle),
            Just(Phase::Ramping),
            Just(Phase::Holding),
            Just(Phase::CoolingDown),
            Just(Phase::Fault),
        ]
    }

    proptest! {
        #[test]
        fn prop_unusable_reading_or_fault_is_off(
            history in prop::collection::vec((0.0f32..1300.0, 0.0f32..1300.0, phase_strategy()), 0..32),
            setpoint in 0.0f32..1300.0,
            temp in 0.0f32..1300.0,
        ) {
            let mut actuator = Actuator::new(MockRelay::new(), 5.0);
            for (sp, t, phase) in history {
                actuator.update(sp, t, phase);
            }

            prop_assert!(!actuator.update(setpoint, f32::NAN, Phase::Ramping));
            prop_assert!(!actuator.relay().on);

            actuator.update(setpoint, temp, Phase::Ramping);
            prop_assert!(!actuator.update(setpoint, temp, Phase::Fault));
            prop_assert!(!actuator.relay().on);
        }
    }
}
