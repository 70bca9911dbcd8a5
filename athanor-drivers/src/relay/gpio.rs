//! GPIO relay output
//!
//! Drives an SSR or contactor coil from a GPIO pin, directly or through a
//! transistor stage.

use athanor_core::traits::RelayOutput;
use athanor_hal::OutputPin;

/// GPIO relay output
///
/// The pin can be active-high (default) or active-low.
pub struct GpioRelay<P> {
    pin: P,
    /// If true, relay ON = pin LOW
    inverted: bool,
    /// Current logical state (true = energized)
    on: bool,
}

impl<P: OutputPin> GpioRelay<P> {
    /// Create a new relay output, released
    pub fn new(pin: P, inverted: bool) -> Self {
        let mut relay = Self {
            pin,
            inverted,
            on: false,
        };
        relay.set_on(false);
        relay
    }

    /// Relay energized by a high pin
    pub fn new_active_high(pin: P) -> Self {
        Self::new(pin, false)
    }

    /// Relay energized by a low pin (sinking driver boards)
    pub fn new_active_low(pin: P) -> Self {
        Self::new(pin, true)
    }
}

impl<P: OutputPin> RelayOutput for GpioRelay<P> {
    fn set_on(&mut self, on: bool) {
        self.on = on;
        self.pin.set_state(on != self.inverted);
    }

    fn is_on(&self) -> bool {
        self.on
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Mock GPIO pin for testing
    struct MockPin {
        high: bool,
    }

    impl MockPin {
        fn new() -> Self {
            Self { high: false }
        }
    }

    impl OutputPin for MockPin {
        fn set_high(&mut self) {
            self.high = true;
        }

        fn set_low(&mut self) {
            self.high = false;
        }

        fn is_set_high(&self) -> bool {
            self.high
        }
    }

    #[test]
    fn test_active_high_relay() {
        let mut relay = GpioRelay::new_active_high(MockPin::new());

        assert!(!relay.is_on());
        assert!(!relay.pin.is_set_high());

        relay.set_on(true);
        assert!(relay.is_on());
        assert!(relay.pin.is_set_high());

        relay.set_on(false);
        assert!(!relay.pin.is_set_high());
    }

    #[test]
    fn test_active_low_relay() {
        let mut relay = GpioRelay::new_active_low(MockPin::new());

        // Released means the pin idles high
        assert!(!relay.is_on());
        assert!(relay.pin.is_set_high());

        relay.set_on(true);
        assert!(relay.is_on());
        assert!(!relay.pin.is_set_high());
    }
}
