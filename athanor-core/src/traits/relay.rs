//! Relay output trait

/// Trait for on/off power outputs
///
/// Implementations drive the heater SSR/contactor or the enable relay via
/// GPIO.
pub trait RelayOutput {
    /// Energize or release the relay
    fn set_on(&mut self, on: bool);

    /// Check if the relay is currently energized
    fn is_on(&self) -> bool;
}

/// Placeholder for boards without an enable relay
#[derive(Debug, Clone, Copy, Default)]
pub struct NoRelay;

impl RelayOutput for NoRelay {
    fn set_on(&mut self, _on: bool) {}

    fn is_on(&self) -> bool {
        false
    }
}

/// Relay that may not be fitted on every board
impl<R: RelayOutput> RelayOutput for Option<R> {
    fn set_on(&mut self, on: bool) {
        if let Some(relay) = self {
            relay.set_on(on);
        }
    }

    fn is_on(&self) -> bool {
        self.as_ref().is_some_and(RelayOutput::is_on)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Latch(bool);

    impl RelayOutput for Latch {
        fn set_on(&mut self, on: bool) {
            self.0 = on;
        }

        fn is_on(&self) -> bool {
            self.0
        }
    }

    #[test]
    fn test_optional_relay() {
        let mut fitted = Some(Latch::default());
        fitted.set_on(true);
        assert!(fitted.is_on());

        let mut missing: Option<Latch> = None;
        missing.set_on(true);
        assert!(!missing.is_on());
    }
}
