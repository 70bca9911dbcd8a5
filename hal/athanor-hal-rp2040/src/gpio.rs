//! GPIO output wrapper

use embassy_rp::gpio::Output;

/// Push-pull output implementing [`athanor_hal::OutputPin`]
pub struct RpOutput<'d> {
    pin: Output<'d>,
}

impl<'d> RpOutput<'d> {
    /// Wrap a configured embassy output
    pub fn new(pin: Output<'d>) -> Self {
        Self { pin }
    }
}

impl athanor_hal::OutputPin for RpOutput<'_> {
    fn set_high(&mut self) {
        self.pin.set_high();
    }

    fn set_low(&mut self) {
        self.pin.set_low();
    }

    fn is_set_high(&self) -> bool {
        self.pin.is_set_high()
    }
}
