//! Energy meter pulse input
//!
//! S0 outputs are open collector: each pulse pulls the input low.

use defmt::*;
use embassy_rp::gpio::Input;
use embassy_time::Instant;

use athanor_core::energy::{EnergyMeter, PulseOutcome};

/// Count meter pulses into the shared meter
#[embassy_executor::task]
pub async fn pulse_task(mut input: Input<'static>, meter: &'static EnergyMeter) {
    info!("Pulse task started");

    loop {
        input.wait_for_falling_edge().await;

        match meter.on_pulse(Instant::now().as_millis()) {
            PulseOutcome::First => info!("First meter pulse"),
            PulseOutcome::Counted => {}
            PulseOutcome::Debounced => trace!("Meter glitch ignored"),
        }
    }
}
