//! Status LED
//!
//! Short blip when idle, steady blink while firing (solid while the heater
//! is on), fast flash on a fault.

use embassy_rp::gpio::Output;
use embassy_time::Timer;
use portable_atomic::Ordering;

use athanor_core::state::Phase;

use crate::channels::{HEATING, PHASE};

#[embassy_executor::task]
pub async fn status_task(mut led: Output<'static>) {
    loop {
        let phase = PHASE.load(Ordering::Relaxed);

        let (on_ms, off_ms) = if phase == Phase::Fault as u8 {
            (100, 100)
        } else if phase == Phase::Idle as u8 {
            (50, 1_950)
        } else if HEATING.load(Ordering::Relaxed) {
            (500, 0)
        } else {
            (500, 500)
        };

        led.set_high();
        Timer::after_millis(on_ms).await;
        if off_ms > 0 {
            led.set_low();
            Timer::after_millis(off_ms).await;
        }
    }
}
