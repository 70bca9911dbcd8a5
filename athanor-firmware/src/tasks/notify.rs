//! Notification task
//!
//! Logs alerts and live values, and performs the restart requested after a
//! completed cycle.

use defmt::*;
use embassy_futures::select::{select3, Either3};
use embassy_time::Timer;

use athanor_core::traits::Notification;

use crate::channels::{LIVE, NOTIFICATIONS, RESTART};

/// Delay before resetting so the last log lines get out
const RESTART_DELAY_MS: u64 = 2_000;

#[embassy_executor::task]
pub async fn notify_task() {
    info!("Notification task started");

    loop {
        match select3(NOTIFICATIONS.receive(), LIVE.wait(), RESTART.wait()).await {
            Either3::First(note) => match note {
                Notification::SensorFault { .. }
                | Notification::InternalOverTemperature { .. }
                | Notification::ProcessOverTemperature { .. }
                | Notification::RampTimeout => warn!("{}", Display2Format(&note)),
                _ => info!("{}", Display2Format(&note)),
            },
            Either3::Second(live) => {
                debug!("{} ({} W)", live.display.as_str(), live.instant_power_w);
            }
            Either3::Third(()) => {
                info!("Cycle complete, restarting");
                Timer::after_millis(RESTART_DELAY_MS).await;
                cortex_m::peripheral::SCB::sys_reset();
            }
        }
    }
}
