//! Start / abort buttons
//!
//! Both buttons pull to ground. Start fires the board's default profile.

use defmt::*;
use embassy_futures::select::{select, Either};
use embassy_rp::gpio::Input;
use embassy_time::Timer;

use athanor_core::profile::FiringProfile;

use crate::board::DEFAULT_PROFILE;
use crate::channels::{Command, COMMANDS};

/// Contact bounce settle time
const DEBOUNCE_MS: u64 = 50;

#[embassy_executor::task]
pub async fn buttons_task(mut start: Input<'static>, mut abort: Input<'static>) {
    info!("Buttons task started");

    loop {
        match select(start.wait_for_falling_edge(), abort.wait_for_falling_edge()).await {
            Either::First(()) => match FiringProfile::new(&DEFAULT_PROFILE) {
                Ok(profile) => COMMANDS.send(Command::Start(profile)).await,
                Err(e) => error!("Default profile invalid: {:?}", e),
            },
            Either::Second(()) => COMMANDS.send(Command::Abort).await,
        }

        Timer::after_millis(DEBOUNCE_MS).await;
    }
}
