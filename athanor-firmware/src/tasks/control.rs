//! Control task
//!
//! Owns the controller. Drives it from the timer table, reads the
//! thermocouple on sample ticks and applies operator commands between
//! ticks.

use defmt::*;
use embassy_futures::select::{select, Either};
use embassy_rp::peripherals::SPI0;
use embassy_rp::spi::{Blocking, Spi};
use embassy_time::{Instant, Timer};
use portable_atomic::Ordering;

use athanor_core::config::TELEMETRY_CAPACITY;
use athanor_core::profile::FiringProfile;
use athanor_core::schedule::TimerTable;
use athanor_core::traits::{ThermocoupleSensor, TickKind};
use athanor_core::{Controller, StoreRequest};
use athanor_drivers::relay::GpioRelay;
use athanor_drivers::sensor::Max31855;
use athanor_hal_rp2040::gpio::RpOutput;
use athanor_hal_rp2040::spi::RpSpi;

use crate::channels::{Command, COMMANDS, HEATING, PHASE, STORE};
use crate::notifier::ChannelNotifier;

/// Heater or contactor relay on a GPIO
pub type BoardRelay = GpioRelay<RpOutput<'static>>;

/// Controller as wired on this board
pub type KilnController = Controller<
    'static,
    TimerTable,
    ChannelNotifier,
    BoardRelay,
    Option<BoardRelay>,
>;

/// Thermocouple amplifier on SPI0
pub type Thermocouple = Max31855<RpSpi<Spi<'static, SPI0, Blocking>>, RpOutput<'static>>;

/// Worst-case postcard size of a full telemetry history
pub const DUMP_LEN: usize = TELEMETRY_CAPACITY * 9 + 4;

/// Idle poll interval when no timer is registered
const IDLE_POLL_MS: u64 = 100;

/// Bytes per hex log line of a telemetry dump
const DUMP_CHUNK: usize = 64;

/// Control task - runs the controller until reset
#[embassy_executor::task]
pub async fn control_task(
    controller: &'static mut KilnController,
    mut sensor: Thermocouple,
    mut pending: Option<FiringProfile>,
    dump_buf: &'static mut [u8; DUMP_LEN],
) {
    info!("Control task started");

    if let Err(e) = controller.boot() {
        error!("Failed to register timers: {:?}", e);
        return;
    }

    let mut was_active = false;

    loop {
        let now = Instant::now().as_millis();

        while let Some(kind) = controller.scheduler_mut().poll(now) {
            match kind {
                TickKind::Sample => {
                    let reading = controller.on_sample(sensor.read(), now);

                    // Resume an interrupted cycle once there is a temperature
                    // to start from
                    if reading.is_usable() {
                        if let Some(profile) = pending.take() {
                            match controller.recover(profile, now) {
                                Ok(()) => info!("Resumed interrupted cycle"),
                                Err(e) => {
                                    warn!("Cannot resume interrupted cycle: {:?}", e);
                                    if STORE.try_send(StoreRequest::Clear).is_err() {
                                        warn!("Store queue full, request dropped");
                                    }
                                }
                            }
                        }
                    }
                }
                other => {
                    if let Err(e) = controller.on_tick(other, now) {
                        warn!("{:?} tick failed: {:?}", other, e);
                    }
                }
            }
        }

        publish(controller);

        let active = controller.phase().is_active();
        if was_active && !active {
            dump_telemetry(controller, dump_buf);
        }
        was_active = active;

        let wait_ms = controller
            .scheduler_mut()
            .next_deadline()
            .map_or(IDLE_POLL_MS, |deadline| {
                deadline.saturating_sub(Instant::now().as_millis())
            });

        match select(Timer::after_millis(wait_ms), COMMANDS.receive()).await {
            Either::First(()) => {}
            Either::Second(command) => handle_command(controller, command),
        }
    }
}

fn handle_command(controller: &mut KilnController, command: Command) {
    let now = Instant::now().as_millis();

    match command {
        Command::Start(profile) => {
            info!("Start requested ({} segments)", profile.len());
            match controller.start_firing(profile, now) {
                Ok(()) => info!("Firing started"),
                Err(e) => warn!("Start rejected: {:?}", e),
            }
        }
        Command::Abort => {
            if controller.abort() {
                info!("Firing aborted");
            } else {
                debug!("Abort ignored, nothing running");
            }
        }
    }
    publish(controller);
}

/// Mirror the controller state for other tasks and flush store requests
fn publish(controller: &mut KilnController) {
    PHASE.store(controller.phase() as u8, Ordering::Relaxed);
    HEATING.store(controller.heater_on(), Ordering::Relaxed);

    if let Some(request) = controller.take_store_request() {
        if STORE.try_send(request).is_err() {
            warn!("Store queue full, request dropped");
        }
    }
}

fn dump_telemetry(controller: &KilnController, buf: &mut [u8; DUMP_LEN]) {
    if let Some(energy) = controller.energy() {
        info!(
            "Cycle energy: {} Wh ({} pulses)",
            energy.cumulative_energy_wh, energy.pulse_count
        );
    }

    match controller.telemetry().dump_into(buf) {
        Ok(bytes) => {
            info!(
                "Telemetry dump: {} points, {} bytes",
                controller.telemetry().len(),
                bytes.len()
            );
            for chunk in bytes.chunks(DUMP_CHUNK) {
                info!("{=[u8]:x}", chunk);
            }
        }
        Err(_) => warn!("Telemetry dump did not fit"),
    }
}
