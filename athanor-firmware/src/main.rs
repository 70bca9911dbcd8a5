//! Athanor - Kiln Controller Firmware
//!
//! Main firmware binary for RP2040-based kiln controllers: MAX31855
//! thermocouple, SSR heater, optional contactor and S0 energy meter.
//!
//! Named after the alchemists' furnace, kept at a steady heat for as long
//! as the work needed.

#![no_std]
#![no_main]

use defmt::*;
use embassy_executor::Spawner;
use embassy_rp::gpio::{Input, Level, Output, Pull};
use embassy_rp::spi::{self, Spi};
use embassy_time::Instant;
use static_cell::StaticCell;
use {defmt_rtt as _, panic_probe as _};

use athanor_core::energy::EnergyMeter;
use athanor_core::schedule::TimerTable;
use athanor_core::Controller;
use athanor_drivers::relay::GpioRelay;
use athanor_drivers::sensor::Max31855;
use athanor_hal_rp2040::flash::FlashStorage;
use athanor_hal_rp2040::gpio::RpOutput;
use athanor_hal_rp2040::spi::RpSpi;

use crate::board::{
    CAPABILITIES, ENABLE_ACTIVE_LOW, HEATER_ACTIVE_LOW, THERMOCOUPLE_SPI_HZ,
};
use crate::notifier::ChannelNotifier;
use crate::persistence::Persistence;
use crate::tasks::{KilnController, DUMP_LEN};

mod board;
mod channels;
mod notifier;
mod persistence;
mod tasks;

// Static cells for state shared with (or too large for) task futures
static METER: StaticCell<EnergyMeter> = StaticCell::new();
static CONTROLLER: StaticCell<KilnController> = StaticCell::new();
static DUMP_BUF: StaticCell<[u8; DUMP_LEN]> = StaticCell::new();

/// Main entry point
#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("Athanor firmware starting...");

    // Initialize RP2040 peripherals
    let p = embassy_rp::init(Default::default());
    info!("Peripherals initialized");

    // Configuration and any interrupted cycle from flash
    let mut persistence = Persistence::new(FlashStorage::new(p.FLASH, p.DMA_CH0));
    let config = persistence.load_config().await;
    let pending = persistence.load_active_profile().await;

    // Relays come up released before anything else runs
    let heater = GpioRelay::new(
        RpOutput::new(Output::new(p.PIN_15, Level::from(HEATER_ACTIVE_LOW))),
        HEATER_ACTIVE_LOW,
    );
    let enable = CAPABILITIES.has_enable_relay.then(|| {
        GpioRelay::new(
            RpOutput::new(Output::new(p.PIN_14, Level::from(ENABLE_ACTIVE_LOW))),
            ENABLE_ACTIVE_LOW,
        )
    });
    info!("Relays initialized");

    // MAX31855 is receive-only, mode 0
    let mut spi_config = spi::Config::default();
    spi_config.frequency = THERMOCOUPLE_SPI_HZ;
    let spi = Spi::new_blocking_rxonly(p.SPI0, p.PIN_18, p.PIN_16, spi_config);
    let cs = RpOutput::new(Output::new(p.PIN_17, Level::High));
    let sensor = Max31855::new(RpSpi::new(spi), cs);
    info!("Thermocouple initialized");

    let meter: Option<&'static EnergyMeter> = CAPABILITIES
        .has_energy_meter
        .then(|| &*METER.init(EnergyMeter::from_config(&config.meter)));

    let controller = CONTROLLER.init(Controller::new(
        config,
        TimerTable::new(),
        ChannelNotifier,
        heater,
        enable,
        meter,
    ));
    let dump_buf = DUMP_BUF.init([0u8; DUMP_LEN]);

    // Spawn tasks
    spawner
        .spawn(tasks::control_task(controller, sensor, pending, dump_buf))
        .unwrap();
    spawner.spawn(tasks::storage_task(persistence)).unwrap();
    spawner.spawn(tasks::notify_task()).unwrap();
    spawner
        .spawn(tasks::buttons_task(
            Input::new(p.PIN_20, Pull::Up),
            Input::new(p.PIN_21, Pull::Up),
        ))
        .unwrap();

    if let Some(meter) = meter {
        spawner
            .spawn(tasks::pulse_task(Input::new(p.PIN_22, Pull::Up), meter))
            .unwrap();
    }

    if CAPABILITIES.has_status_led {
        spawner
            .spawn(tasks::status_task(Output::new(p.PIN_25, Level::Low)))
            .unwrap();
    }

    info!("All tasks spawned, firmware running");

    loop {
        embassy_time::Timer::after_secs(60).await;
        trace!("Main loop heartbeat, uptime {} s", Instant::now().as_secs());
    }
}
