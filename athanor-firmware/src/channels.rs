//! Inter-task communication channels
//!
//! Static channels and signals between Embassy tasks, all on
//! `CriticalSectionRawMutex` so they can be touched from any priority.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use embassy_sync::signal::Signal;
use portable_atomic::{AtomicBool, AtomicU8};

use athanor_core::controller::StoreRequest;
use athanor_core::profile::FiringProfile;
use athanor_core::traits::{LiveTelemetry, Notification};

/// Channel capacity for operator commands
const COMMAND_CHANNEL_SIZE: usize = 4;

/// Channel capacity for notifications
const NOTIFY_CHANNEL_SIZE: usize = 8;

/// Channel capacity for persistence requests
const STORE_CHANNEL_SIZE: usize = 2;

/// Operator commands for the control task
#[derive(Debug, Clone)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Command {
    /// Start a firing cycle
    Start(FiringProfile),
    /// Abort the running cycle
    Abort,
}

/// Commands from buttons (and any future remote interface)
pub static COMMANDS: Channel<CriticalSectionRawMutex, Command, COMMAND_CHANNEL_SIZE> =
    Channel::new();

/// Alerts raised by the controller
pub static NOTIFICATIONS: Channel<CriticalSectionRawMutex, Notification, NOTIFY_CHANNEL_SIZE> =
    Channel::new();

/// Latest live values (overwritten every control tick)
pub static LIVE: Signal<CriticalSectionRawMutex, LiveTelemetry> = Signal::new();

/// Restart requested after a completed cycle
pub static RESTART: Signal<CriticalSectionRawMutex, ()> = Signal::new();

/// Profile persistence work
pub static STORE: Channel<CriticalSectionRawMutex, StoreRequest, STORE_CHANNEL_SIZE> =
    Channel::new();

/// Mirror of the controller phase (`Phase as u8`) for the status LED
pub static PHASE: AtomicU8 = AtomicU8::new(0);

/// Mirror of the heater relay state
pub static HEATING: AtomicBool = AtomicBool::new(false);
