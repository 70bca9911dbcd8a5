//! Collaborator traits
//!
//! These traits define the interface between the firing logic and the
//! hardware, timer and alerting implementations around it.

pub mod notifier;
pub mod relay;
pub mod scheduler;
pub mod sensor;

pub use notifier::{LiveTelemetry, Notification, Notifier, DISPLAY_LEN};
pub use relay::{NoRelay, RelayOutput};
pub use scheduler::{SchedulerError, TickKind, TickScheduler, TimerHandle};
pub use sensor::{
    RawReading, SensorError, ThermocoupleSensor, FAULT_OPEN_CIRCUIT, FAULT_SHORT_TO_GROUND,
    FAULT_SHORT_TO_VCC,
};
