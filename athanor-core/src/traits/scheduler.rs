//! Periodic tick scheduling trait

/// The kinds of periodic tick the firing logic consumes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TickKind {
    /// Read and filter the sensor
    Sample,
    /// Hysteresis control and phase transitions
    Control,
    /// Setpoint ramp step
    Rate,
    /// Safety watchdog
    Safety,
}

/// Handle to a registered periodic timer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TimerHandle(pub u8);

/// Errors from timer registration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SchedulerError {
    /// No free timer slot
    Full,
    /// Interval of zero
    ZeroInterval,
}

/// Trait for a periodic timer service
///
/// The scheduler owns timing; when a registered timer fires, the owner of
/// the scheduler dispatches the [`TickKind`] to the controller. Ticks of the
/// same kind never overlap.
pub trait TickScheduler {
    /// Fire `tick` every `interval_ms` until cancelled
    fn register_periodic(
        &mut self,
        interval_ms: u32,
        tick: TickKind,
    ) -> Result<TimerHandle, SchedulerError>;

    /// Stop a timer; cancelling an unknown handle is a no-op
    fn cancel(&mut self, handle: TimerHandle);
}
