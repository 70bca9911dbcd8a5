//! Timer table

use heapless::Vec;

use crate::traits::{SchedulerError, TickKind, TickScheduler, TimerHandle};

/// Timers needed by the controller (sample, control, safety, rate)
pub const MAX_TIMERS: usize = 4;

#[derive(Debug, Clone, Copy)]
struct Slot {
    handle: TimerHandle,
    tick: TickKind,
    interval_ms: u32,
    next_due_ms: u64,
}

/// Periodic timer table
///
/// Due timers fire in registration order. A timer that fell behind (the
/// poller stalled) fires once and is rescheduled from the current time rather
/// than replaying every missed period.
#[derive(Debug)]
pub struct TimerTable<const N: usize = MAX_TIMERS> {
    slots: Vec<Slot, N>,
    next_id: u8,
    now_ms: u64,
}

impl<const N: usize> Default for TimerTable<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> TimerTable<N> {
    /// Create an empty table at time zero
    pub const fn new() -> Self {
        Self {
            slots: Vec::new(),
            next_id: 0,
            now_ms: 0,
        }
    }

    /// Time of the last poll (ms)
    pub fn now_ms(&self) -> u64 {
        self.now_ms
    }

    /// Number of active timers
    pub fn active(&self) -> usize {
        self.slots.len()
    }

    /// Check whether a timer of this kind is registered
    pub fn is_registered(&self, tick: TickKind) -> bool {
        self.slots.iter().any(|s| s.tick == tick)
    }

    /// Advance to `now_ms` and return the first due tick, if any
    ///
    /// Call repeatedly until it returns `None` to drain all due ticks.
    pub fn poll(&mut self, now_ms: u64) -> Option<TickKind> {
        self.now_ms = self.now_ms.max(now_ms);
        let now = self.now_ms;

        let slot = self.slots.iter_mut().find(|s| s.next_due_ms <= now)?;
        slot.next_due_ms += slot.interval_ms as u64;
        if slot.next_due_ms <= now {
            slot.next_due_ms = now + slot.interval_ms as u64;
        }
        Some(slot.tick)
    }

    /// Earliest pending deadline, for sleeping until the next tick
    pub fn next_deadline(&self) -> Option<u64> {
        self.slots.iter().map(|s| s.next_due_ms).min()
    }

    fn allocate_id(&mut self) -> TimerHandle {
        loop {
            let id = self.next_id;
            self.next_id = self.next_id.wrapping_add(1);
            if !self.slots.iter().any(|s| s.handle.0 == id) {
                return TimerHandle(id);
            }
        }
    }
}

impl<const N: usize> TickScheduler for TimerTable<N> {
    fn register_periodic(
        &mut self,
        interval_ms: u32,
        tick: TickKind,
    ) -> Result<TimerHandle, SchedulerError> {
        if interval_ms == 0 {
            return Err(SchedulerError::ZeroInterval);
        }
        if self.slots.is_full() {
            return Err(SchedulerError::Full);
        }

        let handle = self.allocate_id();
        self.slots
            .push(Slot {
                handle,
                tick,
                interval_ms,
                next_due_ms: self.now_ms + interval_ms as u64,
            })
            .map_err(|_| SchedulerError::Full)?;
        Ok(handle)
    }

    fn cancel(&mut self, handle: TimerHandle) {
        if let Some(pos) = self.slots.iter().position(|s| s.handle == handle) {
            self.slots.remove(pos);
        }
    }
}
