//! Bounded temperature history
//!
//! A fixed-capacity ring of `(epoch seconds, °C)` points. Once full, every
//! append evicts the oldest point. Nothing here allocates or blocks.

use heapless::Deque;
use serde::ser::{SerializeSeq, Serializer};
use serde::{Deserialize, Serialize};

use crate::config::TELEMETRY_CAPACITY;

/// One history point
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TelemetryPoint {
    /// Wall-clock time (Unix seconds)
    pub at: u32,
    /// Temperature at that time (°C, NaN if the sensor was faulted)
    pub temperature_c: f32,
}

/// Ring buffer of telemetry points
pub struct TelemetryBuffer<const N: usize = TELEMETRY_CAPACITY> {
    points: Deque<TelemetryPoint, N>,
    interval_ms: u64,
    last_record_ms: Option<u64>,
}

impl<const N: usize> TelemetryBuffer<N> {
    /// Create an empty buffer recording at most once per `interval_ms`
    pub const fn new(interval_ms: u64) -> Self {
        Self {
            points: Deque::new(),
            interval_ms,
            last_record_ms: None,
        }
    }

    /// Number of stored points
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Check if no point has been recorded
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Append a point, evicting the oldest when full
    pub fn push(&mut self, point: TelemetryPoint) {
        if self.points.is_full() {
            self.points.pop_front();
        }
        // Cannot fail: a slot was just freed
        let _ = self.points.push_back(point);
    }

    /// Append unconditionally and restart the interval
    pub fn record(&mut self, now_ms: u64, point: TelemetryPoint) {
        self.push(point);
        self.last_record_ms = Some(now_ms);
    }

    /// Append if at least one interval passed since the last record
    ///
    /// Returns true when a point was appended.
    pub fn maybe_record(&mut self, now_ms: u64, point: TelemetryPoint) -> bool {
        let due = match self.last_record_ms {
            None => true,
            Some(last) => now_ms.saturating_sub(last) >= self.interval_ms,
        };
        if due {
            self.record(now_ms, point);
        }
        due
    }

    /// Oldest-first iterator; clone it to walk the history again
    pub fn iter(&self) -> impl Iterator<Item = &TelemetryPoint> + Clone + '_ {
        self.points.iter()
    }

    /// Most recent point
    pub fn latest(&self) -> Option<&TelemetryPoint> {
        self.points.back()
    }

    /// Serialize the whole history (postcard sequence) into `buf`
    pub fn dump_into<'b>(&self, buf: &'b mut [u8]) -> Result<&'b mut [u8], postcard::Error> {
        postcard::to_slice(&History(&self.points), buf)
    }
}

struct History<'a, const N: usize>(&'a Deque<TelemetryPoint, N>);

impl<const N: usize> Serialize for History<'_, N> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.0.len()))?;
        for point in self.0.iter() {
            seq.serialize_element(point)?;
        }
        seq.end()
    }
}
