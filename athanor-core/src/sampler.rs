//! Sensor sampling and fault classification
//!
//! Converts raw amplifier reads into [`SampleReading`]s. Every `window`-th
//! call emits the average of the accumulated window; the calls in between
//! emit the latest raw value.

use crate::config::SamplerConfig;
use crate::traits::{RawReading, SensorError};

/// Fault bit substituted when the driver could not read the amplifier at all
pub const READ_ERROR: u8 = 0b1000_0000;

/// A filtered, classified temperature sample
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SampleReading {
    /// Process temperature (°C), NaN when unusable
    pub temperature_c: f32,
    /// Amplifier junction temperature (°C)
    pub internal_c: f32,
    /// Non-ignored fault bits (0 = healthy)
    pub fault_code: u8,
    /// Uptime the sample was taken (ms)
    pub taken_at_ms: u64,
}

impl SampleReading {
    /// Placeholder before the first sample tick
    pub const fn unavailable() -> Self {
        Self {
            temperature_c: f32::NAN,
            internal_c: f32::NAN,
            fault_code: 0,
            taken_at_ms: 0,
        }
    }

    /// Check if the process temperature can be used for control
    pub fn is_usable(&self) -> bool {
        !self.temperature_c.is_nan()
    }
}

/// One-shot notification from the sampler
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SamplerEvent {
    /// A non-ignored fault appeared; the relay must be forced off
    SensorFault {
        /// Non-ignored fault bits
        fault_code: u8,
    },
    /// The fault cleared; readings are usable again
    SensorRecovered,
}

/// Rolling-average sampler with fault edge detection
#[derive(Debug, Clone)]
pub struct Sampler {
    config: SamplerConfig,
    sum_c: f32,
    count: u8,
    faulted: bool,
}

impl Sampler {
    /// Create a new sampler
    pub fn new(config: SamplerConfig) -> Self {
        Self {
            config,
            sum_c: 0.0,
            count: 0,
            faulted: false,
        }
    }

    /// Check if a sensor fault is currently active
    pub fn is_faulted(&self) -> bool {
        self.faulted
    }

    /// Process one raw read
    pub fn sample(
        &mut self,
        raw: Result<RawReading, SensorError>,
        now_ms: u64,
    ) -> (SampleReading, Option<SamplerEvent>) {
        let raw = raw.unwrap_or(RawReading {
            celsius: f32::NAN,
            internal_celsius: f32::NAN,
            fault_bits: READ_ERROR,
        });
        let fault_code = raw.fault_bits & !self.config.ignored_fault_mask;

        if fault_code != 0 {
            let event = if self.faulted {
                None
            } else {
                self.faulted = true;
                self.reset_window();
                Some(SamplerEvent::SensorFault { fault_code })
            };
            let reading = SampleReading {
                temperature_c: f32::NAN,
                internal_c: raw.internal_celsius,
                fault_code,
                taken_at_ms: now_ms,
            };
            return (reading, event);
        }

        let event = if self.faulted {
            self.faulted = false;
            Some(SamplerEvent::SensorRecovered)
        } else {
            None
        };

        (
            SampleReading {
                temperature_c: self.filter(raw.celsius),
                internal_c: raw.internal_celsius,
                fault_code: 0,
                taken_at_ms: now_ms,
            },
            event,
        )
    }

    fn filter(&mut self, celsius: f32) -> f32 {
        self.sum_c += celsius;
        self.count += 1;

        if self.count >= self.config.window.max(1) {
            let average = self.sum_c / self.count as f32;
            self.reset_window();
            average
        } else {
            celsius
        }
    }

    fn reset_window(&mut self) {
        self.sum_c = 0.0;
        self.count = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ok(celsius: f32) -> Result<RawReading, SensorError> {
        Ok(RawReading::new(celsius, 25.0))
    }

    fn faulted(bits: u8) -> Result<RawReading, SensorError> {
        Ok(RawReading {
            celsius: 0.0,
            internal_celsius: 25.0,
            fault_bits: bits,
        })
    }

    #[test]
    fn test_average_every_fourth_sample() {
        let mut sampler = Sampler::new(SamplerConfig::default());

        assert_eq!(sampler.sample(ok(100.0), 0).0.temperature_c, 100.0);
        assert_eq!(sampler.sample(ok(102.0), 1).0.temperature_c, 102.0);
        assert_eq!(sampler.sample(ok(104.0), 2).0.temperature_c, 104.0);
        // (100 + 102 + 104 + 106) / 4
        assert_eq!(sampler.sample(ok(106.0), 3).0.temperature_c, 103.0);
        // Window restarts
        assert_eq!(sampler.sample(ok(200.0), 4).0.temperature_c, 200.0);
    }

    #[test]
    fn test_ignored_fault_bit() {
        let mut sampler = Sampler::new(SamplerConfig::default());
        let (reading, event) = sampler.sample(
            Ok(RawReading {
                celsius: 300.0,
                internal_celsius: 25.0,
                fault_bits: 0b001,
            }),
            0,
        );
        assert_eq!(reading.temperature_c, 300.0);
        assert_eq!(reading.fault_code, 0);
        assert_eq!(event, None);
    }

    #[test]
    fn test_fault_rising_edge_notifies_once() {
        let mut sampler = Sampler::new(SamplerConfig::default());
        sampler.sample(ok(300.0), 0);

        let (reading, event) = sampler.sample(faulted(0b011), 1);
        assert!(reading.temperature_c.is_nan());
        assert_eq!(reading.fault_code, 0b010);
        assert_eq!(event, Some(SamplerEvent::SensorFault { fault_code: 0b010 }));

        let (reading, event) = sampler.sample(faulted(0b010), 2);
        assert!(reading.temperature_c.is_nan());
        assert_eq!(event, None);
        assert!(sampler.is_faulted());
    }

    #[test]
    fn test_fault_falling_edge_resumes_averaging() {
        let mut sampler = Sampler::new(SamplerConfig::default());
        sampler.sample(ok(999.0), 0);
        sampler.sample(faulted(0b100), 1);

        let (reading, event) = sampler.sample(ok(400.0), 2);
        assert_eq!(event, Some(SamplerEvent::SensorRecovered));
        assert_eq!(reading.temperature_c, 400.0);

        // Pre-fault value was discarded from the window
        sampler.sample(ok(400.0), 3);
        assert_eq!(sampler.sample(ok(400.0), 4).0.temperature_c, 400.0);
        assert_eq!(sampler.sample(ok(400.0), 5).0.temperature_c, 400.0);
    }

    #[test]
    fn test_read_error_is_a_fault() {
        let mut sampler = Sampler::new(SamplerConfig::default());
        let (reading, event) = sampler.sample(Err(SensorError::Bus), 0);
        assert!(!reading.is_usable());
        assert_eq!(
            event,
            Some(SamplerEvent::SensorFault {
                fault_code: READ_ERROR
            })
        );
    }

    #[test]
    fn test_configurable_window() {
        let mut sampler = Sampler::new(SamplerConfig {
            window: 2,
            ignored_fault_mask: 0,
        });
        sampler.sample(ok(10.0), 0);
        assert_eq!(sampler.sample(ok(20.0), 1).0.temperature_c, 15.0);

        // Nothing ignored: bit 0 now faults
        let (_, event) = sampler.sample(faulted(0b001), 2);
        assert_eq!(event, Some(SamplerEvent::SensorFault { fault_code: 0b001 }));
    }
}
