//! Controller tying the firing subsystems together
//!
//! The controller is the only thing the platform talks to:
//! - Sample ticks feed raw reads through the sampler
//! - Control ticks run the engine, the actuator and telemetry
//! - Rate ticks move the setpoint
//! - Safety ticks run the monitor and turn its events into notifications
//!
//! Hardware and timers stay behind the collaborator traits, so the whole
//! cycle runs on the host in tests.

use core::fmt::Write;

use heapless::String;

use crate::config::FiringConfig;
use crate::control::Actuator;
use crate::energy::{EnergyCounters, EnergyMeter};
use crate::engine::{CommandError, EngineEvent, ProfileEngine};
use crate::profile::FiringProfile;
use crate::safety::{SafetyEvent, SafetyMonitor};
use crate::sampler::{SampleReading, Sampler, SamplerEvent};
use crate::state::{ControlState, FaultKind, Phase};
use crate::telemetry::{TelemetryBuffer, TelemetryPoint};
use crate::traits::{
    LiveTelemetry, NoRelay, Notification, Notifier, RawReading, RelayOutput, SchedulerError,
    SensorError, TickKind, TickScheduler, DISPLAY_LEN,
};

/// Persistence work queued for the platform
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StoreRequest {
    /// Store the active profile so a restart can resume it
    Save(FiringProfile),
    /// Forget the stored profile
    Clear,
}

/// Kiln controller
///
/// - `S`: tick scheduler
/// - `N`: notifier
/// - `H`: heater relay
/// - `F`: enable/contactor relay (`NoRelay` on boards without one)
pub struct Controller<'m, S, N, H, F = NoRelay> {
    config: FiringConfig,
    scheduler: S,
    notifier: N,
    actuator: Actuator<H>,
    enable: F,
    meter: Option<&'m EnergyMeter>,
    sampler: Sampler,
    engine: ProfileEngine,
    safety: SafetyMonitor,
    telemetry: TelemetryBuffer,
    last_sample: SampleReading,
    store_request: Option<StoreRequest>,
    epoch_base_s: u32,
}

impl<'m, S, N, H, F> Controller<'m, S, N, H, F>
where
    S: TickScheduler,
    N: Notifier,
    H: RelayOutput,
    F: RelayOutput,
{
    /// Create a controller; both relays start released
    ///
    /// `config` is expected to have passed [`FiringConfig::validate`].
    pub fn new(
        config: FiringConfig,
        scheduler: S,
        notifier: N,
        heater: H,
        mut enable: F,
        meter: Option<&'m EnergyMeter>,
    ) -> Self {
        enable.set_on(false);
        Self {
            config,
            scheduler,
            notifier,
            actuator: Actuator::new(heater, config.hysteresis_c),
            enable,
            meter,
            sampler: Sampler::new(config.sampler),
            engine: ProfileEngine::new(config),
            safety: SafetyMonitor::new(config.safety),
            telemetry: TelemetryBuffer::new(config.telemetry_interval_ms),
            last_sample: SampleReading::unavailable(),
            store_request: None,
            epoch_base_s: 0,
        }
    }

    /// Register the sample, control and safety timers
    pub fn boot(&mut self) -> Result<(), SchedulerError> {
        let ticks = self.config.ticks;
        self.scheduler
            .register_periodic(ticks.sample_ms, TickKind::Sample)?;
        self.scheduler
            .register_periodic(ticks.control_ms, TickKind::Control)?;
        self.scheduler
            .register_periodic(ticks.safety_ms, TickKind::Safety)?;
        Ok(())
    }

    /// Set the wall-clock time (Unix seconds) corresponding to uptime zero
    pub fn set_epoch_base(&mut self, epoch_s: u32) {
        self.epoch_base_s = epoch_s;
    }

    /// Feed one raw sensor read (sample tick)
    pub fn on_sample(
        &mut self,
        raw: Result<RawReading, SensorError>,
        now_ms: u64,
    ) -> SampleReading {
        let (reading, event) = self.sampler.sample(raw, now_ms);
        self.last_sample = reading;

        if let Some(SamplerEvent::SensorFault { fault_code }) = event {
            self.actuator.force_off();
            self.notifier
                .notify(&Notification::SensorFault { fault_code });
        }

        reading
    }

    /// Dispatch a due tick
    ///
    /// Sample ticks are a no-op here: the platform reads the sensor and calls
    /// [`Self::on_sample`] instead.
    pub fn on_tick(&mut self, kind: TickKind, now_ms: u64) -> Result<(), SchedulerError> {
        match kind {
            TickKind::Sample => Ok(()),
            TickKind::Rate => {
                self.engine.rate_tick();
                Ok(())
            }
            TickKind::Control => self.control_tick(now_ms),
            TickKind::Safety => {
                self.safety_tick(now_ms);
                Ok(())
            }
        }
    }

    /// Start a firing cycle from the latest sample
    pub fn start_firing(&mut self, profile: FiringProfile, now_ms: u64) -> Result<(), CommandError> {
        let stored = profile.clone();
        self.begin(profile, now_ms)?;
        self.store_request = Some(StoreRequest::Save(stored));
        Ok(())
    }

    /// Resume a cycle after a restart, from a profile read back from storage
    ///
    /// Same semantics as [`Self::start_firing`]; the profile is already stored
    /// so no save is queued.
    pub fn recover(&mut self, profile: FiringProfile, now_ms: u64) -> Result<(), CommandError> {
        self.begin(profile, now_ms)
    }

    fn begin(&mut self, profile: FiringProfile, now_ms: u64) -> Result<(), CommandError> {
        let segments = profile.len() as u8;
        self.engine
            .start_firing(profile, &self.last_sample, now_ms, &mut self.scheduler)?;

        self.safety.cycle_started();
        self.actuator.reset();
        if let Some(meter) = self.meter {
            meter.reset();
        }
        self.enable.set_on(true);
        let point = self.point(now_ms);
        self.telemetry.record(now_ms, point);
        self.notifier
            .notify(&Notification::FiringStarted { segments });
        Ok(())
    }

    /// Stop the running cycle
    ///
    /// Returns false when there was nothing to abort.
    pub fn abort(&mut self) -> bool {
        if !self.engine.abort(&mut self.scheduler) {
            return false;
        }

        self.shut_down();
        self.store_request = Some(StoreRequest::Clear);
        self.notifier.notify(&Notification::FiringAborted);
        true
    }

    /// Current phase
    pub fn phase(&self) -> Phase {
        self.engine.phase()
    }

    /// Engine state of the running cycle
    pub fn control_state(&self) -> &ControlState {
        self.engine.state()
    }

    /// Check if the heater relay is energized
    pub fn heater_on(&self) -> bool {
        self.actuator.is_on()
    }

    /// Check if the enable relay is energized
    pub fn enable_on(&self) -> bool {
        self.enable.is_on()
    }

    /// Latest sample
    pub fn last_sample(&self) -> &SampleReading {
        &self.last_sample
    }

    /// Energy counters, when a meter is fitted
    pub fn energy(&self) -> Option<EnergyCounters> {
        self.meter.map(|meter| meter.snapshot())
    }

    /// Temperature history
    pub fn telemetry(&self) -> &TelemetryBuffer {
        &self.telemetry
    }

    /// Scheduler, for platforms that poll it
    pub fn scheduler_mut(&mut self) -> &mut S {
        &mut self.scheduler
    }

    /// Notifier
    pub fn notifier(&self) -> &N {
        &self.notifier
    }

    /// Take the pending persistence request, if any
    pub fn take_store_request(&mut self) -> Option<StoreRequest> {
        self.store_request.take()
    }

    /// One-line status for displays and status endpoints
    pub fn status(&self) -> String<DISPLAY_LEN> {
        let mut out = String::new();
        let state = self.engine.state();
        let temp = self.last_sample.temperature_c;

        // Overflow only truncates the display line
        let _ = match state.phase {
            Phase::Idle => write!(out, "Idle {}", Celsius(temp)),
            Phase::Ramping | Phase::Holding => write!(
                out,
                "{} {}/{} {}>{}",
                state.phase.as_str(),
                state.segment_index + 1,
                self.engine.profile().map_or(0, FiringProfile::len),
                Celsius(temp),
                Celsius(state.setpoint_c),
            ),
            Phase::CoolingDown => write!(
                out,
                "Cooling {}>{}",
                Celsius(temp),
                Celsius(state.setpoint_c)
            ),
            Phase::Fault => match state.fault {
                Some(FaultKind::RampTimeout) => write!(out, "Fault: not heating"),
                Some(FaultKind::OverTemperature) => write!(out, "Fault: {} too hot", Celsius(temp)),
                None => write!(out, "Fault"),
            },
        };
        out
    }

    fn control_tick(&mut self, now_ms: u64) -> Result<(), SchedulerError> {
        let result = self
            .engine
            .control_tick(&self.last_sample, now_ms, &mut self.scheduler);

        if let Ok(events) = &result {
            for event in events {
                self.on_engine_event(*event);
            }
        }

        let state = *self.engine.state();
        self.actuator
            .update(state.setpoint_c, self.last_sample.temperature_c, state.phase);

        if state.phase.is_active() {
            let point = self.point(now_ms);
            self.telemetry.maybe_record(now_ms, point);
        }

        let live = LiveTelemetry {
            temperature_c: self.last_sample.temperature_c,
            instant_power_w: self.energy().map_or(0.0, |e| e.instant_power_w),
            display: self.status(),
        };
        self.notifier.push_live(&live);

        result.map(|_| ())
    }

    fn on_engine_event(&mut self, event: EngineEvent) {
        if event == EngineEvent::CooldownFinished {
            self.shut_down();
            self.safety.cooldown_finished();
            self.store_request = Some(StoreRequest::Clear);
            self.notifier.notify(&Notification::CooldownFinished);
        }
    }

    fn safety_tick(&mut self, now_ms: u64) {
        let events = self
            .safety
            .check(&self.last_sample, self.engine.state(), now_ms);

        for event in events {
            match event {
                SafetyEvent::InternalOverTemperature(celsius) => {
                    self.notifier
                        .notify(&Notification::InternalOverTemperature { celsius });
                }
                SafetyEvent::ProcessOverTemperature(celsius) => {
                    self.notifier
                        .notify(&Notification::ProcessOverTemperature { celsius });
                }
                SafetyEvent::RampTimeout => {
                    self.notifier.notify(&Notification::RampTimeout);
                    self.fault(FaultKind::RampTimeout);
                }
                SafetyEvent::CycleComplete => {
                    self.notifier.notify(&Notification::CycleComplete);
                    self.notifier.request_restart();
                }
            }
        }

        // Level-triggered: a cycle started while still over the ceiling faults too
        if self.config.safety.abort_on_overtemperature
            && self.safety.is_over_temperature()
            && self.engine.phase().is_active()
        {
            self.fault(FaultKind::OverTemperature);
        }
    }

    fn fault(&mut self, kind: FaultKind) {
        if self.engine.enter_fault(kind, &mut self.scheduler) {
            self.shut_down();
            // A faulted cycle must not resume after a restart
            self.store_request = Some(StoreRequest::Clear);
        }
    }

    fn shut_down(&mut self) {
        self.actuator.force_off();
        self.enable.set_on(false);
    }

    fn point(&self, now_ms: u64) -> TelemetryPoint {
        TelemetryPoint {
            at: self.epoch_base_s.wrapping_add((now_ms / 1000) as u32),
            temperature_c: self.last_sample.temperature_c,
        }
    }
}

/// Whole degrees, or `--` for an unusable reading
struct Celsius(f32);

impl core::fmt::Display for Celsius {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        if self.0.is_nan() {
            f.write_str("--C")
        } else {
            write!(f, "{:.0}C", self.0)
        }
    }
}
