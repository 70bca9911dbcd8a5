//! Firing profile execution
//!
//! Owns the [`ControlState`] for the running cycle. Two cadences drive it:
//! the slow rate tick moves the setpoint, the faster control tick watches the
//! sample and decides phase transitions.

use heapless::Vec;

use crate::config::FiringConfig;
use crate::profile::{FiringProfile, ProfileError, Segment};
use crate::sampler::SampleReading;
use crate::state::{ControlState, Event, FaultKind, Phase, RampDirection};
use crate::traits::{SchedulerError, TickKind, TickScheduler, TimerHandle};

/// Phase changes reported by the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum EngineEvent {
    /// Kiln reached the segment target; soak timer started
    HoldStarted {
        /// Segment index
        segment: u8,
    },
    /// Ramp toward the next segment started
    SegmentStarted {
        /// Segment index
        segment: u8,
    },
    /// Final soak done, controlled cooldown started
    CooldownStarted,
    /// Cooldown reached its cutover; engine is idle again
    CooldownFinished,
}

/// Events produced by one control tick (enter hold and skip a zero hold)
pub type EngineEvents = Vec<EngineEvent, 3>;

/// Reasons a command is rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CommandError {
    /// A cycle is already running or faulted
    Busy,
    /// Profile failed validation
    InvalidProfile(ProfileError),
    /// No usable temperature to start the setpoint from
    SensorUnavailable,
    /// The rate timer could not be registered
    Scheduler(SchedulerError),
}

impl From<ProfileError> for CommandError {
    fn from(e: ProfileError) -> Self {
        CommandError::InvalidProfile(e)
    }
}

impl From<SchedulerError> for CommandError {
    fn from(e: SchedulerError) -> Self {
        CommandError::Scheduler(e)
    }
}

/// Firing state machine
#[derive(Debug)]
pub struct ProfileEngine {
    config: FiringConfig,
    profile: Option<FiringProfile>,
    state: ControlState,
    rate_timer: Option<TimerHandle>,
}

impl ProfileEngine {
    /// Create an idle engine
    pub fn new(config: FiringConfig) -> Self {
        Self {
            config,
            profile: None,
            state: ControlState::default(),
            rate_timer: None,
        }
    }

    /// Current control state
    pub fn state(&self) -> &ControlState {
        &self.state
    }

    /// Current phase
    pub fn phase(&self) -> Phase {
        self.state.phase
    }

    /// Profile of the running cycle
    pub fn profile(&self) -> Option<&FiringProfile> {
        self.profile.as_ref()
    }

    /// Segment being ramped to or held
    pub fn current_segment(&self) -> Option<&Segment> {
        if !matches!(self.state.phase, Phase::Ramping | Phase::Holding) {
            return None;
        }
        self.profile
            .as_ref()?
            .get(self.state.segment_index as usize)
    }

    /// Start a cycle from `sample`
    ///
    /// Only valid from Idle. Rejected commands leave the engine untouched.
    pub fn start_firing<S: TickScheduler>(
        &mut self,
        profile: FiringProfile,
        sample: &SampleReading,
        now_ms: u64,
        scheduler: &mut S,
    ) -> Result<(), CommandError> {
        if self.state.phase != Phase::Idle {
            return Err(CommandError::Busy);
        }
        profile.validate()?;
        if !sample.is_usable() {
            return Err(CommandError::SensorUnavailable);
        }
        let first = *profile.get(0).ok_or(ProfileError::Empty)?;

        self.rate_timer = Some(scheduler.register_periodic(self.config.ticks.rate_ms, TickKind::Rate)?);
        self.state = ControlState {
            segment_index: 0,
            setpoint_c: sample.temperature_c,
            cycle_start_ms: now_ms,
            hold_start_ms: None,
            phase: Phase::Idle.transition(Event::Start),
            direction: direction_toward(sample.temperature_c, first.target_temp_c),
            fault: None,
        };
        self.profile = Some(profile);
        Ok(())
    }

    /// Advance the setpoint by one rate period
    pub fn rate_tick(&mut self) {
        match self.state.phase {
            Phase::Ramping => {
                let Some(segment) = self.current_segment().copied() else {
                    return;
                };
                let step = self.config.step_per_rate_tick(segment.ramp_rate_c_per_hour);
                let target = segment.target_temp_c;

                self.state.setpoint_c = match self.state.direction {
                    RampDirection::Up if self.state.setpoint_c >= target => target,
                    RampDirection::Up => (self.state.setpoint_c + step).min(target),
                    RampDirection::Down if self.state.setpoint_c <= target => target,
                    RampDirection::Down => (self.state.setpoint_c - step).max(target),
                };
            }
            Phase::CoolingDown => {
                let step = self.config.step_per_rate_tick(self.config.cooldown_rate_c_per_hour);
                self.state.setpoint_c -= step;
            }
            _ => {}
        }
    }

    /// Evaluate phase transitions against the latest sample
    pub fn control_tick<S: TickScheduler>(
        &mut self,
        sample: &SampleReading,
        now_ms: u64,
        scheduler: &mut S,
    ) -> Result<EngineEvents, SchedulerError> {
        let mut events = EngineEvents::new();

        if self.state.phase == Phase::Ramping {
            if let Some(event) = self.check_target_reached(sample, now_ms, scheduler) {
                let _ = events.push(event);
            }
        }

        // A zero-minute hold advances on the same tick it starts
        if self.state.phase == Phase::Holding {
            if let Some(event) = self.check_hold_elapsed(now_ms, scheduler)? {
                let _ = events.push(event);
            }
        }

        if self.state.phase == Phase::CoolingDown {
            if let Some(event) = self.check_cooldown_done(sample, scheduler) {
                let _ = events.push(event);
            }
        }

        Ok(events)
    }

    fn check_target_reached<S: TickScheduler>(
        &mut self,
        sample: &SampleReading,
        now_ms: u64,
        scheduler: &mut S,
    ) -> Option<EngineEvent> {
        let target = self.current_segment()?.target_temp_c;
        let reached = match self.state.direction {
            RampDirection::Up => sample.temperature_c > target,
            RampDirection::Down => sample.temperature_c < target,
        };
        if !reached {
            return None;
        }

        self.state.setpoint_c = target;
        self.state.hold_start_ms = Some(now_ms);
        self.cancel_rate_timer(scheduler);
        self.state.phase = self.state.phase.transition(Event::TargetReached);
        Some(EngineEvent::HoldStarted {
            segment: self.state.segment_index,
        })
    }

    fn check_hold_elapsed<S: TickScheduler>(
        &mut self,
        now_ms: u64,
        scheduler: &mut S,
    ) -> Result<Option<EngineEvent>, SchedulerError> {
        let Some(profile) = self.profile.as_ref() else {
            return Ok(None);
        };
        let index = self.state.segment_index as usize;
        let Some(segment) = profile.get(index) else {
            return Ok(None);
        };
        let Some(elapsed) = self.state.hold_elapsed_minutes(now_ms) else {
            return Ok(None);
        };
        if elapsed < segment.hold_minutes as u64 {
            return Ok(None);
        }

        let next = profile.get(index + 1).copied();

        // Register first so a full timer table leaves us soaking, not stuck
        if self.rate_timer.is_none() {
            self.rate_timer =
                Some(scheduler.register_periodic(self.config.ticks.rate_ms, TickKind::Rate)?);
        }
        self.state.hold_start_ms = None;

        match next {
            Some(next) => {
                self.state.segment_index += 1;
                self.state.direction = direction_toward(self.state.setpoint_c, next.target_temp_c);
                self.state.phase = self.state.phase.transition(Event::HoldElapsed);
                Ok(Some(EngineEvent::SegmentStarted {
                    segment: self.state.segment_index,
                }))
            }
            None => {
                self.state.direction = RampDirection::Down;
                self.state.phase = self.state.phase.transition(Event::FinalHoldElapsed);
                Ok(Some(EngineEvent::CooldownStarted))
            }
        }
    }

    fn check_cooldown_done<S: TickScheduler>(
        &mut self,
        sample: &SampleReading,
        scheduler: &mut S,
    ) -> Option<EngineEvent> {
        let final_target = self.profile.as_ref()?.last()?.target_temp_c;
        let cutover = final_target - self.config.cooldown_margin_c;

        let done = self.state.setpoint_c < cutover
            || sample.temperature_c < self.config.cooldown_floor_c;
        if !done {
            return None;
        }

        self.cancel_rate_timer(scheduler);
        self.state.phase = self.state.phase.transition(Event::CooldownDone);
        self.profile = None;
        Some(EngineEvent::CooldownFinished)
    }

    /// Stop the cycle from any non-idle phase
    ///
    /// Returns false (and does nothing) when already idle.
    pub fn abort<S: TickScheduler>(&mut self, scheduler: &mut S) -> bool {
        if self.state.phase == Phase::Idle {
            return false;
        }

        self.cancel_rate_timer(scheduler);
        self.state.phase = self.state.phase.transition(Event::Abort);
        self.state.hold_start_ms = None;
        self.state.fault = None;
        self.profile = None;
        true
    }

    /// Latch a safety fault; the cycle stays faulted until aborted
    ///
    /// Returns false when there is no active cycle to fault.
    pub fn enter_fault<S: TickScheduler>(&mut self, kind: FaultKind, scheduler: &mut S) -> bool {
        if !self.state.phase.is_active() {
            return false;
        }

        self.cancel_rate_timer(scheduler);
        self.state.phase = self.state.phase.transition(Event::FaultDetected(kind));
        self.state.fault = Some(kind);
        true
    }

    fn cancel_rate_timer<S: TickScheduler>(&mut self, scheduler: &mut S) {
        if let Some(handle) = self.rate_timer.take() {
            scheduler.cancel(handle);
        }
    }
}

fn direction_toward(from_c: f32, target_c: f32) -> RampDirection {
    if target_c < from_c {
        RampDirection::Down
    } else {
        RampDirection::Up
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::Segment;
    use crate::schedule::TimerTable;
    use proptest::prelude::*;

    const MINUTE: u64 = 60_000;

    fn sample(temperature_c: f32) -> SampleReading {
        SampleReading {
            temperature_c,
            internal_c: 25.0,
            fault_code: 0,
            taken_at_ms: 0,
        }
    }

    fn profile(segments: &[Segment]) -> FiringProfile {
        FiringProfile::new(segments).unwrap()
    }

    fn started(segments: &[Segment], from_c: f32) -> (ProfileEngine, TimerTable) {
        let mut engine = ProfileEngine::new(FiringConfig::default());
        let mut table = TimerTable::new();
        engine
            .start_firing(profile(segments), &sample(from_c), 0, &mut table)
            .unwrap();
        (engine, table)
    }

    #[test]
    fn test_engine_creation() {
        let engine = ProfileEngine::new(FiringConfig::default());
        assert_eq!(engine.phase(), Phase::Idle);
        assert!(engine.profile().is_none());
    }

    #[test]
    fn test_start_firing() {
        let (engine, table) = started(&[Segment::new(550.0, 550.0, 15)], 20.0);

        assert_eq!(engine.phase(), Phase::Ramping);
        assert_eq!(engine.state().segment_index, 0);
        assert_eq!(engine.state().setpoint_c, 20.0);
        assert!(table.is_registered(TickKind::Rate));
    }

    #[test]
    fn test_start_rejected_without_side_effects() {
        let mut engine = ProfileEngine::new(FiringConfig::default());
        let mut table: TimerTable = TimerTable::new();
        let seg = [Segment::new(550.0, 550.0, 15)];

        assert_eq!(
            engine.start_firing(profile(&seg), &sample(f32::NAN), 0, &mut table),
            Err(CommandError::SensorUnavailable)
        );
        assert_eq!(engine.phase(), Phase::Idle);
        assert_eq!(table.active(), 0);

        engine
            .start_firing(profile(&seg), &sample(20.0), 0, &mut table)
            .unwrap();
        let before = *engine.state();
        assert_eq!(
            engine.start_firing(profile(&seg), &sample(20.0), 5, &mut table),
            Err(CommandError::Busy)
        );
        assert_eq!(*engine.state(), before);
        assert_eq!(table.active(), 1);
    }

    #[test]
    fn test_ramp_advances_and_clamps() {
        // 600°C/h at 60s ticks = 10°C per tick
        let (mut engine, _table) = started(&[Segment::new(45.0, 600.0, 0)], 20.0);

        engine.rate_tick();
        assert_eq!(engine.state().setpoint_c, 30.0);
        engine.rate_tick();
        assert_eq!(engine.state().setpoint_c, 40.0);
        engine.rate_tick();
        assert_eq!(engine.state().setpoint_c, 45.0);
        engine.rate_tick();
        assert_eq!(engine.state().setpoint_c, 45.0);
    }

    #[test]
    fn test_target_reached_starts_hold() {
        let (mut engine, mut table) = started(&[Segment::new(550.0, 550.0, 15)], 20.0);

        let events = engine.control_tick(&sample(550.0), 1_000, &mut table).unwrap();
        assert!(events.is_empty());
        assert_eq!(engine.phase(), Phase::Ramping);

        let events = engine.control_tick(&sample(551.0), 2_000, &mut table).unwrap();
        assert_eq!(events.as_slice(), &[EngineEvent::HoldStarted { segment: 0 }]);
        assert_eq!(engine.phase(), Phase::Holding);
        assert_eq!(engine.state().setpoint_c, 550.0);
        assert_eq!(engine.state().hold_start_ms, Some(2_000));
        assert!(!table.is_registered(TickKind::Rate));
    }

    #[test]
    fn test_hold_duration_accounting() {
        let (mut engine, mut table) = started(&[Segment::new(550.0, 550.0, 15)], 20.0);
        let t = 10 * MINUTE;
        engine.control_tick(&sample(560.0), t, &mut table).unwrap();

        for now in [t, t + MINUTE, t + 14 * MINUTE, t + 15 * MINUTE - 1] {
            engine.control_tick(&sample(550.0), now, &mut table).unwrap();
            assert_eq!(engine.phase(), Phase::Holding);
        }

        let events = engine
            .control_tick(&sample(550.0), t + 15 * MINUTE, &mut table)
            .unwrap();
        assert_eq!(events.as_slice(), &[EngineEvent::CooldownStarted]);
        assert_eq!(engine.phase(), Phase::CoolingDown);
        assert_eq!(engine.state().hold_start_ms, None);
        assert!(table.is_registered(TickKind::Rate));
    }

    #[test]
    fn test_zero_hold_skips_immediately() {
        let (mut engine, mut table) = started(
            &[Segment::new(100.0, 100.0, 0), Segment::new(600.0, 200.0, 10)],
            20.0,
        );

        let events = engine.control_tick(&sample(101.0), 5_000, &mut table).unwrap();
        assert_eq!(
            events.as_slice(),
            &[
                EngineEvent::HoldStarted { segment: 0 },
                EngineEvent::SegmentStarted { segment: 1 }
            ]
        );
        assert_eq!(engine.phase(), Phase::Ramping);
        assert_eq!(engine.state().segment_index, 1);
        assert_eq!(engine.state().hold_start_ms, None);
        assert!(table.is_registered(TickKind::Rate));
    }

    #[test]
    fn test_descending_segment() {
        let (mut engine, mut table) = started(
            &[Segment::new(600.0, 600.0, 0), Segment::new(500.0, 600.0, 0)],
            590.0,
        );
        engine.control_tick(&sample(601.0), 0, &mut table).unwrap();
        assert_eq!(engine.state().segment_index, 1);
        assert_eq!(engine.state().direction, RampDirection::Down);

        engine.rate_tick();
        assert_eq!(engine.state().setpoint_c, 590.0);

        // Still above the lower target
        engine.control_tick(&sample(560.0), 1_000, &mut table).unwrap();
        assert_eq!(engine.phase(), Phase::Ramping);

        engine.control_tick(&sample(499.0), 2_000, &mut table).unwrap();
        assert_eq!(engine.state().setpoint_c, 500.0);
    }

    #[test]
    fn test_cooldown_setpoint_only_decreases() {
        let (mut engine, mut table) = started(&[Segment::new(550.0, 550.0, 0)], 20.0);
        engine.control_tick(&sample(551.0), 0, &mut table).unwrap();
        assert_eq!(engine.phase(), Phase::CoolingDown);

        let mut last = engine.state().setpoint_c;
        for _ in 0..10 {
            engine.rate_tick();
            assert!(engine.state().setpoint_c < last);
            last = engine.state().setpoint_c;
        }
    }

    #[test]
    fn test_cooldown_ends_below_floor() {
        let (mut engine, mut table) = started(&[Segment::new(550.0, 550.0, 0)], 20.0);
        engine.control_tick(&sample(551.0), 0, &mut table).unwrap();

        engine.control_tick(&sample(300.0), 1_000, &mut table).unwrap();
        assert_eq!(engine.phase(), Phase::CoolingDown);

        let events = engine.control_tick(&sample(99.0), 2_000, &mut table).unwrap();
        assert_eq!(events.as_slice(), &[EngineEvent::CooldownFinished]);
        assert_eq!(engine.phase(), Phase::Idle);
        assert_eq!(table.active(), 0);
    }

    #[test]
    fn test_cooldown_ends_at_cutover() {
        let config = FiringConfig {
            cooldown_margin_c: 10.0,
            cooldown_rate_c_per_hour: 600.0,
            ..Default::default()
        };
        let mut engine = ProfileEngine::new(config);
        let mut table: TimerTable = TimerTable::new();
        engine
            .start_firing(profile(&[Segment::new(550.0, 550.0, 0)]), &sample(20.0), 0, &mut table)
            .unwrap();
        engine.control_tick(&sample(551.0), 0, &mut table).unwrap();

        engine.rate_tick();
        engine.control_tick(&sample(530.0), 1, &mut table).unwrap();
        assert_eq!(engine.phase(), Phase::CoolingDown);

        // 550 - 2 * 10 = 530 < 540 cutover
        engine.rate_tick();
        engine.control_tick(&sample(530.0), 2, &mut table).unwrap();
        assert_eq!(engine.phase(), Phase::Idle);
    }

    #[test]
    fn test_abort_from_every_phase() {
        let seg = [Segment::new(550.0, 550.0, 15)];

        let (mut ramping, mut table) = started(&seg, 20.0);
        assert!(ramping.abort(&mut table));
        assert_eq!(ramping.phase(), Phase::Idle);
        assert_eq!(table.active(), 0);

        let (mut holding, mut table) = started(&seg, 20.0);
        holding.control_tick(&sample(560.0), 0, &mut table).unwrap();
        assert!(holding.abort(&mut table));
        assert_eq!(holding.phase(), Phase::Idle);

        let (mut faulted, mut table) = started(&seg, 20.0);
        faulted.enter_fault(FaultKind::RampTimeout, &mut table);
        assert!(faulted.abort(&mut table));
        assert_eq!(faulted.phase(), Phase::Idle);
        assert_eq!(faulted.state().fault, None);

        // Idempotent
        assert!(!faulted.abort(&mut table));
    }

    #[test]
    fn test_fault_is_sticky() {
        let (mut engine, mut table) = started(&[Segment::new(550.0, 550.0, 0)], 20.0);
        assert!(engine.enter_fault(FaultKind::RampTimeout, &mut table));
        assert_eq!(engine.phase(), Phase::Fault);
        assert!(!table.is_registered(TickKind::Rate));

        engine.rate_tick();
        engine.control_tick(&sample(600.0), 1_000, &mut table).unwrap();
        assert_eq!(engine.phase(), Phase::Fault);
        assert_eq!(engine.state().fault, Some(FaultKind::RampTimeout));

        // Restart only after abort
        assert_eq!(
            engine.start_firing(profile(&[Segment::new(550.0, 550.0, 0)]), &sample(20.0), 0, &mut table),
            Err(CommandError::Busy)
        );
    }

    proptest! {
        #[test]
        fn prop_ramp_setpoint_never_exceeds_target(
            target in 50.0f32..1300.0,
            rate in 1.0f32..2000.0,
            start in 0.0f32..50.0,
            ticks in 0usize..400,
        ) {
            let (mut engine, _table) = started(&[Segment::new(target, rate, 0)], start);
            let mut last = engine.state().setpoint_c;
            for _ in 0..ticks {
                engine.rate_tick();
                let sp = engine.state().setpoint_c;
                prop_assert!(sp <= target);
                prop_assert!(sp >= last);
                last = sp;
            }
        }
    }
}
