//! Bird behavior state machine
//!
//! Each evaluation walks a fixed priority list and the first rule that fires wins:
//! - Envelope guard (airborne): ceiling or airtime breach forces a landing
//! - Cruise logic (airborne): takeoff completion, cruise ceiling, soaring in and out
//! - Proximity alarm (grounded): flee or become alert when the player is close
//! - Alert decay (grounded): calm down once the player is far enough away
//! - Scheduled random transition (grounded): one draw whenever the deadline passes
//!
//! The brain keeps its own simulation clock, advanced by the delta time it is
//! given, so decisions never depend on the host clock.

use bevy::prelude::*;
use rand::Rng;

use super::decision::{BehaviorDecision, TransitionReason};
use super::envelope::{EnvelopeBreach, FlightEnvelopeGuard};
use crate::components::{BirdState, FlightMode};
use crate::resources::{BirdConfig, FlightEnvelope};

/// Shortest delay before the next scheduled decision (seconds)
pub const DECISION_DELAY_MIN: f32 = 2.0;
/// Longest delay before the next scheduled decision (seconds)
pub const DECISION_DELAY_MAX: f32 = 7.0;

/// Fraction of the alert distance inside which a grounded bird takes off
pub const FLEE_DISTANCE_RATIO: f32 = 0.6;
/// Multiple of the alert distance beyond which an alert bird relaxes
pub const ALERT_CLEAR_RATIO: f32 = 1.5;
/// Per-tick chance for a cruising bird above the band floor to start soaring
pub const SOAR_CHANCE: f32 = 0.1;

/// What a scheduled draw resolves to
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScheduledOutcome {
    Become(BirdState),
    TakeOff,
}

// Cumulative upper bounds; a draw past the last band keeps the current state.
const IDLE_BANDS: [(f32, ScheduledOutcome); 4] = [
    (0.3, ScheduledOutcome::Become(BirdState::Walking)),
    (0.5, ScheduledOutcome::Become(BirdState::Foraging)),
    (0.7, ScheduledOutcome::Become(BirdState::Preening)),
    (0.85, ScheduledOutcome::TakeOff),
];

const ACTIVITY_BANDS: [(f32, ScheduledOutcome); 2] = [
    (0.4, ScheduledOutcome::Become(BirdState::Idle)),
    (0.7, ScheduledOutcome::TakeOff),
];

/// Resolves a uniform draw `r` in `[0, 1)` against the transition table for `state`
pub fn scheduled_outcome(state: BirdState, r: f32) -> Option<ScheduledOutcome> {
    let bands: &[(f32, ScheduledOutcome)] = match state {
        BirdState::Idle => &IDLE_BANDS,
        BirdState::Walking | BirdState::Foraging | BirdState::Preening => &ACTIVITY_BANDS,
        _ => &[],
    };

    bands
        .iter()
        .find(|(upper, _)| r < *upper)
        .map(|(_, outcome)| *outcome)
}

/// World snapshot handed to the brain once per tick
#[derive(Clone, Copy, Debug)]
pub struct BehaviorInput<'a> {
    pub delta_time: f32,
    pub position: Vec3,
    pub player_position: Option<Vec3>,
    pub bird_state: BirdState,
    pub flight_mode: FlightMode,
    /// Seconds airborne in the current flight
    pub flight_timer: f32,
    pub emergency_landing: bool,
    pub ground_level: f32,
    pub config: &'a BirdConfig,
    pub envelope: &'a FlightEnvelope,
}

impl BehaviorInput<'_> {
    pub fn distance_to_player(&self) -> f32 {
        self.player_position
            .map(|player| player.distance(self.position))
            .unwrap_or(f32::INFINITY)
    }

    pub fn height_above_ground(&self) -> f32 {
        self.position.y - self.ground_level
    }
}

/// Per-bird decision state: the simulation clock and the next decision deadline
#[derive(Clone, Debug)]
pub struct BirdBrain {
    clock: f32,
    next_decision_at: f32,
}

impl BirdBrain {
    pub fn new<R: Rng>(rng: &mut R) -> Self {
        let mut brain = Self {
            clock: 0.0,
            next_decision_at: 0.0,
        };
        brain.reschedule(rng);
        brain
    }

    pub fn clock(&self) -> f32 {
        self.clock
    }

    pub fn next_decision_at(&self) -> f32 {
        self.next_decision_at
    }

    /// Schedules the next voluntary decision `uniform(2, 7)` seconds from now
    pub fn reschedule<R: Rng>(&mut self, rng: &mut R) {
        self.next_decision_at = self.clock + rng.gen_range(DECISION_DELAY_MIN..DECISION_DELAY_MAX);
    }

    pub fn evaluate<R: Rng>(&mut self, input: &BehaviorInput, rng: &mut R) -> BehaviorDecision {
        if !input.delta_time.is_finite() || input.delta_time <= 0.0 {
            return BehaviorDecision::hold(input.bird_state, input.flight_mode);
        }
        self.clock += input.delta_time;

        if input.flight_mode.is_airborne() {
            self.evaluate_airborne(input, rng)
        } else {
            self.evaluate_grounded(input, rng)
        }
    }

    fn evaluate_airborne<R: Rng>(&mut self, input: &BehaviorInput, rng: &mut R) -> BehaviorDecision {
        let hold = BehaviorDecision::hold(input.bird_state, input.flight_mode);

        if input.emergency_landing {
            return BehaviorDecision::land(true, TransitionReason::EmergencyLanding);
        }

        let guard = FlightEnvelopeGuard::new(input.envelope);
        match guard.check(input.position.y, input.flight_timer) {
            Some(EnvelopeBreach::Altitude) => {
                return BehaviorDecision::land(true, TransitionReason::AltitudeExceeded);
            }
            Some(EnvelopeBreach::Duration) => {
                return BehaviorDecision::land(false, TransitionReason::FlightTimeExceeded);
            }
            None => {}
        }

        let band = input.config.flight_altitude;
        let height = input.height_above_ground();

        match input.bird_state {
            BirdState::TakingOff if height >= band.min || input.position.y >= guard.cruise_ceiling() => {
                BehaviorDecision::change(
                    BirdState::Flying,
                    FlightMode::Cruising,
                    TransitionReason::TakeoffComplete,
                )
            }
            BirdState::Flying | BirdState::Soaring
                if height > band.max && guard.min_flight_time_reached(input.flight_timer) =>
            {
                BehaviorDecision::land(false, TransitionReason::CruiseCeiling)
            }
            BirdState::Flying if height > band.min && rng.gen::<f32>() < SOAR_CHANCE => {
                BehaviorDecision::change(
                    BirdState::Soaring,
                    FlightMode::Cruising,
                    TransitionReason::SoaringStarted,
                )
            }
            BirdState::Soaring if height < band.min => BehaviorDecision::change(
                BirdState::Flying,
                FlightMode::Cruising,
                TransitionReason::SoaringEnded,
            ),
            _ => hold,
        }
    }

    fn evaluate_grounded<R: Rng>(&mut self, input: &BehaviorInput, rng: &mut R) -> BehaviorDecision {
        let hold = BehaviorDecision::hold(input.bird_state, input.flight_mode);
        let distance = input.distance_to_player();
        let alert_distance = input.config.alert_distance;
        let can_take_off = FlightEnvelopeGuard::new(input.envelope).allows_takeoff(input.ground_level);

        if distance < alert_distance {
            // Ground too high to fly from: the bird stays put and watches
            if distance < alert_distance * FLEE_DISTANCE_RATIO && can_take_off {
                return BehaviorDecision::take_off(TransitionReason::Flee);
            }
            if input.bird_state != BirdState::Alert {
                return BehaviorDecision::change(
                    BirdState::Alert,
                    FlightMode::Grounded,
                    TransitionReason::PlayerNearby,
                );
            }
            return hold;
        }

        if input.bird_state == BirdState::Alert {
            if distance > alert_distance * ALERT_CLEAR_RATIO {
                self.reschedule(rng);
                return BehaviorDecision::change(
                    BirdState::Idle,
                    FlightMode::Grounded,
                    TransitionReason::AlertCleared,
                );
            }
            return hold;
        }

        if self.clock < self.next_decision_at {
            return hold;
        }

        let r: f32 = rng.gen();
        self.reschedule(rng);

        match scheduled_outcome(input.bird_state, r) {
            Some(ScheduledOutcome::Become(state)) if state != input.bird_state => {
                BehaviorDecision::change(state, FlightMode::Grounded, TransitionReason::Scheduled)
            }
            Some(ScheduledOutcome::TakeOff) if can_take_off => {
                BehaviorDecision::take_off(TransitionReason::Scheduled)
            }
            _ => hold,
        }
    }
}
