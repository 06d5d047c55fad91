//! Per-bird tick driver
//!
//! Every tick, in order:
//! 1. Advance the state and flight timers
//! 2. Ask the [`BirdBrain`] for a decision
//! 3. Apply the decision through [`IntentSink`]
//! 4. Integrate flight physics (or the landing routine) while airborne
//! 5. Drive ground locomotion or patrol following for the resolved state
//! 6. Expose state, velocity and rotation for animation and rendering

use arrayvec::ArrayVec;
use bevy::prelude::*;
use rand::Rng;

use super::flight_path::FlightPath;
use super::ground::{
    horizontal_distance, random_point_around, step_toward, FORAGE_REPICK_CHANCE, FORAGE_REPICK_RADIUS,
    FORAGE_SPEED_FACTOR, TARGET_REACHED_DISTANCE,
};
use crate::behavior::{BehaviorInput, BirdBrain, IntentSink, TransitionReason};
use crate::components::{BirdState, FlightMode};
use crate::physics::{
    execute_emergency_landing, execute_landing, ground_contact_height, step_flight, FlightContext,
    FlightKinematics, EMERGENCY_PITCH, HOVER_INTENSITY, MAX_CLIMB_RATE,
};
use crate::resources::{BirdConfig, FlightEnvelope};

/// Wing-beat intensity while climbing out after takeoff
pub const TAKEOFF_INTENSITY: f32 = 1.3;
/// Minimum climb rate given on the takeoff tick
pub const TAKEOFF_KICK: f32 = 2.0;
/// Fraction of flight speed given horizontally on takeoff
pub const TAKEOFF_SPEED_FACTOR: f32 = 0.5;
/// Altitude error (units) tolerated before flapping harder or gliding
pub const ALTITUDE_DEADBAND: f32 = 1.0;
/// Extra wing-beat intensity per unit of altitude deficit
pub const CLIMB_INTENSITY_GAIN: f32 = 0.05;
pub const MAX_CRUISE_INTENSITY: f32 = 1.3;
/// Maximum cruise pitch (radians), reached at the climb rate limit
pub const MAX_CRUISE_PITCH: f32 = 0.3;

// A tick applies at most one decision, one position reset and one touchdown
const MAX_TRANSITIONS_PER_TICK: usize = 4;

/// Band midpoint above `ground_level`, held under the envelope's cruise ceiling
pub fn cruise_altitude_over(config: &BirdConfig, envelope: &FlightEnvelope, ground_level: f32) -> f32 {
    (ground_level + config.flight_altitude.midpoint()).min(envelope.cruise_ceiling())
}

/// One applied change of state or flight mode
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BirdTransition {
    pub from_state: BirdState,
    pub to_state: BirdState,
    pub flight_mode: FlightMode,
    pub reason: TransitionReason,
}

/// World inputs for one tick
#[derive(Clone, Copy, Debug)]
pub struct TickInput {
    pub delta_time: f32,
    pub player_position: Option<Vec3>,
    /// Ground height under the bird
    pub ground_level: f32,
}

#[derive(Clone, Debug, Default)]
pub struct TickReport {
    pub transitions: ArrayVec<BirdTransition, MAX_TRANSITIONS_PER_TICK>,
}

/// A single bird: owns its transform, motion, behavior clock and patrol route
#[derive(Component, Clone, Debug)]
pub struct BirdAgent {
    config: BirdConfig,
    envelope: FlightEnvelope,
    brain: BirdBrain,
    flight_path: FlightPath,
    kinematics: FlightKinematics,
    home_position: Vec3,
    target_position: Option<Vec3>,
    bird_state: BirdState,
    flight_mode: FlightMode,
    /// Seconds in the current state
    state_timer: f32,
    /// Seconds airborne in the current flight
    flight_timer: f32,
    emergency_landing: bool,
    /// World-space altitude held while cruising
    cruise_altitude: f32,
    yaw: f32,
    pitch: f32,
    ground_level: f32,
    player_position: Option<Vec3>,
    transitions: ArrayVec<BirdTransition, MAX_TRANSITIONS_PER_TICK>,
}

impl BirdAgent {
    /// Spawns an idle, grounded bird standing at `home`
    pub fn new<R: Rng>(
        config: BirdConfig,
        envelope: FlightEnvelope,
        home: Vec3,
        ground_level: f32,
        rng: &mut R,
    ) -> Self {
        let home_position = Vec3::new(home.x, ground_contact_height(ground_level), home.z);
        let flight_path = FlightPath::patrol(home_position, config.territory_radius);
        let cruise_altitude = cruise_altitude_over(&config, &envelope, ground_level);

        Self {
            brain: BirdBrain::new(rng),
            flight_path,
            kinematics: FlightKinematics::at(home_position),
            home_position,
            target_position: None,
            bird_state: BirdState::Idle,
            flight_mode: FlightMode::Grounded,
            state_timer: 0.0,
            flight_timer: 0.0,
            emergency_landing: false,
            cruise_altitude,
            yaw: 0.0,
            pitch: 0.0,
            ground_level,
            player_position: None,
            transitions: ArrayVec::new(),
            config,
            envelope,
        }
    }

    pub fn config(&self) -> &BirdConfig {
        &self.config
    }

    pub fn envelope(&self) -> &FlightEnvelope {
        &self.envelope
    }

    pub fn brain(&self) -> &BirdBrain {
        &self.brain
    }

    pub fn bird_state(&self) -> BirdState {
        self.bird_state
    }

    pub fn flight_mode(&self) -> FlightMode {
        self.flight_mode
    }

    pub fn position(&self) -> Vec3 {
        self.kinematics.position
    }

    pub fn velocity(&self) -> Vec3 {
        self.kinematics.velocity
    }

    pub fn is_flapping(&self) -> bool {
        self.kinematics.is_flapping
    }

    pub fn wing_beat_intensity(&self) -> f32 {
        self.kinematics.wing_beat_intensity
    }

    pub fn soaring_altitude_loss(&self) -> f32 {
        self.kinematics.soaring_altitude_loss
    }

    pub fn home_position(&self) -> Vec3 {
        self.home_position
    }

    pub fn target_position(&self) -> Option<Vec3> {
        self.target_position
    }

    pub fn state_timer(&self) -> f32 {
        self.state_timer
    }

    pub fn flight_timer(&self) -> f32 {
        self.flight_timer
    }

    pub fn is_emergency_landing(&self) -> bool {
        self.emergency_landing
    }

    pub fn cruise_altitude(&self) -> f32 {
        self.cruise_altitude
    }

    pub fn yaw(&self) -> f32 {
        self.yaw
    }

    /// Positive is nose up
    pub fn pitch(&self) -> f32 {
        self.pitch
    }

    /// Mesh rotation: yaw about +Y with the beak along +Z, then pitch
    pub fn rotation(&self) -> Quat {
        Quat::from_euler(EulerRot::YXZ, self.yaw, -self.pitch, 0.0)
    }

    /// Moves the bird without touching its state, e.g. when a zone streams in under it
    pub fn set_position(&mut self, position: Vec3) {
        self.kinematics.position = position;
    }

    pub fn tick<R: Rng>(&mut self, input: TickInput, rng: &mut R) -> TickReport {
        self.transitions.clear();

        let dt = input.delta_time;
        if !dt.is_finite() || dt <= 0.0 {
            return TickReport::default();
        }

        self.ground_level = if input.ground_level.is_finite() {
            input.ground_level
        } else {
            self.ground_level
        };
        self.player_position = input.player_position.filter(|player| player.is_finite());

        if !self.kinematics.position.is_finite() {
            log::warn!(
                "[BIRD] Non-finite position for {} bird, returning it home",
                self.config.species
            );
            self.kinematics.position = Vec3::new(
                self.home_position.x,
                ground_contact_height(self.ground_level),
                self.home_position.z,
            );
            self.kinematics.velocity = Vec3::ZERO;
            if self.flight_mode.is_airborne() {
                self.force_grounding();
            }
        }

        self.state_timer += dt;
        if self.flight_mode.is_airborne() {
            self.flight_timer += dt;
        }

        let decision = self.brain.evaluate(
            &BehaviorInput {
                delta_time: dt,
                position: self.kinematics.position,
                player_position: self.player_position,
                bird_state: self.bird_state,
                flight_mode: self.flight_mode,
                flight_timer: self.flight_timer,
                emergency_landing: self.emergency_landing,
                ground_level: self.ground_level,
                config: &self.config,
                envelope: &self.envelope,
            },
            rng,
        );
        decision.dispatch(self);

        if self.flight_mode.is_airborne() {
            self.integrate_flight(dt, rng);
        }

        self.locomote(dt, rng);
        self.update_yaw();

        TickReport {
            transitions: self.transitions.clone(),
        }
    }

    fn integrate_flight<R: Rng>(&mut self, dt: f32, rng: &mut R) {
        if self.bird_state == BirdState::Landing {
            let touched_down = if self.emergency_landing {
                self.pitch = EMERGENCY_PITCH;
                execute_emergency_landing(&mut self.kinematics, dt, self.ground_level)
            } else {
                let step = execute_landing(&mut self.kinematics, dt, self.ground_level);
                self.pitch = step.pitch;
                step.touched_down
            };

            if touched_down {
                self.force_grounding();
                self.brain.reschedule(rng);
            }
            return;
        }

        let step = step_flight(
            &mut self.kinematics,
            &FlightContext {
                delta_time: dt,
                bird_state: self.bird_state,
                flight_mode: self.flight_mode,
                target_altitude: self.cruise_altitude,
                ground_level: self.ground_level,
            },
            rng,
        );
        if step.sink_recovery {
            log::debug!(
                "[BIRD DEBUG] {} bird sank too far while soaring at {:.1}, flapping again",
                self.config.species,
                self.kinematics.position.y
            );
        }
        self.pitch = (self.kinematics.velocity.y / MAX_CLIMB_RATE).clamp(-1.0, 1.0) * MAX_CRUISE_PITCH;
    }

    fn locomote<R: Rng>(&mut self, dt: f32, rng: &mut R) {
        match self.bird_state {
            BirdState::Walking => self.walk(dt, rng),
            BirdState::Foraging => self.forage(dt, rng),
            BirdState::Flying => {
                self.follow_patrol(dt);
                self.hold_cruise_altitude();
            }
            BirdState::Soaring => {
                self.follow_patrol(dt);
                // Only physics may start flapping during a soar; stop once back at altitude
                if self.kinematics.is_flapping && self.kinematics.position.y >= self.cruise_altitude {
                    self.kinematics.is_flapping = false;
                }
            }
            BirdState::Idle | BirdState::Alert | BirdState::Preening => {
                self.kinematics.velocity = Vec3::ZERO;
                self.stand_on_ground();
            }
            BirdState::TakingOff | BirdState::Landing => {}
        }
    }

    fn walk<R: Rng>(&mut self, dt: f32, rng: &mut R) {
        let reached = self
            .target_position
            .map_or(true, |target| horizontal_distance(target, self.kinematics.position) < TARGET_REACHED_DISTANCE);
        if reached {
            self.target_position = Some(random_point_around(
                self.home_position,
                self.config.territory_radius,
                rng,
            ));
        }

        self.move_on_ground(self.config.walk_speed, dt);
    }

    fn forage<R: Rng>(&mut self, dt: f32, rng: &mut R) {
        let reached = self
            .target_position
            .map_or(true, |target| horizontal_distance(target, self.kinematics.position) < TARGET_REACHED_DISTANCE);
        if reached || rng.gen::<f32>() < FORAGE_REPICK_CHANCE {
            let mut spot = random_point_around(self.kinematics.position, FORAGE_REPICK_RADIUS, rng);
            if horizontal_distance(spot, self.home_position) > self.config.territory_radius {
                spot = random_point_around(self.home_position, self.config.territory_radius, rng);
            }
            self.target_position = Some(spot);
        }

        self.move_on_ground(self.config.walk_speed * FORAGE_SPEED_FACTOR, dt);
    }

    fn move_on_ground(&mut self, speed: f32, dt: f32) {
        if let Some(target) = self.target_position {
            self.kinematics.velocity = step_toward(&mut self.kinematics.position, target, speed, dt);
        }
        self.stand_on_ground();
    }

    fn stand_on_ground(&mut self) {
        self.kinematics.position.y = ground_contact_height(self.ground_level);
    }

    fn follow_patrol(&mut self, dt: f32) {
        let position = self.kinematics.position;
        self.flight_path
            .steer(position, &mut self.kinematics.velocity, self.config.flight_speed, dt);
    }

    fn hold_cruise_altitude(&mut self) {
        let altitude = self.kinematics.position.y;
        let target = self.cruise_altitude;

        if altitude < target - ALTITUDE_DEADBAND {
            self.flap((1.0 + (target - altitude) * CLIMB_INTENSITY_GAIN).min(MAX_CRUISE_INTENSITY));
        } else if altitude > target + ALTITUDE_DEADBAND {
            self.kinematics.is_flapping = false;
        } else {
            self.flap(HOVER_INTENSITY);
        }
    }

    fn flap(&mut self, intensity: f32) {
        self.kinematics.is_flapping = true;
        self.kinematics.wing_beat_intensity = intensity;
        self.kinematics.soaring_altitude_loss = 0.0;
    }

    fn update_yaw(&mut self) {
        if self.bird_state == BirdState::Alert {
            if let Some(player) = self.player_position {
                let to_player = player - self.kinematics.position;
                if to_player.x.abs() > f32::EPSILON || to_player.z.abs() > f32::EPSILON {
                    self.yaw = to_player.x.atan2(to_player.z);
                }
            }
            return;
        }

        if self.kinematics.horizontal_speed() > 0.01 {
            self.yaw = self.kinematics.velocity.x.atan2(self.kinematics.velocity.z);
        }
    }

    fn record(&mut self, from_state: BirdState, reason: TransitionReason) {
        let transition = BirdTransition {
            from_state,
            to_state: self.bird_state,
            flight_mode: self.flight_mode,
            reason,
        };
        log::debug!(
            "[BIRD DEBUG] {} bird {:?} -> {:?} ({:?}, {:?})",
            self.config.species,
            transition.from_state,
            transition.to_state,
            transition.flight_mode,
            reason
        );
        if self.transitions.try_push(transition).is_err() {
            log::warn!(
                "[BIRD] Dropped {:?} transition for {} bird, tick transition list is full",
                reason,
                self.config.species
            );
        }
    }
}

impl IntentSink for BirdAgent {
    fn change_state(&mut self, state: BirdState, mode: FlightMode, reason: TransitionReason) {
        if state == self.bird_state && mode == self.flight_mode {
            return;
        }

        let from_state = self.bird_state;
        if state == BirdState::Soaring {
            self.kinematics.is_flapping = false;
        }
        if state != from_state {
            self.target_position = None;
            self.state_timer = 0.0;
        }
        self.bird_state = state;
        self.flight_mode = mode;
        self.record(from_state, reason);
    }

    fn start_flight(&mut self, reason: TransitionReason) {
        if self.flight_mode.is_airborne() {
            return;
        }

        let from_state = self.bird_state;
        let position = self.kinematics.position;

        self.flight_path.join_at_nearest(position);
        let away = match (reason, self.player_position) {
            (TransitionReason::Flee, Some(player)) => Vec3::new(position.x - player.x, 0.0, position.z - player.z),
            _ => Vec3::ZERO,
        };
        let heading = if away.length_squared() > f32::EPSILON {
            away.normalize()
        } else {
            let waypoint = self.flight_path.current_waypoint();
            Vec3::new(waypoint.x - position.x, 0.0, waypoint.z - position.z).normalize_or_zero()
        };

        let horizontal = heading * self.config.flight_speed * TAKEOFF_SPEED_FACTOR;
        self.kinematics.velocity = Vec3::new(
            horizontal.x,
            self.kinematics.velocity.y.max(TAKEOFF_KICK),
            horizontal.z,
        );
        self.flap(TAKEOFF_INTENSITY);

        self.cruise_altitude = cruise_altitude_over(&self.config, &self.envelope, self.ground_level);
        self.flight_timer = 0.0;
        self.state_timer = 0.0;
        self.emergency_landing = false;
        self.target_position = None;
        self.bird_state = BirdState::TakingOff;
        self.flight_mode = FlightMode::Ascending;
        self.record(from_state, reason);
    }

    fn start_landing(&mut self, emergency: bool, reason: TransitionReason) {
        if !self.flight_mode.is_airborne() {
            return;
        }
        let escalating = emergency && !self.emergency_landing;
        if self.bird_state == BirdState::Landing && !escalating {
            return;
        }

        if escalating {
            log::info!(
                "[BIRD] {} bird at {:.1} forced into an emergency landing after {:.1}s airborne ({:?})",
                self.config.species,
                self.kinematics.position.y,
                self.flight_timer,
                reason
            );
        }

        let from_state = self.bird_state;
        self.emergency_landing |= emergency;
        self.kinematics.is_flapping = false;
        self.kinematics.soaring_altitude_loss = 0.0;
        self.kinematics.velocity.y = self.kinematics.velocity.y.min(0.0);
        self.target_position = None;
        if from_state != BirdState::Landing {
            self.state_timer = 0.0;
        }
        self.bird_state = BirdState::Landing;
        self.flight_mode = if self.emergency_landing {
            FlightMode::Descending
        } else {
            FlightMode::LandingApproach
        };
        self.record(from_state, reason);
    }

    fn force_grounding(&mut self) {
        let from_state = self.bird_state;

        self.kinematics.velocity = Vec3::ZERO;
        self.kinematics.position.y = ground_contact_height(self.ground_level);
        self.kinematics.is_flapping = false;
        self.kinematics.wing_beat_intensity = 0.0;
        self.kinematics.soaring_altitude_loss = 0.0;
        self.pitch = 0.0;
        self.flight_timer = 0.0;
        self.state_timer = 0.0;
        self.emergency_landing = false;
        self.target_position = None;
        self.bird_state = BirdState::Idle;
        self.flight_mode = FlightMode::Grounded;
        self.record(from_state, TransitionReason::Touchdown);
    }
}
