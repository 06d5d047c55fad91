//! Flight physics integrator
//!
//! Stateless: every function works on a [`FlightKinematics`] owned by the caller.
//! Per-tick damping factors are tuned at 60 ticks per second and converted to
//! exponential decay so behavior does not depend on the frame rate.

use bevy::prelude::*;
use rand::Rng;

use crate::components::{BirdState, FlightMode};

/// Downward acceleration (units/s²)
pub const GRAVITY: f32 = 9.8;
/// Upward acceleration per unit of wing-beat intensity while flapping
pub const LIFT_PER_INTENSITY: f32 = 12.0;
/// Wing-beat intensity at which lift cancels gravity
pub const HOVER_INTENSITY: f32 = GRAVITY / LIFT_PER_INTENSITY;

/// Passive sink while soaring (units/s²)
pub const SOARING_SINK: f32 = 1.5;
/// Updraft acceleration when a thermal is caught
pub const THERMAL_LIFT: f32 = 2.0;
/// Per-tick chance of catching a thermal while soaring
pub const THERMAL_CHANCE: f32 = 0.01;
/// Accumulated soaring loss forgiven by one thermal
pub const THERMAL_LOSS_RECOVERY: f32 = 1.0;
/// Accumulated soaring loss after which a sinking bird starts flapping again
pub const SINK_RECOVERY_LOSS: f32 = 4.0;
/// How far under the target altitude the bird must be before recovery kicks in
pub const SINK_RECOVERY_DEPTH: f32 = 3.0;
pub const SINK_RECOVERY_INTENSITY: f32 = 1.1;

pub const MAX_CLIMB_RATE: f32 = 4.0;
pub const MAX_SINK_RATE: f32 = 6.0;

pub const AIR_DAMPING_PER_TICK: f32 = 0.985;
/// Tick rate the per-tick damping factors were tuned at
pub const REFERENCE_TICK_RATE: f32 = 60.0;

/// Height of the body above the ground while standing
pub const GROUND_CONTACT_OFFSET: f32 = 0.48;

/// Converts a per-tick damping factor into the factor for a step of `delta_time`
pub fn damping(per_tick: f32, delta_time: f32) -> f32 {
    per_tick.powf(delta_time * REFERENCE_TICK_RATE)
}

pub fn ground_contact_height(ground_level: f32) -> f32 {
    ground_level + GROUND_CONTACT_OFFSET
}

/// Motion state integrated by the flight physics
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FlightKinematics {
    pub position: Vec3,
    pub velocity: Vec3,
    pub is_flapping: bool,
    pub wing_beat_intensity: f32,
    /// Seconds spent soaring without flapping since the last flap or thermal
    pub soaring_altitude_loss: f32,
}

impl FlightKinematics {
    pub fn at(position: Vec3) -> Self {
        Self {
            position,
            ..Default::default()
        }
    }

    pub fn horizontal_speed(&self) -> f32 {
        Vec2::new(self.velocity.x, self.velocity.z).length()
    }

    pub fn damp_horizontal(&mut self, factor: f32) {
        self.velocity.x *= factor;
        self.velocity.z *= factor;
    }

    pub fn integrate_position(&mut self, delta_time: f32) {
        self.position += self.velocity * delta_time;
    }
}

/// Per-tick inputs the integrator reads but never changes
#[derive(Clone, Copy, Debug)]
pub struct FlightContext {
    pub delta_time: f32,
    pub bird_state: BirdState,
    pub flight_mode: FlightMode,
    /// World-space altitude the bird is trying to hold
    pub target_altitude: f32,
    pub ground_level: f32,
}

/// Notable events from one integration step
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FlightStep {
    pub thermal_updraft: bool,
    pub sink_recovery: bool,
}

/// Advances one airborne tick: gravity, lift, soaring, clamping, damping, then position
pub fn step_flight<R: Rng>(
    body: &mut FlightKinematics,
    context: &FlightContext,
    rng: &mut R,
) -> FlightStep {
    let mut step = FlightStep::default();
    let dt = context.delta_time;
    if !dt.is_finite() || dt <= 0.0 {
        return step;
    }
    let airborne = context.flight_mode.is_airborne();

    body.velocity.y -= GRAVITY * dt;

    if body.is_flapping {
        body.velocity.y += LIFT_PER_INTENSITY * body.wing_beat_intensity * dt;
    }

    if context.bird_state == BirdState::Soaring && airborne {
        body.soaring_altitude_loss += dt;

        if rng.gen::<f32>() < THERMAL_CHANCE {
            body.velocity.y += THERMAL_LIFT * dt;
            body.soaring_altitude_loss = (body.soaring_altitude_loss - THERMAL_LOSS_RECOVERY).max(0.0);
            step.thermal_updraft = true;
        } else {
            body.velocity.y -= SOARING_SINK * dt;
        }

        if body.soaring_altitude_loss > SINK_RECOVERY_LOSS
            && body.position.y < context.target_altitude - SINK_RECOVERY_DEPTH
        {
            body.is_flapping = true;
            body.wing_beat_intensity = SINK_RECOVERY_INTENSITY;
            step.sink_recovery = true;
        }
    }

    // Flapping lift and passive soaring loss are never tracked together
    if body.is_flapping {
        body.soaring_altitude_loss = 0.0;
    }

    body.velocity.y = body.velocity.y.clamp(-MAX_SINK_RATE, MAX_CLIMB_RATE);
    body.velocity *= damping(AIR_DAMPING_PER_TICK, dt);
    body.integrate_position(dt);

    if airborne && context.bird_state != BirdState::Landing {
        let floor = ground_contact_height(context.ground_level);
        if body.position.y < floor {
            body.position.y = floor;
            body.velocity.y = body.velocity.y.max(0.0);
        }
    }

    step
}
