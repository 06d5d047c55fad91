//! Landing routines: the forced steep descent and the normal two-phase glide.
//!
//! Both integrate position themselves and report touchdown; the caller grounds
//! the bird once they do.

use super::flight_physics::{damping, ground_contact_height, FlightKinematics, MAX_SINK_RATE};

pub const EMERGENCY_DESCENT_ACCEL: f32 = 8.0;
/// Slowest descent allowed during an emergency landing
pub const EMERGENCY_MIN_SINK: f32 = 3.0;
pub const EMERGENCY_HORIZONTAL_DAMPING: f32 = 0.95;
/// Emergency landings complete this far above ground contact
pub const EMERGENCY_TOUCHDOWN_TOLERANCE: f32 = 1.0;
pub const EMERGENCY_PITCH: f32 = -0.2;

/// Height above ground where the glide turns into the flare
pub const FLARE_HEIGHT: f32 = 5.0;
pub const GLIDE_HORIZONTAL_DAMPING: f32 = 0.99;
pub const GLIDE_SINK_ACCEL: f32 = 0.6;
/// Descent bounded by this fraction of horizontal speed (about 14 degrees)
pub const GLIDE_SLOPE: f32 = 0.25;
/// Glide descent floor so a slow bird still comes down
pub const GLIDE_MIN_SINK: f32 = 0.8;
pub const GLIDE_PITCH: f32 = -0.1;

pub const FLARE_HORIZONTAL_DAMPING: f32 = 0.94;
pub const FLARE_MAX_SINK: f32 = 1.0;
pub const FLARE_MIN_SINK: f32 = 0.3;
pub const FLARE_PITCH: f32 = 0.25;

/// Normal landings complete this far above ground contact
pub const LANDING_TOUCHDOWN_TOLERANCE: f32 = 0.3;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LandingStep {
    pub touched_down: bool,
    /// Mesh pitch for this phase, positive is nose up
    pub pitch: f32,
}

/// Steep forced descent. Returns true once within touchdown tolerance.
pub fn execute_emergency_landing(body: &mut FlightKinematics, delta_time: f32, ground_level: f32) -> bool {
    let touchdown_height = ground_contact_height(ground_level) + EMERGENCY_TOUCHDOWN_TOLERANCE;
    if !delta_time.is_finite() || delta_time <= 0.0 {
        return body.position.y <= touchdown_height;
    }

    body.velocity.y = (body.velocity.y - EMERGENCY_DESCENT_ACCEL * delta_time)
        .min(-EMERGENCY_MIN_SINK)
        .max(-MAX_SINK_RATE);
    body.damp_horizontal(damping(EMERGENCY_HORIZONTAL_DAMPING, delta_time));
    body.integrate_position(delta_time);

    body.position.y <= touchdown_height
}

/// Glide down at a shallow slope, then flare below [`FLARE_HEIGHT`]
pub fn execute_landing(body: &mut FlightKinematics, delta_time: f32, ground_level: f32) -> LandingStep {
    let touchdown_height = ground_contact_height(ground_level) + LANDING_TOUCHDOWN_TOLERANCE;
    let height = body.position.y - ground_level;
    let flaring = height <= FLARE_HEIGHT;
    let pitch = if flaring { FLARE_PITCH } else { GLIDE_PITCH };

    if !delta_time.is_finite() || delta_time <= 0.0 {
        return LandingStep {
            touched_down: body.position.y <= touchdown_height,
            pitch,
        };
    }

    if flaring {
        body.damp_horizontal(damping(FLARE_HORIZONTAL_DAMPING, delta_time));
        body.velocity.y = body.velocity.y.min(-FLARE_MIN_SINK).max(-FLARE_MAX_SINK);
    } else {
        body.damp_horizontal(damping(GLIDE_HORIZONTAL_DAMPING, delta_time));
        let max_sink = (body.horizontal_speed() * GLIDE_SLOPE).max(GLIDE_MIN_SINK);
        body.velocity.y = (body.velocity.y.min(0.0) - GLIDE_SINK_ACCEL * delta_time).max(-max_sink);
    }

    body.integrate_position(delta_time);

    LandingStep {
        touched_down: body.position.y <= touchdown_height,
        pitch,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::flight_physics::GROUND_CONTACT_OFFSET;
    use bevy::prelude::*;

    const DT: f32 = 1.0 / 60.0;

    #[test]
    fn test_emergency_landing_descends_steeply() {
        let mut body = FlightKinematics::at(Vec3::new(0.0, 36.0, 0.0));
        body.velocity = Vec3::new(4.0, 2.0, 0.0);

        assert!(!execute_emergency_landing(&mut body, DT, 0.0));
        assert!(body.velocity.y <= -EMERGENCY_MIN_SINK);
        assert!(body.velocity.x < 4.0);

        let mut ticks = 0;
        while !execute_emergency_landing(&mut body, DT, 0.0) {
            assert!(body.velocity.y >= -MAX_SINK_RATE);
            ticks += 1;
            assert!(ticks < 60 * 20, "emergency landing never completed");
        }
        assert!(body.position.y <= GROUND_CONTACT_OFFSET + EMERGENCY_TOUCHDOWN_TOLERANCE);
    }

    #[test]
    fn test_emergency_landing_reports_touchdown_inside_tolerance() {
        let mut body = FlightKinematics::at(Vec3::new(0.0, 2.0 + GROUND_CONTACT_OFFSET + 0.5, 0.0));
        assert!(execute_emergency_landing(&mut body, DT, 2.0));
    }

    #[test]
    fn test_landing_altitude_is_non_increasing() {
        let ground = 3.0;
        let mut body = FlightKinematics::at(Vec3::new(0.0, ground + 20.0, 0.0));
        body.velocity = Vec3::new(6.0, 1.5, 0.0);

        let mut previous = body.position.y;
        let mut saw_glide = false;
        let mut saw_flare = false;
        let mut ticks = 0;
        loop {
            let step = execute_landing(&mut body, DT, ground);
            assert!(body.position.y <= previous + 1e-6);
            previous = body.position.y;
            saw_glide |= step.pitch == GLIDE_PITCH;
            saw_flare |= step.pitch == FLARE_PITCH;
            if step.touched_down {
                break;
            }
            ticks += 1;
            assert!(ticks < 60 * 120, "landing never completed");
        }
        assert!(saw_glide && saw_flare);
        assert!(body.position.y <= ground + GROUND_CONTACT_OFFSET + LANDING_TOUCHDOWN_TOLERANCE);
    }

    #[test]
    fn test_flare_caps_descent_rate() {
        let mut body = FlightKinematics::at(Vec3::new(0.0, 3.0, 0.0));
        body.velocity = Vec3::new(5.0, -4.0, 0.0);
        let step = execute_landing(&mut body, DT, 0.0);
        assert_eq!(step.pitch, FLARE_PITCH);
        assert_eq!(body.velocity.y, -FLARE_MAX_SINK);
        assert!(body.velocity.x < 5.0);
    }

    #[test]
    fn test_glide_descent_bounded_by_slope() {
        let mut body = FlightKinematics::at(Vec3::new(0.0, 20.0, 0.0));
        body.velocity = Vec3::new(8.0, -5.0, 0.0);
        execute_landing(&mut body, DT, 0.0);
        let bound = body.horizontal_speed() * GLIDE_SLOPE;
        assert!(body.velocity.y >= -bound - 1e-5);
    }
}
