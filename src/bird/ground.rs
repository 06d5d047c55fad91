use bevy::prelude::*;
use rand::Rng;

/// Distance at which a walking target counts as reached
pub const TARGET_REACHED_DISTANCE: f32 = 0.5;
/// Foraging moves at this fraction of the walk speed
pub const FORAGE_SPEED_FACTOR: f32 = 0.5;
/// Per-tick chance of a foraging bird picking a fresh spot
pub const FORAGE_REPICK_CHANCE: f32 = 0.1;
pub const FORAGE_REPICK_RADIUS: f32 = 2.0;

/// Random point on the ground plane within `radius` of `center`. Keeps `center.y`.
pub fn random_point_around<R: Rng>(center: Vec3, radius: f32, rng: &mut R) -> Vec3 {
    let angle = rng.gen::<f32>() * std::f32::consts::TAU;
    let distance = rng.gen::<f32>() * radius;
    Vec3::new(
        center.x + angle.cos() * distance,
        center.y,
        center.z + angle.sin() * distance,
    )
}

/// Horizontal distance, ignoring height
pub fn horizontal_distance(a: Vec3, b: Vec3) -> f32 {
    Vec2::new(a.x - b.x, a.z - b.z).length()
}

/// Moves `position` horizontally toward `target` without overshooting.
/// Returns the horizontal velocity used.
pub fn step_toward(position: &mut Vec3, target: Vec3, speed: f32, delta_time: f32) -> Vec3 {
    let offset = Vec3::new(target.x - position.x, 0.0, target.z - position.z);
    let distance = offset.length();
    if distance < f32::EPSILON || speed <= 0.0 || delta_time <= 0.0 {
        return Vec3::ZERO;
    }

    let direction = offset / distance;
    let travel = (speed * delta_time).min(distance);
    *position += direction * travel;
    direction * speed
}
