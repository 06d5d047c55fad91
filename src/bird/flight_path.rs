use bevy::prelude::*;

use super::ground::horizontal_distance;

pub const PATROL_WAYPOINTS: usize = 6;
/// Horizontal distance at which the patrol moves on to the next waypoint
pub const WAYPOINT_REACHED_DISTANCE: f32 = 3.0;
/// Exponential steering rate toward the desired heading (per second)
pub const STEERING_RATE: f32 = 2.0;

/// Closed patrol loop around a bird's home, followed while cruising
#[derive(Clone, Debug)]
pub struct FlightPath {
    center: Vec3,
    radius: f32,
    current: usize,
}

impl FlightPath {
    pub fn patrol(center: Vec3, radius: f32) -> Self {
        Self {
            center,
            radius,
            current: 0,
        }
    }

    /// Waypoint `index` on the ring. Height is left at the center's height;
    /// altitude is managed separately.
    pub fn waypoint(&self, index: usize) -> Vec3 {
        let angle = (index % PATROL_WAYPOINTS) as f32 / PATROL_WAYPOINTS as f32 * std::f32::consts::TAU;
        Vec3::new(
            self.center.x + angle.cos() * self.radius,
            self.center.y,
            self.center.z + angle.sin() * self.radius,
        )
    }

    pub fn current_waypoint(&self) -> Vec3 {
        self.waypoint(self.current)
    }

    /// Restarts the patrol from the waypoint closest to `position`
    pub fn join_at_nearest(&mut self, position: Vec3) {
        self.current = (0..PATROL_WAYPOINTS)
            .min_by(|a, b| {
                let da = horizontal_distance(self.waypoint(*a), position);
                let db = horizontal_distance(self.waypoint(*b), position);
                da.total_cmp(&db)
            })
            .unwrap_or(0);
    }

    /// Turns the horizontal part of `velocity` toward the current waypoint at `speed`
    pub fn steer(&mut self, position: Vec3, velocity: &mut Vec3, speed: f32, delta_time: f32) {
        if horizontal_distance(self.current_waypoint(), position) < WAYPOINT_REACHED_DISTANCE {
            self.current = (self.current + 1) % PATROL_WAYPOINTS;
        }

        let waypoint = self.current_waypoint();
        let desired = Vec3::new(waypoint.x - position.x, 0.0, waypoint.z - position.z).normalize_or_zero() * speed;
        let blend = 1.0 - (-STEERING_RATE * delta_time).exp();
        velocity.x += (desired.x - velocity.x) * blend;
        velocity.z += (desired.z - velocity.z) * blend;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_waypoints_lie_on_ring() {
        let path = FlightPath::patrol(Vec3::new(5.0, 0.0, 5.0), 10.0);
        for index in 0..PATROL_WAYPOINTS {
            let distance = horizontal_distance(path.waypoint(index), Vec3::new(5.0, 0.0, 5.0));
            assert!((distance - 10.0).abs() < 1e-4);
        }
    }

    #[test]
    fn test_join_at_nearest() {
        let mut path = FlightPath::patrol(Vec3::ZERO, 10.0);
        let near_third = path.waypoint(3) + Vec3::new(0.5, 12.0, 0.0);
        path.join_at_nearest(near_third);
        assert_eq!(path.current_waypoint(), path.waypoint(3));
    }

    #[test]
    fn test_steer_converges_on_waypoint_heading() {
        let mut path = FlightPath::patrol(Vec3::ZERO, 10.0);
        let position = Vec3::new(-10.0, 15.0, 0.0);
        let mut velocity = Vec3::ZERO;
        for _ in 0..600 {
            path.steer(position, &mut velocity, 7.0, 1.0 / 60.0);
        }
        let heading = (path.current_waypoint() - position).with_y(0.0).normalize();
        assert!(velocity.normalize().dot(heading) > 0.99);
        assert!((Vec2::new(velocity.x, velocity.z).length() - 7.0).abs() < 0.1);
    }

    #[test]
    fn test_reaching_waypoint_advances() {
        let mut path = FlightPath::patrol(Vec3::ZERO, 10.0);
        let mut velocity = Vec3::ZERO;
        path.steer(path.waypoint(0), &mut velocity, 7.0, 1.0 / 60.0);
        assert_eq!(path.current_waypoint(), path.waypoint(1));
    }
}
