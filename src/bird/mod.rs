//! Per-bird orchestration: the [`BirdAgent`] tick plus ground and patrol movement helpers.

mod agent;
mod flight_path;
mod ground;

pub use agent::{
    cruise_altitude_over, BirdAgent, BirdTransition, TickInput, TickReport, ALTITUDE_DEADBAND, CLIMB_INTENSITY_GAIN,
    MAX_CRUISE_INTENSITY, MAX_CRUISE_PITCH, TAKEOFF_INTENSITY, TAKEOFF_KICK, TAKEOFF_SPEED_FACTOR,
};
pub use flight_path::{FlightPath, PATROL_WAYPOINTS, STEERING_RATE, WAYPOINT_REACHED_DISTANCE};
pub use ground::{
    horizontal_distance, random_point_around, step_toward, FORAGE_REPICK_CHANCE, FORAGE_REPICK_RADIUS,
    FORAGE_SPEED_FACTOR, TARGET_REACHED_DISTANCE,
};
