use crate::physics::ground_contact_height;
use crate::resources::{AltitudeBreachPolicy, FlightEnvelope};

/// Climb room required under the cruise ceiling before a bird may take off
pub const MIN_TAKEOFF_HEADROOM: f32 = 1.0;

/// Which bound of the flight envelope was crossed
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EnvelopeBreach {
    /// Above the ceiling. Always lands as an emergency.
    Altitude,
    /// Airborne too long. Lands normally.
    Duration,
}

/// Safety layer evaluated ahead of the random behavior for airborne birds
#[derive(Clone, Copy, Debug)]
pub struct FlightEnvelopeGuard<'a> {
    envelope: &'a FlightEnvelope,
}

impl<'a> FlightEnvelopeGuard<'a> {
    pub fn new(envelope: &'a FlightEnvelope) -> Self {
        Self { envelope }
    }

    pub fn min_flight_time_reached(&self, flight_timer: f32) -> bool {
        flight_timer >= self.envelope.min_flight_time
    }

    pub fn cruise_ceiling(&self) -> f32 {
        self.envelope.cruise_ceiling()
    }

    /// Ground standing too close to the ceiling leaves no room for a flight
    pub fn allows_takeoff(&self, ground_level: f32) -> bool {
        ground_contact_height(ground_level) + MIN_TAKEOFF_HEADROOM <= self.cruise_ceiling()
    }

    /// `altitude` is the world-space height of the bird
    pub fn check(&self, altitude: f32, flight_timer: f32) -> Option<EnvelopeBreach> {
        let floor_reached = self.min_flight_time_reached(flight_timer);

        if altitude > self.envelope.max_altitude {
            let allowed = match self.envelope.altitude_policy {
                AltitudeBreachPolicy::Immediate => true,
                AltitudeBreachPolicy::RespectMinFlightTime => floor_reached,
            };
            if allowed {
                return Some(EnvelopeBreach::Altitude);
            }
        }

        if flight_timer > self.envelope.max_flight_time && floor_reached {
            return Some(EnvelopeBreach::Duration);
        }

        None
    }
}
