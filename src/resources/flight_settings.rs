use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// Whether an altitude breach may force a landing before the minimum flight time
#[derive(Reflect, Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AltitudeBreachPolicy {
    /// Breaching the ceiling lands the bird on the next tick, whatever the flight time
    #[default]
    Immediate,
    /// Breaches are ignored until `min_flight_time` has elapsed
    RespectMinFlightTime,
}

/// Distance kept between cruising birds and the envelope ceiling
pub const CEILING_MARGIN: f32 = 3.0;

/// Resource holding the flight envelope shared by every bird
#[derive(Resource, Reflect, Clone, Debug, Serialize, Deserialize)]
#[reflect(Resource, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FlightEnvelope {
    /// World-space ceiling; crossing it triggers an emergency landing
    pub max_altitude: f32,
    /// Airtime after which a normal landing is forced (seconds)
    pub max_flight_time: f32,
    /// Airtime before which no forced landing may fire (seconds)
    pub min_flight_time: f32,
    pub altitude_policy: AltitudeBreachPolicy,
}

impl FlightEnvelope {
    /// Highest world-space altitude a bird may cruise at
    pub fn cruise_ceiling(&self) -> f32 {
        self.max_altitude - CEILING_MARGIN
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |reason: &str| ConfigError::InvalidEnvelope(reason.to_string());

        if !self.max_altitude.is_finite() {
            return Err(invalid("max_altitude must be finite"));
        }
        if !self.min_flight_time.is_finite() || self.min_flight_time < 0.0 {
            return Err(invalid("min_flight_time must be a non-negative number"));
        }
        if !self.max_flight_time.is_finite() || self.max_flight_time < self.min_flight_time {
            return Err(invalid("max_flight_time must not be below min_flight_time"));
        }
        Ok(())
    }
}

impl Default for FlightEnvelope {
    fn default() -> Self {
        Self {
            max_altitude: 35.0,
            max_flight_time: 30.0,
            min_flight_time: 10.0,
            altitude_policy: AltitudeBreachPolicy::Immediate,
        }
    }
}
