use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// Height band above ground level in which a species cruises
#[derive(Reflect, Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct AltitudeBand {
    pub min: f32,
    pub max: f32,
}

impl AltitudeBand {
    pub fn midpoint(&self) -> f32 {
        (self.min + self.max) * 0.5
    }
}

/// Immutable per-species parameters, supplied when a bird is spawned.
/// Fields missing from a config file fall back to the crow preset.
#[derive(Reflect, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BirdConfig {
    /// Species name used to look the config up when spawning
    pub species: String,
    /// Overall size multiplier
    pub size: f32,
    pub wingspan: f32,
    pub body_length: f32,
    pub leg_length: f32,
    /// Ground locomotion speed (units per second)
    pub walk_speed: f32,
    /// Cruise speed while following the patrol path
    pub flight_speed: f32,
    /// Cruise band measured above the ground
    pub flight_altitude: AltitudeBand,
    /// Radius around the home position used for walking targets and patrols
    pub territory_radius: f32,
    /// Player distance at which the bird becomes alert
    pub alert_distance: f32,
}

impl BirdConfig {
    pub fn crow() -> Self {
        Self {
            species: "crow".to_string(),
            size: 1.0,
            wingspan: 1.0,
            body_length: 0.5,
            leg_length: 0.2,
            walk_speed: 1.2,
            flight_speed: 7.0,
            flight_altitude: AltitudeBand { min: 8.0, max: 25.0 },
            territory_radius: 20.0,
            alert_distance: 8.0,
        }
    }

    pub fn sparrow() -> Self {
        Self {
            species: "sparrow".to_string(),
            size: 0.4,
            wingspan: 0.25,
            body_length: 0.15,
            leg_length: 0.08,
            walk_speed: 0.8,
            flight_speed: 5.0,
            flight_altitude: AltitudeBand { min: 4.0, max: 15.0 },
            territory_radius: 10.0,
            alert_distance: 5.0,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |reason: &str| ConfigError::InvalidSpecies {
            species: self.species.clone(),
            reason: reason.to_string(),
        };

        if self.species.trim().is_empty() {
            return Err(invalid("species name is empty"));
        }
        let positive = [
            ("size", self.size),
            ("wingspan", self.wingspan),
            ("walk_speed", self.walk_speed),
            ("flight_speed", self.flight_speed),
            ("territory_radius", self.territory_radius),
            ("alert_distance", self.alert_distance),
        ];
        for (name, value) in positive {
            if !value.is_finite() || value <= 0.0 {
                return Err(invalid(&format!("{} must be a positive number", name)));
            }
        }
        let band = self.flight_altitude;
        if !band.min.is_finite() || !band.max.is_finite() || band.min < 0.0 || band.min >= band.max {
            return Err(invalid("flight_altitude must satisfy 0 <= min < max"));
        }
        Ok(())
    }
}

impl Default for BirdConfig {
    fn default() -> Self {
        Self::crow()
    }
}

/// Resource for bird configuration settings
#[derive(Resource, Reflect, Clone, Debug, Serialize, Deserialize)]
#[reflect(Resource, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BirdSettings {
    /// Whether birds are simulated at all
    pub enabled: bool,
    /// Known species, looked up by name when spawning
    pub species: Vec<BirdConfig>,
    /// Wing flap speed at full wing-beat intensity (radians per second)
    pub flap_speed: f32,
    /// Vertical bobbing amplitude while walking
    pub bob_amplitude: f32,
    /// Vertical bobbing speed
    pub bob_speed: f32,
}

impl BirdSettings {
    pub fn find_species(&self, name: &str) -> Option<&BirdConfig> {
        self.species
            .iter()
            .find(|config| config.species.eq_ignore_ascii_case(name))
    }
}

impl Default for BirdSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            species: vec![BirdConfig::crow(), BirdConfig::sparrow()],
            flap_speed: 12.0,
            bob_amplitude: 0.5,
            bob_speed: 2.0,
        }
    }
}
