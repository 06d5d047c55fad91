use bevy::prelude::App;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

pub mod behavior;
pub mod bird;
pub mod components;
pub mod events;
pub mod physics;
pub mod resources;
pub mod systems;

pub use systems::BirdPlugin;

use resources::{BirdSettings, FlightEnvelope};

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read configuration: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Invalid bird species '{species}': {reason}")]
    InvalidSpecies { species: String, reason: String },
    #[error("Invalid flight envelope: {0}")]
    InvalidEnvelope(String),
    #[error("Bird species '{0}' is defined more than once")]
    DuplicateSpecies(String),
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub birds: BirdSettings,
    pub envelope: FlightEnvelope,
}

impl Config {
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.envelope.validate()?;

        for (index, species) in self.birds.species.iter().enumerate() {
            species.validate()?;
            if species.flight_altitude.min >= self.envelope.cruise_ceiling() {
                return Err(ConfigError::InvalidSpecies {
                    species: species.species.clone(),
                    reason: format!(
                        "flight_altitude.min must stay below the cruise ceiling ({})",
                        self.envelope.cruise_ceiling()
                    ),
                });
            }

            let duplicate = self.birds.species[..index]
                .iter()
                .any(|other| other.species.eq_ignore_ascii_case(&species.species));
            if duplicate {
                return Err(ConfigError::DuplicateSpecies(species.species.clone()));
            }
        }
        Ok(())
    }

    /// Replaces the bird resources in `app` with this configuration
    pub fn insert_into(self, app: &mut App) {
        app.insert_resource(self.birds).insert_resource(self.envelope);
    }
}

pub fn parse_config(toml_str: &str) -> Result<Config, ConfigError> {
    let config: Config = toml::from_str(toml_str)?;
    config.validate()?;
    Ok(config)
}

pub fn load_config(path: &Path) -> Config {
    let toml_str = match std::fs::read_to_string(path) {
        Ok(toml_str) => toml_str,
        Err(error) => {
            log::warn!(
                "[BIRD] Failed to load configuration from {} with error: {}",
                path.to_string_lossy(),
                ConfigError::from(error)
            );
            return Config::default();
        }
    };

    match parse_config(&toml_str) {
        Ok(config) => {
            log::info!(
                "[BIRD] Read configuration from {} ({} species)",
                path.to_string_lossy(),
                config.birds.species.len()
            );
            config
        }
        Err(error) => {
            log::warn!(
                "[BIRD] Failed to load configuration from {} with error: {}",
                path.to_string_lossy(),
                error
            );
            Config::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resources::AltitudeBreachPolicy;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = parse_config("").unwrap();
        assert!(config.birds.enabled);
        assert_eq!(config.birds.species.len(), 2);
        assert_eq!(config.envelope.max_altitude, 35.0);
        assert_eq!(config.envelope.altitude_policy, AltitudeBreachPolicy::Immediate);
    }

    #[test]
    fn test_parse_species_and_envelope() {
        let config = parse_config(
            r#"
            [envelope]
            max_altitude = 50.0
            altitude_policy = "respect_min_flight_time"

            [birds]
            flap_speed = 10.0

            [[birds.species]]
            species = "raven"
            flight_speed = 8.5
            flight_altitude = { min = 10.0, max = 30.0 }
            "#,
        )
        .unwrap();

        assert_eq!(config.envelope.max_altitude, 50.0);
        assert_eq!(config.envelope.max_flight_time, 30.0);
        assert_eq!(config.envelope.altitude_policy, AltitudeBreachPolicy::RespectMinFlightTime);
        assert_eq!(config.birds.flap_speed, 10.0);

        let raven = config.birds.find_species("Raven").unwrap();
        assert_eq!(raven.flight_speed, 8.5);
        assert_eq!(raven.flight_altitude.max, 30.0);
        // Unset fields fall back to the crow preset
        assert_eq!(raven.alert_distance, 8.0);
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        let error = parse_config(
            r#"
            [[birds.species]]
            species = "ghost"
            flight_speed = -1.0
            "#,
        )
        .unwrap_err();
        assert!(matches!(error, ConfigError::InvalidSpecies { ref species, .. } if species == "ghost"));

        let error = parse_config(
            r#"
            [envelope]
            min_flight_time = 40.0
            "#,
        )
        .unwrap_err();
        assert!(matches!(error, ConfigError::InvalidEnvelope(_)));

        let error = parse_config(
            r#"
            [[birds.species]]
            species = "crow"

            [[birds.species]]
            species = "CROW"
            "#,
        )
        .unwrap_err();
        assert!(matches!(error, ConfigError::DuplicateSpecies(_)));

        let error = parse_config(
            r#"
            [envelope]
            max_altitude = 20.0

            [[birds.species]]
            species = "eagle"
            flight_altitude = { min = 18.0, max = 40.0 }
            "#,
        )
        .unwrap_err();
        assert!(matches!(error, ConfigError::InvalidSpecies { ref species, .. } if species == "eagle"));

        assert!(matches!(parse_config("birds = 3"), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_missing_file_falls_back_to_defaults() {
        let config = load_config(Path::new("/nonexistent/aviary.toml"));
        assert_eq!(config.birds.species.len(), 2);
        assert_eq!(config.envelope.min_flight_time, 10.0);
    }

    #[test]
    fn test_shipped_config_is_valid() {
        let config = parse_config(include_str!("../aviary.toml")).unwrap();
        assert!(config.birds.find_species("crow").is_some());
    }
}
