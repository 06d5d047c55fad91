use bevy::prelude::*;
use rand::rngs::StdRng;

/// Behavioral activity of a bird. Drives which physics and animation routine applies.
#[derive(Reflect, Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum BirdState {
    #[default]
    Idle,
    Walking,
    Foraging,
    Alert,
    TakingOff,
    Flying,
    Soaring,
    Landing,
    Preening,
}

impl BirdState {
    /// States a bird may only be in while standing on the ground
    pub fn is_ground_activity(self) -> bool {
        matches!(
            self,
            BirdState::Idle
                | BirdState::Walking
                | BirdState::Foraging
                | BirdState::Alert
                | BirdState::Preening
        )
    }

    /// States that require the bird to be off the ground
    pub fn is_airborne_activity(self) -> bool {
        !self.is_ground_activity()
    }
}

/// Coarse flight phase, orthogonal to [`BirdState`] but correlated with it
#[derive(Reflect, Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum FlightMode {
    #[default]
    Grounded,
    Ascending,
    Cruising,
    Descending,
    LandingApproach,
}

impl FlightMode {
    pub fn is_airborne(self) -> bool {
        self != FlightMode::Grounded
    }
}

/// Animation phases read by the wing/bob animation system
#[derive(Component, Reflect, Clone, Debug)]
#[reflect(Component)]
pub struct BirdAnimation {
    /// Wing flap animation phase (0 to 2π)
    pub flap_phase: f32,
    /// Vertical bobbing phase, advanced while walking on the ground
    pub bob_phase: f32,
    /// Child entity carrying the visible mesh
    pub mesh_entity: Option<Entity>,
}

impl Default for BirdAnimation {
    fn default() -> Self {
        Self {
            flap_phase: 0.0,
            bob_phase: 0.0,
            mesh_entity: None,
        }
    }
}

/// Marker component for the bird mesh child entity
#[derive(Component)]
pub struct BirdMesh;

/// Per-bird random source, seeded at spawn so each bird draws independently
#[derive(Component)]
pub struct BirdRng(pub StdRng);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ground_and_airborne_states_partition() {
        let all = [
            BirdState::Idle,
            BirdState::Walking,
            BirdState::Foraging,
            BirdState::Alert,
            BirdState::TakingOff,
            BirdState::Flying,
            BirdState::Soaring,
            BirdState::Landing,
            BirdState::Preening,
        ];
        for state in all {
            assert_ne!(state.is_ground_activity(), state.is_airborne_activity());
        }
        assert!(BirdState::Landing.is_airborne_activity());
        assert!(BirdState::Preening.is_ground_activity());
    }

    #[test]
    fn test_flight_mode_default_is_grounded() {
        assert_eq!(FlightMode::default(), FlightMode::Grounded);
        assert!(!FlightMode::Grounded.is_airborne());
        assert!(FlightMode::LandingApproach.is_airborne());
    }
}
