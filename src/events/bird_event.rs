use bevy::prelude::*;

use crate::behavior::TransitionReason;
use crate::components::{BirdState, FlightMode};

/// Requests a group of birds of one species around a home position
#[derive(Message, Clone, Debug)]
pub struct SpawnBirdsEvent {
    /// Species name, looked up in [`crate::resources::BirdSettings`]
    pub species: String,
    /// Territory anchor for every bird in the group
    pub home: Vec3,
    pub count: usize,
}

/// Written whenever a bird's behavioral state or flight mode changes
#[derive(Message, Clone, Debug)]
pub struct BirdTransitionEvent {
    pub entity: Entity,
    pub from_state: BirdState,
    pub to_state: BirdState,
    pub flight_mode: FlightMode,
    pub reason: TransitionReason,
}
