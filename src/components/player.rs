use bevy::prelude::*;

/// Marker for the locally controlled player. Birds read its translation
/// every tick to decide whether to raise the alarm.
#[derive(Component, Reflect, Default, Clone, Copy, Debug)]
#[reflect(Component)]
pub struct PlayerCharacter;
