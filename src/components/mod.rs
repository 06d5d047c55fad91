mod bird;
mod player;

pub use bird::{BirdAnimation, BirdMesh, BirdRng, BirdState, FlightMode};
pub use player::PlayerCharacter;
