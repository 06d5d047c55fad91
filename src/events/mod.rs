mod bird_event;

pub use bird_event::{BirdTransitionEvent, SpawnBirdsEvent};
