mod bird_system;

pub use bird_system::{
    advance_phase, bird_animation_system, spawn_birds_system, update_birds_system, BirdPlugin,
};
