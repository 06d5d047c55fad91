mod bird_settings;
mod flight_settings;
mod ground_height;

pub use bird_settings::{AltitudeBand, BirdConfig, BirdSettings};
pub use flight_settings::{AltitudeBreachPolicy, FlightEnvelope, CEILING_MARGIN};
pub use ground_height::GroundHeight;
