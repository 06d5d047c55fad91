mod flight_physics;
mod landing;

pub use flight_physics::*;
pub use landing::*;
