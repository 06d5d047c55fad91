use bevy::prelude::*;

/// Samples the ground height under a horizontal world position.
///
/// Defaults to a flat plane at `y = 0`. Games with terrain replace the sampler
/// once the zone heightmap is available.
#[derive(Resource)]
pub struct GroundHeight {
    sampler: Box<dyn Fn(f32, f32) -> f32 + Send + Sync>,
}

impl GroundHeight {
    pub fn new(sampler: impl Fn(f32, f32) -> f32 + Send + Sync + 'static) -> Self {
        Self {
            sampler: Box::new(sampler),
        }
    }

    pub fn flat(height: f32) -> Self {
        Self::new(move |_, _| height)
    }

    /// Ground height at `(x, z)`. Non-finite samples fall back to 0.
    pub fn at(&self, x: f32, z: f32) -> f32 {
        let height = (self.sampler)(x, z);
        if height.is_finite() {
            height
        } else {
            0.0
        }
    }
}

impl Default for GroundHeight {
    fn default() -> Self {
        Self::flat(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sampler_is_used() {
        let ground = GroundHeight::new(|x, z| x + z);
        assert_eq!(ground.at(1.0, 2.0), 3.0);
    }

    #[test]
    fn test_non_finite_sample_falls_back_to_zero() {
        let ground = GroundHeight::new(|_, _| f32::NAN);
        assert_eq!(ground.at(0.0, 0.0), 0.0);
    }
}
