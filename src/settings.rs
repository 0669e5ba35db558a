//! Construction-time configuration for the simulator.
//!
//! These values are fixed once the renderer is built: the position-texture
//! resolution never changes (window resizes only touch the camera), and the
//! field box plus the two seeds define the reproducible initial state.
//! Per-frame knobs (speed, color, point size, noise frequency) live on
//! [`ParticleRenderer`](crate::renderer::ParticleRenderer) as setters.

use glam::Vec3;

/// Fixed parameters of a particle field.
///
/// The field holds `resolution * resolution` particles, one per texel of an
/// `Rgba32Float` texture. `field_scale` and `field_offset` describe the world
/// box particles are seeded into: a unit cube scaled then offset, so the
/// defaults span -5..5 on every axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimSettings {
    /// Side length of the square position texture. Must be a power of two.
    pub resolution: u32,
    /// Extent of the field box on each axis.
    pub field_scale: Vec3,
    /// World offset of the field box corner.
    pub field_offset: Vec3,
    /// Seed baked into the noise shader's channel offsets.
    pub noise_seed: u32,
    /// Seed for the initial particle distribution.
    pub spawn_seed: u32,
}

impl Default for SimSettings {
    fn default() -> Self {
        Self {
            resolution: 512,
            field_scale: Vec3::splat(10.0),
            field_offset: Vec3::splat(-5.0),
            noise_seed: 0,
            spawn_seed: 0,
        }
    }
}

impl SimSettings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the position-texture side length. Must be a power of two.
    pub fn with_resolution(mut self, resolution: u32) -> Self {
        assert!(
            resolution.is_power_of_two(),
            "position texture resolution must be a power of two, got {}",
            resolution
        );
        self.resolution = resolution;
        self
    }

    pub fn with_field_box(mut self, scale: Vec3, offset: Vec3) -> Self {
        self.field_scale = scale;
        self.field_offset = offset;
        self
    }

    pub fn with_noise_seed(mut self, seed: u32) -> Self {
        self.noise_seed = seed;
        self
    }

    pub fn with_spawn_seed(mut self, seed: u32) -> Self {
        self.spawn_seed = seed;
        self
    }

    /// Number of particles the field holds.
    pub fn particle_count(&self) -> u32 {
        self.resolution * self.resolution
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let s = SimSettings::default();
        assert_eq!(s.resolution, 512);
        assert_eq!(s.field_scale, Vec3::splat(10.0));
        assert_eq!(s.field_offset, Vec3::splat(-5.0));
        assert_eq!(s.particle_count(), 512 * 512);
    }

    #[test]
    fn test_builder_chain() {
        let s = SimSettings::new()
            .with_resolution(128)
            .with_field_box(Vec3::new(4.0, 2.0, 4.0), Vec3::new(-2.0, -1.0, -2.0))
            .with_noise_seed(7)
            .with_spawn_seed(99);
        assert_eq!(s.resolution, 128);
        assert_eq!(s.particle_count(), 16384);
        assert_eq!(s.field_scale, Vec3::new(4.0, 2.0, 4.0));
        assert_eq!(s.noise_seed, 7);
        assert_eq!(s.spawn_seed, 99);
    }

    #[test]
    #[should_panic(expected = "power of two")]
    fn test_non_pow2_resolution_panics() {
        let _ = SimSettings::new().with_resolution(500);
    }
}
