//! Deterministic particle seeding.
//!
//! The initial distribution is generated on the CPU as a flat RGBA stream,
//! uniform inside the field box with W fixed at 1.0, and uploaded once into a
//! seed texture. Reset blits that same texture back, so reproducibility
//! requires the generation itself to be a pure function of the spawn seed.
//! A small integer hash stands in for an RNG here; it has no state to carry
//! between runs and no crate dependency to version-drift under.

use glam::Vec3;

use crate::settings::SimSettings;

/// Hash a seed to a pseudo-random value in the unit interval.
pub fn hash_unit(seed: u32) -> f32 {
    let x = seed.wrapping_mul(1103515245).wrapping_add(12345);
    let x = x ^ (x >> 16);
    (x & 0x7FFFFFFF) as f32 / 0x7FFFFFFF as f32
}

/// Generate the seed distribution for a field: `resolution²` particles,
/// 4 floats each (xyz inside the field box, w = 1.0).
pub fn uniform_cloud(settings: &SimSettings) -> Vec<f32> {
    let count = settings.particle_count();
    let scale = settings.field_scale;
    let offset = settings.field_offset;
    let mut data = Vec::with_capacity(count as usize * 4);
    for i in 0..count {
        let stream = settings
            .spawn_seed
            .wrapping_mul(0x85eb_ca6b)
            .wrapping_add(i.wrapping_mul(3));
        let p = Vec3::new(
            hash_unit(stream) * scale.x + offset.x,
            hash_unit(stream.wrapping_add(1)) * scale.y + offset.y,
            hash_unit(stream.wrapping_add(2)) * scale.z + offset.z,
        );
        data.extend_from_slice(&[p.x, p.y, p.z, 1.0]);
    }
    data
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;

    fn small_settings(spawn_seed: u32) -> SimSettings {
        SimSettings::new()
            .with_resolution(16)
            .with_spawn_seed(spawn_seed)
    }

    #[test]
    fn test_hash_unit_range() {
        for seed in 0..10_000u32 {
            let v = hash_unit(seed);
            assert!((0.0..=1.0).contains(&v), "hash_unit({}) = {}", seed, v);
        }
    }

    #[test]
    fn test_cloud_layout() {
        let settings = small_settings(0);
        let data = uniform_cloud(&settings);
        assert_eq!(data.len(), 16 * 16 * 4);
        for texel in data.chunks_exact(4) {
            assert!(texel[0] >= -5.0 && texel[0] <= 5.0);
            assert!(texel[1] >= -5.0 && texel[1] <= 5.0);
            assert!(texel[2] >= -5.0 && texel[2] <= 5.0);
            assert_eq!(texel[3], 1.0);
        }
    }

    #[test]
    fn test_cloud_respects_field_box() {
        let settings = SimSettings::new()
            .with_resolution(8)
            .with_field_box(Vec3::new(2.0, 1.0, 4.0), Vec3::new(10.0, -1.0, 0.0));
        for texel in uniform_cloud(&settings).chunks_exact(4) {
            assert!(texel[0] >= 10.0 && texel[0] <= 12.0);
            assert!(texel[1] >= -1.0 && texel[1] <= 0.0);
            assert!(texel[2] >= 0.0 && texel[2] <= 4.0);
        }
    }

    #[test]
    fn test_cloud_deterministic() {
        let mut rng = rand::thread_rng();
        for _ in 0..8 {
            let seed: u32 = rng.gen();
            let settings = small_settings(seed);
            assert_eq!(uniform_cloud(&settings), uniform_cloud(&settings));
        }
    }

    #[test]
    fn test_cloud_varies_with_seed() {
        assert_ne!(
            uniform_cloud(&small_settings(1)),
            uniform_cloud(&small_settings(2))
        );
    }

    #[test]
    fn test_cloud_not_degenerate() {
        // A broken stream key would collapse every particle onto one point.
        let data = uniform_cloud(&small_settings(5));
        let first: &[f32] = &data[0..3];
        let any_different = data.chunks_exact(4).any(|t| &t[0..3] != first);
        assert!(any_different);
    }
}
