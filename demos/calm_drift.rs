//! # Calm Drift
//!
//! A sparse, slow-moving field: 65k particles drifting through a wide
//! noise volume with a large, soft point sprite.
//!
//! ## What This Demonstrates
//!
//! - `SimSettings` construction-time knobs: resolution, field box, seeds
//! - `SpriteConfig::soft_disc()` for a procedural point texture
//! - The same seeds always produce the same field
//!
//! ## Controls
//!
//! - **Left-click + drag**: orbit the camera
//! - **Scroll wheel**: zoom
//! - **1/2**: advection speed, **3/4**: point size, **5/6**: alpha,
//!   **7/8**: noise frequency, **C**: cycle tint, **R**: reseed,
//!   **Space**: pause
//!
//! ## Try This
//!
//! - Change `with_noise_seed` and watch the flow structure change
//! - Shrink the field box for tighter, faster-looking swirls
//! - Press 8 a few times to break the drift into fine turbulence
//!
//! Run with: `cargo run --example calm_drift`

use curlfield::settings::SimSettings;
use curlfield::sprite::SpriteConfig;
use curlfield::{Simulator, SimulatorError, Vec3};

fn main() -> Result<(), SimulatorError> {
    env_logger::init();

    Simulator::new()
        .with_title("curlfield - calm drift")
        .with_settings(
            SimSettings::new()
                .with_resolution(256)
                .with_field_box(Vec3::splat(16.0), Vec3::splat(-8.0))
                .with_noise_seed(11)
                .with_spawn_seed(4),
        )
        .with_sprite(SpriteConfig::soft_disc(128))
        .run()
}
