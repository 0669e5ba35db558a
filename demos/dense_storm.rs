//! # Dense Storm
//!
//! A million particles packed into a small field box. The default camera
//! starts close enough that the cloud fills the frame; zoom out to see
//! the whole box.
//!
//! ## What This Demonstrates
//!
//! - A 1024x1024 position texture (1,048,576 particles)
//! - `SpriteFilter::Nearest` for hard-edged points
//! - `with_window_size()` for a larger initial surface
//!
//! ## Performance Notes
//!
//! Every particle is one instanced quad, so fill rate dominates at this
//! density. Small point sizes and low alpha keep the frame time stable;
//! press 3 to grow the points and watch the cost climb.
//!
//! ## Try This
//!
//! - Drop the alpha (key 5) until only the dense filaments show
//! - Raise the noise frequency (key 8) to shred the cloud
//! - Swap the sprite for `SpriteConfig::from_file("smoke.png")`
//!
//! Run with: `cargo run --example dense_storm`

use curlfield::settings::SimSettings;
use curlfield::sprite::{SpriteConfig, SpriteFilter};
use curlfield::{Simulator, SimulatorError, Vec3};

fn main() -> Result<(), SimulatorError> {
    env_logger::init();

    Simulator::new()
        .with_title("curlfield - dense storm")
        .with_window_size(1600, 900)
        .with_settings(
            SimSettings::new()
                .with_resolution(1024)
                .with_field_box(Vec3::splat(6.0), Vec3::splat(-3.0))
                .with_noise_seed(77),
        )
        .with_sprite(SpriteConfig::soft_disc(16).with_filter(SpriteFilter::Nearest))
        .run()
}
