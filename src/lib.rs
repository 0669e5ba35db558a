//! # curlfield
//!
//! GPU particle advection through a curl-noise field.
//!
//! A quarter-million particles drift along a divergence-free flow derived
//! from 3D simplex noise. All particle state lives in float textures: a
//! fragment shader advances positions by ping-ponging between two render
//! targets, a projection pass transforms them to clip space, and the point
//! pass fetches each particle's position straight from that texture. No
//! compute shaders, no CPU read-back.
//!
//! ## Quick Start
//!
//! ```ignore
//! use curlfield::{SimSettings, Simulator};
//!
//! fn main() -> Result<(), curlfield::SimulatorError> {
//!     env_logger::init();
//!     Simulator::new()
//!         .with_settings(SimSettings::new().with_resolution(512))
//!         .run()
//! }
//! ```
//!
//! ## Pipeline
//!
//! Each frame runs over R x R float textures, one texel per particle:
//!
//! 1. [`ParticleSimulation`] advects every position through the curl field,
//!    writing the new state into the back target and swapping.
//! 2. [`TransformPass`] multiplies every position by the camera matrix and
//!    stores the full homogeneous result in a clip-space texture.
//! 3. [`DepthSort`] owns that clip-space texture; its sorting pass is a
//!    placeholder and currently leaves the data untouched.
//! 4. The point pass draws one sprite per texel, looking up its clip-space
//!    position by texture coordinate and expanding a small quad around it.
//!
//! [`CopyPass`] blits the retained seed texture over the live state to reset
//! the system to its spawn positions.
//!
//! The stages take `&wgpu::Device`/`&wgpu::Queue` directly, so they can be
//! driven without a window; [`Simulator`] wires them to a winit event loop
//! for interactive use.
//!
//! ## Controls
//!
//! Left-drag orbits the camera and the wheel zooms. Number keys `1`-`8` tune
//! speed, point size, alpha, and noise frequency; `C` cycles the tint color,
//! `R` reseeds the particles, `Space` pauses.

mod app;
pub mod camera;
pub mod controls;
pub mod copy;
pub mod error;
pub mod geometry;
pub mod noise;
pub mod renderer;
pub mod settings;
pub mod simulation;
pub mod sort;
pub mod spawn;
pub mod sprite;
pub mod stage;
pub mod targets;
pub mod time;
pub mod transform;

pub use app::Simulator;
pub use camera::Camera;
pub use controls::ParamPanel;
pub use copy::CopyPass;
pub use error::{GpuError, SimulatorError, SpriteError, StageError};
pub use glam::{Mat4, Vec3};
pub use renderer::ParticleRenderer;
pub use settings::SimSettings;
pub use simulation::ParticleSimulation;
pub use sort::DepthSort;
pub use sprite::{SpriteConfig, SpriteFilter};
pub use targets::{PositionTargets, POSITION_FORMAT};
pub use time::Time;
pub use transform::TransformPass;

/// Convenient re-exports for common usage.
///
/// ```ignore
/// use curlfield::prelude::*;
/// ```
pub mod prelude {
    pub use crate::camera::Camera;
    pub use crate::controls::ParamPanel;
    pub use crate::error::SimulatorError;
    pub use crate::renderer::ParticleRenderer;
    pub use crate::settings::SimSettings;
    pub use crate::sprite::{SpriteConfig, SpriteFilter};
    pub use crate::time::Time;
    pub use crate::Simulator;
    pub use crate::{Mat4, Vec3};
}
