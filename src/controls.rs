//! Keyboard parameter panel.
//!
//! Holds the user-tunable parameters and pushes all of them to the renderer
//! once per frame, so panel state is the single source of truth. Values are
//! clamped here; the renderer setters accept whatever they are given.
//!
//! Bindings:
//! - `1` / `2` - advection speed down / up
//! - `3` / `4` - point size down / up
//! - `5` / `6` - alpha down / up
//! - `7` / `8` - noise frequency down / up (all axes)
//! - `C` - cycle tint color
//! - `R` - reset particles to spawn positions
//! - `Space` - pause advection

use glam::Vec3;
use winit::keyboard::KeyCode;

use crate::renderer::ParticleRenderer;

const SPEED_RANGE: (f32, f32) = (0.0, 0.05);
const SPEED_STEP: f32 = 0.002;
const SIZE_RANGE: (f32, f32) = (1.0, 10.0);
const SIZE_STEP: f32 = 0.5;
const ALPHA_RANGE: (f32, f32) = (0.0, 1.0);
const ALPHA_STEP: f32 = 0.02;
const NOISE_RANGE: (f32, f32) = (1.0, 10.0);
const NOISE_STEP: f32 = 0.5;

/// Tint presets cycled with `C`, as 0-255 channels.
const COLOR_PRESETS: [[f32; 3]; 5] = [
    [128.0, 128.0, 255.0],
    [255.0, 128.0, 128.0],
    [128.0, 255.0, 160.0],
    [255.0, 200.0, 96.0],
    [230.0, 230.0, 230.0],
];

/// Mutable parameter state driven by the keyboard.
pub struct ParamPanel {
    /// Advection step length per frame.
    pub speed: f32,
    /// Point diameter in pixels.
    pub size: f32,
    /// Tint color, 0-255 channels.
    pub rgb: Vec3,
    /// Tint alpha, 0-1.
    pub alpha: f32,
    /// Per-axis noise frequency.
    pub noise_frequency: Vec3,
    /// While paused the panel pushes zero speed.
    pub paused: bool,
    color_index: usize,
    reset_requested: bool,
}

impl ParamPanel {
    pub fn new() -> Self {
        Self {
            speed: 0.01,
            size: 3.0,
            rgb: Vec3::new(128.0, 128.0, 255.0),
            alpha: 0.1,
            noise_frequency: Vec3::splat(4.0),
            paused: false,
            color_index: 0,
            reset_requested: false,
        }
    }

    /// React to a pressed key. Returns true if the key was handled.
    pub fn handle_key(&mut self, key: KeyCode) -> bool {
        match key {
            KeyCode::Digit1 => {
                self.speed = (self.speed - SPEED_STEP).clamp(SPEED_RANGE.0, SPEED_RANGE.1);
                log::info!("speed: {:.3}", self.speed);
            }
            KeyCode::Digit2 => {
                self.speed = (self.speed + SPEED_STEP).clamp(SPEED_RANGE.0, SPEED_RANGE.1);
                log::info!("speed: {:.3}", self.speed);
            }
            KeyCode::Digit3 => {
                self.size = (self.size - SIZE_STEP).clamp(SIZE_RANGE.0, SIZE_RANGE.1);
                log::info!("point size: {:.1}", self.size);
            }
            KeyCode::Digit4 => {
                self.size = (self.size + SIZE_STEP).clamp(SIZE_RANGE.0, SIZE_RANGE.1);
                log::info!("point size: {:.1}", self.size);
            }
            KeyCode::Digit5 => {
                self.alpha = (self.alpha - ALPHA_STEP).clamp(ALPHA_RANGE.0, ALPHA_RANGE.1);
                log::info!("alpha: {:.2}", self.alpha);
            }
            KeyCode::Digit6 => {
                self.alpha = (self.alpha + ALPHA_STEP).clamp(ALPHA_RANGE.0, ALPHA_RANGE.1);
                log::info!("alpha: {:.2}", self.alpha);
            }
            KeyCode::Digit7 => {
                let f = (self.noise_frequency.x - NOISE_STEP).clamp(NOISE_RANGE.0, NOISE_RANGE.1);
                self.noise_frequency = Vec3::splat(f);
                log::info!("noise frequency: {:.1}", f);
            }
            KeyCode::Digit8 => {
                let f = (self.noise_frequency.x + NOISE_STEP).clamp(NOISE_RANGE.0, NOISE_RANGE.1);
                self.noise_frequency = Vec3::splat(f);
                log::info!("noise frequency: {:.1}", f);
            }
            KeyCode::KeyC => {
                self.color_index = (self.color_index + 1) % COLOR_PRESETS.len();
                self.rgb = Vec3::from_array(COLOR_PRESETS[self.color_index]);
                log::info!(
                    "color: ({}, {}, {})",
                    self.rgb.x as u32,
                    self.rgb.y as u32,
                    self.rgb.z as u32
                );
            }
            KeyCode::KeyR => {
                self.reset_requested = true;
                log::info!("reset requested");
            }
            KeyCode::Space => {
                self.paused = !self.paused;
                log::info!("{}", if self.paused { "paused" } else { "resumed" });
            }
            _ => return false,
        }
        true
    }

    /// Push every parameter to the renderer. Called once per frame.
    pub fn apply(&self, renderer: &mut ParticleRenderer) {
        let speed = if self.paused { 0.0 } else { self.speed };
        renderer.set_speed(speed);
        renderer.set_color(self.rgb, self.alpha);
        renderer.set_particle_size(self.size);
        renderer.set_noise_scale(
            self.noise_frequency.x,
            self.noise_frequency.y,
            self.noise_frequency.z,
        );
    }

    /// Consume a pending reset request.
    pub fn take_reset(&mut self) -> bool {
        std::mem::take(&mut self.reset_requested)
    }
}

impl Default for ParamPanel {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let panel = ParamPanel::new();
        assert_eq!(panel.speed, 0.01);
        assert_eq!(panel.size, 3.0);
        assert_eq!(panel.rgb, Vec3::new(128.0, 128.0, 255.0));
        assert_eq!(panel.alpha, 0.1);
        assert_eq!(panel.noise_frequency, Vec3::splat(4.0));
        assert!(!panel.paused);
    }

    #[test]
    fn test_speed_clamps_at_zero() {
        let mut panel = ParamPanel::new();
        for _ in 0..20 {
            panel.handle_key(KeyCode::Digit1);
        }
        assert_eq!(panel.speed, 0.0);
    }

    #[test]
    fn test_speed_clamps_at_max() {
        let mut panel = ParamPanel::new();
        for _ in 0..100 {
            panel.handle_key(KeyCode::Digit2);
        }
        assert_eq!(panel.speed, 0.05);
    }

    #[test]
    fn test_size_steps_up() {
        let mut panel = ParamPanel::new();
        panel.handle_key(KeyCode::Digit4);
        assert_eq!(panel.size, 3.5);
    }

    #[test]
    fn test_noise_frequency_moves_all_axes() {
        let mut panel = ParamPanel::new();
        panel.handle_key(KeyCode::Digit8);
        assert_eq!(panel.noise_frequency, Vec3::splat(4.5));
    }

    #[test]
    fn test_color_cycles_and_wraps() {
        let mut panel = ParamPanel::new();
        let first = panel.rgb;
        for _ in 0..COLOR_PRESETS.len() {
            panel.handle_key(KeyCode::KeyC);
        }
        assert_eq!(panel.rgb, first);
    }

    #[test]
    fn test_reset_latch() {
        let mut panel = ParamPanel::new();
        assert!(!panel.take_reset());
        panel.handle_key(KeyCode::KeyR);
        assert!(panel.take_reset());
        assert!(!panel.take_reset());
    }

    #[test]
    fn test_pause_toggles() {
        let mut panel = ParamPanel::new();
        panel.handle_key(KeyCode::Space);
        assert!(panel.paused);
        panel.handle_key(KeyCode::Space);
        assert!(!panel.paused);
    }

    #[test]
    fn test_unmapped_key_ignored() {
        let mut panel = ParamPanel::new();
        assert!(!panel.handle_key(KeyCode::KeyZ));
        assert_eq!(panel.speed, 0.01);
    }
}
