//! Camera for 3D orbit view.
//!
//! Perspective parameters are fixed for the life of the renderer; only the
//! aspect ratio follows the viewport. Resizing the window therefore refreshes
//! the projection matrix but never touches the simulation.

use glam::{Mat4, Vec3};

/// Vertical field of view in degrees.
const FOV_Y_DEGREES: f32 = 60.0;
/// Near clip plane distance.
const NEAR: f32 = 0.5;
/// Far clip plane distance.
const FAR: f32 = 1000.0;

/// Orbit camera for viewing the particle field.
pub struct Camera {
    /// Horizontal rotation angle in radians.
    pub yaw: f32,
    /// Vertical rotation angle in radians.
    pub pitch: f32,
    /// Distance from the target point.
    pub distance: f32,
    /// Point the camera orbits around.
    pub target: Vec3,
    aspect: f32,
}

impl Camera {
    /// Create a new camera with default positioning: eye at (5, 10, 15)
    /// looking at the origin.
    pub fn new() -> Self {
        Self {
            yaw: 0.321_750_6,
            pitch: 0.563_942_7,
            distance: 18.708_287,
            target: Vec3::ZERO,
            aspect: 1.0,
        }
    }

    /// Calculate the camera's world position.
    pub fn position(&self) -> Vec3 {
        let x = self.distance * self.pitch.cos() * self.yaw.sin();
        let y = self.distance * self.pitch.sin();
        let z = self.distance * self.pitch.cos() * self.yaw.cos();
        self.target + Vec3::new(x, y, z)
    }

    /// Recompute the aspect ratio from the current viewport.
    pub fn set_aspect(&mut self, width: u32, height: u32) {
        self.aspect = width as f32 / height.max(1) as f32;
    }

    pub fn aspect(&self) -> f32 {
        self.aspect
    }

    pub fn fov_y_degrees(&self) -> f32 {
        FOV_Y_DEGREES
    }

    pub fn near(&self) -> f32 {
        NEAR
    }

    pub fn far(&self) -> f32 {
        FAR
    }

    /// Calculate the view matrix for rendering.
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position(), self.target, Vec3::Y)
    }

    /// Calculate the projection matrix for the current aspect ratio.
    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(FOV_Y_DEGREES.to_radians(), self.aspect, NEAR, FAR)
    }

    /// Combined projection * view matrix.
    pub fn view_projection(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new()
    }
}
