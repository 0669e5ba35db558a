//! Depth-sort stage for the point cloud. Execution is a stub.
//!
//! Additive blending is order-independent in brightness but a true
//! back-to-front ordering would still be needed for any non-additive mode,
//! and a GPU bitonic sort over the position texture is the intended
//! implementation. The stage currently forwards its buffer untouched:
//! [`execute`](DepthSort::execute) records nothing. Its render target is
//! live regardless, because the projection pass writes clip-space output
//! into it and the point material reads it back out. Removing the stage
//! would rewire that data path, so the buffer stays even while the sort
//! itself is parked.

use crate::targets::create_field_target;

/// Bitonic-sort placeholder owning the clip-space data target.
pub struct DepthSort {
    view: wgpu::TextureView,
    _texture: wgpu::Texture,
}

impl DepthSort {
    pub fn new(device: &wgpu::Device, resolution: u32) -> Self {
        let (texture, view) = create_field_target(device, resolution, "Sort Data Target");
        Self {
            view,
            _texture: texture,
        }
    }

    /// The stage's data buffer: written by the projection pass, read by the
    /// point material.
    pub fn data_view(&self) -> &wgpu::TextureView {
        &self.view
    }

    /// Run the sort network over the data buffer.
    ///
    /// Stub: records no passes, leaving the buffer exactly as the projection
    /// pass wrote it. A real implementation would encode log²(n) bitonic
    /// merge passes here, ping-ponging against a second target.
    pub fn execute(&mut self, _encoder: &mut wgpu::CommandEncoder) {}
}
