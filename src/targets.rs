//! Double-buffered position render targets.
//!
//! Particle state lives in two `Rgba32Float` textures of identical size. One
//! is readable and one is the write target at any instant; a pass may never
//! read the buffer it renders into, so every integration step draws into the
//! write target and then the roles swap. The textures are allocated once at
//! a fixed resolution and never resized.
//!
//! Positions are fetched with `textureLoad` on integer texel coordinates,
//! so the bind sites use non-filterable float sampling and no sampler.

/// Texture format for particle positions (xyz in RGB, w = 1.0 in A).
pub const POSITION_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba32Float;

/// Which of the two buffers is currently readable.
///
/// Pure role bookkeeping, kept separate from the GPU objects so the swap
/// invariant can be checked without a device: the read and write slots never
/// coincide, and each `swap` exchanges them exactly once.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SwapState {
    read_is_b: bool,
}

impl SwapState {
    pub fn read_index(self) -> usize {
        if self.read_is_b {
            1
        } else {
            0
        }
    }

    pub fn write_index(self) -> usize {
        if self.read_is_b {
            0
        } else {
            1
        }
    }

    pub fn swap(&mut self) {
        self.read_is_b = !self.read_is_b;
    }
}

/// Create one square field render target.
pub(crate) fn create_field_target(
    device: &wgpu::Device,
    resolution: u32,
    label: &str,
) -> (wgpu::Texture, wgpu::TextureView) {
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some(label),
        size: wgpu::Extent3d {
            width: resolution,
            height: resolution,
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: POSITION_FORMAT,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
        view_formats: &[],
    });
    let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
    (texture, view)
}

/// The ping-pong pair of position textures.
pub struct PositionTargets {
    views: [wgpu::TextureView; 2],
    state: SwapState,
    // Textures are kept alive for the views; nothing reads them directly.
    _textures: [wgpu::Texture; 2],
}

impl PositionTargets {
    pub fn new(device: &wgpu::Device, resolution: u32) -> Self {
        let (texture_a, view_a) = create_field_target(device, resolution, "Position Target A");
        let (texture_b, view_b) = create_field_target(device, resolution, "Position Target B");
        Self {
            views: [view_a, view_b],
            state: SwapState::default(),
            _textures: [texture_a, texture_b],
        }
    }

    /// The buffer holding current particle state.
    pub fn read_view(&self) -> &wgpu::TextureView {
        &self.views[self.state.read_index()]
    }

    /// The buffer the next integration step renders into.
    pub fn write_view(&self) -> &wgpu::TextureView {
        &self.views[self.state.write_index()]
    }

    /// Both views in slot order, for building per-slot bind groups.
    pub fn views(&self) -> [&wgpu::TextureView; 2] {
        [&self.views[0], &self.views[1]]
    }

    pub fn swap(&mut self) {
        self.state.swap();
    }

    pub fn swap_state(&self) -> SwapState {
        self.state
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_and_write_never_alias() {
        let mut state = SwapState::default();
        for _ in 0..9 {
            assert_ne!(state.read_index(), state.write_index());
            state.swap();
        }
    }

    #[test]
    fn test_swap_exchanges_roles() {
        let mut state = SwapState::default();
        assert_eq!(state.read_index(), 0);
        assert_eq!(state.write_index(), 1);
        state.swap();
        assert_eq!(state.read_index(), 1);
        assert_eq!(state.write_index(), 0);
    }

    #[test]
    fn test_double_swap_returns_to_start() {
        let mut state = SwapState::default();
        let initial = state;
        state.swap();
        assert_ne!(state, initial);
        state.swap();
        assert_eq!(state, initial);
    }
}
