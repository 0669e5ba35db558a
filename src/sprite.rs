//! Point sprite images.
//!
//! Every particle is drawn as a small camera-facing quad textured with one
//! shared RGBA sprite and tinted by the renderer's particle color. The default
//! sprite is a procedural soft disc; `SpriteConfig::from_file` loads a custom
//! image instead.

use std::path::Path;

use crate::error::SpriteError;

/// Texture filtering for the sprite sampler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SpriteFilter {
    /// Smooth linear interpolation (default).
    #[default]
    Linear,
    /// Nearest-neighbor, for crisp pixel-art sprites.
    Nearest,
}

impl SpriteFilter {
    fn to_wgpu(self) -> wgpu::FilterMode {
        match self {
            SpriteFilter::Linear => wgpu::FilterMode::Linear,
            SpriteFilter::Nearest => wgpu::FilterMode::Nearest,
        }
    }
}

/// CPU-side sprite image plus sampling configuration.
#[derive(Debug, Clone)]
pub struct SpriteConfig {
    /// Raw RGBA8 pixel data, tightly packed row-major.
    pub data: Vec<u8>,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Filtering mode for sampling.
    pub filter: SpriteFilter,
}

impl SpriteConfig {
    /// Create a sprite from raw RGBA8 data.
    pub fn from_rgba(data: Vec<u8>, width: u32, height: u32) -> Self {
        assert_eq!(
            data.len(),
            (width * height * 4) as usize,
            "Sprite data size doesn't match dimensions"
        );
        Self {
            data,
            width,
            height,
            filter: SpriteFilter::Linear,
        }
    }

    /// Load a sprite from an image file (PNG or JPEG).
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, SpriteError> {
        let bytes = std::fs::read(path)?;
        let img = image::load_from_memory(&bytes)?.to_rgba8();
        let (width, height) = img.dimensions();
        Ok(Self::from_rgba(img.into_raw(), width, height))
    }

    /// Built-in sprite: a white disc whose alpha fades quadratically from the
    /// center to fully transparent at the edge. White RGB means the tint color
    /// passes through unchanged under additive blending.
    pub fn soft_disc(size: u32) -> Self {
        let mut data = Vec::with_capacity((size * size * 4) as usize);
        let center = (size as f32 - 1.0) * 0.5;
        let radius = size as f32 * 0.5;
        for y in 0..size {
            for x in 0..size {
                let dx = x as f32 - center;
                let dy = y as f32 - center;
                let dist = (dx * dx + dy * dy).sqrt() / radius;
                let fade = (1.0 - dist).clamp(0.0, 1.0);
                let alpha = (fade * fade * 255.0).round() as u8;
                data.extend_from_slice(&[255, 255, 255, alpha]);
            }
        }
        Self::from_rgba(data, size, size)
    }

    /// Set the filtering mode.
    pub fn with_filter(mut self, filter: SpriteFilter) -> Self {
        self.filter = filter;
        self
    }
}

impl Default for SpriteConfig {
    fn default() -> Self {
        Self::soft_disc(64)
    }
}

/// Upload a sprite to the GPU, returning the texture view and sampler the
/// point pipeline binds.
pub(crate) fn upload_sprite(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    config: &SpriteConfig,
) -> (wgpu::TextureView, wgpu::Sampler) {
    let size = wgpu::Extent3d {
        width: config.width,
        height: config.height,
        depth_or_array_layers: 1,
    };
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("Sprite Texture"),
        size,
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: wgpu::TextureFormat::Rgba8Unorm,
        usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
        view_formats: &[],
    });
    queue.write_texture(
        wgpu::TexelCopyTextureInfo {
            texture: &texture,
            mip_level: 0,
            origin: wgpu::Origin3d::ZERO,
            aspect: wgpu::TextureAspect::All,
        },
        &config.data,
        wgpu::TexelCopyBufferLayout {
            offset: 0,
            bytes_per_row: Some(4 * config.width),
            rows_per_image: Some(config.height),
        },
        size,
    );
    let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
    let filter = config.filter.to_wgpu();
    let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
        label: Some("Sprite Sampler"),
        address_mode_u: wgpu::AddressMode::ClampToEdge,
        address_mode_v: wgpu::AddressMode::ClampToEdge,
        address_mode_w: wgpu::AddressMode::ClampToEdge,
        mag_filter: filter,
        min_filter: filter,
        mipmap_filter: wgpu::FilterMode::Nearest,
        ..Default::default()
    });
    (view, sampler)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_rgba() {
        let data = vec![255u8; 4 * 4 * 4];
        let sprite = SpriteConfig::from_rgba(data, 4, 4);
        assert_eq!(sprite.width, 4);
        assert_eq!(sprite.height, 4);
        assert_eq!(sprite.filter, SpriteFilter::Linear);
    }

    #[test]
    #[should_panic(expected = "doesn't match dimensions")]
    fn test_from_rgba_wrong_size() {
        SpriteConfig::from_rgba(vec![0u8; 7], 4, 4);
    }

    #[test]
    fn test_soft_disc_center_opaque_edge_transparent() {
        let sprite = SpriteConfig::soft_disc(32);
        assert_eq!(sprite.data.len(), 32 * 32 * 4);

        let alpha_at = |x: usize, y: usize| sprite.data[(y * 32 + x) * 4 + 3];
        // Center pixels are nearly opaque, corners fully transparent.
        assert!(alpha_at(15, 15) > 220);
        assert_eq!(alpha_at(0, 0), 0);
        assert_eq!(alpha_at(31, 31), 0);
    }

    #[test]
    fn test_soft_disc_is_white() {
        let sprite = SpriteConfig::soft_disc(16);
        for px in sprite.data.chunks_exact(4) {
            assert_eq!(&px[..3], &[255, 255, 255]);
        }
    }

    #[test]
    fn test_soft_disc_radially_symmetric() {
        let sprite = SpriteConfig::soft_disc(32);
        let alpha_at = |x: usize, y: usize| sprite.data[(y * 32 + x) * 4 + 3];
        for i in 0..32 {
            assert_eq!(alpha_at(i, 15), alpha_at(15, i));
            assert_eq!(alpha_at(i, 15), alpha_at(31 - i, 15));
        }
    }

    #[test]
    fn test_with_filter() {
        let sprite = SpriteConfig::soft_disc(8).with_filter(SpriteFilter::Nearest);
        assert_eq!(sprite.filter, SpriteFilter::Nearest);
    }
}
