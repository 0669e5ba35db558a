//! Particle renderer.
//!
//! Owns the whole frame pipeline: advance positions through the curl field,
//! project them to clip space, then draw the point cloud over a wireframe of
//! the spawn volume. Positions never leave the GPU; the point vertex shader
//! fetches each particle's clip-space position from the projected texture
//! using a per-instance lookup coordinate.

use bytemuck::{Pod, Zeroable};
use glam::Vec3;
use wgpu::util::DeviceExt;

use crate::camera::Camera;
use crate::copy::CopyPass;
use crate::error::StageError;
use crate::geometry::{box_edges, lookup_grid, BoxVertex, LookupVertex};
use crate::settings::SimSettings;
use crate::simulation::ParticleSimulation;
use crate::sort::DepthSort;
use crate::spawn::uniform_cloud;
use crate::sprite::{upload_sprite, SpriteConfig};
use crate::stage::validated;
use crate::targets::POSITION_FORMAT;
use crate::transform::TransformPass;

/// Background clear color for the visible framebuffer.
const CLEAR_COLOR: wgpu::Color = wgpu::Color {
    r: 0.02,
    g: 0.02,
    b: 0.05,
    a: 1.0,
};

/// Uniforms for the point material.
#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
struct PointParams {
    /// Tint color (premultiplied by nothing; alpha feeds the blend factor).
    color: [f32; 4],
    /// Viewport size in pixels, for sizing points in screen space.
    viewport: [f32; 2],
    /// Side length of the position texture.
    grid_size: f32,
    /// Point diameter in pixels.
    point_size: f32,
}

impl PointParams {
    fn new(resolution: u32, width: u32, height: u32) -> Self {
        Self {
            color: [0.5, 0.5, 1.0, 0.1],
            viewport: [width as f32, height.max(1) as f32],
            grid_size: resolution as f32,
            point_size: 3.0,
        }
    }
}

/// Uniforms for the bounds wireframe.
#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
struct WireframeUniforms {
    view_proj: [[f32; 4]; 4],
}

/// WGSL for the point material.
///
/// Each particle is one instance of a six-vertex quad. The vertex stage looks
/// up the particle's projected clip-space position by texel, then expands the
/// quad in clip space so the point covers `point_size` pixels regardless of
/// depth. The fragment stage samples the sprite and tints it.
pub fn point_shader() -> String {
    r#"struct PointParams {
    color: vec4<f32>,
    viewport: vec2<f32>,
    grid_size: f32,
    point_size: f32,
};

@group(0) @binding(0) var projected: texture_2d<f32>;
@group(0) @binding(1) var<uniform> params: PointParams;
@group(0) @binding(2) var sprite_texture: texture_2d<f32>;
@group(0) @binding(3) var sprite_sampler: sampler;

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) uv: vec2<f32>,
};

@vertex
fn vs_main(
    @builtin(vertex_index) vertex_index: u32,
    @location(0) lookup: vec2<f32>,
) -> VertexOutput {
    var quad_vertices = array<vec2<f32>, 6>(
        vec2<f32>(-1.0, -1.0),
        vec2<f32>( 1.0, -1.0),
        vec2<f32>(-1.0,  1.0),
        vec2<f32>(-1.0,  1.0),
        vec2<f32>( 1.0, -1.0),
        vec2<f32>( 1.0,  1.0),
    );
    let quad_pos = quad_vertices[vertex_index];

    let texel = vec2<i32>(lookup * params.grid_size);
    var clip_pos = textureLoad(projected, texel, 0);

    // Expand the quad after projection so the point stays point_size pixels
    // wide at any depth. Offsets are scaled by w to survive the divide.
    let half_extent = quad_pos * params.point_size / params.viewport;
    clip_pos.x += half_extent.x * clip_pos.w;
    clip_pos.y += half_extent.y * clip_pos.w;

    var out: VertexOutput;
    out.clip_position = clip_pos;
    out.uv = quad_pos * vec2<f32>(0.5, -0.5) + 0.5;
    return out;
}

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    let tex_color = textureSample(sprite_texture, sprite_sampler, in.uv);
    return tex_color * params.color;
}
"#
    .to_string()
}

/// WGSL for the bounds wireframe: plain green line segments.
pub fn wireframe_shader() -> String {
    r#"struct WireframeUniforms {
    view_proj: mat4x4<f32>,
};

@group(0) @binding(0) var<uniform> uniforms: WireframeUniforms;

@vertex
fn vs_main(@location(0) position: vec3<f32>) -> @builtin(position) vec4<f32> {
    return uniforms.view_proj * vec4<f32>(position, 1.0);
}

@fragment
fn fs_main() -> @location(0) vec4<f32> {
    return vec4<f32>(0.0, 1.0, 0.0, 1.0);
}
"#
    .to_string()
}

/// Orchestrates simulation, projection, and drawing for one particle system.
pub struct ParticleRenderer {
    camera: Camera,
    simulation: ParticleSimulation,
    transform: TransformPass,
    copy: CopyPass,
    sort: DepthSort,
    seed_view: wgpu::TextureView,
    _seed_texture: wgpu::Texture,
    lookup_buffer: wgpu::Buffer,
    box_buffer: wgpu::Buffer,
    point_pipeline: wgpu::RenderPipeline,
    point_bind_group: wgpu::BindGroup,
    point_buffer: wgpu::Buffer,
    point_params: PointParams,
    wireframe_pipeline: wgpu::RenderPipeline,
    wireframe_bind_group: wgpu::BindGroup,
    wireframe_buffer: wgpu::Buffer,
    particle_count: u32,
}

impl ParticleRenderer {
    /// Build every stage and seed the position buffer.
    ///
    /// `width`/`height` set the initial camera aspect and point scaling;
    /// call [`adjust_camera`](Self::adjust_camera) when the surface resizes.
    pub fn new(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        settings: &SimSettings,
        sprite: &SpriteConfig,
        surface_format: wgpu::TextureFormat,
        width: u32,
        height: u32,
    ) -> Result<Self, StageError> {
        let mut camera = Camera::new();
        camera.set_aspect(width, height);

        let simulation = ParticleSimulation::new(device, settings)?;
        let transform = TransformPass::new(device)?;
        let copy = CopyPass::new(device)?;
        let sort = DepthSort::new(device, settings.resolution);

        let (seed_texture, seed_view) = create_seed_texture(device, queue, settings);

        let lookup = lookup_grid(settings.resolution);
        let lookup_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Particle Lookup Buffer"),
            contents: bytemuck::cast_slice(&lookup),
            usage: wgpu::BufferUsages::VERTEX,
        });

        let edges = box_edges(settings.field_offset, settings.field_scale);
        let box_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Bounds Box Buffer"),
            contents: bytemuck::cast_slice(&edges),
            usage: wgpu::BufferUsages::VERTEX,
        });

        let point_params = PointParams::new(settings.resolution, width, height);
        let point_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Point Params Buffer"),
            contents: bytemuck::bytes_of(&point_params),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let (sprite_view, sprite_sampler) = upload_sprite(device, queue, sprite);

        let (point_pipeline, point_layout) = validated(device, "point", |device| {
            create_point_pipeline(device, surface_format)
        })?;
        let point_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Point Bind Group"),
            layout: &point_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(sort.data_view()),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: point_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::TextureView(&sprite_view),
                },
                wgpu::BindGroupEntry {
                    binding: 3,
                    resource: wgpu::BindingResource::Sampler(&sprite_sampler),
                },
            ],
        });

        let wireframe_uniforms = WireframeUniforms {
            view_proj: camera.view_projection().to_cols_array_2d(),
        };
        let wireframe_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Wireframe Uniform Buffer"),
            contents: bytemuck::bytes_of(&wireframe_uniforms),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let (wireframe_pipeline, wireframe_layout) = validated(device, "wireframe", |device| {
            create_wireframe_pipeline(device, surface_format)
        })?;
        let wireframe_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Wireframe Bind Group"),
            layout: &wireframe_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: wireframe_buffer.as_entire_binding(),
            }],
        });

        let mut renderer = Self {
            camera,
            simulation,
            transform,
            copy,
            sort,
            seed_view,
            _seed_texture: seed_texture,
            lookup_buffer,
            box_buffer,
            point_pipeline,
            point_bind_group,
            point_buffer,
            point_params,
            wireframe_pipeline,
            wireframe_bind_group,
            wireframe_buffer,
            particle_count: settings.particle_count(),
        };
        renderer.reset_particles(device, queue);
        Ok(renderer)
    }

    /// Run one frame: integrate, project, and draw to `surface_view`.
    pub fn render(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        encoder: &mut wgpu::CommandEncoder,
        surface_view: &wgpu::TextureView,
        clock: f32,
    ) {
        let positions = self.simulation.integrate(queue, encoder, clock);

        let view_proj = self.camera.view_projection();
        self.transform.project(
            device,
            queue,
            encoder,
            positions,
            view_proj,
            self.sort.data_view(),
        );
        self.sort.execute(encoder);

        queue.write_buffer(&self.point_buffer, 0, bytemuck::bytes_of(&self.point_params));
        let wireframe_uniforms = WireframeUniforms {
            view_proj: view_proj.to_cols_array_2d(),
        };
        queue.write_buffer(
            &self.wireframe_buffer,
            0,
            bytemuck::bytes_of(&wireframe_uniforms),
        );

        let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Surface Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: surface_view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(CLEAR_COLOR),
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
        });

        // Bounds box first; additive points accumulate over it.
        render_pass.set_pipeline(&self.wireframe_pipeline);
        render_pass.set_bind_group(0, &self.wireframe_bind_group, &[]);
        render_pass.set_vertex_buffer(0, self.box_buffer.slice(..));
        render_pass.draw(0..24, 0..1);

        render_pass.set_pipeline(&self.point_pipeline);
        render_pass.set_bind_group(0, &self.point_bind_group, &[]);
        render_pass.set_vertex_buffer(0, self.lookup_buffer.slice(..));
        render_pass.draw(0..6, 0..self.particle_count);
    }

    /// Restore every particle to its spawn position.
    pub fn reset_particles(&mut self, device: &wgpu::Device, queue: &wgpu::Queue) {
        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("Reset Encoder"),
        });
        self.copy.copy(
            device,
            &mut encoder,
            &self.seed_view,
            self.simulation.current_view(),
        );
        queue.submit(std::iter::once(encoder.finish()));
    }

    /// Recompute the camera aspect for a new viewport. Field of view and
    /// clip planes stay fixed.
    pub fn adjust_camera(&mut self, width: u32, height: u32) {
        self.camera.set_aspect(width, height);
    }

    /// Handle a surface resize: camera aspect plus the viewport uniform the
    /// point shader uses to keep sizes in pixels.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.adjust_camera(width, height);
        self.point_params.viewport = [width as f32, height.max(1) as f32];
    }

    /// Set the advection step length per frame.
    pub fn set_speed(&mut self, speed: f32) {
        self.simulation.set_speed(speed);
    }

    /// Set the particle tint. `rgb` channels are 0-255, `alpha` is 0-1.
    pub fn set_color(&mut self, rgb: Vec3, alpha: f32) {
        self.point_params.color = [rgb.x / 255.0, rgb.y / 255.0, rgb.z / 255.0, alpha];
    }

    /// Set the point diameter in pixels.
    pub fn set_particle_size(&mut self, size: f32) {
        self.point_params.point_size = size;
    }

    /// Set the per-axis noise frequency.
    pub fn set_noise_scale(&mut self, x: f32, y: f32, z: f32) {
        self.simulation.set_noise_scale(x, y, z);
    }

    /// Number of particles drawn per frame.
    pub fn particle_count(&self) -> u32 {
        self.particle_count
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    /// Mutable camera access for interactive orbiting.
    pub fn camera_mut(&mut self) -> &mut Camera {
        &mut self.camera
    }
}

/// Create the seed texture and fill it with spawn positions. Reset blits this
/// texture back over the simulation state, so the upload happens exactly once.
fn create_seed_texture(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    settings: &SimSettings,
) -> (wgpu::Texture, wgpu::TextureView) {
    let seed = uniform_cloud(settings);
    let size = wgpu::Extent3d {
        width: settings.resolution,
        height: settings.resolution,
        depth_or_array_layers: 1,
    };
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("Seed Texture"),
        size,
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: POSITION_FORMAT,
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
        bytemuck::cast_slice(&seed),
        wgpu::TexelCopyBufferLayout {
            offset: 0,
            bytes_per_row: Some(16 * settings.resolution),
            rows_per_image: Some(settings.resolution),
        },
        size,
    );
    let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
    (texture, view)
}

fn create_point_pipeline(
    device: &wgpu::Device,
    surface_format: wgpu::TextureFormat,
) -> (wgpu::RenderPipeline, wgpu::BindGroupLayout) {
    let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some("Point Shader"),
        source: wgpu::ShaderSource::Wgsl(point_shader().into()),
    });

    let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some("Point Bind Group Layout"),
        entries: &[
            // Projected clip-space positions
            wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX,
                ty: wgpu::BindingType::Texture {
                    sample_type: wgpu::TextureSampleType::Float { filterable: false },
                    view_dimension: wgpu::TextureViewDimension::D2,
                    multisampled: false,
                },
                count: None,
            },
            // Point params
            wgpu::BindGroupLayoutEntry {
                binding: 1,
                visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            },
            // Sprite texture
            wgpu::BindGroupLayoutEntry {
                binding: 2,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Texture {
                    sample_type: wgpu::TextureSampleType::Float { filterable: true },
                    view_dimension: wgpu::TextureViewDimension::D2,
                    multisampled: false,
                },
                count: None,
            },
            // Sprite sampler
            wgpu::BindGroupLayoutEntry {
                binding: 3,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                count: None,
            },
        ],
    });

    let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some("Point Pipeline Layout"),
        bind_group_layouts: &[&bind_group_layout],
        push_constant_ranges: &[],
    });

    let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some("Point Pipeline"),
        layout: Some(&pipeline_layout),
        vertex: wgpu::VertexState {
            module: &shader,
            entry_point: Some("vs_main"),
            buffers: &[wgpu::VertexBufferLayout {
                array_stride: std::mem::size_of::<LookupVertex>() as wgpu::BufferAddress,
                step_mode: wgpu::VertexStepMode::Instance,
                attributes: &[wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 0,
                    format: wgpu::VertexFormat::Float32x2,
                }],
            }],
            compilation_options: Default::default(),
        },
        fragment: Some(wgpu::FragmentState {
            module: &shader,
            entry_point: Some("fs_main"),
            targets: &[Some(wgpu::ColorTargetState {
                format: surface_format,
                // Additive: overlapping particles accumulate brightness.
                blend: Some(wgpu::BlendState {
                    color: wgpu::BlendComponent {
                        src_factor: wgpu::BlendFactor::SrcAlpha,
                        dst_factor: wgpu::BlendFactor::One,
                        operation: wgpu::BlendOperation::Add,
                    },
                    alpha: wgpu::BlendComponent {
                        src_factor: wgpu::BlendFactor::One,
                        dst_factor: wgpu::BlendFactor::One,
                        operation: wgpu::BlendOperation::Add,
                    },
                }),
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: Default::default(),
        }),
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            strip_index_format: None,
            front_face: wgpu::FrontFace::Ccw,
            cull_mode: None,
            polygon_mode: wgpu::PolygonMode::Fill,
            unclipped_depth: false,
            conservative: false,
        },
        // Depth test and write stay off so accumulation is order-independent.
        depth_stencil: None,
        multisample: wgpu::MultisampleState::default(),
        multiview: None,
        cache: None,
    });

    (pipeline, bind_group_layout)
}

fn create_wireframe_pipeline(
    device: &wgpu::Device,
    surface_format: wgpu::TextureFormat,
) -> (wgpu::RenderPipeline, wgpu::BindGroupLayout) {
    let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some("Wireframe Shader"),
        source: wgpu::ShaderSource::Wgsl(wireframe_shader().into()),
    });

    let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some("Wireframe Bind Group Layout"),
        entries: &[wgpu::BindGroupLayoutEntry {
            binding: 0,
            visibility: wgpu::ShaderStages::VERTEX,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            count: None,
        }],
    });

    let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some("Wireframe Pipeline Layout"),
        bind_group_layouts: &[&bind_group_layout],
        push_constant_ranges: &[],
    });

    let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some("Wireframe Pipeline"),
        layout: Some(&pipeline_layout),
        vertex: wgpu::VertexState {
            module: &shader,
            entry_point: Some("vs_main"),
            buffers: &[wgpu::VertexBufferLayout {
                array_stride: std::mem::size_of::<BoxVertex>() as wgpu::BufferAddress,
                step_mode: wgpu::VertexStepMode::Vertex,
                attributes: &[wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 0,
                    format: wgpu::VertexFormat::Float32x3,
                }],
            }],
            compilation_options: Default::default(),
        },
        fragment: Some(wgpu::FragmentState {
            module: &shader,
            entry_point: Some("fs_main"),
            targets: &[Some(wgpu::ColorTargetState {
                format: surface_format,
                blend: None,
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: Default::default(),
        }),
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::LineList,
            strip_index_format: None,
            front_face: wgpu::FrontFace::Ccw,
            cull_mode: None,
            polygon_mode: wgpu::PolygonMode::Fill,
            unclipped_depth: false,
            conservative: false,
        },
        depth_stencil: None,
        multisample: wgpu::MultisampleState::default(),
        multiview: None,
        cache: None,
    });

    (pipeline, bind_group_layout)
}

#[cfg(test)]
mod tests {
    use super::*;
    use naga::valid::{Capabilities, ValidationFlags, Validator};

    fn validate_wgsl(source: &str) {
        let module = naga::front::wgsl::parse_str(source)
            .unwrap_or_else(|e| panic!("WGSL parse error: {}", e));
        Validator::new(ValidationFlags::all(), Capabilities::all())
            .validate(&module)
            .unwrap_or_else(|e| panic!("WGSL validation error: {}", e));
    }

    #[test]
    fn test_point_shader_validates() {
        validate_wgsl(&point_shader());
    }

    #[test]
    fn test_wireframe_shader_validates() {
        validate_wgsl(&wireframe_shader());
    }

    #[test]
    fn test_point_shader_fetches_clip_position_per_instance() {
        let src = point_shader();
        // Clip position comes from the projected texture, not a vertex stream.
        assert!(src.contains("textureLoad(projected, texel, 0)"));
        assert!(src.contains("lookup * params.grid_size"));
        // Quad expansion happens in clip space, scaled by w.
        assert!(src.contains("clip_pos.w"));
    }

    #[test]
    fn test_point_shader_tints_sprite() {
        let src = point_shader();
        assert!(src.contains("textureSample(sprite_texture, sprite_sampler, in.uv)"));
        assert!(src.contains("tex_color * params.color"));
    }

    #[test]
    fn test_wireframe_is_green() {
        assert!(wireframe_shader().contains("vec4<f32>(0.0, 1.0, 0.0, 1.0)"));
    }

    #[test]
    fn test_point_params_layout() {
        assert_eq!(std::mem::size_of::<PointParams>(), 32);
    }

    #[test]
    fn test_point_params_defaults() {
        let params = PointParams::new(512, 1280, 720);
        assert_eq!(params.color, [0.5, 0.5, 1.0, 0.1]);
        assert_eq!(params.point_size, 3.0);
        assert_eq!(params.grid_size, 512.0);
        assert_eq!(params.viewport, [1280.0, 720.0]);
    }
}
