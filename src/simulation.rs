//! GPU curl-noise integration over the position texture pair.
//!
//! One fragment invocation per texel advects one particle: read the current
//! position from the readable buffer, step it along the curl field, write it
//! to the opposite buffer. The pair swaps after each pass, so the shader
//! never samples the texture it renders into.

use bytemuck::{Pod, Zeroable};
use wgpu::util::DeviceExt;

use crate::error::StageError;
use crate::noise;
use crate::settings::SimSettings;
use crate::stage::{validated, FULLSCREEN_VERTEX_WGSL};
use crate::targets::{PositionTargets, POSITION_FORMAT};

/// Uniform block for the integration shader.
///
/// Matches the WGSL struct layout: vec3 members are 16-aligned, so each is
/// paired with one trailing f32.
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
struct FieldUniforms {
    field_scale: [f32; 3],
    clock: f32,
    field_offset: [f32; 3],
    _pad0: f32,
    speed: [f32; 3],
    _pad1: f32,
    noise_scale: [f32; 3],
    _pad2: f32,
}

/// Assemble the integration shader for a given noise seed.
pub fn integration_shader(noise_seed: u32) -> String {
    format!(
        r#"
struct FieldUniforms {{
    field_scale: vec3<f32>,
    clock: f32,
    field_offset: vec3<f32>,
    _pad0: f32,
    speed: vec3<f32>,
    _pad1: f32,
    noise_scale: vec3<f32>,
    _pad2: f32,
}};

@group(0) @binding(0)
var positions: texture_2d<f32>;
@group(0) @binding(1)
var<uniform> params: FieldUniforms;

{field_lib}

{fullscreen_vertex}

@fragment
fn fs_main(@builtin(position) frag_coord: vec4<f32>) -> @location(0) vec4<f32> {{
    let texel = vec2<i32>(frag_coord.xy);
    var p = textureLoad(positions, texel, 0).xyz;
    p -= params.field_offset;
    let noise_coord = p / params.field_scale;
    p += params.speed * curl_noise(noise_coord * params.noise_scale);
    p += params.field_offset;
    return vec4<f32>(p, 1.0);
}}
"#,
        field_lib = noise::field_wgsl(noise_seed),
        fullscreen_vertex = FULLSCREEN_VERTEX_WGSL,
    )
}

/// The curl-noise integrator and its double-buffered state.
pub struct ParticleSimulation {
    targets: PositionTargets,
    pipeline: wgpu::RenderPipeline,
    /// One bind group per readable slot, so the frame path allocates nothing.
    bind_groups: [wgpu::BindGroup; 2],
    uniform_buffer: wgpu::Buffer,
    uniforms: FieldUniforms,
}

impl ParticleSimulation {
    pub fn new(device: &wgpu::Device, settings: &SimSettings) -> Result<Self, StageError> {
        assert!(
            settings.resolution.is_power_of_two(),
            "position texture resolution must be a power of two, got {}",
            settings.resolution
        );

        let targets = PositionTargets::new(device, settings.resolution);

        let uniforms = FieldUniforms {
            field_scale: settings.field_scale.to_array(),
            clock: 0.0,
            field_offset: settings.field_offset.to_array(),
            _pad0: 0.0,
            speed: [0.001; 3],
            _pad1: 0.0,
            noise_scale: [1.0; 3],
            _pad2: 0.0,
        };

        let uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Integration Uniform Buffer"),
            contents: bytemuck::bytes_of(&uniforms),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let shader_src = integration_shader(settings.noise_seed);
        let (pipeline, bind_group_layout) = validated(device, "integration", |device| {
            create_integration_pipeline(device, &shader_src)
        })?;

        let views = targets.views();
        let bind_groups = [
            create_read_bind_group(device, &bind_group_layout, views[0], &uniform_buffer, "A"),
            create_read_bind_group(device, &bind_group_layout, views[1], &uniform_buffer, "B"),
        ];

        Ok(Self {
            targets,
            pipeline,
            bind_groups,
            uniform_buffer,
            uniforms,
        })
    }

    /// Advance every particle one step and swap the buffer roles.
    ///
    /// Returns the view holding the freshly written state, also available as
    /// [`current_view`](Self::current_view).
    pub fn integrate(
        &mut self,
        queue: &wgpu::Queue,
        encoder: &mut wgpu::CommandEncoder,
        clock: f32,
    ) -> &wgpu::TextureView {
        self.uniforms.clock = clock;
        queue.write_buffer(&self.uniform_buffer, 0, bytemuck::bytes_of(&self.uniforms));

        let read_index = self.targets.swap_state().read_index();
        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Integration Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: self.targets.write_view(),
                    depth_slice: None,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::TRANSPARENT),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });
            pass.set_pipeline(&self.pipeline);
            pass.set_bind_group(0, &self.bind_groups[read_index], &[]);
            pass.draw(0..3, 0..1);
        }
        self.targets.swap();
        self.targets.read_view()
    }

    /// The buffer holding current particle state.
    pub fn current_view(&self) -> &wgpu::TextureView {
        self.targets.read_view()
    }

    /// Integration step scale, applied uniformly on all axes.
    pub fn set_speed(&mut self, speed: f32) {
        self.uniforms.speed = [speed; 3];
    }

    /// Noise frequency per axis.
    pub fn set_noise_scale(&mut self, x: f32, y: f32, z: f32) {
        self.uniforms.noise_scale = [x, y, z];
    }
}

fn create_integration_pipeline(
    device: &wgpu::Device,
    shader_src: &str,
) -> (wgpu::RenderPipeline, wgpu::BindGroupLayout) {
    let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some("Integration Shader"),
        source: wgpu::ShaderSource::Wgsl(shader_src.into()),
    });

    let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some("Integration Bind Group Layout"),
        entries: &[
            wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Texture {
                    sample_type: wgpu::TextureSampleType::Float { filterable: false },
                    view_dimension: wgpu::TextureViewDimension::D2,
                    multisampled: false,
                },
                count: None,
            },
            wgpu::BindGroupLayoutEntry {
                binding: 1,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            },
        ],
    });

    let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some("Integration Pipeline Layout"),
        bind_group_layouts: &[&bind_group_layout],
        push_constant_ranges: &[],
    });

    let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some("Integration Pipeline"),
        layout: Some(&pipeline_layout),
        vertex: wgpu::VertexState {
            module: &shader,
            entry_point: Some("vs_main"),
            buffers: &[],
            compilation_options: Default::default(),
        },
        fragment: Some(wgpu::FragmentState {
            module: &shader,
            entry_point: Some("fs_main"),
            targets: &[Some(wgpu::ColorTargetState {
                format: POSITION_FORMAT,
                blend: None,
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: Default::default(),
        }),
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            ..Default::default()
        },
        depth_stencil: None,
        multisample: wgpu::MultisampleState::default(),
        multiview: None,
        cache: None,
    });

    (pipeline, bind_group_layout)
}

fn create_read_bind_group(
    device: &wgpu::Device,
    layout: &wgpu::BindGroupLayout,
    position_view: &wgpu::TextureView,
    uniform_buffer: &wgpu::Buffer,
    slot: &str,
) -> wgpu::BindGroup {
    device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some(&format!("Integration Bind Group {}", slot)),
        layout,
        entries: &[
            wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::TextureView(position_view),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: uniform_buffer.as_entire_binding(),
            },
        ],
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn validate_wgsl(code: &str) -> Result<(), String> {
        let module =
            naga::front::wgsl::parse_str(code).map_err(|e| format!("Parse error: {:?}", e))?;
        let mut validator = naga::valid::Validator::new(
            naga::valid::ValidationFlags::all(),
            naga::valid::Capabilities::all(),
        );
        validator
            .validate(&module)
            .map_err(|e| format!("Validation error: {:?}", e))?;
        Ok(())
    }

    #[test]
    fn test_integration_shader_validates() {
        let wgsl = integration_shader(0);
        if let Err(e) = validate_wgsl(&wgsl) {
            panic!("Integration shader failed validation: {}", e);
        }
    }

    #[test]
    fn test_integration_shader_deterministic_per_seed() {
        assert_eq!(integration_shader(42), integration_shader(42));
        assert_ne!(integration_shader(42), integration_shader(43));
    }

    #[test]
    fn test_integration_shader_advects_in_field_space() {
        let wgsl = integration_shader(0);
        assert!(wgsl.contains("p -= params.field_offset"));
        assert!(wgsl.contains("p / params.field_scale"));
        assert!(wgsl.contains("params.speed * curl_noise(noise_coord * params.noise_scale)"));
        assert!(wgsl.contains("p += params.field_offset"));
        assert!(wgsl.contains("return vec4<f32>(p, 1.0);"));
    }

    #[test]
    fn test_integration_shader_reads_own_texel() {
        let wgsl = integration_shader(0);
        assert!(wgsl.contains("vec2<i32>(frag_coord.xy)"));
        assert!(wgsl.contains("textureLoad(positions, texel, 0)"));
    }

    #[test]
    fn test_uniform_block_size_matches_wgsl_layout() {
        // Four 16-byte rows: (vec3 + f32) * 4.
        assert_eq!(std::mem::size_of::<FieldUniforms>(), 64);
    }
}
