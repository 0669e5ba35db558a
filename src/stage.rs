//! Shared plumbing for the off-screen field stages.
//!
//! Every field stage draws one fullscreen triangle so the fragment shader
//! runs exactly once per texel of the target; the vertex stage below is
//! spliced into each stage's shader source. Pipeline construction runs inside
//! a device error scope so WGSL or layout mistakes surface as a
//! [`StageError`](crate::error::StageError) at startup instead of a later
//! uncaptured device error.

use crate::error::StageError;

/// Vertex stage covering the whole target with a single triangle.
pub const FULLSCREEN_VERTEX_WGSL: &str = r#"
@vertex
fn vs_main(@builtin(vertex_index) vertex_index: u32) -> @builtin(position) vec4<f32> {
    var positions = array<vec2<f32>, 3>(
        vec2<f32>(-1.0, -1.0),
        vec2<f32>(3.0, -1.0),
        vec2<f32>(-1.0, 3.0),
    );
    return vec4<f32>(positions[vertex_index], 0.0, 1.0);
}
"#;

/// Run `build` with validation errors captured and attributed to `stage`.
///
/// wgpu reports shader and pipeline validation failures asynchronously; the
/// error scope collects whatever `build` raised and `pollster` blocks until
/// the device has replied. Construction-time only, never on the frame path.
pub(crate) fn validated<T>(
    device: &wgpu::Device,
    stage: &'static str,
    build: impl FnOnce(&wgpu::Device) -> T,
) -> Result<T, StageError> {
    device.push_error_scope(wgpu::ErrorFilter::Validation);
    let value = build(device);
    match pollster::block_on(device.pop_error_scope()) {
        None => Ok(value),
        Some(error) => Err(StageError::PipelineValidation {
            stage,
            message: error.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fullscreen_vertex_validates() {
        let module = naga::front::wgsl::parse_str(FULLSCREEN_VERTEX_WGSL)
            .unwrap_or_else(|e| panic!("Parse error: {:?}", e));
        let mut validator = naga::valid::Validator::new(
            naga::valid::ValidationFlags::all(),
            naga::valid::Capabilities::all(),
        );
        validator
            .validate(&module)
            .unwrap_or_else(|e| panic!("Validation error: {:?}", e));
    }

    #[test]
    fn test_fullscreen_triangle_covers_clip_space() {
        // The oversized triangle must reach past all four NDC edges.
        assert!(FULLSCREEN_VERTEX_WGSL.contains("vec2<f32>(-1.0, -1.0)"));
        assert!(FULLSCREEN_VERTEX_WGSL.contains("vec2<f32>(3.0, -1.0)"));
        assert!(FULLSCREEN_VERTEX_WGSL.contains("vec2<f32>(-1.0, 3.0)"));
    }
}
