//! Integration tests for runtime shader assembly.
//!
//! Every pipeline stage generates its WGSL at startup; these tests push the
//! generated sources through naga's full validator, the same check wgpu
//! performs when the shader module is created on a device.

use naga::valid::{Capabilities, ValidationFlags, Validator};

use curlfield::{copy, noise, renderer, simulation, stage, transform};

fn validate(label: &str, source: &str) {
    let module = naga::front::wgsl::parse_str(source)
        .unwrap_or_else(|e| panic!("{}: WGSL parse error: {}", label, e));
    Validator::new(ValidationFlags::all(), Capabilities::all())
        .validate(&module)
        .unwrap_or_else(|e| panic!("{}: WGSL validation error: {}", label, e));
}

// ============================================================================
// Per-stage validation
// ============================================================================

#[test]
fn test_integration_shader_validates_across_seeds() {
    for seed in [0u32, 1, 7, 42, 0xDEAD_BEEF, u32::MAX] {
        validate("integration", &simulation::integration_shader(seed));
    }
}

#[test]
fn test_transform_shader_validates() {
    validate("transform", &transform::transform_shader());
}

#[test]
fn test_copy_shader_validates() {
    validate("copy", &copy::copy_shader());
}

#[test]
fn test_point_shader_validates() {
    validate("point", &renderer::point_shader());
}

#[test]
fn test_wireframe_shader_validates() {
    validate("wireframe", &renderer::wireframe_shader());
}

#[test]
fn test_noise_library_validates_standalone() {
    for seed in [0u32, 3, 99] {
        validate("noise library", &noise::field_wgsl(seed));
    }
}

// ============================================================================
// Assembly properties
// ============================================================================

#[test]
fn test_integration_shader_deterministic_per_seed() {
    assert_eq!(
        simulation::integration_shader(11),
        simulation::integration_shader(11)
    );
    assert_ne!(
        simulation::integration_shader(11),
        simulation::integration_shader(12)
    );
}

#[test]
fn test_field_stages_share_fullscreen_vertex() {
    for src in [
        simulation::integration_shader(0),
        transform::transform_shader(),
        copy::copy_shader(),
    ] {
        assert!(src.contains(stage::FULLSCREEN_VERTEX_WGSL));
    }
}

#[test]
fn test_copy_shader_has_no_arithmetic() {
    // Bit-exact blit: the fragment body forwards the loaded texel untouched.
    let src = copy::copy_shader();
    let body = src
        .split("@fragment")
        .nth(1)
        .expect("copy shader has a fragment stage");
    assert!(!body.contains('*'));
    assert!(!body.contains('+'));
    assert!(body.contains("return textureLoad(source, vec2<i32>(frag_coord.xy), 0);"));
}

#[test]
fn test_transform_keeps_full_homogeneous_result() {
    // The w component must reach the output texture; the point pass divides
    // by it when expanding quads.
    let src = transform::transform_shader();
    assert!(src.contains("return params.transform * vec4<f32>(p, 1.0);"));
    assert!(!src.contains(".xyz / "));
}

#[test]
fn test_integration_shader_works_in_field_local_space() {
    let src = simulation::integration_shader(5);
    let offset_removed = src.find("p -= params.field_offset").unwrap();
    let advected = src.find("p += params.speed * curl_noise").unwrap();
    let offset_restored = src.find("p += params.field_offset").unwrap();
    assert!(offset_removed < advected);
    assert!(advected < offset_restored);
}
