//! WGSL noise library for the integration shader.
//!
//! The advection field is built in three layers, each emitted as WGSL text
//! and concatenated into the integration shader source:
//!
//! - `noise3(v: vec3<f32>) -> f32` - 3D simplex gradient noise in [-1, 1]
//! - `vector_noise(x: vec3<f32>) -> vec3<f32>` - three decorrelated channels
//!   of `noise3`, evaluated at axis-permuted inputs with additive offsets
//!   baked into the source at assembly time
//! - `curl_noise(p: vec3<f32>) -> vec3<f32>` - divergence-free flow direction
//!   from central differences of `vector_noise`
//!
//! Baking the channel offsets keeps a run reproducible: the same seed emits
//! byte-identical shader source, so two runs seeded alike advect identically.

use crate::spawn::hash_unit;

/// WGSL source for 3D simplex gradient noise.
pub const NOISE_WGSL: &str = r#"
// Gradient noise helpers
fn mod289_3(x: vec3<f32>) -> vec3<f32> {
    return x - floor(x * (1.0 / 289.0)) * 289.0;
}

fn mod289_4(x: vec4<f32>) -> vec4<f32> {
    return x - floor(x * (1.0 / 289.0)) * 289.0;
}

fn permute4(x: vec4<f32>) -> vec4<f32> {
    return mod289_4(((x * 34.0) + 1.0) * x);
}

fn taylor_inv_sqrt4(r: vec4<f32>) -> vec4<f32> {
    return 1.79284291400159 - 0.85373472095314 * r;
}

// 3D Simplex noise
fn noise3(v: vec3<f32>) -> f32 {
    let C = vec2<f32>(1.0/6.0, 1.0/3.0);
    let D = vec4<f32>(0.0, 0.5, 1.0, 2.0);

    // First corner
    var i = floor(v + dot(v, vec3(C.y)));
    let x0 = v - i + dot(i, vec3(C.x));

    // Other corners
    let g = step(x0.yzx, x0.xyz);
    let l = 1.0 - g;
    let i1 = min(g.xyz, l.zxy);
    let i2 = max(g.xyz, l.zxy);

    let x1 = x0 - i1 + C.x;
    let x2 = x0 - i2 + C.y;
    let x3 = x0 - D.yyy;

    // Permutations
    i = mod289_3(i);
    let p = permute4(permute4(permute4(
        i.z + vec4<f32>(0.0, i1.z, i2.z, 1.0))
      + i.y + vec4<f32>(0.0, i1.y, i2.y, 1.0))
      + i.x + vec4<f32>(0.0, i1.x, i2.x, 1.0));

    // Gradients
    let n_ = 0.142857142857;
    let ns = n_ * D.wyz - D.xzx;

    let j = p - 49.0 * floor(p * ns.z * ns.z);

    let x_ = floor(j * ns.z);
    let y_ = floor(j - 7.0 * x_);

    let x = x_ * ns.x + ns.yyyy;
    let y = y_ * ns.x + ns.yyyy;
    let h = 1.0 - abs(x) - abs(y);

    let b0 = vec4<f32>(x.xy, y.xy);
    let b1 = vec4<f32>(x.zw, y.zw);

    let s0 = floor(b0) * 2.0 + 1.0;
    let s1 = floor(b1) * 2.0 + 1.0;
    let sh = -step(h, vec4<f32>(0.0));

    let a0 = b0.xzyw + s0.xzyw * sh.xxyy;
    let a1 = b1.xzyw + s1.xzyw * sh.zzww;

    var p0 = vec3<f32>(a0.xy, h.x);
    var p1 = vec3<f32>(a0.zw, h.y);
    var p2 = vec3<f32>(a1.xy, h.z);
    var p3 = vec3<f32>(a1.zw, h.w);

    // Normalize gradients
    let norm = taylor_inv_sqrt4(vec4<f32>(dot(p0,p0), dot(p1,p1), dot(p2,p2), dot(p3,p3)));
    p0 *= norm.x;
    p1 *= norm.y;
    p2 *= norm.z;
    p3 *= norm.w;

    // Mix final noise value
    var m = max(0.6 - vec4<f32>(dot(x0,x0), dot(x1,x1), dot(x2,x2), dot(x3,x3)), vec4<f32>(0.0));
    m = m * m;
    return 42.0 * dot(m*m, vec4<f32>(dot(p0,x0), dot(p1,x1), dot(p2,x2), dot(p3,x3)));
}
"#;

/// WGSL source for the curl of the vector noise field.
///
/// Central differences with a fixed epsilon of 1/1024, independent of the
/// position-texture resolution. The cross-partial combination is the curl of
/// a vector potential, so the resulting flow is divergence-free and particles
/// do not clump the way they would along a plain gradient.
pub const CURL_WGSL: &str = r#"
fn curl_noise(p: vec3<f32>) -> vec3<f32> {
    let e = 0.0009765625;
    let e2 = 2.0 * e;
    let dx = vec3<f32>(e, 0.0, 0.0);
    let dy = vec3<f32>(0.0, e, 0.0);
    let dz = vec3<f32>(0.0, 0.0, e);

    let p_x0 = vector_noise(p - dx);
    let p_x1 = vector_noise(p + dx);
    let p_y0 = vector_noise(p - dy);
    let p_y1 = vector_noise(p + dy);
    let p_z0 = vector_noise(p - dz);
    let p_z1 = vector_noise(p + dz);

    let x = p_y1.z - p_y0.z - p_z1.y + p_z0.y;
    let y = p_z1.x - p_z0.x - p_x1.z + p_x0.z;
    let z = p_x1.y - p_x0.y - p_y1.x + p_y0.x;

    return normalize(vec3<f32>(x, y, z) / e2);
}
"#;

/// Per-channel additive offsets for the vector noise, derived from a seed.
///
/// Six unit-interval values, one per component of the two permuted
/// evaluations.
pub fn channel_offsets(seed: u32) -> [f32; 6] {
    let mut offsets = [0.0f32; 6];
    for (i, slot) in offsets.iter_mut().enumerate() {
        *slot = hash_unit(seed.wrapping_add(i as u32).wrapping_mul(0x9e3779b9));
    }
    offsets
}

/// Generate the vector-valued noise function with offsets baked in.
///
/// Three scalar evaluations at axis-permuted inputs; the offsets decorrelate
/// the channels so the curl is not degenerate.
pub fn vector_noise_wgsl(seed: u32) -> String {
    let o = channel_offsets(seed);
    format!(
        r#"
fn vector_noise(x: vec3<f32>) -> vec3<f32> {{
    let s = noise3(x);
    let s1 = noise3(vec3<f32>(x.y + {:.10}, x.z + {:.10}, x.x + {:.10}));
    let s2 = noise3(vec3<f32>(x.z + {:.10}, x.x + {:.10}, x.y + {:.10}));
    return vec3<f32>(s, s1, s2);
}}
"#,
        o[0], o[1], o[2], o[3], o[4], o[5]
    )
}

/// Full WGSL field library for a given noise seed.
pub fn field_wgsl(seed: u32) -> String {
    format!("{}\n{}\n{}", NOISE_WGSL, vector_noise_wgsl(seed), CURL_WGSL)
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

    fn wrap_in_shader(field_lib: &str) -> String {
        format!(
            r#"{}

@fragment
fn fs_main(@builtin(position) frag_coord: vec4<f32>) -> @location(0) vec4<f32> {{
    let flow = curl_noise(frag_coord.xyz * 0.01);
    return vec4<f32>(flow, 1.0);
}}
"#,
            field_lib
        )
    }

    #[test]
    fn test_field_wgsl_validates() {
        let wgsl = wrap_in_shader(&field_wgsl(0));
        if let Err(e) = validate_wgsl(&wgsl) {
            panic!("Field WGSL failed validation: {}", e);
        }
    }

    #[test]
    fn test_field_wgsl_validates_any_seed() {
        for seed in [1u32, 42, 0xdead_beef] {
            let wgsl = wrap_in_shader(&field_wgsl(seed));
            if let Err(e) = validate_wgsl(&wgsl) {
                panic!("Field WGSL failed validation for seed {}: {}", seed, e);
            }
        }
    }

    #[test]
    fn test_field_wgsl_deterministic() {
        assert_eq!(field_wgsl(7), field_wgsl(7));
        assert_ne!(field_wgsl(7), field_wgsl(8));
    }

    #[test]
    fn test_channel_offsets_in_unit_range() {
        let offsets = channel_offsets(3);
        for o in offsets {
            assert!((0.0..1.0).contains(&o), "offset {} outside [0, 1)", o);
        }
    }

    #[test]
    fn test_channel_offsets_distinct() {
        let offsets = channel_offsets(11);
        for i in 0..offsets.len() {
            for j in (i + 1)..offsets.len() {
                assert_ne!(offsets[i], offsets[j]);
            }
        }
    }

    #[test]
    fn test_curl_uses_fixed_epsilon() {
        assert!(CURL_WGSL.contains("0.0009765625"));
        assert!(CURL_WGSL.contains("normalize"));
    }

    #[test]
    fn test_vector_noise_permutes_axes() {
        let wgsl = vector_noise_wgsl(0);
        assert!(wgsl.contains("x.y +"));
        assert!(wgsl.contains("x.z +"));
        assert!(wgsl.contains("x.x +"));
    }
}
