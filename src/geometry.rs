//! Point-cloud lookup geometry and the field bounds wireframe.
//!
//! The point cloud carries no positions. Each particle contributes a single
//! 2D lookup coordinate addressing its texel in the position texture; the
//! vertex shader fetches the projected position from there at draw time. The
//! grid is generated once and never changes.

use bytemuck::{Pod, Zeroable};
use glam::Vec3;

/// Per-particle vertex data: the texel lookup coordinate, half-texel
/// centered, in [0, 1] on both axes.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct LookupVertex {
    pub coord: [f32; 2],
}

/// One endpoint of a bounds wireframe segment, in world space.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct BoxVertex {
    pub position: [f32; 3],
}

/// Generate `resolution²` lookup coordinates in row-major texel order.
///
/// Vertex `i` addresses texel `(i mod R, i / R)`; the half-texel offset
/// centers the coordinate so scaling by R recovers the texel index exactly.
pub fn lookup_grid(resolution: u32) -> Vec<LookupVertex> {
    let r = resolution as f32;
    let half = 0.5 / r;
    let mut vertices = Vec::with_capacity((resolution * resolution) as usize);
    for i in 0..resolution * resolution {
        vertices.push(LookupVertex {
            coord: [
                (i % resolution) as f32 / r + half,
                (i / resolution) as f32 / r + half,
            ],
        });
    }
    vertices
}

/// The 12 edges of the field box as 24 line-list vertices.
///
/// Corners are indexed by a 3-bit mask (bit set = high end of that axis);
/// every pair of corners differing in exactly one bit is an edge.
pub fn box_edges(offset: Vec3, scale: Vec3) -> Vec<BoxVertex> {
    let corner = |mask: u32| -> [f32; 3] {
        [
            offset.x + if mask & 1 != 0 { scale.x } else { 0.0 },
            offset.y + if mask & 2 != 0 { scale.y } else { 0.0 },
            offset.z + if mask & 4 != 0 { scale.z } else { 0.0 },
        ]
    };
    let mut vertices = Vec::with_capacity(24);
    for a in 0u32..8 {
        for bit in [1u32, 2, 4] {
            if a & bit == 0 {
                vertices.push(BoxVertex {
                    position: corner(a),
                });
                vertices.push(BoxVertex {
                    position: corner(a | bit),
                });
            }
        }
    }
    vertices
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_lookup_grid_count() {
        for resolution in [2u32, 8, 64, 256] {
            let grid = lookup_grid(resolution);
            assert_eq!(grid.len(), (resolution * resolution) as usize);
        }
    }

    #[test]
    fn test_lookup_coords_within_half_texel_bounds() {
        let resolution = 32u32;
        let r = resolution as f32;
        let lo = 0.5 / r;
        let hi = 1.0 - 0.5 / r;
        for v in lookup_grid(resolution) {
            assert!(v.coord[0] >= lo && v.coord[0] <= hi, "x = {}", v.coord[0]);
            assert!(v.coord[1] >= lo && v.coord[1] <= hi, "y = {}", v.coord[1]);
        }
    }

    #[test]
    fn test_lookup_coords_unique() {
        let resolution = 64u32;
        let mut seen = HashSet::new();
        for v in lookup_grid(resolution) {
            let bits = (v.coord[0].to_bits(), v.coord[1].to_bits());
            assert!(seen.insert(bits), "duplicate coordinate {:?}", v.coord);
        }
    }

    #[test]
    fn test_lookup_coords_recover_texel_index() {
        let resolution = 16u32;
        let r = resolution as f32;
        for (i, v) in lookup_grid(resolution).iter().enumerate() {
            let tx = (v.coord[0] * r) as u32;
            let ty = (v.coord[1] * r) as u32;
            assert_eq!(tx, i as u32 % resolution);
            assert_eq!(ty, i as u32 / resolution);
        }
    }

    #[test]
    fn test_box_edge_count() {
        let edges = box_edges(Vec3::splat(-5.0), Vec3::splat(10.0));
        assert_eq!(edges.len(), 24);
    }

    #[test]
    fn test_box_vertices_on_corners() {
        let offset = Vec3::new(-5.0, -5.0, -5.0);
        let scale = Vec3::new(10.0, 10.0, 10.0);
        for v in box_edges(offset, scale) {
            for (axis, p) in v.position.iter().enumerate() {
                let lo = offset[axis];
                let hi = offset[axis] + scale[axis];
                assert!(*p == lo || *p == hi, "vertex not on box corner: {:?}", v);
            }
        }
    }

    #[test]
    fn test_box_edges_each_span_one_axis() {
        let edges = box_edges(Vec3::ZERO, Vec3::ONE);
        for pair in edges.chunks_exact(2) {
            let differing = pair[0]
                .position
                .iter()
                .zip(pair[1].position.iter())
                .filter(|(a, b)| a != b)
                .count();
            assert_eq!(differing, 1, "edge {:?} spans more than one axis", pair);
        }
    }
}
