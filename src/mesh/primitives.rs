//! Small procedural meshes used as placeholders and scenery.
//!
//! Triangles are already in the left-handed winding the converted assets use,
//! so these do not go through [`rh_to_lh`](super::coords::rh_to_lh).

use super::vertex::{IndexedMesh, SimpleVertex};

pub const GROUND_HALF_EXTENT: f32 = 15.0;
pub const CROSS_HATCH_DEFAULT_SCALE: f32 = 0.5;

const CROSS_HATCH_BASE_NORMAL: f32 = 0.4;

fn v(position: [f32; 3], normal: [f32; 3], uv: [f32; 2]) -> SimpleVertex {
    SimpleVertex::new(position, normal, uv)
}

/// Two triangles per face, fanning from the first vertex of every quad of
/// four vertices: `3,1,0` and `2,1,3`.
fn quad_indices(quads: u32) -> Vec<u32> {
    (0..quads)
        .flat_map(|quad| [3, 1, 0, 2, 1, 3].map(|corner| quad * 4 + corner))
        .collect()
}

/// Unit cube spanning `-1..1` with per-face normals and texture coordinates.
pub fn cube() -> IndexedMesh<SimpleVertex> {
    let vertices = vec![
        // +Y
        v([-1.0, 1.0, -1.0], [0.0, 1.0, 0.0], [-1.0, 0.0]),
        v([1.0, 1.0, -1.0], [0.0, 1.0, 0.0], [0.0, 0.0]),
        v([1.0, 1.0, 1.0], [0.0, 1.0, 0.0], [0.0, 1.0]),
        v([-1.0, 1.0, 1.0], [0.0, 1.0, 0.0], [-1.0, 1.0]),
        // -Y
        v([-1.0, -1.0, -1.0], [0.0, -1.0, 0.0], [0.0, 0.0]),
        v([1.0, -1.0, -1.0], [0.0, -1.0, 0.0], [-1.0, 0.0]),
        v([1.0, -1.0, 1.0], [0.0, -1.0, 0.0], [-1.0, 1.0]),
        v([-1.0, -1.0, 1.0], [0.0, -1.0, 0.0], [0.0, 1.0]),
        // -X
        v([-1.0, -1.0, 1.0], [-1.0, 0.0, 0.0], [0.0, 1.0]),
        v([-1.0, -1.0, -1.0], [-1.0, 0.0, 0.0], [-1.0, 1.0]),
        v([-1.0, 1.0, -1.0], [-1.0, 0.0, 0.0], [-1.0, 0.0]),
        v([-1.0, 1.0, 1.0], [-1.0, 0.0, 0.0], [0.0, 0.0]),
        // +X
        v([1.0, -1.0, 1.0], [1.0, 0.0, 0.0], [-1.0, 1.0]),
        v([1.0, -1.0, -1.0], [1.0, 0.0, 0.0], [0.0, 1.0]),
        v([1.0, 1.0, -1.0], [1.0, 0.0, 0.0], [0.0, 0.0]),
        v([1.0, 1.0, 1.0], [1.0, 0.0, 0.0], [-1.0, 0.0]),
        // -Z
        v([-1.0, -1.0, -1.0], [0.0, 0.0, -1.0], [0.0, 1.0]),
        v([1.0, -1.0, -1.0], [0.0, 0.0, -1.0], [-1.0, 1.0]),
        v([1.0, 1.0, -1.0], [0.0, 0.0, -1.0], [-1.0, 0.0]),
        v([-1.0, 1.0, -1.0], [0.0, 0.0, -1.0], [0.0, 0.0]),
        // +Z
        v([-1.0, -1.0, 1.0], [0.0, 0.0, 1.0], [-1.0, 1.0]),
        v([1.0, -1.0, 1.0], [0.0, 0.0, 1.0], [0.0, 1.0]),
        v([1.0, 1.0, 1.0], [0.0, 0.0, 1.0], [0.0, 0.0]),
        v([-1.0, 1.0, 1.0], [0.0, 0.0, 1.0], [-1.0, 0.0]),
    ];
    // Faces alternate between the two fan orders so each one faces outward.
    let indices = vec![
        3, 1, 0, 2, 1, 3, //
        6, 4, 5, 7, 4, 6, //
        11, 9, 8, 10, 9, 11, //
        14, 12, 13, 15, 12, 14, //
        19, 17, 16, 18, 17, 19, //
        22, 20, 21, 23, 20, 22,
    ];
    IndexedMesh { vertices, indices }
}

/// Flat ground quad at `y = 0`, `2 * GROUND_HALF_EXTENT` wide, with the
/// texture tiled three times across.
pub fn ground() -> IndexedMesh<SimpleVertex> {
    let s = GROUND_HALF_EXTENT;
    let up = [0.0, 1.0, 0.0];
    IndexedMesh {
        vertices: vec![
            v([-s, 0.0, -s], up, [-3.0, 0.0]),
            v([s, 0.0, -s], up, [0.0, 0.0]),
            v([s, 0.0, s], up, [0.0, 3.0]),
            v([-s, 0.0, s], up, [-3.0, 3.0]),
        ],
        indices: quad_indices(1),
    }
}

/// Two crossed vertical quads (grass/foliage billboard), `2 * scale` tall.
///
/// The bottom edge gets a shortened up-normal so it shades darker.
pub fn cross_hatch(scale: f32) -> IndexedMesh<SimpleVertex> {
    let s = scale;
    let h = scale * 2.0;
    let base = [0.0, CROSS_HATCH_BASE_NORMAL, 0.0];
    let top = [0.0, 1.0, -0.2];
    IndexedMesh {
        vertices: vec![
            v([-s, 0.0, -s], base, [1.0, 0.0]),
            v([s, 0.0, s], base, [0.0, 0.0]),
            v([s, h, s], top, [0.0, -1.0]),
            v([-s, h, -s], top, [1.0, -1.0]),
            v([s, 0.0, -s], base, [-1.0, 0.0]),
            v([-s, 0.0, s], base, [0.0, 0.0]),
            v([-s, h, s], top, [0.0, -1.0]),
            v([s, h, -s], top, [-1.0, -1.0]),
        ],
        indices: vec![3, 1, 0, 2, 1, 3, 6, 4, 5, 7, 4, 6],
    }
}
