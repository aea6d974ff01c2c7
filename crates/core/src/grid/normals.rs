//! Smooth per-vertex normals from triangle geometry.

use crate::core_types::{normalize_or_zero, Vec3};
use crate::grid::GridMesh;
use rayon::prelude::*;

/// Weight applied to each unnormalized face normal before accumulation.
///
/// Half the cross product is the triangle's area vector, so larger faces
/// pull the vertex normal harder.
const FACE_WEIGHT: f32 = 0.5;

/// Face normal `(b - a) × (c - a)` scaled by [`FACE_WEIGHT`].
#[inline]
pub fn face_normal(a: &Vec3, b: &Vec3, c: &Vec3) -> Vec3 {
    (b - a).cross(&(c - a)) * FACE_WEIGHT
}

/// Compute area-weighted vertex normals for an indexed triangle list.
///
/// Vertices referenced only by degenerate (zero area) triangles, or by no
/// triangle at all, get the zero vector instead of NaN.
///
/// Callers must pass triangles whose indices were checked against
/// `positions`, as [`GridMesh`] and [`TriMesh`](crate::mesh::TriMesh) do on
/// construction and deserialization.
pub(crate) fn vertex_normals(positions: &[Vec3], triangles: &[[u32; 3]]) -> Vec<Vec3> {
    let mut accum = vec![Vec3::zeros(); positions.len()];

    for &[a, b, c] in triangles {
        let (a, b, c) = (a as usize, b as usize, c as usize);
        let n = face_normal(&positions[a], &positions[b], &positions[c]);
        accum[a] += n;
        accum[b] += n;
        accum[c] += n;
    }

    accum.par_iter_mut().for_each(|n| *n = normalize_or_zero(n));
    accum
}

/// Recompute the normals of a grid mesh from its current heights.
pub fn calculate_normals(grid: &mut GridMesh) {
    grid.normals = vertex_normals(&grid.positions, &grid.triangles);
}
