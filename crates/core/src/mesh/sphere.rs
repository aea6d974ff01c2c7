//! Unit sphere tessellated by recursive tetrahedron subdivision.
//!
//! Used to draw particles: the renderer scales and translates one shared
//! sphere per particle. Positions double as normals because every vertex
//! lies on the unit sphere.

use crate::core_types::Vec3;
use crate::grid::mesh::flatten;

/// Non-indexed triangle soup approximating the unit sphere.
#[derive(Debug, Clone)]
pub struct SphereMesh {
    positions: Vec<Vec3>,
}

impl SphereMesh {
    /// Tessellate with `subdivisions` levels; yields `4 · 4^subdivisions` triangles.
    pub fn new(subdivisions: u32) -> Self {
        let a = Vec3::new(0.0, 0.0, -1.0);
        let b = Vec3::new(0.0, 0.942809, 0.333333);
        let c = Vec3::new(-0.816497, -0.471405, 0.333333);
        let d = Vec3::new(0.816497, -0.471405, 0.333333);

        let mut positions = Vec::with_capacity(12 * 4_usize.pow(subdivisions));
        subdivide(&mut positions, a, b, c, subdivisions);
        subdivide(&mut positions, d, c, b, subdivisions);
        subdivide(&mut positions, a, d, b, subdivisions);
        subdivide(&mut positions, a, c, d, subdivisions);

        Self { positions }
    }

    /// Number of triangles.
    pub fn num_triangles(&self) -> usize {
        self.positions.len() / 3
    }

    /// Vertex positions, three per triangle.
    pub fn positions(&self) -> &[Vec3] {
        &self.positions
    }

    /// Vertex normals; identical to the positions.
    pub fn normals(&self) -> &[Vec3] {
        &self.positions
    }

    /// Flat position buffer (also usable as the normal buffer).
    pub fn position_data(&self) -> Vec<f32> {
        flatten(&self.positions)
    }
}

fn subdivide(out: &mut Vec<Vec3>, a: Vec3, b: Vec3, c: Vec3, depth: u32) {
    if depth == 0 {
        out.extend_from_slice(&[a, b, c]);
        return;
    }

    let ab = a.lerp(&b, 0.5).normalize();
    let ac = a.lerp(&c, 0.5).normalize();
    let bc = b.lerp(&c, 0.5).normalize();

    subdivide(out, a, ab, ac, depth - 1);
    subdivide(out, ab, b, bc, depth - 1);
    subdivide(out, bc, c, ac, depth - 1);
    subdivide(out, ab, bc, ac, depth - 1);
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_triangle_count() {
        for n in 0..4 {
            assert_eq!(SphereMesh::new(n).num_triangles(), 4 * 4_usize.pow(n));
        }
    }

    #[test]
    fn test_vertices_on_unit_sphere() {
        let sphere = SphereMesh::new(3);
        for p in sphere.positions() {
            assert_relative_eq!(p.norm(), 1.0, epsilon = 1e-5);
        }
        assert_eq!(sphere.position_data().len(), sphere.num_triangles() * 9);
    }
}
