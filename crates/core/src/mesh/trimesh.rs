//! Indexed triangle mesh built from externally parsed vertex/face arrays.

use crate::core_types::{Result, SimError, Vec3};
use crate::grid::mesh::{check_indices, edges_of, flatten};
use crate::grid::vertex_normals;
use nalgebra::Matrix4;
use serde::{Deserialize, Serialize};

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    /// Minimum corner
    pub min: Vec3,
    /// Maximum corner
    pub max: Vec3,
}

impl Aabb {
    /// Box centre.
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// Edge lengths along X, Y and Z.
    pub fn extent(&self) -> Vec3 {
        self.max - self.min
    }

    /// Length of the longest side.
    pub fn longest_side(&self) -> f32 {
        self.extent().max()
    }
}

/// Triangle surface mesh with per-vertex normals.
///
/// Only the positions and faces are read back when deserializing; the
/// bounding box and normals are rebuilt through [`TriMesh::new`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "TriMeshData")]
pub struct TriMesh {
    positions: Vec<Vec3>,
    faces: Vec<[u32; 3]>,
    normals: Vec<Vec3>,
    aabb: Aabb,
}

#[derive(Deserialize)]
struct TriMeshData {
    positions: Vec<Vec3>,
    faces: Vec<[u32; 3]>,
}

impl TryFrom<TriMeshData> for TriMesh {
    type Error = SimError;

    fn try_from(data: TriMeshData) -> Result<Self> {
        Self::new(data.positions, data.faces)
    }
}

impl TriMesh {
    /// Build a mesh and compute its bounding box and normals.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::IndexOutOfRange`] if a face references a missing
    /// vertex, or [`SimError::InvalidParameter`] for an empty vertex list.
    pub fn new(positions: Vec<Vec3>, faces: Vec<[u32; 3]>) -> Result<Self> {
        if positions.is_empty() {
            return Err(SimError::invalid_parameter(
                "positions",
                0.0,
                "must contain at least one vertex",
            ));
        }
        check_indices(&faces, positions.len())?;

        let mut mesh = Self {
            aabb: Aabb {
                min: positions[0],
                max: positions[0],
            },
            normals: Vec::new(),
            positions,
            faces,
        };
        mesh.compute_aabb();
        mesh.generate_normals();
        Ok(mesh)
    }

    /// Build a mesh from flat `x, y, z` and index buffers.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::MalformedBuffer`] if a buffer length is not a
    /// multiple of 3, plus any error from [`TriMesh::new`].
    pub fn from_buffers(vertices: &[f32], indices: &[u32]) -> Result<Self> {
        if vertices.len() % 3 != 0 {
            return Err(SimError::MalformedBuffer {
                name: "vertex",
                len: vertices.len(),
                stride: 3,
            });
        }
        if indices.len() % 3 != 0 {
            return Err(SimError::MalformedBuffer {
                name: "index",
                len: indices.len(),
                stride: 3,
            });
        }
        let positions = vertices
            .chunks_exact(3)
            .map(|c| Vec3::new(c[0], c[1], c[2]))
            .collect();
        let faces = indices.chunks_exact(3).map(|c| [c[0], c[1], c[2]]).collect();
        Self::new(positions, faces)
    }

    /// Recompute the bounding box from the current vertices.
    pub fn compute_aabb(&mut self) {
        let first = self.positions[0];
        self.aabb = self
            .positions
            .iter()
            .fold(Aabb { min: first, max: first }, |b, p| Aabb {
                min: b.min.inf(p),
                max: b.max.sup(p),
            });
    }

    /// Recompute per-vertex normals from the current vertices.
    pub fn generate_normals(&mut self) {
        self.normals = vertex_normals(&self.positions, &self.faces);
    }

    /// Model matrix `S · T` that centres the bounding box on the origin and
    /// scales it uniformly so its longest side is 1.
    ///
    /// A mesh collapsed to a single point only gets the translation.
    pub fn canonical_transform(&self) -> Matrix4<f32> {
        let translate = Matrix4::new_translation(&-self.aabb.center());
        let longest = self.aabb.longest_side();
        if longest > 0.0 {
            Matrix4::new_scaling(1.0 / longest) * translate
        } else {
            translate
        }
    }

    /// Position of vertex `index`.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::IndexOutOfRange`] for a missing vertex.
    pub fn vertex(&self, index: usize) -> Result<Vec3> {
        self.positions
            .get(index)
            .copied()
            .ok_or_else(|| SimError::out_of_range("vertex", index, self.positions.len()))
    }

    /// Move vertex `index`. Call [`compute_aabb`](Self::compute_aabb) and
    /// [`generate_normals`](Self::generate_normals) after a batch of edits.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::IndexOutOfRange`] for a missing vertex.
    pub fn set_vertex(&mut self, index: usize, position: Vec3) -> Result<()> {
        let len = self.positions.len();
        let slot = self
            .positions
            .get_mut(index)
            .ok_or_else(|| SimError::out_of_range("vertex", index, len))?;
        *slot = position;
        Ok(())
    }

    /// Number of vertices.
    pub fn num_vertices(&self) -> usize {
        self.positions.len()
    }

    /// Number of faces.
    pub fn num_faces(&self) -> usize {
        self.faces.len()
    }

    /// Bounding box.
    pub fn aabb(&self) -> Aabb {
        self.aabb
    }

    /// Vertex positions.
    pub fn positions(&self) -> &[Vec3] {
        &self.positions
    }

    /// Face index triples.
    pub fn faces(&self) -> &[[u32; 3]] {
        &self.faces
    }

    /// Per-vertex normals.
    pub fn normals(&self) -> &[Vec3] {
        &self.normals
    }

    /// Wireframe edges.
    pub fn generate_edges(&self) -> Vec<[u32; 2]> {
        edges_of(&self.faces)
    }

    /// Flat position buffer.
    pub fn position_data(&self) -> Vec<f32> {
        flatten(&self.positions)
    }

    /// Flat normal buffer.
    pub fn normal_data(&self) -> Vec<f32> {
        flatten(&self.normals)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use nalgebra::Point3;

    fn tetrahedron() -> TriMesh {
        TriMesh::from_buffers(
            &[
                0.0, 0.0, 0.0, //
                2.0, 0.0, 0.0, //
                0.0, 4.0, 0.0, //
                0.0, 0.0, 1.0,
            ],
            &[0, 2, 1, 0, 1, 3, 0, 3, 2, 1, 2, 3],
        )
        .unwrap()
    }

    #[test]
    fn test_aabb_excludes_origin_bias() {
        let mesh = TriMesh::from_buffers(&[1.0, 1.0, 1.0, 2.0, 3.0, 4.0, 1.5, 2.0, 1.0], &[0, 1, 2])
            .unwrap();
        assert_eq!(mesh.aabb().min, Vec3::new(1.0, 1.0, 1.0));
        assert_eq!(mesh.aabb().max, Vec3::new(2.0, 3.0, 4.0));
    }

    #[test]
    fn test_normals_unit_length() {
        let mesh = tetrahedron();
        assert_eq!(mesh.num_faces(), 4);
        for n in mesh.normals() {
            assert_relative_eq!(n.norm(), 1.0, epsilon = 1e-5);
        }
    }

    #[test]
    fn test_canonical_transform_fits_unit_box() {
        let mesh = tetrahedron();
        let m = mesh.canonical_transform();
        let mut lo = Vec3::repeat(f32::INFINITY);
        let mut hi = Vec3::repeat(f32::NEG_INFINITY);
        for p in mesh.positions() {
            let q = m.transform_point(&Point3::from(*p)).coords;
            lo = lo.inf(&q);
            hi = hi.sup(&q);
        }
        assert_relative_eq!((hi - lo).max(), 1.0, epsilon = 1e-6);
        assert_relative_eq!((hi + lo) * 0.5, Vec3::zeros(), epsilon = 1e-6);
    }

    #[test]
    fn test_bad_buffers() {
        assert!(matches!(
            TriMesh::from_buffers(&[0.0, 1.0], &[]),
            Err(SimError::MalformedBuffer { .. })
        ));
        assert!(matches!(
            TriMesh::from_buffers(&[0.0; 9], &[0, 1, 3]),
            Err(SimError::IndexOutOfRange { index: 3, .. })
        ));
        assert!(TriMesh::new(Vec::new(), Vec::new()).is_err());
    }

    #[test]
    fn test_deserialize_rebuilds_and_validates() {
        let mesh = tetrahedron();
        let loaded: TriMesh = serde_json::from_str(&serde_json::to_string(&mesh).unwrap()).unwrap();
        assert_eq!(loaded.aabb(), mesh.aabb());
        assert_eq!(loaded.normals(), mesh.normals());

        let bad = r#"{"positions": [[0.0, 0.0, 0.0]], "faces": [[0, 0, 5]]}"#;
        assert!(serde_json::from_str::<TriMesh>(bad).is_err());
    }

    #[test]
    fn test_edit_then_recompute() {
        let mut mesh = tetrahedron();
        mesh.set_vertex(3, Vec3::new(0.0, 0.0, 8.0)).unwrap();
        mesh.compute_aabb();
        assert_eq!(mesh.aabb().max.z, 8.0);
        assert!(mesh.set_vertex(4, Vec3::zeros()).is_err());
        assert_eq!(mesh.generate_edges().len(), 12);
    }
}
