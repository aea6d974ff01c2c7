//! Regular triangulated grid mesh used as the terrain heightfield.
//!
//! Vertices are laid out row-major (`i * (div + 1) + j`, row `i` along Y,
//! column `j` along X). Each grid cell is split into two triangles wound
//! counter-clockwise when seen from +Z, so face normals point up on a flat
//! grid. Topology is fixed after [`GridMesh::generate`]; only heights
//! (the Z coordinate) are mutated afterwards.

use crate::core_types::{Result, SimError, Vec3};
use serde::{Deserialize, Serialize};

/// Lattice resolution and XY extent of a grid mesh.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridSpec {
    /// Number of cells along each axis (0 is promoted to 1)
    pub divisions: usize,
    /// Minimum X coordinate
    pub min_x: f32,
    /// Maximum X coordinate
    pub max_x: f32,
    /// Minimum Y coordinate
    pub min_y: f32,
    /// Maximum Y coordinate
    pub max_y: f32,
}

impl Default for GridSpec {
    fn default() -> Self {
        Self {
            divisions: 64,
            min_x: -1.0,
            max_x: 1.0,
            min_y: -1.0,
            max_y: 1.0,
        }
    }
}

impl GridSpec {
    /// Create a grid spec.
    pub fn new(divisions: usize, min_x: f32, max_x: f32, min_y: f32, max_y: f32) -> Self {
        Self {
            divisions,
            min_x,
            max_x,
            min_y,
            max_y,
        }
    }

    /// Check that the extent is finite and non-empty.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::InvalidExtent`] if any bound is not finite,
    /// `max <= min` on either axis, or the side lengths or diagonal
    /// overflow `f32`.
    pub fn validate(&self) -> Result<()> {
        let finite = [self.min_x, self.max_x, self.min_y, self.max_y]
            .iter()
            .all(|v| v.is_finite());
        let ordered = self.max_x > self.min_x && self.max_y > self.min_y;
        // Bounds near f32::MAX can still overflow once subtracted or squared
        let measurable = (self.max_x - self.min_x).is_finite()
            && (self.max_y - self.min_y).is_finite()
            && self.diagonal().is_finite();
        if !finite || !ordered || !measurable {
            return Err(SimError::InvalidExtent {
                min_x: self.min_x,
                max_x: self.max_x,
                min_y: self.min_y,
                max_y: self.max_y,
            });
        }
        Ok(())
    }

    /// Cells per axis actually generated.
    #[inline]
    pub fn effective_divisions(&self) -> usize {
        self.divisions.max(1)
    }

    /// Length of the rectangle's diagonal.
    pub fn diagonal(&self) -> f32 {
        let dx = self.max_x - self.min_x;
        let dy = self.max_y - self.min_y;
        (dx * dx + dy * dy).sqrt()
    }
}

/// Triangulated heightfield: positions, normals and triangle indices.
///
/// Deserialization re-checks the extent, the normal count and every
/// triangle index, so a loaded mesh upholds the same invariants as one
/// built by [`GridMesh::generate`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "GridMeshData")]
pub struct GridMesh {
    pub(crate) spec: GridSpec,
    pub(crate) positions: Vec<Vec3>,
    pub(crate) normals: Vec<Vec3>,
    pub(crate) triangles: Vec<[u32; 3]>,
}

/// Unchecked serialized form of [`GridMesh`].
#[derive(Deserialize)]
struct GridMeshData {
    spec: GridSpec,
    positions: Vec<Vec3>,
    normals: Vec<Vec3>,
    triangles: Vec<[u32; 3]>,
}

impl TryFrom<GridMeshData> for GridMesh {
    type Error = SimError;

    fn try_from(data: GridMeshData) -> Result<Self> {
        data.spec.validate()?;
        if data.normals.len() != data.positions.len() {
            return Err(SimError::LengthMismatch {
                name: "normal",
                len: data.normals.len(),
                expected: data.positions.len(),
            });
        }
        check_indices(&data.triangles, data.positions.len())?;
        Ok(Self {
            spec: data.spec,
            positions: data.positions,
            normals: data.normals,
            triangles: data.triangles,
        })
    }
}

impl GridMesh {
    /// Build a flat lattice of `(div + 1)²` vertices and `2 · div²` triangles.
    ///
    /// All heights start at zero and all normals at zero until
    /// [`calculate_normals`](crate::grid::calculate_normals) runs.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::InvalidExtent`] for an empty or non-finite rectangle.
    pub fn generate(spec: GridSpec) -> Result<Self> {
        spec.validate()?;

        let div = spec.effective_divisions();
        let side = div + 1;
        let delta_x = (spec.max_x - spec.min_x) / div as f32;
        let delta_y = (spec.max_y - spec.min_y) / div as f32;

        let mut positions = Vec::with_capacity(side * side);
        for i in 0..side {
            for j in 0..side {
                positions.push(Vec3::new(
                    spec.min_x + delta_x * j as f32,
                    spec.min_y + delta_y * i as f32,
                    0.0,
                ));
            }
        }

        let mut triangles = Vec::with_capacity(2 * div * div);
        for i in 0..div {
            for j in 0..div {
                let bottom_left = (i * side + j) as u32;
                let bottom_right = bottom_left + 1;
                let top_left = bottom_left + side as u32;
                let top_right = top_left + 1;
                triangles.push([bottom_left, bottom_right, top_left]);
                triangles.push([bottom_right, top_right, top_left]);
            }
        }

        Ok(Self {
            spec,
            normals: vec![Vec3::zeros(); positions.len()],
            positions,
            triangles,
        })
    }

    /// Grid spec this mesh was generated from.
    pub fn spec(&self) -> &GridSpec {
        &self.spec
    }

    /// Number of cells along each axis.
    pub fn divisions(&self) -> usize {
        self.spec.effective_divisions()
    }

    /// Number of vertices.
    pub fn num_vertices(&self) -> usize {
        self.positions.len()
    }

    /// Number of triangles.
    pub fn num_triangles(&self) -> usize {
        self.triangles.len()
    }

    /// Position of vertex `index`.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::IndexOutOfRange`] if `index >= num_vertices()`.
    pub fn vertex(&self, index: usize) -> Result<Vec3> {
        self.positions
            .get(index)
            .copied()
            .ok_or_else(|| SimError::out_of_range("vertex", index, self.positions.len()))
    }

    /// Overwrite the position of vertex `index`.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::IndexOutOfRange`] if `index >= num_vertices()`.
    pub fn set_vertex(&mut self, index: usize, position: Vec3) -> Result<()> {
        let len = self.positions.len();
        let slot = self
            .positions
            .get_mut(index)
            .ok_or_else(|| SimError::out_of_range("vertex", index, len))?;
        *slot = position;
        Ok(())
    }

    /// Normal of vertex `index`.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::IndexOutOfRange`] if `index >= num_vertices()`.
    pub fn normal(&self, index: usize) -> Result<Vec3> {
        self.normals
            .get(index)
            .copied()
            .ok_or_else(|| SimError::out_of_range("normal", index, self.normals.len()))
    }

    /// Vertex indices of triangle `index`.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::IndexOutOfRange`] if `index >= num_triangles()`.
    pub fn triangle(&self, index: usize) -> Result<[u32; 3]> {
        self.triangles
            .get(index)
            .copied()
            .ok_or_else(|| SimError::out_of_range("triangle", index, self.triangles.len()))
    }

    /// Vertex positions.
    pub fn positions(&self) -> &[Vec3] {
        &self.positions
    }

    /// Per-vertex normals.
    pub fn normals(&self) -> &[Vec3] {
        &self.normals
    }

    /// Triangle index triples.
    pub fn triangles(&self) -> &[[u32; 3]] {
        &self.triangles
    }

    /// Wireframe edge list: `(a,b), (b,c), (c,a)` for every triangle.
    ///
    /// Shared edges appear once per adjacent triangle.
    pub fn generate_edges(&self) -> Vec<[u32; 2]> {
        edges_of(&self.triangles)
    }

    /// Minimum and maximum height over all vertices.
    pub fn height_range(&self) -> (f32, f32) {
        self.positions
            .iter()
            .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), p| {
                (lo.min(p.z), hi.max(p.z))
            })
    }

    /// Flat `x, y, z` position buffer for GPU upload.
    pub fn position_data(&self) -> Vec<f32> {
        flatten(&self.positions)
    }

    /// Flat `x, y, z` normal buffer for GPU upload.
    pub fn normal_data(&self) -> Vec<f32> {
        flatten(&self.normals)
    }

    /// Flat triangle index buffer for GPU upload.
    pub fn index_data(&self) -> Vec<u32> {
        self.triangles.iter().flatten().copied().collect()
    }

    /// Flat line index buffer for wireframe drawing.
    pub fn edge_data(&self) -> Vec<u32> {
        self.generate_edges().iter().flatten().copied().collect()
    }
}

/// Fail on the first triangle corner that is not a valid vertex index.
pub(crate) fn check_indices(triangles: &[[u32; 3]], num_vertices: usize) -> Result<()> {
    match triangles.iter().flatten().find(|&&i| i as usize >= num_vertices) {
        Some(&bad) => Err(SimError::out_of_range("vertex", bad as usize, num_vertices)),
        None => Ok(()),
    }
}

pub(crate) fn edges_of(triangles: &[[u32; 3]]) -> Vec<[u32; 2]> {
    let mut edges = Vec::with_capacity(triangles.len() * 3);
    for &[a, b, c] in triangles {
        edges.push([a, b]);
        edges.push([b, c]);
        edges.push([c, a]);
    }
    edges
}

pub(crate) fn flatten(vectors: &[Vec3]) -> Vec<f32> {
    let mut data = Vec::with_capacity(vectors.len() * 3);
    for v in vectors {
        data.extend_from_slice(&[v.x, v.y, v.z]);
    }
    data
}
