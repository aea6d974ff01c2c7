//! Grid mesh generation, fault-plane terrain shaping and normals

pub mod mesh;
pub mod normals;
pub mod terrain;

// Re-export main types
pub use mesh::*;
pub use normals::*;
pub use terrain::*;
