//! Standalone triangle meshes consumed by the renderer

pub mod sphere;
pub mod trimesh;

pub use sphere::SphereMesh;
pub use trimesh::{Aabb, TriMesh};
