//! Terrain and Particle Simulation Core Library
//!
//! Pure geometry and physics engines that feed an external renderer:
//!
//! - **Terrain**: regular grid meshes shaped into fractal heightfields by
//!   repeated random fault-plane displacement, with smooth per-vertex normals.
//! - **Particles**: spheres falling under gravity and drag inside a cube,
//!   bouncing off the walls and settling on the floor.
//! - **Meshes**: bounding boxes, normals and canonical transforms for
//!   externally loaded triangle meshes, plus a tessellated unit sphere.
//!
//! Nothing here touches a GPU; renderers borrow the produced arrays.

// Core types and utilities
pub mod core_types;

pub mod config;
pub mod grid;
pub mod mesh;
pub mod particle;

// Re-export core types
pub use core_types::{normalize_or_zero, Result, SimError, Vec3};

pub use config::SimConfig;
pub use grid::{
    calculate_normals, shape_terrain, FaultParams, FaultPlane, GridMesh, GridSpec, Terrain,
    TerrainConfig,
};
pub use mesh::{Aabb, SphereMesh, TriMesh};
pub use particle::{
    detect_collision, CollisionHit, Particle, ParticleParams, ParticleState, ParticleSystem,
    ParticleSystemStats, Wall,
};
