//! Fractal terrain synthesis by repeated random fault-plane displacement.
//!
//! Each pass picks a random point `p` inside the grid rectangle and a random
//! horizontal direction `n`. Every vertex on the positive side of the plane
//! through `p` with normal `n` is raised, every other vertex lowered, by
//! `delta · f(r)` where `r` is the vertex distance to `p`. `delta` decays by
//! `2^-H` after each pass, so later faults add progressively finer detail.
//!
//! # Falloff
//!
//! ```text
//! f(r) = (1 - (r / R)²)²
//! ```
//!
//! with `R` the diagonal of the grid rectangle. The formula is applied
//! literally. Inside the rectangle `r <= R` always holds; for `r > R` the
//! squared form grows again instead of going to zero.

use crate::core_types::{Result, SimError, Vec3};
use crate::grid::{calculate_normals, GridMesh, GridSpec};
use rand::Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Parameters of the fault-plane shaping pass.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FaultParams {
    /// Number of fault passes
    pub iterations: u32,
    /// Displacement applied by the first pass
    pub initial_delta: f32,
    /// Persistence exponent `H`; `delta` is divided by `2^H` per pass.
    /// Smaller values decay slower and give rougher terrain.
    pub persistence: f32,
}

impl Default for FaultParams {
    fn default() -> Self {
        Self {
            iterations: 100,
            initial_delta: 0.01,
            persistence: 0.0143,
        }
    }
}

impl FaultParams {
    /// Check the parameters are finite and the decay does not amplify.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::InvalidParameter`] for a non-finite delta or a
    /// negative/non-finite persistence.
    pub fn validate(&self) -> Result<()> {
        if !self.initial_delta.is_finite() {
            return Err(SimError::invalid_parameter(
                "initial_delta",
                self.initial_delta,
                "must be finite",
            ));
        }
        if !self.persistence.is_finite() || self.persistence < 0.0 {
            return Err(SimError::invalid_parameter(
                "persistence",
                self.persistence,
                "must be finite and non-negative",
            ));
        }
        Ok(())
    }

    /// Multiplier applied to `delta` after each pass.
    #[inline]
    pub fn decay(&self) -> f32 {
        2.0_f32.powf(-self.persistence)
    }
}

/// A random dividing plane, vertical through `point` with horizontal `normal`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FaultPlane {
    /// Point on the plane (z = 0)
    pub point: Vec3,
    /// Unit normal with zero Z component
    pub normal: Vec3,
}

impl FaultPlane {
    /// Sample a fault plane uniformly over the rectangle of `spec`.
    pub fn random<R: Rng + ?Sized>(spec: &GridSpec, rng: &mut R) -> Self {
        let x = rng.random_range(spec.min_x..spec.max_x);
        let y = rng.random_range(spec.min_y..spec.max_y);
        let angle = rng.random_range(0.0..std::f32::consts::TAU);
        Self {
            point: Vec3::new(x, y, 0.0),
            normal: Vec3::new(angle.cos(), angle.sin(), 0.0),
        }
    }

    /// Signed side of `b`: positive in front of the plane.
    #[inline]
    pub fn side(&self, b: &Vec3) -> f32 {
        (b - self.point).dot(&self.normal)
    }
}

/// Falloff coefficient `(1 - (r/R)²)²`.
#[inline]
pub fn falloff(r: f32, radius: f32) -> f32 {
    let q = r / radius;
    let s = 1.0 - q * q;
    s * s
}

/// Apply one fault displacement of magnitude `delta` to every vertex.
///
/// Vertices are independent within a pass and are updated in parallel.
pub fn apply_fault(grid: &mut GridMesh, plane: &FaultPlane, delta: f32) {
    let radius = grid.spec.diagonal();
    grid.positions.par_iter_mut().for_each(|b| {
        let r = (*b - plane.point).norm();
        let step = delta * falloff(r, radius);
        if plane.side(b) > 0.0 {
            b.z += step;
        } else {
            b.z -= step;
        }
    });
}

/// Shape the grid with `params.iterations` random fault passes.
///
/// Passes run strictly in order. Given the same RNG state the result is
/// reproducible.
///
/// # Errors
///
/// Returns [`SimError::InvalidParameter`] if `params` fail validation.
pub fn shape_terrain<R: Rng + ?Sized>(
    grid: &mut GridMesh,
    params: &FaultParams,
    rng: &mut R,
) -> Result<()> {
    params.validate()?;

    let decay = params.decay();
    let mut delta = params.initial_delta;
    for pass in 0..params.iterations {
        let plane = FaultPlane::random(&grid.spec, rng);
        apply_fault(grid, &plane, delta);
        debug!(pass, delta, "applied fault plane");
        delta *= decay;
    }
    Ok(())
}

/// Configuration of a complete terrain build.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TerrainConfig {
    /// Lattice and extent
    pub grid: GridSpec,
    /// Fault shaping
    pub fault: FaultParams,
}

impl TerrainConfig {
    /// Validate both the grid and the fault parameters.
    ///
    /// # Errors
    ///
    /// Propagates the first failing check.
    pub fn validate(&self) -> Result<()> {
        self.grid.validate()?;
        self.fault.validate()
    }
}

/// Finished terrain ready to hand to a renderer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Terrain {
    mesh: GridMesh,
    edges: Vec<[u32; 2]>,
    min_height: f32,
    max_height: f32,
}

impl Terrain {
    /// Generate, shape and light a terrain in one go.
    ///
    /// # Errors
    ///
    /// Returns an error if `config` fails validation.
    pub fn build<R: Rng + ?Sized>(config: &TerrainConfig, rng: &mut R) -> Result<Self> {
        config.validate()?;

        let mut mesh = GridMesh::generate(config.grid)?;
        info!(
            vertices = mesh.num_vertices(),
            triangles = mesh.num_triangles(),
            "Terrain: generated triangles"
        );

        let edges = mesh.generate_edges();
        info!(edges = edges.len(), "Terrain: generated lines");

        shape_terrain(&mut mesh, &config.fault, rng)?;
        let (min_height, max_height) = mesh.height_range();
        info!(
            iterations = config.fault.iterations,
            min_height, max_height, "Terrain: sculpted terrain"
        );

        calculate_normals(&mut mesh);
        info!("Terrain: generated normals");

        Ok(Self {
            mesh,
            edges,
            min_height,
            max_height,
        })
    }

    /// Underlying mesh.
    pub fn mesh(&self) -> &GridMesh {
        &self.mesh
    }

    /// Wireframe edges.
    pub fn edges(&self) -> &[[u32; 2]] {
        &self.edges
    }

    /// Lowest vertex height.
    pub fn min_height(&self) -> f32 {
        self.min_height
    }

    /// Highest vertex height.
    pub fn max_height(&self) -> f32 {
        self.max_height
    }
}
