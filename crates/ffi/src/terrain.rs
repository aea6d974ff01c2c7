use std::ptr;
use std::sync::RwLock;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use terra_sim_core::{FaultParams, GridSpec, Terrain, TerrainConfig};
use tracing::info;

use crate::error::{DefaultTerraSimError, TerraSimErrorCode};
use crate::helpers::{
    copy_to_buffer, handle_ffi_result_error, instance_from_ptr, read_lock, track_error,
    track_result, write_lock, write_optional,
};

/// Terrain generation parameters in a C-compatible layout.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TerrainParams {
    /// Cells per side; 0 is treated as 1
    pub divisions: u32,
    pub min_x: f32,
    pub max_x: f32,
    pub min_y: f32,
    pub max_y: f32,
    /// Number of fault passes
    pub iterations: u32,
    /// Displacement of the first fault pass
    pub initial_delta: f32,
    /// Decay exponent `H`; delta is divided by `2^H` per pass
    pub persistence: f32,
}

impl From<TerrainParams> for TerrainConfig {
    fn from(p: TerrainParams) -> Self {
        Self {
            grid: GridSpec::new(p.divisions as usize, p.min_x, p.max_x, p.min_y, p.max_y),
            fault: FaultParams {
                iterations: p.iterations,
                initial_delta: p.initial_delta,
                persistence: p.persistence,
            },
        }
    }
}

impl From<TerrainConfig> for TerrainParams {
    fn from(c: TerrainConfig) -> Self {
        Self {
            divisions: u32::try_from(c.grid.divisions).unwrap_or(u32::MAX),
            min_x: c.grid.min_x,
            max_x: c.grid.max_x,
            min_y: c.grid.min_y,
            max_y: c.grid.max_y,
            iterations: c.fault.iterations,
            initial_delta: c.fault.initial_delta,
            persistence: c.fault.persistence,
        }
    }
}

/// Default terrain parameters: 64 divisions over `[-1, 1]²`, 100 fault passes.
#[no_mangle]
pub extern "C" fn terra_sim_terrain_default_params() -> TerrainParams {
    TerrainConfig::default().into()
}

/// A generated terrain owned by the library.
///
/// The mesh sits behind an `RwLock` so buffer copies from several threads
/// can run together while `terra_sim_terrain_regenerate` takes exclusive access.
pub struct TerraSimTerrain {
    config: TerrainConfig,
    terrain: RwLock<Terrain>,
}

impl TerraSimTerrain {
    fn new(params: TerrainParams, seed: u64) -> Result<Box<Self>, DefaultTerraSimError> {
        let config = TerrainConfig::from(params);
        let terrain = Terrain::build(&config, &mut ChaCha8Rng::seed_from_u64(seed))?;
        info!(seed, "ffi: created terrain instance");
        Ok(Box::new(Self {
            config,
            terrain: RwLock::new(terrain),
        }))
    }
}

/// Generate a new terrain.
///
/// - `params`: grid and fault parameters, see `terra_sim_terrain_default_params`
/// - `seed`: RNG seed; the same seed and params always give the same mesh
/// - `out_instance`: receives the instance on success, null on failure
///
/// Returns
/// - `Ok` on success
/// - `NullPointer` if `out_instance` is null
/// - `InvalidTerrainParameters` if the rectangle is empty or not finite
/// - `InvalidParameter` if the fault parameters are invalid
///
/// # Safety
///
/// - `out_instance` must be a valid, non-null pointer to writable memory.
/// - The caller owns the instance and must call `terra_sim_terrain_destroy` exactly once.
#[no_mangle]
pub unsafe extern "C" fn terra_sim_terrain_new(
    params: TerrainParams,
    seed: u64,
    out_instance: *mut *mut TerraSimTerrain,
) -> TerraSimErrorCode {
    if out_instance.is_null() {
        return track_error(&DefaultTerraSimError::null_pointer("out_instance"));
    }

    match track_result(TerraSimTerrain::new(params, seed)) {
        Ok(instance) => {
            unsafe {
                *out_instance = Box::into_raw(instance);
            }
            TerraSimErrorCode::Ok
        }
        Err(code) => {
            unsafe {
                *out_instance = ptr::null_mut();
            }
            code
        }
    }
}

/// Destroy a terrain created by `terra_sim_terrain_new`. Null is a no-op.
///
/// # Safety
///
/// `ptr` must come from `terra_sim_terrain_new` and must not be used afterwards.
#[no_mangle]
pub unsafe extern "C" fn terra_sim_terrain_destroy(ptr: *mut TerraSimTerrain) {
    if ptr.is_null() {
        return;
    }
    // SAFETY: created by `Box::into_raw` in `terra_sim_terrain_new`.
    unsafe {
        drop(Box::from_raw(ptr));
    }
}

/// Rebuild the terrain in place with its creation parameters and a new seed.
///
/// Buffer sizes stay the same, so callers can reuse their vertex buffers.
#[no_mangle]
pub extern "C" fn terra_sim_terrain_regenerate(
    ptr: *const TerraSimTerrain,
    seed: u64,
) -> TerraSimErrorCode {
    handle_ffi_result_error(|| {
        let instance = instance_from_ptr(ptr)?;
        let terrain = Terrain::build(&instance.config, &mut ChaCha8Rng::seed_from_u64(seed))?;
        *write_lock(&instance.terrain, "terrain")? = terrain;
        Ok(())
    })
}

/// Report element counts so the caller can size its buffers.
///
/// Any of the out-pointers may be null. Positions and normals take
/// `3 * vertices` floats, indices `3 * triangles` and edges `2 * edges` integers.
///
/// # Safety
///
/// Non-null out-pointers must be valid for a write of `usize`.
#[no_mangle]
pub unsafe extern "C" fn terra_sim_terrain_counts(
    ptr: *const TerraSimTerrain,
    out_vertices: *mut usize,
    out_triangles: *mut usize,
    out_edges: *mut usize,
) -> TerraSimErrorCode {
    handle_ffi_result_error(|| {
        let instance = instance_from_ptr(ptr)?;
        let terrain = read_lock(&instance.terrain, "terrain")?;
        unsafe {
            write_optional(out_vertices, terrain.mesh().num_vertices());
            write_optional(out_triangles, terrain.mesh().num_triangles());
            write_optional(out_edges, terrain.edges().len());
        }
        Ok(())
    })
}

/// Copy vertex positions as `x, y, z` triples into `out` (`capacity` floats).
///
/// # Safety
///
/// `out` must point to at least `capacity` writable floats.
#[no_mangle]
pub unsafe extern "C" fn terra_sim_terrain_copy_positions(
    ptr: *const TerraSimTerrain,
    out: *mut f32,
    capacity: usize,
) -> TerraSimErrorCode {
    handle_ffi_result_error(|| {
        let instance = instance_from_ptr(ptr)?;
        let terrain = read_lock(&instance.terrain, "terrain")?;
        unsafe { copy_to_buffer(&terrain.mesh().position_data(), out, capacity, "out_positions") }
    })
}

/// Copy unit vertex normals as `x, y, z` triples into `out` (`capacity` floats).
///
/// # Safety
///
/// `out` must point to at least `capacity` writable floats.
#[no_mangle]
pub unsafe extern "C" fn terra_sim_terrain_copy_normals(
    ptr: *const TerraSimTerrain,
    out: *mut f32,
    capacity: usize,
) -> TerraSimErrorCode {
    handle_ffi_result_error(|| {
        let instance = instance_from_ptr(ptr)?;
        let terrain = read_lock(&instance.terrain, "terrain")?;
        unsafe { copy_to_buffer(&terrain.mesh().normal_data(), out, capacity, "out_normals") }
    })
}

/// Copy triangle vertex indices into `out` (`capacity` integers).
///
/// # Safety
///
/// `out` must point to at least `capacity` writable integers.
#[no_mangle]
pub unsafe extern "C" fn terra_sim_terrain_copy_indices(
    ptr: *const TerraSimTerrain,
    out: *mut u32,
    capacity: usize,
) -> TerraSimErrorCode {
    handle_ffi_result_error(|| {
        let instance = instance_from_ptr(ptr)?;
        let terrain = read_lock(&instance.terrain, "terrain")?;
        unsafe { copy_to_buffer(&terrain.mesh().index_data(), out, capacity, "out_indices") }
    })
}

/// Copy wireframe edges as index pairs into `out` (`capacity` integers).
///
/// # Safety
///
/// `out` must point to at least `capacity` writable integers.
#[no_mangle]
pub unsafe extern "C" fn terra_sim_terrain_copy_edges(
    ptr: *const TerraSimTerrain,
    out: *mut u32,
    capacity: usize,
) -> TerraSimErrorCode {
    handle_ffi_result_error(|| {
        let instance = instance_from_ptr(ptr)?;
        let terrain = read_lock(&instance.terrain, "terrain")?;
        let edges: Vec<u32> = terrain.edges().iter().flatten().copied().collect();
        unsafe { copy_to_buffer(&edges, out, capacity, "out_edges") }
    })
}

/// Read the lowest and highest vertex heights, used for colour ramps.
///
/// # Safety
///
/// `out_min` and `out_max` must be valid, non-null pointers.
#[no_mangle]
pub unsafe extern "C" fn terra_sim_terrain_height_range(
    ptr: *const TerraSimTerrain,
    out_min: *mut f32,
    out_max: *mut f32,
) -> TerraSimErrorCode {
    if out_min.is_null() || out_max.is_null() {
        return track_error(&DefaultTerraSimError::null_pointer("out_min/out_max"));
    }

    handle_ffi_result_error(|| {
        let instance = instance_from_ptr(ptr)?;
        let terrain = read_lock(&instance.terrain, "terrain")?;
        unsafe {
            *out_min = terrain.min_height();
            *out_max = terrain.max_height();
        }
        Ok(())
    })
}
