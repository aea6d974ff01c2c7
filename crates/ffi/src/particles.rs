use std::ptr;
use std::sync::RwLock;

use terra_sim_core::{Particle, ParticleParams, ParticleSystem};

use crate::error::{DefaultTerraSimError, TerraSimErrorCode};
use crate::helpers::{
    copy_to_buffer, handle_ffi_result_error, instance_from_ptr, read_lock, track_error,
    track_result, write_lock, write_optional,
};

/// Particle simulation parameters in a C-compatible layout.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParticleSimParams {
    /// Half side length `m` of the cube `[-m, m]³`
    pub half_width: f32,
    /// Per-second velocity retention factor
    pub drag: f32,
    /// Downward acceleration along -Y
    pub gravity: f32,
    /// Speed fraction kept after a bounce
    pub restitution: f32,
    /// Floor bounces slower than this settle the particle
    pub settle_speed: f32,
    /// Launch speed of spawned particles
    pub initial_speed: f32,
    pub min_radius: f32,
    pub max_radius: f32,
}

impl From<ParticleSimParams> for ParticleParams {
    fn from(p: ParticleSimParams) -> Self {
        Self {
            half_width: p.half_width,
            drag: p.drag,
            gravity: p.gravity,
            restitution: p.restitution,
            settle_speed: p.settle_speed,
            initial_speed: p.initial_speed,
            min_radius: p.min_radius,
            max_radius: p.max_radius,
        }
    }
}

impl From<ParticleParams> for ParticleSimParams {
    fn from(p: ParticleParams) -> Self {
        Self {
            half_width: p.half_width,
            drag: p.drag,
            gravity: p.gravity,
            restitution: p.restitution,
            settle_speed: p.settle_speed,
            initial_speed: p.initial_speed,
            min_radius: p.min_radius,
            max_radius: p.max_radius,
        }
    }
}

/// Default particle parameters: cube half-width 3, drag 0.6, gravity 10.
#[no_mangle]
pub extern "C" fn terra_sim_particles_default_params() -> ParticleSimParams {
    ParticleParams::default().into()
}

/// Render snapshot of one particle. Keep this layout stable for C consumers.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ParticleVisual {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub radius: f32,
    pub r: f32,
    pub g: f32,
    pub b: f32,
    /// Whether the particle has come to rest on the floor
    pub settled: bool,
}

impl From<&Particle> for ParticleVisual {
    fn from(p: &Particle) -> Self {
        let position = p.position();
        let color = p.color();
        Self {
            x: position.x,
            y: position.y,
            z: position.z,
            radius: p.radius(),
            r: color.x,
            g: color.y,
            b: color.z,
            settled: p.is_settled(),
        }
    }
}

/// A particle system owned by the library.
pub struct TerraSimParticles {
    system: RwLock<ParticleSystem>,
}

/// Create an empty particle system.
///
/// Returns
/// - `Ok` on success
/// - `NullPointer` if `out_instance` is null
/// - `InvalidParameter` if `params` fail validation
///
/// # Safety
///
/// - `out_instance` must be a valid, non-null pointer to writable memory.
/// - The caller owns the instance and must call `terra_sim_particles_destroy` exactly once.
#[no_mangle]
pub unsafe extern "C" fn terra_sim_particles_new(
    params: ParticleSimParams,
    seed: u64,
    out_instance: *mut *mut TerraSimParticles,
) -> TerraSimErrorCode {
    if out_instance.is_null() {
        return track_error(&DefaultTerraSimError::null_pointer("out_instance"));
    }

    let created = ParticleSystem::new(params.into(), seed)
        .map(|system| {
            Box::new(TerraSimParticles {
                system: RwLock::new(system),
            })
        })
        .map_err(DefaultTerraSimError::from);

    match track_result(created) {
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

/// Destroy a particle system. Null is a no-op.
///
/// # Safety
///
/// `ptr` must come from `terra_sim_particles_new` and must not be used afterwards.
#[no_mangle]
pub unsafe extern "C" fn terra_sim_particles_destroy(ptr: *mut TerraSimParticles) {
    if ptr.is_null() {
        return;
    }
    // SAFETY: created by `Box::into_raw` in `terra_sim_particles_new`.
    unsafe {
        drop(Box::from_raw(ptr));
    }
}

/// Spawn `count` particles at random positions inside the cube with random
/// directions, radii and colours.
///
/// Returns `InvalidParameter` if `count` particles cannot be allocated; no
/// particles are added in that case.
#[no_mangle]
pub extern "C" fn terra_sim_particles_spawn(
    ptr: *const TerraSimParticles,
    count: usize,
) -> TerraSimErrorCode {
    handle_ffi_result_error(|| {
        let instance = instance_from_ptr(ptr)?;
        write_lock(&instance.system, "particles")?.spawn(count)?;
        Ok(())
    })
}

/// Remove every particle and reset the counters.
#[no_mangle]
pub extern "C" fn terra_sim_particles_reset(ptr: *const TerraSimParticles) -> TerraSimErrorCode {
    handle_ffi_result_error(|| {
        let instance = instance_from_ptr(ptr)?;
        write_lock(&instance.system, "particles")?.reset();
        Ok(())
    })
}

/// Advance every particle by `dt` seconds.
///
/// `out_collisions` (optional) receives the number of wall contacts
/// resolved in this step.
///
/// Returns `InvalidParameter` if `dt` is not finite and positive.
///
/// # Safety
///
/// `out_collisions` must be null or valid for a write of `usize`.
#[no_mangle]
pub unsafe extern "C" fn terra_sim_particles_step(
    ptr: *const TerraSimParticles,
    dt: f32,
    out_collisions: *mut usize,
) -> TerraSimErrorCode {
    if !dt.is_finite() || dt <= 0.0 {
        return track_error(&DefaultTerraSimError::invalid_parameter(format!(
            "dt must be finite and positive, got {dt}"
        )));
    }

    handle_ffi_result_error(|| {
        let instance = instance_from_ptr(ptr)?;
        let collisions = write_lock(&instance.system, "particles")?.step(dt);
        unsafe {
            write_optional(out_collisions, collisions);
        }
        Ok(())
    })
}

/// Report the number of particles and how many of them have settled.
///
/// # Safety
///
/// Non-null out-pointers must be valid for a write of `usize`.
#[no_mangle]
pub unsafe extern "C" fn terra_sim_particles_count(
    ptr: *const TerraSimParticles,
    out_count: *mut usize,
    out_settled: *mut usize,
) -> TerraSimErrorCode {
    handle_ffi_result_error(|| {
        let instance = instance_from_ptr(ptr)?;
        let system = read_lock(&instance.system, "particles")?;
        unsafe {
            write_optional(out_count, system.len());
            write_optional(out_settled, system.settled_count());
        }
        Ok(())
    })
}

/// Copy one `ParticleVisual` per particle into `out` (`capacity` records).
///
/// # Safety
///
/// `out` must point to at least `capacity` writable records.
#[no_mangle]
pub unsafe extern "C" fn terra_sim_particles_copy_visuals(
    ptr: *const TerraSimParticles,
    out: *mut ParticleVisual,
    capacity: usize,
) -> TerraSimErrorCode {
    handle_ffi_result_error(|| {
        let instance = instance_from_ptr(ptr)?;
        let system = read_lock(&instance.system, "particles")?;
        let visuals: Vec<ParticleVisual> =
            system.particles().iter().map(ParticleVisual::from).collect();
        unsafe { copy_to_buffer(&visuals, out, capacity, "out_visuals") }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create(seed: u64) -> *mut TerraSimParticles {
        let mut ptr = ptr::null_mut();
        let code =
            unsafe { terra_sim_particles_new(terra_sim_particles_default_params(), seed, &mut ptr) };
        assert_eq!(code, TerraSimErrorCode::Ok);
        ptr
    }

    fn counts(ptr: *const TerraSimParticles) -> (usize, usize) {
        let (mut n, mut settled) = (0, 0);
        let code = unsafe { terra_sim_particles_count(ptr, &mut n, &mut settled) };
        assert_eq!(code, TerraSimErrorCode::Ok);
        (n, settled)
    }

    #[test]
    fn test_spawn_step_reset() {
        let ptr = create(11);
        assert_eq!(terra_sim_particles_spawn(ptr, 10), TerraSimErrorCode::Ok);
        assert_eq!(counts(ptr).0, 10);

        for _ in 0..100 {
            let code = unsafe { terra_sim_particles_step(ptr, 0.016, ptr::null_mut()) };
            assert_eq!(code, TerraSimErrorCode::Ok);
        }

        let mut visuals = [ParticleVisual::default(); 10];
        let code =
            unsafe { terra_sim_particles_copy_visuals(ptr, visuals.as_mut_ptr(), visuals.len()) };
        assert_eq!(code, TerraSimErrorCode::Ok);
        for v in &visuals {
            assert!((0.1..0.4).contains(&v.radius));
            assert!(v.x.abs() < 3.5 && v.y.abs() < 3.5 && v.z.abs() < 3.5);
        }

        assert_eq!(terra_sim_particles_reset(ptr), TerraSimErrorCode::Ok);
        assert_eq!(counts(ptr), (0, 0));
        unsafe { terra_sim_particles_destroy(ptr) };
    }

    #[test]
    fn test_invalid_dt_rejected() {
        let ptr = create(1);
        let mut collisions = 7;
        let code = unsafe { terra_sim_particles_step(ptr, f32::NAN, &mut collisions) };
        assert_eq!(code, TerraSimErrorCode::InvalidParameter);
        assert_eq!(collisions, 7);
        unsafe { terra_sim_particles_destroy(ptr) };
    }

    #[test]
    fn test_invalid_params_rejected() {
        let params = ParticleSimParams {
            restitution: 2.0,
            ..terra_sim_particles_default_params()
        };
        let mut ptr = ptr::null_mut();
        let code = unsafe { terra_sim_particles_new(params, 0, &mut ptr) };
        assert_eq!(code, TerraSimErrorCode::InvalidParameter);
        assert!(ptr.is_null());
    }

    #[test]
    fn test_huge_spawn_rejected() {
        let ptr = create(4);
        assert_eq!(terra_sim_particles_spawn(ptr, 2), TerraSimErrorCode::Ok);
        assert_eq!(
            terra_sim_particles_spawn(ptr, usize::MAX),
            TerraSimErrorCode::InvalidParameter
        );
        assert_eq!(counts(ptr), (2, 0));
        unsafe { terra_sim_particles_destroy(ptr) };
    }

    #[test]
    fn test_visual_buffer_too_small() {
        let ptr = create(2);
        assert_eq!(terra_sim_particles_spawn(ptr, 3), TerraSimErrorCode::Ok);
        let mut visuals = [ParticleVisual::default(); 2];
        let code =
            unsafe { terra_sim_particles_copy_visuals(ptr, visuals.as_mut_ptr(), visuals.len()) };
        assert_eq!(code, TerraSimErrorCode::BufferTooSmall);
        unsafe { terra_sim_particles_destroy(ptr) };
    }
}
