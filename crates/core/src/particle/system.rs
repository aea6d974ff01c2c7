//! A swarm of independent particles sharing one set of constants.

use crate::core_types::{Result, SimError};
use crate::particle::{Particle, ParticleParams};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// Aggregate counters for reporting.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ParticleSystemStats {
    /// Number of particles
    pub count: usize,
    /// Particles resting on the floor
    pub settled: usize,
    /// Mean speed of the free particles (0 if none)
    pub mean_free_speed: f32,
    /// Wall contacts resolved since the last reset
    pub total_collisions: u64,
    /// Simulated time since the last reset (seconds)
    pub simulation_time: f32,
}

/// Particle swarm with its own seeded random source.
///
/// Particles never interact, so a step updates them in parallel.
#[derive(Debug, Clone)]
pub struct ParticleSystem {
    params: ParticleParams,
    particles: Vec<Particle>,
    rng: ChaCha8Rng,
    total_collisions: u64,
    simulation_time: f32,
}

impl ParticleSystem {
    /// Create an empty system.
    ///
    /// # Errors
    ///
    /// Returns an error if `params` fail validation.
    pub fn new(params: ParticleParams, seed: u64) -> Result<Self> {
        params.validate()?;
        Ok(Self {
            params,
            particles: Vec::new(),
            rng: ChaCha8Rng::seed_from_u64(seed),
            total_collisions: 0,
            simulation_time: 0.0,
        })
    }

    /// Simulation constants.
    pub fn params(&self) -> &ParticleParams {
        &self.params
    }

    /// Add `count` randomly initialised particles.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::CapacityExceeded`] if room for `count` more
    /// particles cannot be allocated; the system is left unchanged.
    pub fn spawn(&mut self, count: usize) -> Result<()> {
        self.particles.try_reserve(count).map_err(|_| {
            warn!(count, "cannot allocate particles");
            SimError::CapacityExceeded {
                what: "particles",
                requested: count,
            }
        })?;
        for _ in 0..count {
            let particle = Particle::random(&self.params, &mut self.rng);
            self.particles.push(particle);
        }
        info!(count, total = self.particles.len(), "spawned particles");
        Ok(())
    }

    /// Add a specific particle.
    pub fn push(&mut self, particle: Particle) {
        self.particles.push(particle);
    }

    /// Remove every particle and clear the counters.
    pub fn reset(&mut self) {
        self.particles.clear();
        self.total_collisions = 0;
        self.simulation_time = 0.0;
        info!("particle system reset");
    }

    /// Advance every particle by `dt` seconds.
    ///
    /// Returns the number of wall contacts resolved in this step. A
    /// non-finite or non-positive `dt` is ignored.
    pub fn step(&mut self, dt: f32) -> usize {
        if !dt.is_finite() || dt <= 0.0 {
            warn!(dt, "ignoring particle step with invalid dt");
            return 0;
        }

        let params = self.params;
        let collisions = self
            .particles
            .par_iter_mut()
            .filter_map(|p| p.step(dt, &params))
            .count();

        self.total_collisions += collisions as u64;
        self.simulation_time += dt;
        debug!(dt, collisions, "particle step");
        collisions
    }

    /// All particles.
    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    /// Number of particles.
    pub fn len(&self) -> usize {
        self.particles.len()
    }

    /// Whether there are no particles.
    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    /// Number of settled particles.
    pub fn settled_count(&self) -> usize {
        self.particles.iter().filter(|p| p.is_settled()).count()
    }

    /// Snapshot of the aggregate counters.
    pub fn stats(&self) -> ParticleSystemStats {
        let (free, speed_sum) = self
            .particles
            .iter()
            .filter(|p| !p.is_settled())
            .fold((0usize, 0.0f32), |(n, s), p| (n + 1, s + p.velocity().norm()));

        ParticleSystemStats {
            count: self.particles.len(),
            settled: self.particles.len() - free,
            mean_free_speed: if free == 0 { 0.0 } else { speed_sum / free as f32 },
            total_collisions: self.total_collisions,
            simulation_time: self.simulation_time,
        }
    }
}
