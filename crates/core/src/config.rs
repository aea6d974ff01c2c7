//! Top-level configuration tying the terrain and particle settings together.
//!
//! Every field has a default, so a partial TOML/JSON document only needs to
//! list what it overrides.

use crate::core_types::Result;
use crate::grid::TerrainConfig;
use crate::particle::ParticleParams;
use serde::{Deserialize, Serialize};

/// Complete simulation setup.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Seed for every random draw (fault planes and particle spawns)
    pub seed: u64,
    /// Terrain grid and fault shaping
    pub terrain: TerrainConfig,
    /// Particle constants
    pub particles: ParticleParams,
    /// Particles spawned at start-up
    pub particle_count: usize,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            terrain: TerrainConfig::default(),
            particles: ParticleParams::default(),
            particle_count: 10,
        }
    }
}

impl SimConfig {
    /// Validate the terrain and particle sections.
    ///
    /// # Errors
    ///
    /// Returns the first validation error found.
    pub fn validate(&self) -> Result<()> {
        self.terrain.validate()?;
        self.particles.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(SimConfig::default().validate().is_ok());
    }

    #[test]
    fn test_invalid_section_is_reported() {
        let mut config = SimConfig::default();
        config.terrain.grid.max_x = config.terrain.grid.min_x;
        assert!(config.validate().is_err());

        let mut config = SimConfig::default();
        config.particles.restitution = 2.0;
        assert!(config.validate().is_err());
    }
}
