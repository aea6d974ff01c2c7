//! Process-wide particle simulation constants.

use crate::core_types::{Result, SimError};
use serde::{Deserialize, Serialize};

/// Simulation constants shared by every particle.
///
/// Defaults reproduce the classic demo setup: a cube of half-width 3,
/// drag 0.6 per second, gravity 10, 90% speed kept on each bounce and
/// settling on the floor at or below speed 1.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParticleParams {
    /// Cube half-width `m`; walls sit at `±m` on every axis
    pub half_width: f32,
    /// Fraction of velocity kept after one second (`v *= drag^dt`)
    pub drag: f32,
    /// Downward (-Y) acceleration
    pub gravity: f32,
    /// Speed multiplier applied on every bounce
    pub restitution: f32,
    /// Floor bounces at or below this speed settle the particle
    pub settle_speed: f32,
    /// Speed of freshly spawned particles
    pub initial_speed: f32,
    /// Smallest spawned radius (inclusive)
    pub min_radius: f32,
    /// Largest spawned radius (exclusive)
    pub max_radius: f32,
}

impl Default for ParticleParams {
    fn default() -> Self {
        Self {
            half_width: 3.0,
            drag: 0.6,
            gravity: 10.0,
            restitution: 0.9,
            settle_speed: 1.0,
            initial_speed: 10.0,
            min_radius: 0.1,
            max_radius: 0.4,
        }
    }
}

impl ParticleParams {
    /// Check every constant is finite and in range.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::InvalidParameter`] naming the first bad field.
    pub fn validate(&self) -> Result<()> {
        let check = |name: &'static str, value: f32, ok: bool, constraint: &'static str| {
            if ok && value.is_finite() {
                Ok(())
            } else {
                Err(SimError::invalid_parameter(name, value, constraint))
            }
        };

        // Spawning samples across the full width, which must stay finite
        check(
            "half_width",
            self.half_width,
            self.half_width > 0.0 && (2.0 * self.half_width).is_finite(),
            "must be positive with a finite full width",
        )?;
        check("drag", self.drag, self.drag > 0.0 && self.drag <= 1.0, "must be in (0, 1]")?;
        check("gravity", self.gravity, true, "must be finite")?;
        check(
            "restitution",
            self.restitution,
            (0.0..=1.0).contains(&self.restitution),
            "must be in [0, 1]",
        )?;
        check(
            "settle_speed",
            self.settle_speed,
            self.settle_speed >= 0.0,
            "must be non-negative",
        )?;
        check(
            "initial_speed",
            self.initial_speed,
            self.initial_speed >= 0.0,
            "must be non-negative",
        )?;
        check(
            "min_radius",
            self.min_radius,
            self.min_radius >= 0.0,
            "must be non-negative",
        )?;
        check(
            "max_radius",
            self.max_radius,
            self.max_radius > self.min_radius && self.max_radius < self.half_width,
            "must exceed min_radius and stay below half_width",
        )
    }
}
