//! A single spherical particle and its per-step kinematics.
//!
//! Each step integrates velocity first, then position with the updated
//! velocity:
//!
//! ```text
//! v ← v · drag^dt − (0, g · dt, 0)
//! p ← p + v · dt
//! ```
//!
//! then resolves the earliest wall contact by reflecting `v` about the
//! wall normal and scaling it by the restitution factor.

use crate::core_types::Vec3;
use crate::particle::{detect_collision, CollisionHit, ParticleParams};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Lifecycle of a particle. `Settled` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ParticleState {
    /// Moving under gravity and drag
    #[default]
    Free,
    /// Came to rest on the floor; never moves again
    Settled,
}

/// Spherical particle inside the container cube.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Particle {
    pub(crate) position: Vec3,
    pub(crate) velocity: Vec3,
    pub(crate) radius: f32,
    pub(crate) color: Vec3,
    pub(crate) state: ParticleState,
}

impl Particle {
    /// Create a free white particle.
    pub fn new(position: Vec3, velocity: Vec3, radius: f32) -> Self {
        Self {
            position,
            velocity,
            radius,
            color: Vec3::repeat(1.0),
            state: ParticleState::Free,
        }
    }

    /// Create a particle with random radius, speed direction, position and color.
    ///
    /// The radius is drawn from `[min_radius, max_radius)`, the velocity is a
    /// uniformly random direction scaled to `initial_speed`, and each
    /// coordinate is placed so the sphere starts fully inside the cube.
    pub fn random<R: Rng + ?Sized>(params: &ParticleParams, rng: &mut R) -> Self {
        let radius = rng.random_range(params.min_radius..params.max_radius);

        // Uniform direction on the unit sphere
        let z: f32 = rng.random_range(-1.0..=1.0);
        let phi = rng.random_range(0.0..std::f32::consts::TAU);
        let ring = (1.0 - z * z).sqrt();
        let velocity = Vec3::new(ring * phi.cos(), ring * phi.sin(), z) * params.initial_speed;

        let extent = params.half_width - radius;
        let position = Vec3::new(
            rng.random_range(-extent..=extent),
            rng.random_range(-extent..=extent),
            rng.random_range(-extent..=extent),
        );

        let color = Vec3::new(rng.random(), rng.random(), rng.random());

        Self {
            position,
            velocity,
            radius,
            color,
            state: ParticleState::Free,
        }
    }

    /// Builder-style color override.
    pub fn with_color(mut self, color: Vec3) -> Self {
        self.color = color;
        self
    }

    /// Advance the particle by `dt` seconds.
    ///
    /// Settled particles are left untouched. Returns the wall contact
    /// resolved during this step, if any.
    pub fn step(&mut self, dt: f32, params: &ParticleParams) -> Option<CollisionHit> {
        if self.is_settled() {
            return None;
        }

        self.velocity *= params.drag.powf(dt);
        self.velocity.y -= params.gravity * dt;

        let old_position = self.position;
        self.position += self.velocity * dt;

        let hit = detect_collision(
            &old_position,
            &self.position,
            self.radius,
            &self.velocity,
            params.half_width,
        )?;
        self.resolve(hit, params);
        Some(hit)
    }

    /// Bounce off the wall in `hit`, settling on a slow floor contact.
    fn resolve(&mut self, hit: CollisionHit, params: &ParticleParams) {
        let n = hit.wall.normal();
        let reflected = self.velocity - n * (2.0 * self.velocity.dot(&n));
        self.velocity = reflected * params.restitution;

        // Rest on the contact plane so the next step starts inside the cube
        self.position[hit.wall.axis()] = hit.wall.contact(params.half_width, self.radius);

        if hit.wall.is_floor() && self.velocity.norm() <= params.settle_speed {
            self.velocity = Vec3::zeros();
            self.state = ParticleState::Settled;
        }
    }

    /// Current centre position.
    pub fn position(&self) -> Vec3 {
        self.position
    }

    /// Current velocity.
    pub fn velocity(&self) -> Vec3 {
        self.velocity
    }

    /// Sphere radius.
    pub fn radius(&self) -> f32 {
        self.radius
    }

    /// RGB color in `[0, 1]`.
    pub fn color(&self) -> Vec3 {
        self.color
    }

    /// Lifecycle state.
    pub fn state(&self) -> ParticleState {
        self.state
    }

    /// Whether the particle has come to rest.
    #[inline]
    pub fn is_settled(&self) -> bool {
        self.state == ParticleState::Settled
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::particle::Wall;
    use approx::assert_relative_eq;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_velocity_then_position_update() {
        let params = ParticleParams::default();
        let mut p = Particle::new(Vec3::zeros(), Vec3::new(1.0, 0.0, 0.0), 0.1);
        let hit = p.step(0.1, &params);
        assert_eq!(hit, None);

        let vx = 0.6_f32.powf(0.1);
        let vy = -10.0 * 0.1;
        assert_relative_eq!(p.velocity(), Vec3::new(vx, vy, 0.0), epsilon = 1e-6);
        assert_relative_eq!(p.position(), Vec3::new(vx * 0.1, vy * 0.1, 0.0), epsilon = 1e-6);
    }

    #[test]
    fn test_bounce_reflects_and_loses_energy() {
        let params = ParticleParams {
            gravity: 0.0,
            drag: 1.0,
            ..ParticleParams::default()
        };
        let mut p = Particle::new(Vec3::new(2.5, 0.0, 0.0), Vec3::new(5.0, 1.0, 0.0), 0.2);
        let hit = p.step(0.1, &params).unwrap();
        assert_eq!(hit.wall, Wall::PosX);
        assert_relative_eq!(p.velocity(), Vec3::new(-4.5, 0.9, 0.0), epsilon = 1e-5);
        assert_relative_eq!(p.position().x, 2.8, epsilon = 1e-6);
        assert_eq!(p.state(), ParticleState::Free);
    }

    #[test]
    fn test_slow_floor_hit_settles_forever() {
        let params = ParticleParams::default();
        let mut p = Particle::new(Vec3::new(0.0, -2.88, 0.0), Vec3::new(0.0, -0.5, 0.0), 0.1);
        let hit = p.step(0.05, &params).unwrap();
        assert_eq!(hit.wall, Wall::NegY);
        assert!(p.is_settled());
        assert_eq!(p.velocity(), Vec3::zeros());

        let frozen = p.clone();
        for dt in [0.01, 0.5, 3.0, 100.0] {
            assert_eq!(p.step(dt, &params), None);
            assert_eq!(p, frozen);
        }
    }

    #[test]
    fn test_fast_floor_hit_bounces() {
        let params = ParticleParams::default();
        let mut p = Particle::new(Vec3::new(0.0, -2.5, 0.0), Vec3::new(0.0, -20.0, 0.0), 0.1);
        let hit = p.step(0.05, &params).unwrap();
        assert_eq!(hit.wall, Wall::NegY);
        assert!(!p.is_settled());
        assert!(p.velocity().y > 0.0);
    }

    #[test]
    fn test_settle_threshold_is_inclusive() {
        // Lossless bounce with no drag or gravity keeps the speed exact
        let params = ParticleParams {
            drag: 1.0,
            gravity: 0.0,
            restitution: 1.0,
            ..ParticleParams::default()
        };

        let mut at_limit = Particle::new(Vec3::new(0.0, -2.85, 0.0), Vec3::new(0.0, -1.0, 0.0), 0.1);
        let hit = at_limit.step(0.1, &params).unwrap();
        assert_eq!(hit.wall, Wall::NegY);
        assert!(at_limit.is_settled());

        let mut above = Particle::new(Vec3::new(0.0, -2.85, 0.0), Vec3::new(0.0, -1.01, 0.0), 0.1);
        let hit = above.step(0.1, &params).unwrap();
        assert_eq!(hit.wall, Wall::NegY);
        assert!(!above.is_settled());
        assert_relative_eq!(above.velocity().y, 1.01, epsilon = 1e-6);
    }

    #[test]
    fn test_non_floor_wall_never_settles() {
        // Drifting into the ceiling slowly with gravity switched off
        let params = ParticleParams {
            gravity: 0.0,
            restitution: 0.0,
            ..ParticleParams::default()
        };
        let mut p = Particle::new(Vec3::new(0.0, 2.85, 0.0), Vec3::new(0.0, 0.5, 0.0), 0.1);
        let hit = p.step(0.5, &params).unwrap();
        assert_eq!(hit.wall, Wall::PosY);
        assert_eq!(p.velocity().norm(), 0.0);
        assert_eq!(p.state(), ParticleState::Free);
    }

    #[test]
    fn test_resting_point_never_collides_without_force() {
        let params = ParticleParams {
            gravity: 0.0,
            ..ParticleParams::default()
        };
        let mut p = Particle::new(Vec3::zeros(), Vec3::zeros(), 0.0);
        for _ in 0..1000 {
            assert_eq!(p.step(0.1, &params), None);
        }
        assert_eq!(p.position(), Vec3::zeros());
    }

    #[test]
    fn test_random_particle_starts_inside() {
        let params = ParticleParams::default();
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        for _ in 0..500 {
            let p = Particle::random(&params, &mut rng);
            assert!(p.radius() >= params.min_radius && p.radius() < params.max_radius);
            assert_relative_eq!(p.velocity().norm(), params.initial_speed, epsilon = 1e-3);
            for axis in 0..3 {
                assert!(p.position()[axis].abs() + p.radius() <= params.half_width + 1e-6);
                assert!((0.0..=1.0).contains(&p.color()[axis]));
            }
        }
    }
}
