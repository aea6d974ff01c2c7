//! Particle simulation inside an axis-aligned cube
//!
//! Spherical particles fall under gravity with exponential drag, bounce off
//! the six cube walls with restitution, and come to rest permanently once
//! they hit the floor slowly enough.

pub mod body;
pub mod collision;
pub mod params;
pub mod system;
pub mod wall;

pub use body::{Particle, ParticleState};
pub use collision::{detect_collision, CollisionHit};
pub use params::ParticleParams;
pub use system::{ParticleSystem, ParticleSystemStats};
pub use wall::Wall;
