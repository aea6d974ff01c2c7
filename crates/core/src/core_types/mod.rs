//! Core types and utilities

pub mod error;
pub mod vec3;

pub use error::{Result, SimError};
pub use vec3::{normalize_or_zero, Vec3};
