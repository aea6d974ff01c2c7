//! Vector type alias for 3D positions, normals and velocities.

use nalgebra::Vector3;

/// 3D vector type for positions, normals, and velocities.
///
/// This is a simple alias for `nalgebra::Vector3<f32>`, used throughout
/// the terrain mesh and the particle simulation.
pub type Vec3 = Vector3<f32>;

/// Normalize `v`, returning the zero vector when `v` has no length.
///
/// Accumulated normals of vertices that only touch degenerate triangles
/// are exactly zero; normalizing those directly would produce NaN.
#[inline]
pub fn normalize_or_zero(v: &Vec3) -> Vec3 {
    v.try_normalize(f32::EPSILON).unwrap_or_else(Vec3::zeros)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_normalize_unit_length() {
        let n = normalize_or_zero(&Vec3::new(3.0, 0.0, 4.0));
        assert_relative_eq!(n.norm(), 1.0, epsilon = 1e-6);
        assert_relative_eq!(n.x, 0.6, epsilon = 1e-6);
    }

    #[test]
    fn test_normalize_zero_vector_stays_zero() {
        let n = normalize_or_zero(&Vec3::zeros());
        assert_eq!(n, Vec3::zeros());
        assert!(n.iter().all(|c| c.is_finite()));
    }
}
