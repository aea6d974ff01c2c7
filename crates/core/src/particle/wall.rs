//! The six walls of the container cube `[-m, m]^3`.

use crate::core_types::Vec3;
use serde::{Deserialize, Serialize};

/// One face of the container, identified by axis and side.
///
/// The discriminant is `axis * 2 + side` with side `0` for the positive
/// face and `1` for the negative face.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Wall {
    /// x = +m
    PosX = 0,
    /// x = -m
    NegX = 1,
    /// y = +m (ceiling)
    PosY = 2,
    /// y = -m (floor)
    NegY = 3,
    /// z = +m
    PosZ = 4,
    /// z = -m
    NegZ = 5,
}

impl Wall {
    /// All walls in index order.
    pub const ALL: [Wall; 6] = [
        Wall::PosX,
        Wall::NegX,
        Wall::PosY,
        Wall::NegY,
        Wall::PosZ,
        Wall::NegZ,
    ];

    /// The floor is the only wall a particle can settle on.
    pub const FLOOR: Wall = Wall::NegY;

    /// Wall on the given axis (0 = X, 1 = Y, 2 = Z) and side.
    pub fn from_axis(axis: usize, positive: bool) -> Self {
        Self::ALL[axis * 2 + usize::from(!positive)]
    }

    /// Wall index `0..6`.
    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    /// Axis the wall is perpendicular to.
    #[inline]
    pub fn axis(self) -> usize {
        self.index() / 2
    }

    /// Whether this is the `+m` face of its axis.
    #[inline]
    pub fn is_positive(self) -> bool {
        self.index() % 2 == 0
    }

    /// Outward unit normal.
    pub fn normal(self) -> Vec3 {
        let mut n = Vec3::zeros();
        n[self.axis()] = if self.is_positive() { 1.0 } else { -1.0 };
        n
    }

    /// Coordinate of the particle centre when a sphere of `radius` touches
    /// this wall of a cube with half-width `half_width`.
    #[inline]
    pub fn contact(self, half_width: f32, radius: f32) -> f32 {
        if self.is_positive() {
            half_width - radius
        } else {
            -half_width + radius
        }
    }

    /// Whether this wall is the floor.
    #[inline]
    pub fn is_floor(self) -> bool {
        self == Self::FLOOR
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normals_are_outward_units() {
        for wall in Wall::ALL {
            let n = wall.normal();
            assert_eq!(n.norm(), 1.0);
            let sign = if wall.is_positive() { 1.0 } else { -1.0 };
            assert_eq!(n[wall.axis()], sign);
        }
        assert_eq!(Wall::NegY.normal(), Vec3::new(0.0, -1.0, 0.0));
    }

    #[test]
    fn test_index_roundtrip() {
        for (i, wall) in Wall::ALL.iter().enumerate() {
            assert_eq!(wall.index(), i);
            assert_eq!(Wall::from_axis(wall.axis(), wall.is_positive()), *wall);
        }
    }

    #[test]
    fn test_only_neg_y_is_floor() {
        let floors: Vec<_> = Wall::ALL.iter().filter(|w| w.is_floor()).collect();
        assert_eq!(floors, vec![&Wall::NegY]);
    }

    #[test]
    fn test_contact() {
        assert_eq!(Wall::PosX.contact(3.0, 0.5), 2.5);
        assert_eq!(Wall::NegZ.contact(3.0, 0.5), -2.5);
    }
}
