//! Continuous wall collision detection for a sphere moving over one step.

use crate::core_types::Vec3;
use crate::particle::Wall;

/// Earliest wall contact found during a step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CollisionHit {
    /// Wall that was hit first
    pub wall: Wall,
    /// Fraction of the step (`0..=1`) at which the sphere touched the wall
    pub time: f32,
}

/// Find the first wall a sphere of `radius` touched moving from `old` to `new`.
///
/// Each axis is tested independently: if the sphere pokes through the
/// `+m` face (or else the `-m` face) the contact time is interpolated
/// linearly between the two positions. The smallest time across the axes
/// wins; on a tie the lower wall index is kept.
///
/// An axis whose `velocity` component is zero, or points away from the
/// wall it overlaps, has no defined contact time and is skipped instead of
/// producing an infinite or NaN candidate. Returns `None` when no axis
/// yields a candidate.
pub fn detect_collision(
    old: &Vec3,
    new: &Vec3,
    radius: f32,
    velocity: &Vec3,
    half_width: f32,
) -> Option<CollisionHit> {
    let mut best: Option<CollisionHit> = None;

    for axis in 0..3 {
        let wall = if new[axis] + radius >= half_width {
            Wall::from_axis(axis, true)
        } else if new[axis] - radius <= -half_width {
            Wall::from_axis(axis, false)
        } else {
            continue;
        };

        let toward = if wall.is_positive() {
            velocity[axis] > 0.0
        } else {
            velocity[axis] < 0.0
        };
        let displacement = new[axis] - old[axis];
        if !toward || displacement == 0.0 {
            continue;
        }

        let time = (wall.contact(half_width, radius) - old[axis]) / displacement;
        if !time.is_finite() {
            continue;
        }
        let time = time.clamp(0.0, 1.0);

        let earlier = match best {
            Some(hit) => time < hit.time,
            None => true,
        };
        if earlier {
            best = Some(CollisionHit { wall, time });
        }
    }

    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const M: f32 = 3.0;

    #[test]
    fn test_positive_x_fractional_time() {
        let r = 0.2;
        let hit = detect_collision(
            &Vec3::zeros(),
            &Vec3::new(M + r, 0.0, 0.0),
            r,
            &Vec3::new(4.0, 0.0, 0.0),
            M,
        )
        .expect("should hit +X");
        assert_eq!(hit.wall, Wall::PosX);
        assert!(hit.time > 0.0 && hit.time < 1.0);
        assert_relative_eq!(hit.time, (M - r) / (M + r));
    }

    #[test]
    fn test_inside_is_no_collision() {
        let hit = detect_collision(
            &Vec3::zeros(),
            &Vec3::new(1.0, -1.0, 2.0),
            0.3,
            &Vec3::new(1.0, -1.0, 2.0),
            M,
        );
        assert_eq!(hit, None);
    }

    #[test]
    fn test_floor_hit() {
        let hit = detect_collision(
            &Vec3::new(0.0, -2.5, 0.0),
            &Vec3::new(0.0, -3.5, 0.0),
            0.25,
            &Vec3::new(0.0, -10.0, 0.0),
            M,
        )
        .unwrap();
        assert_eq!(hit.wall, Wall::NegY);
        assert_relative_eq!(hit.time, 0.25);
    }

    #[test]
    fn test_earliest_axis_wins() {
        // Reaches the Z wall a quarter of the way in, the X wall only at the end
        let old = Vec3::new(2.0, 0.0, 2.5);
        let new = Vec3::new(3.0, 0.0, 4.5);
        let hit = detect_collision(&old, &new, 0.0, &(new - old), M).unwrap();
        assert_eq!(hit.wall, Wall::PosZ);
        assert_relative_eq!(hit.time, 0.25);
    }

    #[test]
    fn test_tie_keeps_first_axis() {
        let old = Vec3::new(2.0, 2.0, 0.0);
        let new = Vec3::new(4.0, 4.0, 0.0);
        let hit = detect_collision(&old, &new, 0.0, &(new - old), M).unwrap();
        assert_eq!(hit.wall, Wall::PosX);
    }

    #[test]
    fn test_zero_velocity_axis_is_skipped() {
        // Already past +X but not moving along X: the Y hit must win
        let old = Vec3::new(3.5, 2.0, 0.0);
        let new = Vec3::new(3.5, 4.0, 0.0);
        let hit = detect_collision(&old, &new, 0.0, &Vec3::new(0.0, 2.0, 0.0), M).unwrap();
        assert_eq!(hit.wall, Wall::PosY);
        assert_relative_eq!(hit.time, 0.5);

        let still = Vec3::new(3.5, 0.0, 0.0);
        assert_eq!(detect_collision(&still, &still, 0.0, &Vec3::zeros(), M), None);
    }

    #[test]
    fn test_moving_away_is_skipped() {
        let old = Vec3::new(0.0, -3.2, 0.0);
        let new = Vec3::new(0.0, -3.1, 0.0);
        let hit = detect_collision(&old, &new, 0.1, &Vec3::new(0.0, 1.0, 0.0), M);
        assert_eq!(hit, None);
    }
}
