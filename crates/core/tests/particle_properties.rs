//! Particle simulator behaviour: collision timing, settling as a terminal
//! state, and wall-specific settling rules.

use approx::assert_relative_eq;
use terra_sim_core::{
    detect_collision, Particle, ParticleParams, ParticleState, ParticleSystem, Vec3, Wall,
};

#[test]
fn test_time_of_impact_is_fractional_on_positive_x() {
    let m = 3.0;
    for r in [0.1_f32, 0.25, 0.4] {
        for v in [0.5_f32, 10.0, 200.0] {
            let hit = detect_collision(
                &Vec3::zeros(),
                &Vec3::new(m + r, 0.0, 0.0),
                r,
                &Vec3::new(v, 0.0, 0.0),
                m,
            )
            .unwrap();
            assert_eq!(hit.wall, Wall::PosX);
            assert!(hit.time > 0.0 && hit.time < 1.0, "time {}", hit.time);
        }
    }
}

#[test]
fn test_center_point_only_moves_under_gravity() {
    let params = ParticleParams::default();
    let mut particle = Particle::new(Vec3::zeros(), Vec3::zeros(), 0.0);

    // Falls straight down; no collision until it reaches the floor
    let mut first_hit = None;
    for step in 0..10_000 {
        let before = particle.position();
        if let Some(hit) = particle.step(0.01, &params) {
            assert!(before.y > -params.half_width);
            first_hit = Some((step, hit.wall));
            break;
        }
        assert_eq!(particle.position().x, 0.0);
        assert_eq!(particle.position().z, 0.0);
    }
    let (step, wall) = first_hit.expect("gravity should bring it to the floor");
    assert!(step > 0);
    assert_eq!(wall, Wall::NegY);
}

#[test]
fn test_settled_particle_is_frozen_for_any_dt() {
    let params = ParticleParams::default();
    let mut particle = Particle::new(Vec3::new(1.0, -2.95, -1.0), Vec3::new(0.0, -0.2, 0.0), 0.05)
        .with_color(Vec3::new(0.2, 0.4, 0.6));

    let mut steps = 0;
    while !particle.is_settled() {
        particle.step(0.01, &params);
        steps += 1;
        assert!(steps < 1000, "particle should settle quickly");
    }
    assert_eq!(particle.state(), ParticleState::Settled);
    assert_eq!(particle.velocity(), Vec3::zeros());
    assert_relative_eq!(particle.position().y, -2.95, epsilon = 1e-6);

    let frozen = particle.clone();
    for dt in [1e-4, 0.016, 1.0, 1e3, 1e6] {
        assert!(particle.step(dt, &params).is_none());
        assert_eq!(particle, frozen);
    }
}

#[test]
fn test_slow_hits_on_other_walls_never_settle() {
    let params = ParticleParams {
        gravity: 0.0,
        restitution: 0.0,
        ..ParticleParams::default()
    };
    let r = 0.1;
    let start = 2.85;
    for wall in Wall::ALL.into_iter().filter(|w| !w.is_floor()) {
        let n = wall.normal();
        let mut particle = Particle::new(n * start, n * 0.5, r);
        let hit = particle.step(0.5, &params).expect("should reach the wall");
        assert_eq!(hit.wall, wall);
        assert_eq!(particle.velocity(), Vec3::zeros());
        assert_eq!(particle.state(), ParticleState::Free);
    }
}

#[test]
fn test_swarm_stays_inside_cube() {
    let params = ParticleParams::default();
    let mut system = ParticleSystem::new(params, 4242).unwrap();
    system.spawn(100).unwrap();
    for _ in 0..2_000 {
        system.step(0.016);
        for p in system.particles() {
            // A corner hit clamps one axis per step, so allow one step of travel
            for axis in 0..3 {
                assert!(p.position()[axis].abs() + p.radius() <= params.half_width + 0.5);
            }
        }
    }
    assert!(system.stats().total_collisions > 0);
}
