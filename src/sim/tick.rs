//! Variable timestep simulation step
//!
//! Advances every body under drift (+ optional gravity), damping and the
//! speed cap, keeps it inside the arena, then relaxes overlaps.

use std::f32::consts::TAU;

use glam::Vec2;

use super::collision::{clamp_to_bounds, push_out_of_obstacles, relax};
use super::config::SimulationConfig;
use super::state::{Arena, Body, GateState, Obstacle, Rect};
use crate::cap_length;

/// Smooth pseudo-random acceleration for a body with the given phase offsets
#[inline]
pub fn drift(phase: Vec2, elapsed: f32, config: &SimulationConfig) -> Vec2 {
    let ax = (phase.x + elapsed * TAU * config.drift_frequency_x).cos();
    let ay = (phase.y + elapsed * TAU * config.drift_frequency_y).sin();
    Vec2::new(ax, ay) * config.drift_amplitude + Vec2::new(0.0, config.gravity)
}

/// Integrate one body's velocity and position
pub fn integrate(body: &mut Body, config: &SimulationConfig, dt: f32, elapsed: f32) {
    let accel = drift(body.phase, elapsed, config);
    body.vel = (body.vel + accel * dt) * config.damping;
    body.vel = cap_length(body.vel, config.max_speed);
    body.pos += body.vel * dt;
}

/// Keep a body out of obstacles and inside the walls, bouncing softly
pub fn contain(body: &mut Body, bounds: &Rect, obstacles: &[Obstacle], wall_bounce: f32) {
    push_out_of_obstacles(body, obstacles, Some(wall_bounce));

    let hit = clamp_to_bounds(&mut body.pos, body.radius, bounds);
    if hit.x {
        body.vel.x *= -wall_bounce;
    }
    if hit.y {
        body.vel.y *= -wall_bounce;
    }
}

/// Advance the arena by `dt` seconds; `elapsed` phases the drift
pub fn step(arena: &mut Arena, config: &SimulationConfig, dt: f32, elapsed: f32) {
    if arena.is_inert() {
        return;
    }

    let dt = config.clamp_dt(dt);
    if dt == 0.0 {
        return;
    }

    let bounds = arena.bounds(config.padding, config.top_offset);
    for body in &mut arena.bodies {
        integrate(body, config, dt, elapsed);
        contain(body, &bounds, &arena.obstacles, config.wall_bounce);
    }

    relax(arena, config);
    mark_settled(arena, config);
}

/// Flag released bodies that have come to rest below the gate
pub(crate) fn mark_settled(arena: &mut Arena, config: &SimulationConfig) {
    if config.settle_speed <= 0.0 || arena.gate_state() != Some(GateState::Open) {
        return;
    }
    let Some(gate) = arena.gate_rect() else {
        return;
    };

    for body in arena.bodies.iter_mut().filter(|b| !b.settled) {
        if body.pos.y > gate.max.y + body.radius && body.speed() < config.settle_speed {
            body.settled = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn open_config() -> SimulationConfig {
        SimulationConfig {
            padding: 0.0,
            top_offset: 0.0,
            ..SimulationConfig::floating()
        }
    }

    #[test]
    fn test_drift_is_desynchronized_by_phase() {
        let config = open_config();
        let a = drift(Vec2::ZERO, 1.0, &config);
        let b = drift(Vec2::new(1.3, 2.1), 1.0, &config);
        assert!((a - b).length() > 1.0);
        assert!(a.length() <= config.drift_amplitude * std::f32::consts::SQRT_2 + 1e-3);
    }

    #[test]
    fn test_gravity_bias_pulls_down() {
        let config = SimulationConfig {
            drift_amplitude: 0.0,
            ..SimulationConfig::plinko()
        };
        let mut body = Body::new(1, Vec2::new(200.0, 200.0), 20.0);
        integrate(&mut body, &config, 1.0 / 60.0, 0.0);
        assert!(body.vel.y > 0.0);
        assert!(body.pos.y > 200.0);
        assert_eq!(body.vel.x, 0.0);
    }

    #[test]
    fn test_speed_is_capped_uniformly() {
        let config = open_config();
        let mut body = Body::new(1, Vec2::new(200.0, 200.0), 10.0);
        body.vel = Vec2::new(3000.0, 4000.0);
        integrate(&mut body, &config, 1.0 / 60.0, 0.0);
        assert!(body.speed() <= config.max_speed + 1e-3);
    }

    #[test]
    fn test_wall_contact_is_soft() {
        let config = open_config();
        let bounds = Rect::new(Vec2::ZERO, Vec2::new(400.0, 700.0));
        let mut body = Body::new(1, Vec2::new(395.0, 300.0), 20.0);
        body.vel = Vec2::new(50.0, 0.0);
        contain(&mut body, &bounds, &[], config.wall_bounce);
        assert_eq!(body.pos.x, 380.0);
        assert!((body.vel.x + 20.0).abs() < 1e-4);
    }

    #[test]
    fn test_inert_arena_is_untouched() {
        let config = open_config();
        let mut arena = Arena::new(0.0, 0.0);
        arena.bodies.push(Body::new(1, Vec2::new(5.0, 5.0), 10.0));
        let before = arena.clone();
        for i in 0..100 {
            step(&mut arena, &config, 1.0 / 60.0, i as f32 / 60.0);
        }
        assert_eq!(arena, before);
    }

    #[test]
    fn test_long_frame_gap_is_clamped() {
        let config = open_config();
        let mut arena = Arena::new(400.0, 700.0);
        let mut body = Body::new(1, Vec2::new(200.0, 350.0), 10.0);
        body.vel = Vec2::new(100.0, 0.0);
        arena.bodies.push(body);

        step(&mut arena, &config, 5.0, 0.0);
        // At most max_speed * max_dt of travel
        let moved = arena.bodies[0].pos.distance(Vec2::new(200.0, 350.0));
        assert!(moved <= config.max_speed * config.max_dt + 1e-3);
    }

    proptest! {
        #[test]
        fn prop_bodies_stay_contained(
            seeds in prop::collection::vec((20.0f32..380.0, 20.0f32..680.0, 5.0f32..20.0, -500.0f32..500.0, -500.0f32..500.0), 1..12),
            steps in 1usize..80,
        ) {
            let config = SimulationConfig::floating();
            let mut arena = Arena::new(400.0, 700.0);
            for (i, (x, y, r, vx, vy)) in seeds.iter().enumerate() {
                let mut body = Body::new(i as u32, Vec2::new(*x, *y), *r)
                    .with_phase(Vec2::new(i as f32 * 0.7, i as f32 * 1.3));
                body.vel = Vec2::new(*vx, *vy);
                arena.bodies.push(body);
            }

            let bounds = arena.bounds(config.padding, config.top_offset);
            for n in 0..steps {
                step(&mut arena, &config, 1.0 / 60.0, n as f32 / 60.0);
                for body in &arena.bodies {
                    prop_assert!(body.pos.x >= bounds.min.x + body.radius - 1e-3);
                    prop_assert!(body.pos.x <= bounds.max.x - body.radius + 1e-3);
                    prop_assert!(body.pos.y >= bounds.min.y + body.radius - 1e-3);
                    prop_assert!(body.pos.y <= bounds.max.y - body.radius + 1e-3);
                }
            }
        }

        #[test]
        fn prop_speed_never_exceeds_cap(
            vx in -5000.0f32..5000.0,
            vy in -5000.0f32..5000.0,
            dt in 0.001f32..0.2,
        ) {
            let config = SimulationConfig::plinko();
            let mut arena = Arena::new(400.0, 700.0);
            let mut body = Body::new(1, Vec2::new(200.0, 400.0), 20.0);
            body.vel = Vec2::new(vx, vy);
            arena.bodies.push(body);

            step(&mut arena, &config, dt, 0.0);
            prop_assert!(arena.bodies[0].speed() <= config.max_speed + 1e-2);
        }
    }
}
