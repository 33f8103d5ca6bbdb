//! Collision detection and position-based resolution
//!
//! Body pairs are separated by moving positions only (no impulses), which keeps
//! the motion calm. Static obstacles and walls push bodies fully out.

use glam::{BVec2, Vec2};

use super::config::SimulationConfig;
use super::state::{Arena, Body, Obstacle, Rect};

/// Result of a collision check against a static shape
#[derive(Debug, Clone)]
pub struct CollisionResult {
    /// Whether a collision occurred
    pub hit: bool,
    /// Contact point on the obstacle surface (if hit)
    pub point: Vec2,
    /// Surface normal pointing from the obstacle toward the body centre
    pub normal: Vec2,
    /// Distance the body must move along `normal` to clear the obstacle
    pub penetration: f32,
}

impl CollisionResult {
    pub fn miss() -> Self {
        Self {
            hit: false,
            point: Vec2::ZERO,
            normal: Vec2::ZERO,
            penetration: 0.0,
        }
    }
}

/// Check a body against a circular peg
pub fn body_peg_collision(pos: Vec2, radius: f32, center: Vec2, peg_radius: f32) -> CollisionResult {
    let delta = pos - center;
    let min_dist = radius + peg_radius;
    let dist_sq = delta.length_squared();

    if dist_sq >= min_dist * min_dist {
        return CollisionResult::miss();
    }

    let dist = dist_sq.sqrt();
    // Dead centre: push straight up
    let normal = if dist > 0.0 { delta / dist } else { Vec2::NEG_Y };

    CollisionResult {
        hit: true,
        point: center + normal * peg_radius,
        normal,
        penetration: min_dist - dist,
    }
}

/// Check a body against an axis-aligned rectangle
pub fn body_rect_collision(pos: Vec2, radius: f32, rect: &Rect) -> CollisionResult {
    let closest = rect.closest_point(pos);
    let delta = pos - closest;
    let dist_sq = delta.length_squared();

    if dist_sq > 0.0 {
        if dist_sq >= radius * radius {
            return CollisionResult::miss();
        }
        let dist = dist_sq.sqrt();
        return CollisionResult {
            hit: true,
            point: closest,
            normal: delta / dist,
            penetration: radius - dist,
        };
    }

    // Centre is inside the rectangle - leave through the nearest side
    let exits = [
        (pos.x - rect.min.x, Vec2::NEG_X),
        (rect.max.x - pos.x, Vec2::X),
        (pos.y - rect.min.y, Vec2::NEG_Y),
        (rect.max.y - pos.y, Vec2::Y),
    ];
    let (depth, normal) = exits
        .into_iter()
        .min_by(|a, b| a.0.total_cmp(&b.0))
        .unwrap_or((0.0, Vec2::NEG_Y));

    CollisionResult {
        hit: true,
        point: pos + normal * depth,
        normal,
        penetration: depth + radius,
    }
}

/// Check a body against a static obstacle. Gates are handled by [`clamp_to_gate`].
pub fn body_obstacle_collision(pos: Vec2, radius: f32, obstacle: &Obstacle) -> CollisionResult {
    match obstacle {
        Obstacle::Peg {
            center,
            radius: peg_radius,
        } => body_peg_collision(pos, radius, *center, *peg_radius),
        Obstacle::Barrier { rect } => body_rect_collision(pos, radius, rect),
        Obstacle::Gate { .. } => CollisionResult::miss(),
    }
}

/// Reflect the component of `velocity` moving into the surface, scaled by `restitution`
///
/// restitution = 1 is a mirror bounce, 0 cancels the normal component.
#[inline]
pub fn reflect_velocity(velocity: Vec2, normal: Vec2, restitution: f32) -> Vec2 {
    let into = velocity.dot(normal);
    if into < 0.0 {
        velocity - (1.0 + restitution) * into * normal
    } else {
        velocity
    }
}

/// Separate two bodies along their centre line, splitting the correction evenly.
/// Returns true if they were closer than `a.radius + b.radius + buffer`.
pub fn separate(a: &mut Body, b: &mut Body, buffer: f32) -> bool {
    let delta = b.pos - a.pos;
    let min_dist = a.radius + b.radius + buffer;
    let dist_sq = delta.length_squared();

    if dist_sq >= min_dist * min_dist {
        return false;
    }

    let (normal, dist) = if dist_sq > 0.0 {
        let dist = dist_sq.sqrt();
        (delta / dist, dist)
    } else {
        (Vec2::X, 0.0)
    };

    let push = (min_dist - dist) * 0.5;
    a.pos -= normal * push;
    b.pos += normal * push;
    true
}

/// One relaxation pass over every unordered body pair
pub fn resolve_pairs(bodies: &mut [Body], buffer: f32) -> usize {
    let mut corrected = 0;
    for i in 0..bodies.len() {
        let (head, tail) = bodies.split_at_mut(i + 1);
        let a = &mut head[i];
        for b in tail.iter_mut() {
            if separate(a, b, buffer) {
                corrected += 1;
            }
        }
    }
    corrected
}

/// Sum of pairwise overlap (ignoring the buffer)
pub fn total_overlap(bodies: &[Body]) -> f32 {
    let mut total = 0.0;
    for (i, a) in bodies.iter().enumerate() {
        for b in &bodies[i + 1..] {
            let overlap = a.radius + b.radius - a.pos.distance(b.pos);
            if overlap > 0.0 {
                total += overlap;
            }
        }
    }
    total
}

/// Clamp a body centre so the whole body lies inside `bounds`.
/// Returns which axes were clamped.
pub fn clamp_to_bounds(pos: &mut Vec2, radius: f32, bounds: &Rect) -> BVec2 {
    let lo = bounds.min + Vec2::splat(radius);
    let hi = bounds.max - Vec2::splat(radius);
    BVec2::new(
        clamp_axis(&mut pos.x, lo.x, hi.x),
        clamp_axis(&mut pos.y, lo.y, hi.y),
    )
}

fn clamp_axis(value: &mut f32, lo: f32, hi: f32) -> bool {
    if lo > hi {
        // Body wider than the space: centre it
        let mid = (lo + hi) * 0.5;
        let moved = *value != mid;
        *value = mid;
        return moved;
    }
    if *value < lo {
        *value = lo;
        true
    } else if *value > hi {
        *value = hi;
        true
    } else {
        false
    }
}

/// Hold a body on its side of a closed gate. Returns true if it was moved.
///
/// The gate divides the whole arena width: bodies above its centre line stay
/// above its top edge, bodies below stay below its bottom edge.
pub fn clamp_to_gate(pos: &mut Vec2, radius: f32, gate: &Rect) -> bool {
    if pos.y <= gate.center().y {
        let limit = gate.min.y - radius;
        if pos.y > limit {
            pos.y = limit;
            return true;
        }
    } else {
        let limit = gate.max.y + radius;
        if pos.y < limit {
            pos.y = limit;
            return true;
        }
    }
    false
}

/// Closed gate rectangle, if the arena has one
fn closed_gate(obstacles: &[Obstacle]) -> Option<Rect> {
    obstacles.iter().find_map(|o| match o {
        Obstacle::Gate { rect, .. } if o.is_solid() => Some(*rect),
        _ => None,
    })
}

/// Push a body out of every solid obstacle.
/// With `restitution`, the inward velocity is reflected as well.
pub fn push_out_of_obstacles(body: &mut Body, obstacles: &[Obstacle], restitution: Option<f32>) {
    for obstacle in obstacles.iter().filter(|o| o.is_solid()) {
        let result = body_obstacle_collision(body.pos, body.radius, obstacle);
        if result.hit {
            body.pos += result.normal * result.penetration;
            if let Some(e) = restitution {
                body.vel = reflect_velocity(body.vel, result.normal, e);
            }
        }
    }

    if let Some(gate) = closed_gate(obstacles) {
        if clamp_to_gate(&mut body.pos, body.radius, &gate) {
            if let Some(e) = restitution {
                body.vel.y *= -e;
            }
        }
    }
}

/// Run `collision_iterations` position-correction passes.
///
/// Each pass separates body pairs, then re-applies obstacle and wall
/// containment (positions only), so bodies end every pass inside the arena.
pub fn relax(arena: &mut Arena, config: &SimulationConfig) {
    let bounds = arena.bounds(config.padding, config.top_offset);

    for _ in 0..config.collision_iterations {
        resolve_pairs(&mut arena.bodies, config.collision_buffer);

        for body in &mut arena.bodies {
            push_out_of_obstacles(body, &arena.obstacles, None);
            clamp_to_bounds(&mut body.pos, body.radius, &bounds);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::GateState;

    fn body_at(id: u32, x: f32, y: f32, radius: f32) -> Body {
        Body::new(id, Vec2::new(x, y), radius)
    }

    #[test]
    fn test_separate_two_overlapping_bodies() {
        let mut bodies = vec![body_at(1, 100.0, 100.0, 10.0), body_at(2, 105.0, 100.0, 10.0)];
        let before = bodies[0].pos.distance(bodies[1].pos);

        resolve_pairs(&mut bodies, 6.0);
        let after_one = bodies[0].pos.distance(bodies[1].pos);
        assert!(after_one > before);

        resolve_pairs(&mut bodies, 6.0);
        let after_two = bodies[0].pos.distance(bodies[1].pos);
        assert!(after_two >= 20.0 - 1e-3);
    }

    #[test]
    fn test_separate_is_symmetric() {
        let mut a = body_at(1, 0.0, 0.0, 10.0);
        let mut b = body_at(2, 10.0, 0.0, 10.0);
        assert!(separate(&mut a, &mut b, 0.0));
        // Midpoint is preserved
        assert!(((a.pos + b.pos) * 0.5 - Vec2::new(5.0, 0.0)).length() < 1e-4);
        assert!((a.pos.distance(b.pos) - 20.0).abs() < 1e-4);
        // Velocities untouched
        assert_eq!(a.vel, Vec2::ZERO);
        assert_eq!(b.vel, Vec2::ZERO);
    }

    #[test]
    fn test_separate_coincident_centres() {
        let mut a = body_at(1, 50.0, 50.0, 10.0);
        let mut b = body_at(2, 50.0, 50.0, 10.0);
        assert!(separate(&mut a, &mut b, 0.0));
        assert!(a.pos.is_finite() && b.pos.is_finite());
        assert!((b.pos.x - a.pos.x - 20.0).abs() < 1e-4);
        assert_eq!(a.pos.y, b.pos.y);
    }

    #[test]
    fn test_separate_ignores_distant_bodies() {
        let mut a = body_at(1, 0.0, 0.0, 10.0);
        let mut b = body_at(2, 100.0, 0.0, 10.0);
        assert!(!separate(&mut a, &mut b, 6.0));
        assert_eq!(a.pos, Vec2::ZERO);
    }

    #[test]
    fn test_overlap_decreases_across_passes() {
        let mut bodies = vec![
            body_at(1, 0.0, 0.0, 10.0),
            body_at(2, 5.0, 0.0, 10.0),
            body_at(3, 10.0, 0.0, 10.0),
        ];
        let initial = total_overlap(&bodies);

        resolve_pairs(&mut bodies, 0.0);
        let first = total_overlap(&bodies);
        assert!(first < initial);

        for _ in 0..9 {
            resolve_pairs(&mut bodies, 0.0);
        }
        assert!(total_overlap(&bodies) < first);
    }

    #[test]
    fn test_peg_collision() {
        let hit = body_peg_collision(Vec2::new(0.0, -20.0), 20.0, Vec2::ZERO, 8.0);
        assert!(hit.hit);
        assert!((hit.penetration - 8.0).abs() < 1e-4);
        assert!((hit.normal - Vec2::NEG_Y).length() < 1e-4);

        let miss = body_peg_collision(Vec2::new(0.0, -40.0), 20.0, Vec2::ZERO, 8.0);
        assert!(!miss.hit);
    }

    #[test]
    fn test_rect_collision_outside_and_inside() {
        let rect = Rect::new(Vec2::new(0.0, 0.0), Vec2::new(60.0, 60.0));

        // Resting just above the top edge, overlapping by 5
        let above = body_rect_collision(Vec2::new(30.0, -15.0), 20.0, &rect);
        assert!(above.hit);
        assert!((above.normal - Vec2::NEG_Y).length() < 1e-4);
        assert!((above.penetration - 5.0).abs() < 1e-4);

        // Centre inside, nearest to the left side
        let inside = body_rect_collision(Vec2::new(5.0, 30.0), 10.0, &rect);
        assert!(inside.hit);
        assert_eq!(inside.normal, Vec2::NEG_X);
        assert!((inside.penetration - 15.0).abs() < 1e-4);

        let clear = body_rect_collision(Vec2::new(100.0, 30.0), 10.0, &rect);
        assert!(!clear.hit);
    }

    #[test]
    fn test_reflect_velocity() {
        // Moving down onto a floor (normal pointing up)
        let v = reflect_velocity(Vec2::new(3.0, 100.0), Vec2::NEG_Y, 0.4);
        assert!((v.y + 40.0).abs() < 1e-3);
        assert!((v.x - 3.0).abs() < 1e-6);

        // Moving away is untouched
        let away = Vec2::new(0.0, -10.0);
        assert_eq!(reflect_velocity(away, Vec2::NEG_Y, 0.4), away);
    }

    #[test]
    fn test_clamp_to_bounds() {
        let bounds = Rect::new(Vec2::ZERO, Vec2::new(400.0, 700.0));
        let mut pos = Vec2::new(-5.0, 690.0);
        let clamped = clamp_to_bounds(&mut pos, 20.0, &bounds);
        assert!(clamped.x && clamped.y);
        assert_eq!(pos, Vec2::new(20.0, 680.0));

        let mut inside = Vec2::new(200.0, 300.0);
        assert!(!clamp_to_bounds(&mut inside, 20.0, &bounds).any());
    }

    #[test]
    fn test_clamp_to_bounds_too_narrow() {
        let bounds = Rect::new(Vec2::ZERO, Vec2::new(30.0, 700.0));
        let mut pos = Vec2::new(2.0, 100.0);
        clamp_to_bounds(&mut pos, 20.0, &bounds);
        assert_eq!(pos.x, 15.0);
    }

    #[test]
    fn test_clamp_to_gate_holds_both_sides() {
        let gate = Rect::from_center(Vec2::new(200.0, 105.0), Vec2::new(400.0, 8.0));

        let mut above = Vec2::new(50.0, 95.0);
        assert!(clamp_to_gate(&mut above, 20.0, &gate));
        assert_eq!(above.y, 101.0 - 20.0);

        let mut below = Vec2::new(50.0, 115.0);
        assert!(clamp_to_gate(&mut below, 20.0, &gate));
        assert_eq!(below.y, 109.0 + 20.0);

        let mut clear = Vec2::new(50.0, 40.0);
        assert!(!clamp_to_gate(&mut clear, 20.0, &gate));
    }

    #[test]
    fn test_open_gate_does_not_hold() {
        let rect = Rect::from_center(Vec2::new(200.0, 105.0), Vec2::new(400.0, 8.0));
        let obstacles = vec![Obstacle::Gate {
            rect,
            state: GateState::Open,
        }];
        let mut body = body_at(1, 50.0, 95.0, 20.0);
        push_out_of_obstacles(&mut body, &obstacles, Some(0.4));
        assert_eq!(body.pos.y, 95.0);
    }

    #[test]
    fn test_relax_keeps_bodies_inside() {
        let mut arena = Arena::new(100.0, 100.0);
        arena.bodies = vec![body_at(1, 10.0, 50.0, 20.0), body_at(2, 12.0, 50.0, 20.0)];
        let config = SimulationConfig {
            padding: 0.0,
            top_offset: 0.0,
            ..SimulationConfig::floating()
        };
        relax(&mut arena, &config);
        for body in &arena.bodies {
            assert!(body.pos.x >= body.radius - 1e-4);
            assert!(body.pos.x <= arena.width - body.radius + 1e-4);
        }
    }
}
