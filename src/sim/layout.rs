//! Arena population
//!
//! Builds the obstacle set and seeds bodies for a freshly sized arena.
//! Placement is fully determined by the config seed, so rebuilding an arena
//! with the same inputs reproduces it exactly.

use std::f32::consts::TAU;

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::config::{Layout, SimulationConfig};
use super::state::{Arena, Body, GateState, Obstacle, Payload, Rect};
use crate::consts::*;
use crate::pill_radius;

/// Fill `arena` with obstacles and one body per payload
pub fn populate(arena: &mut Arena, payloads: &[Payload], config: &SimulationConfig) {
    arena.bodies.clear();
    arena.obstacles.clear();

    if arena.is_inert() {
        log::debug!(
            "Arena {}x{} has no area - leaving it empty",
            arena.width,
            arena.height
        );
        return;
    }

    if config.peg_rows > 0 {
        let ball = config.body_radius.unwrap_or(BALL_RADIUS);
        place_pegs(arena, config.peg_rows, 2.0 * ball + config.collision_buffer);
    }
    if config.barriers {
        place_barriers(arena);
    }
    if config.gate {
        place_gate(arena, config.gate_y);
    }

    let mut rng = Pcg32::seed_from_u64(config.seed);
    match config.layout {
        Layout::Plinko => seed_row(arena, payloads, config, &mut rng),
        Layout::Floating => scatter(arena, payloads, config, &mut rng),
    }
    arena.normalize_order();

    log::debug!(
        "Populated {} arena {}x{}: {} bodies, {} obstacles",
        config.layout.as_str(),
        arena.width,
        arena.height,
        arena.bodies.len(),
        arena.obstacles.len()
    );
}

fn body_radius(payload: &Payload, config: &SimulationConfig) -> f32 {
    config
        .body_radius
        .unwrap_or_else(|| pill_radius(&payload.label))
}

fn random_phase(rng: &mut Pcg32) -> Vec2 {
    Vec2::new(rng.random::<f32>() * TAU, rng.random::<f32>() * TAU)
}

/// Staggered peg rows that a ball of width `passage` can always fall through.
///
/// Row `k` wants `PEGS_FIRST_ROW + k` pegs. Every row shares one spacing and is
/// centred, so rows whose counts differ by one sit half a spacing apart. On a
/// narrow arena the count is capped so that peg-to-peg and peg-to-wall gaps
/// stay at least `passage + PEG_GAP_SLACK`; capped rows alternate between the
/// cap and one less to keep the stagger.
fn place_pegs(arena: &mut Arena, rows: u32, passage: f32) {
    let (w, h) = (arena.width, arena.height);
    let clearance = passage + PEG_GAP_SLACK;
    let margin = clearance + PEG_RADIUS;
    let span = (w * ROW_SPAN).min(w - 2.0 * margin);
    if span < 0.0 {
        log::debug!("Arena width {w} too narrow for pegs");
        return;
    }

    let min_spacing = clearance + 2.0 * PEG_RADIUS;
    let fit = (span / min_spacing).floor() as u32 + 1;
    let widest = (PEGS_FIRST_ROW + rows - 1).min(fit);
    let spacing = if widest > 1 {
        span / (widest - 1) as f32
    } else {
        0.0
    };

    let start_y = h * PEG_START_Y;
    let row_gap = if rows > 1 {
        h * (PEG_END_Y - PEG_START_Y) / (rows - 1) as f32
    } else {
        0.0
    };

    let mut previous = 0;
    for row in 0..rows {
        let mut count = (PEGS_FIRST_ROW + row).min(widest);
        if count == previous && count > 1 {
            count -= 1;
        }
        previous = count;

        let y = start_y + row as f32 * row_gap;
        let row_start = (w - (count - 1) as f32 * spacing) / 2.0;
        for i in 0..count {
            arena.obstacles.push(Obstacle::Peg {
                center: Vec2::new(row_start + i as f32 * spacing, y),
                radius: PEG_RADIUS,
            });
        }
    }
}

/// Two square barriers resting just above the floor
fn place_barriers(arena: &mut Arena) {
    let (w, h) = (arena.width, arena.height);
    let half = BARRIER_SIZE / 2.0;
    let y = h - half - BARRIER_FLOOR_GAP;
    let size = Vec2::splat(BARRIER_SIZE);

    for x in [half + BARRIER_SIDE_GAP, w - half - BARRIER_SIDE_GAP] {
        arena.obstacles.push(Obstacle::Barrier {
            rect: Rect::from_center(Vec2::new(x, y), size),
        });
    }
}

/// A closed full-width gate
fn place_gate(arena: &mut Arena, gate_y: f32) {
    let (w, h) = (arena.width, arena.height);
    arena.obstacles.push(Obstacle::Gate {
        rect: Rect::from_center(Vec2::new(w / 2.0, h * gate_y), Vec2::new(w, GATE_THICKNESS)),
        state: GateState::Closed,
    });
}

/// One row of bodies at rest above the gate
fn seed_row(arena: &mut Arena, payloads: &[Payload], config: &SimulationConfig, rng: &mut Pcg32) {
    if payloads.is_empty() {
        return;
    }
    let (w, h) = (arena.width, arena.height);
    let spacing = w * ROW_SPAN / payloads.len() as f32;
    let start_x = w * (1.0 - ROW_SPAN) / 2.0;
    let y = h * BALL_ROW_Y;

    for (i, payload) in payloads.iter().enumerate() {
        let pos = Vec2::new(start_x + (i as f32 + 0.5) * spacing, y);
        let body = Body::new(i as u32 + 1, pos, body_radius(payload, config))
            .with_payload(payload.clone())
            .with_phase(random_phase(rng));
        arena.bodies.push(body);
    }
}

fn sample(rng: &mut Pcg32, lo: f32, hi: f32) -> f32 {
    if lo < hi {
        rng.random_range(lo..hi)
    } else {
        (lo + hi) * 0.5
    }
}

/// Rejection-sample positions that keep clear of bodies already placed
fn scatter(arena: &mut Arena, payloads: &[Payload], config: &SimulationConfig, rng: &mut Pcg32) {
    let bounds = arena.bounds(config.padding, config.top_offset);

    for (i, payload) in payloads.iter().enumerate() {
        let radius = body_radius(payload, config);
        let lo = bounds.min + Vec2::splat(radius);
        let hi = bounds.max - Vec2::splat(radius);

        let mut pos = bounds.center();
        for _ in 0..SEED_TRIES {
            pos = Vec2::new(sample(rng, lo.x, hi.x), sample(rng, lo.y, hi.y));
            let clear = arena.bodies.iter().all(|b| {
                let min_dist = b.radius + radius + SEED_CLEARANCE;
                b.pos.distance_squared(pos) >= min_dist * min_dist
            });
            if clear {
                break;
            }
        }

        let mut body = Body::new(i as u32 + 1, pos, radius)
            .with_payload(payload.clone())
            .with_phase(random_phase(rng));
        body.vel = Vec2::new(
            (rng.random::<f32>() - 0.9) * 10.0,
            (rng.random::<f32>() - 0.5) * 10.0,
        );
        arena.bodies.push(body);
    }
}
