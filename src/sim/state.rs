//! Simulation state types
//!
//! Bodies, obstacles and the arena that owns them. All state the painter
//! reads lives here.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::WALL_THICKNESS;

/// Display content attached to a body
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payload {
    pub label: String,
    /// CSS hex colour (`#RRGGBB` or `#RRGGBBAA`)
    pub color: String,
}

impl Payload {
    pub fn new(label: impl Into<String>, color: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            color: color.into(),
        }
    }
}

/// A mobile circular body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Body {
    pub id: u32,
    pub pos: Vec2,
    pub vel: Vec2,
    /// Fixed at creation
    pub radius: f32,
    /// Drift phase offsets (radians) per axis, distinct per body
    pub phase: Vec2,
    pub payload: Option<Payload>,
    /// Came to rest after release (sticky until reset)
    #[serde(default)]
    pub settled: bool,
}

impl Body {
    pub fn new(id: u32, pos: Vec2, radius: f32) -> Self {
        Self {
            id,
            pos,
            vel: Vec2::ZERO,
            radius,
            phase: Vec2::ZERO,
            payload: None,
            settled: false,
        }
    }

    pub fn with_payload(mut self, payload: Payload) -> Self {
        self.payload = Some(payload);
        self
    }

    pub fn with_phase(mut self, phase: Vec2) -> Self {
        self.phase = phase;
        self
    }

    pub fn speed(&self) -> f32 {
        self.vel.length()
    }
}

/// Axis-aligned rectangle
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub min: Vec2,
    pub max: Vec2,
}

impl Rect {
    pub fn new(min: Vec2, max: Vec2) -> Self {
        Self { min, max }
    }

    pub fn from_center(center: Vec2, size: Vec2) -> Self {
        let half = size * 0.5;
        Self {
            min: center - half,
            max: center + half,
        }
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        (self.min + self.max) * 0.5
    }

    #[inline]
    pub fn size(&self) -> Vec2 {
        self.max - self.min
    }

    /// Closest point on or inside the rectangle
    #[inline]
    pub fn closest_point(&self, p: Vec2) -> Vec2 {
        p.clamp(self.min, self.max)
    }
}

/// Gate position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum GateState {
    /// Holds bodies on their side of the gate line
    #[default]
    Closed,
    /// Out of the containment set
    Open,
}

/// Static collision region
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Obstacle {
    Peg { center: Vec2, radius: f32 },
    Barrier { rect: Rect },
    Gate { rect: Rect, state: GateState },
}

impl Obstacle {
    pub fn is_gate(&self) -> bool {
        matches!(self, Obstacle::Gate { .. })
    }

    /// Whether this obstacle currently constrains bodies
    pub fn is_solid(&self) -> bool {
        !matches!(
            self,
            Obstacle::Gate {
                state: GateState::Open,
                ..
            }
        )
    }
}

/// The bounded region owning bodies and obstacles
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Arena {
    pub width: f32,
    pub height: f32,
    /// Sorted by id
    pub bodies: Vec<Body>,
    pub obstacles: Vec<Obstacle>,
}

impl Arena {
    /// Empty arena; negative or NaN dimensions collapse to 0
    pub fn new(width: f32, height: f32) -> Self {
        let sanitize = |v: f32| if v.is_nan() { 0.0 } else { v.max(0.0) };
        Self {
            width: sanitize(width),
            height: sanitize(height),
            bodies: Vec::new(),
            obstacles: Vec::new(),
        }
    }

    /// An arena with no area performs no physics
    pub fn is_inert(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }

    /// Region body centres may occupy before accounting for radius
    pub fn bounds(&self, padding: f32, top_offset: f32) -> Rect {
        Rect::new(
            Vec2::new(padding, padding + top_offset),
            Vec2::new(self.width - padding, self.height - padding),
        )
    }

    /// Obstacles that currently constrain bodies (an open gate is excluded)
    pub fn containment(&self) -> impl Iterator<Item = &Obstacle> {
        self.obstacles.iter().filter(|o| o.is_solid())
    }

    /// State of the gate, if the arena has one
    pub fn gate_state(&self) -> Option<GateState> {
        self.obstacles.iter().find_map(|o| match o {
            Obstacle::Gate { state, .. } => Some(*state),
            _ => None,
        })
    }

    pub fn gate_rect(&self) -> Option<Rect> {
        self.obstacles.iter().find_map(|o| match o {
            Obstacle::Gate { rect, .. } => Some(*rect),
            _ => None,
        })
    }

    /// Open the gate. Returns true if this call changed its state.
    pub fn open_gate(&mut self) -> bool {
        for obstacle in &mut self.obstacles {
            if let Obstacle::Gate { state, .. } = obstacle {
                if *state == GateState::Closed {
                    *state = GateState::Open;
                    return true;
                }
            }
        }
        false
    }

    /// Invisible walls just outside the arena (left, right, floor)
    pub fn walls(&self) -> [Obstacle; 3] {
        let (w, h, t) = (self.width, self.height, WALL_THICKNESS);
        [
            Obstacle::Barrier {
                rect: Rect::new(Vec2::new(-t, 0.0), Vec2::new(0.0, h)),
            },
            Obstacle::Barrier {
                rect: Rect::new(Vec2::new(w, 0.0), Vec2::new(w + t, h)),
            },
            Obstacle::Barrier {
                rect: Rect::new(Vec2::new(0.0, h), Vec2::new(w, h + t)),
            },
        ]
    }

    /// Ensure bodies are sorted by id for deterministic iteration
    pub fn normalize_order(&mut self) {
        self.bodies.sort_by_key(|b| b.id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gate() -> Obstacle {
        Obstacle::Gate {
            rect: Rect::from_center(Vec2::new(200.0, 105.0), Vec2::new(400.0, 8.0)),
            state: GateState::Closed,
        }
    }

    #[test]
    fn test_arena_sanitizes_dimensions() {
        let arena = Arena::new(-10.0, f32::NAN);
        assert_eq!(arena.width, 0.0);
        assert_eq!(arena.height, 0.0);
        assert!(arena.is_inert());
        assert!(Arena::new(400.0, 0.0).is_inert());
        assert!(!Arena::new(400.0, 700.0).is_inert());
    }

    #[test]
    fn test_open_gate_is_idempotent() {
        let mut arena = Arena::new(400.0, 700.0);
        arena.obstacles.push(gate());
        assert_eq!(arena.gate_state(), Some(GateState::Closed));
        assert_eq!(arena.containment().filter(|o| o.is_gate()).count(), 1);

        assert!(arena.open_gate());
        assert!(!arena.open_gate());
        assert_eq!(arena.gate_state(), Some(GateState::Open));
        assert_eq!(arena.containment().filter(|o| o.is_gate()).count(), 0);
    }

    #[test]
    fn test_open_gate_without_gate() {
        let mut arena = Arena::new(400.0, 700.0);
        assert!(!arena.open_gate());
        assert_eq!(arena.gate_state(), None);
    }

    #[test]
    fn test_rect_helpers() {
        let rect = Rect::from_center(Vec2::new(10.0, 10.0), Vec2::new(4.0, 2.0));
        assert_eq!(rect.min, Vec2::new(8.0, 9.0));
        assert_eq!(rect.size(), Vec2::new(4.0, 2.0));
        assert_eq!(rect.closest_point(Vec2::new(0.0, 10.0)), Vec2::new(8.0, 10.0));
        assert_eq!(rect.center(), Vec2::new(10.0, 10.0));
    }

    #[test]
    fn test_walls_surround_arena() {
        let arena = Arena::new(400.0, 700.0);
        let walls = arena.walls();
        assert!(walls.iter().all(|w| matches!(w, Obstacle::Barrier { .. })));
        if let Obstacle::Barrier { rect } = &walls[2] {
            assert_eq!(rect.min.y, 700.0);
        }
    }
}
