//! Plinko Field - decorative 2D body simulation for a canvas widget
//!
//! Core modules:
//! - `sim`: Simulation field (drift integration, collision relaxation, gate state)
//! - `renderer`: Paints simulation state onto a minimal 2D drawing surface
//! - `platform`: Frame driver and browser animation-loop glue
//! - `settings`: Display preferences persisted in LocalStorage

pub mod platform;
pub mod renderer;
pub mod settings;
pub mod sim;

pub use platform::{FrameDriver, FrameScheduler, ManualScheduler};
pub use renderer::{Painter, Surface, Theme};
pub use settings::{QualityPreset, Settings};
pub use sim::{Payload, SimulationConfig, SimulationField};

use glam::Vec2;

/// Layout constants shared by the simulation and the painter
pub mod consts {
    /// Plinko ball radius
    pub const BALL_RADIUS: f32 = 20.0;
    /// Ball row height as a fraction of arena height
    pub const BALL_ROW_Y: f32 = 0.08;
    /// Horizontal share of the arena used by the ball row and peg rows
    pub const ROW_SPAN: f32 = 0.8;

    /// Peg radius
    pub const PEG_RADIUS: f32 = 8.0;
    /// First and last peg row, as fractions of arena height
    pub const PEG_START_Y: f32 = 0.25;
    pub const PEG_END_Y: f32 = 0.75;
    /// Pegs in the first row (each following row adds one)
    pub const PEGS_FIRST_ROW: u32 = 3;
    /// Room beyond a ball diameter (plus buffer) kept between pegs and walls
    pub const PEG_GAP_SLACK: f32 = 8.0;

    /// Bottom barrier edge length
    pub const BARRIER_SIZE: f32 = 60.0;
    /// Gap between a barrier and its side wall
    pub const BARRIER_SIDE_GAP: f32 = 40.0;
    /// Gap between a barrier and the floor
    pub const BARRIER_FLOOR_GAP: f32 = 20.0;

    /// Gate centre line as a fraction of arena height
    pub const GATE_Y: f32 = 0.15;
    /// Gate bar thickness
    pub const GATE_THICKNESS: f32 = 8.0;

    /// Thickness of the invisible walls handed to an external physics backend
    pub const WALL_THICKNESS: f32 = 50.0;

    /// Extra clearance between floating bodies when seeding positions
    pub const SEED_CLEARANCE: f32 = 8.0;
    /// Placement attempts per floating body
    pub const SEED_TRIES: u32 = 400;

    /// Floating pill metrics (12px label text)
    pub const PILL_CHAR_WIDTH: f32 = 6.5;
    pub const PILL_PADDING_X: f32 = 24.0;
    pub const PILL_HEIGHT: f32 = 28.0;
    /// Pill radius as a fraction of the pill's larger side
    pub const PILL_RADIUS_FACTOR: f32 = 0.6;
}

/// Default display payloads
pub mod content {
    use crate::sim::Payload;

    /// Tech icons dropped through the Plinko board
    pub fn tech_icons() -> Vec<Payload> {
        [
            ("React", "#61DAFB"),
            ("Node", "#339933"),
            ("JS", "#F7DF1E"),
            ("TS", "#3178C6"),
            ("CSS", "#1572B6"),
            ("HTML", "#E34F26"),
            ("Git", "#F05032"),
            ("API", "#FF6B6B"),
            ("DB", "#4DB33D"),
            ("AWS", "#FF9900"),
        ]
        .into_iter()
        .map(|(label, color)| Payload::new(label, color))
        .collect()
    }

    /// Labels for the calm floating demo, as faint white pills
    pub fn floating_labels() -> Vec<Payload> {
        [
            "React",
            "TypeScript",
            "Vite",
            "Node",
            "CSS",
            "GitHub Actions",
            "Accessibility",
            "Testing",
        ]
        .into_iter()
        .map(|label| Payload::new(label, "#FFFFFF14"))
        .collect()
    }
}

/// Scale `v` down uniformly so its length does not exceed `max`
#[inline]
pub fn cap_length(v: Vec2, max: f32) -> Vec2 {
    let len_sq = v.length_squared();
    if len_sq > max * max && len_sq > 0.0 {
        v * (max / len_sq.sqrt())
    } else {
        v
    }
}

/// Radius of a floating pill sized to fit `label`
#[inline]
pub fn pill_radius(label: &str) -> f32 {
    use consts::*;
    let width = label.chars().count() as f32 * PILL_CHAR_WIDTH + PILL_PADDING_X;
    PILL_RADIUS_FACTOR * width.max(PILL_HEIGHT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cap_length() {
        let v = cap_length(Vec2::new(30.0, 40.0), 10.0);
        assert!((v.length() - 10.0).abs() < 1e-4);
        assert!((v.x / v.y - 0.75).abs() < 1e-4);

        let short = Vec2::new(1.0, 1.0);
        assert_eq!(cap_length(short, 10.0), short);
        assert_eq!(cap_length(Vec2::ZERO, 10.0), Vec2::ZERO);
    }

    #[test]
    fn test_pill_radius_grows_with_label() {
        assert!(pill_radius("GitHub Actions") > pill_radius("CSS"));
        // Short labels are bounded by pill height
        assert!((pill_radius("") - consts::PILL_RADIUS_FACTOR * consts::PILL_HEIGHT).abs() < 1e-4);
    }

    #[test]
    fn test_default_content() {
        assert_eq!(content::tech_icons().len(), 10);
        assert_eq!(content::floating_labels().len(), 8);
    }
}
