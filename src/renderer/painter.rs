//! Render adapter
//!
//! Paints an arena onto a [`Surface`]. The output is a pure function of the
//! arena, the theme and the elapsed time; the painter keeps no frame state.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::color::Color;
use super::surface::{Font, Surface};
use crate::sim::{Arena, Body, GateState, Obstacle, Rect};

/// Scanline pitch in pixels
const SCANLINE_SPACING: f32 = 4.0;
/// Opacity the Plinko board multiplies into payload colours
const BODY_ALPHA: f32 = 0xAA as f32 / 255.0;

/// Colours and effects for one look
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Theme {
    pub background: Color,
    pub peg: Color,
    pub barrier_fill: Color,
    pub barrier_stroke: Color,
    pub gate: Color,
    /// Used when a body has no payload or its colour does not parse
    pub body_fallback: Color,
    /// Multiplied into a payload colour's own alpha
    pub body_alpha: f32,
    pub body_stroke: Color,
    pub label: Color,
    pub label_size: f32,
    pub show_labels: bool,
    /// Pegs pulse between 0.4 and 1.0 alpha
    pub peg_glow: bool,
    /// Glow angular speed (rad/s)
    pub glow_rate: f32,
    pub scanlines: bool,
    pub scanline: Color,
}

impl Theme {
    /// Green-on-black terminal look for the Plinko board
    pub fn plinko() -> Self {
        Self {
            background: Color::rgb(0x0A, 0x0A, 0x0A),
            peg: Color::rgb(0x00, 0xFF, 0x41),
            barrier_fill: Color::rgba(0x00, 0xFF, 0x41, 0x1A),
            barrier_stroke: Color::rgb(0x00, 0xAA, 0x33),
            gate: Color::rgb(0xFF, 0x00, 0x33),
            body_fallback: Color::rgb(0x00, 0xFF, 0x41),
            body_alpha: BODY_ALPHA,
            body_stroke: Color::rgb(0x00, 0xFF, 0x41),
            label: Color::WHITE,
            label_size: 12.0,
            show_labels: true,
            peg_glow: true,
            glow_rate: 3.0,
            scanlines: true,
            scanline: Color::rgb(0x00, 0xFF, 0x41).with_alpha(0.02),
        }
    }

    /// Soft translucent pills over a transparent background
    pub fn floating() -> Self {
        Self {
            background: Color::TRANSPARENT,
            body_fallback: Color::WHITE.with_alpha(0.08),
            body_alpha: 1.0,
            body_stroke: Color::WHITE.with_alpha(0.2),
            peg_glow: false,
            scanlines: false,
            ..Self::plinko()
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::plinko()
    }
}

/// Paints arenas with a theme
#[derive(Debug, Clone, Default)]
pub struct Painter {
    theme: Theme,
}

impl Painter {
    pub fn new(theme: Theme) -> Self {
        Self { theme }
    }

    pub fn theme(&self) -> &Theme {
        &self.theme
    }

    pub fn set_theme(&mut self, theme: Theme) {
        self.theme = theme;
    }

    /// Draw one frame of `arena`
    pub fn paint(&self, arena: &Arena, surface: &mut dyn Surface, elapsed: f32) {
        surface.clear(self.theme.background);
        if arena.is_inert() {
            return;
        }

        for obstacle in &arena.obstacles {
            self.paint_obstacle(obstacle, surface, elapsed);
        }
        for body in &arena.bodies {
            self.paint_body(body, surface);
        }
        if self.theme.scanlines {
            self.paint_scanlines(surface);
        }
    }

    /// Peg alpha at `elapsed`; phase comes from the peg's x so neighbours ripple
    pub fn peg_alpha(&self, center: Vec2, elapsed: f32) -> f32 {
        if !self.theme.peg_glow {
            return 1.0;
        }
        0.7 + 0.3 * (center.x * 0.01 + elapsed * self.theme.glow_rate).sin()
    }

    fn paint_obstacle(&self, obstacle: &Obstacle, surface: &mut dyn Surface, elapsed: f32) {
        match obstacle {
            Obstacle::Peg { center, radius } => {
                let color = self.theme.peg.with_alpha(self.peg_alpha(*center, elapsed));
                surface.fill_circle(*center, *radius, color);
            }
            Obstacle::Barrier { rect } => {
                surface.fill_rect(*rect, self.theme.barrier_fill);
                surface.stroke_rect(*rect, self.theme.barrier_stroke, 2.0);
            }
            Obstacle::Gate { rect, state } => {
                if *state == GateState::Closed {
                    surface.fill_rect(*rect, self.theme.gate);
                }
            }
        }
    }

    fn body_color(&self, body: &Body) -> Color {
        body.payload
            .as_ref()
            .and_then(|p| Color::from_hex(&p.color))
            .map(|c| c.with_alpha(c.alpha() * self.theme.body_alpha))
            .unwrap_or(self.theme.body_fallback)
    }

    fn paint_body(&self, body: &Body, surface: &mut dyn Surface) {
        surface.fill_circle(body.pos, body.radius, self.body_color(body));
        surface.stroke_circle(body.pos, body.radius, self.theme.body_stroke, 2.0);

        if !self.theme.show_labels {
            return;
        }
        if let Some(payload) = &body.payload {
            let font = Font {
                size: self.theme.label_size,
                bold: true,
            };
            surface.fill_text(&payload.label, body.pos, self.theme.label, font);
        }
    }

    fn paint_scanlines(&self, surface: &mut dyn Surface) {
        let size = surface.size();
        let mut y = 0.0;
        while y < size.y {
            let line = Rect::new(Vec2::new(0.0, y), Vec2::new(size.x, y + 1.0));
            surface.fill_rect(line, self.theme.scanline);
            y += SCANLINE_SPACING;
        }
    }
}
