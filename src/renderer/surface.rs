//! Minimal 2D drawing surface
//!
//! The painter only needs filled/stroked circles and rectangles plus text.
//! Hosts implement [`Surface`] over whatever they draw with.

use glam::Vec2;
use serde::Serialize;

use super::color::Color;
use crate::sim::Rect;

/// Text styling for [`Surface::fill_text`]
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Font {
    pub size: f32,
    pub bold: bool,
}

impl Font {
    pub fn to_css(&self) -> String {
        let weight = if self.bold { "bold " } else { "" };
        format!("{weight}{}px monospace", self.size)
    }
}

/// Host drawing surface in device pixels
pub trait Surface {
    /// Current drawable size (width, height)
    fn size(&self) -> Vec2;

    fn clear(&mut self, color: Color);

    fn fill_circle(&mut self, center: Vec2, radius: f32, color: Color);

    fn stroke_circle(&mut self, center: Vec2, radius: f32, color: Color, width: f32);

    fn fill_rect(&mut self, rect: Rect, color: Color);

    fn stroke_rect(&mut self, rect: Rect, color: Color, width: f32);

    /// Text centred on `pos`
    fn fill_text(&mut self, text: &str, pos: Vec2, color: Color, font: Font);
}

/// Surface that draws nothing
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSurface {
    pub size: Vec2,
}

impl Surface for NullSurface {
    fn size(&self) -> Vec2 {
        self.size
    }

    fn clear(&mut self, _color: Color) {}

    fn fill_circle(&mut self, _center: Vec2, _radius: f32, _color: Color) {}

    fn stroke_circle(&mut self, _center: Vec2, _radius: f32, _color: Color, _width: f32) {}

    fn fill_rect(&mut self, _rect: Rect, _color: Color) {}

    fn stroke_rect(&mut self, _rect: Rect, _color: Color, _width: f32) {}

    fn fill_text(&mut self, _text: &str, _pos: Vec2, _color: Color, _font: Font) {}
}

/// One recorded draw call
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum DrawCommand {
    Clear {
        color: Color,
    },
    FillCircle {
        center: Vec2,
        radius: f32,
        color: Color,
    },
    StrokeCircle {
        center: Vec2,
        radius: f32,
        color: Color,
        width: f32,
    },
    FillRect {
        min: Vec2,
        max: Vec2,
        color: Color,
    },
    StrokeRect {
        min: Vec2,
        max: Vec2,
        color: Color,
        width: f32,
    },
    FillText {
        text: String,
        pos: Vec2,
        color: Color,
        font: Font,
    },
}

/// Surface that records every call, for headless output and tests
#[derive(Debug, Clone, Default, Serialize)]
pub struct DisplayList {
    pub size: Vec2,
    pub commands: Vec<DrawCommand>,
}

impl DisplayList {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            size: Vec2::new(width.max(0.0), height.max(0.0)),
            commands: Vec::new(),
        }
    }

    /// Commands since the most recent clear
    pub fn last_frame(&self) -> &[DrawCommand] {
        let start = self
            .commands
            .iter()
            .rposition(|c| matches!(c, DrawCommand::Clear { .. }))
            .unwrap_or(0);
        &self.commands[start..]
    }
}

impl Surface for DisplayList {
    fn size(&self) -> Vec2 {
        self.size
    }

    fn clear(&mut self, color: Color) {
        self.commands.push(DrawCommand::Clear { color });
    }

    fn fill_circle(&mut self, center: Vec2, radius: f32, color: Color) {
        self.commands.push(DrawCommand::FillCircle {
            center,
            radius,
            color,
        });
    }

    fn stroke_circle(&mut self, center: Vec2, radius: f32, color: Color, width: f32) {
        self.commands.push(DrawCommand::StrokeCircle {
            center,
            radius,
            color,
            width,
        });
    }

    fn fill_rect(&mut self, rect: Rect, color: Color) {
        self.commands.push(DrawCommand::FillRect {
            min: rect.min,
            max: rect.max,
            color,
        });
    }

    fn stroke_rect(&mut self, rect: Rect, color: Color, width: f32) {
        self.commands.push(DrawCommand::StrokeRect {
            min: rect.min,
            max: rect.max,
            color,
            width,
        });
    }

    fn fill_text(&mut self, text: &str, pos: Vec2, color: Color, font: Font) {
        self.commands.push(DrawCommand::FillText {
            text: text.to_owned(),
            pos,
            color,
            font,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_font_css() {
        let font = Font {
            size: 12.0,
            bold: true,
        };
        assert_eq!(font.to_css(), "bold 12px monospace");
    }

    #[test]
    fn test_last_frame() {
        let mut list = DisplayList::new(100.0, 100.0);
        list.fill_circle(Vec2::ZERO, 1.0, Color::WHITE);
        list.clear(Color::TRANSPARENT);
        list.fill_circle(Vec2::ONE, 2.0, Color::WHITE);

        let frame = list.last_frame();
        assert_eq!(frame.len(), 2);
        assert!(matches!(frame[0], DrawCommand::Clear { .. }));
    }

    #[test]
    fn test_display_list_serializes() {
        let mut list = DisplayList::new(10.0, 10.0);
        list.fill_rect(Rect::new(Vec2::ZERO, Vec2::ONE), Color::WHITE);
        let json = serde_json::to_string(&list).unwrap_or_default();
        assert!(json.contains("\"op\":\"fill_rect\""));
    }
}
