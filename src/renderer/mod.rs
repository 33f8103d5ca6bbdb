//! Rendering module
//!
//! Paints simulation state through a small 2D [`Surface`] trait. The browser
//! build draws with Canvas 2D; tests and the native binary record into a
//! [`DisplayList`].

pub mod color;
pub mod painter;
pub mod surface;

#[cfg(target_arch = "wasm32")]
pub mod canvas;

#[cfg(target_arch = "wasm32")]
pub use canvas::CanvasSurface;
pub use color::Color;
pub use painter::{Painter, Theme};
pub use surface::{DisplayList, DrawCommand, Font, NullSurface, Surface};
