//! Platform layer
//!
//! Frame scheduling and host glue:
//! - `driver`: frame driver plus a hand-cranked scheduler for tests and native runs
//! - `web`: `requestAnimationFrame` loop (wasm32 only)

pub mod driver;
#[cfg(target_arch = "wasm32")]
pub mod web;

pub use driver::{FrameDriver, FrameScheduler, ManualScheduler};
#[cfg(target_arch = "wasm32")]
pub use web::AnimationLoop;
