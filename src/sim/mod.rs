//! Simulation module
//!
//! Everything that moves lives here. This module has no rendering or platform
//! dependencies:
//! - Variable timestep, clamped to `max_dt`
//! - Seeded RNG only (layout and drift phases)
//! - Stable body order (by id)

pub mod backend;
pub mod collision;
pub mod config;
pub mod field;
pub mod layout;
pub mod state;
pub mod tick;

pub use backend::{BackendHandle, PhysicsBackend};
pub use collision::{CollisionResult, relax, resolve_pairs, separate};
pub use config::{Layout, SimulationConfig};
pub use field::SimulationField;
pub use layout::populate;
pub use state::{Arena, Body, GateState, Obstacle, Payload, Rect};
pub use tick::step;
