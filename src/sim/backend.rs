//! External physics engine seam
//!
//! A host may hand the field a full rigid-body engine at construction. When it
//! does, the engine owns integration and contacts and the field only mirrors
//! body state back into the arena. When it does not, the built-in integrator
//! runs instead.

use glam::Vec2;

use super::state::{Body, Obstacle};

/// Opaque handle to an object inside a backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BackendHandle(pub u32);

/// A rigid-body engine the field can delegate to
pub trait PhysicsBackend {
    /// Engine name for logging
    fn name(&self) -> &str;

    /// Drop every object and reset world settings
    fn clear(&mut self);

    /// Uniform world acceleration (px/s²)
    fn set_gravity(&mut self, gravity: Vec2);

    /// Add an immovable obstacle
    fn insert_static(&mut self, obstacle: &Obstacle) -> BackendHandle;

    /// Add a dynamic circular body
    fn insert_body(&mut self, body: &Body) -> BackendHandle;

    fn remove(&mut self, handle: BackendHandle);

    /// Move a body and set its velocity, clearing any spin
    fn teleport(&mut self, handle: BackendHandle, pos: Vec2, vel: Vec2);

    fn step(&mut self, dt: f32);

    /// Current position and velocity of a dynamic body
    fn body_state(&self, handle: BackendHandle) -> Option<(Vec2, Vec2)>;
}

/// Handles the field keeps for a populated backend world
#[derive(Debug, Default)]
pub(crate) struct BackendWorld {
    /// One per arena body, in arena order
    pub bodies: Vec<BackendHandle>,
    pub gate: Option<BackendHandle>,
}

impl std::fmt::Debug for dyn PhysicsBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PhysicsBackend")
            .field("name", &self.name())
            .finish()
    }
}
