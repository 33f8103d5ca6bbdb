//! Simulation field
//!
//! Owns one arena plus the engine that advances it: either the built-in
//! drift integrator or an injected [`PhysicsBackend`]. The choice is made once,
//! at construction.

use glam::Vec2;

use super::backend::{BackendWorld, PhysicsBackend};
use super::config::SimulationConfig;
use super::layout::populate;
use super::state::{Arena, GateState, Obstacle, Payload};
use super::tick;

#[derive(Debug)]
enum Engine {
    Builtin,
    External {
        backend: Box<dyn PhysicsBackend>,
        world: BackendWorld,
    },
}

/// A populated arena and the engine stepping it
#[derive(Debug)]
pub struct SimulationField {
    arena: Arena,
    config: SimulationConfig,
    payloads: Vec<Payload>,
    engine: Engine,
}

impl SimulationField {
    /// Field driven by the built-in integrator
    pub fn new(width: f32, height: f32, payloads: Vec<Payload>, config: SimulationConfig) -> Self {
        Self::with_backend(width, height, payloads, config, None)
    }

    /// Field driven by `backend` when one is supplied, else the built-in integrator
    pub fn with_backend(
        width: f32,
        height: f32,
        payloads: Vec<Payload>,
        config: SimulationConfig,
        backend: Option<Box<dyn PhysicsBackend>>,
    ) -> Self {
        let mut arena = Arena::new(width, height);
        populate(&mut arena, &payloads, &config);

        let engine = match backend {
            Some(mut backend) => {
                log::info!("Physics backend: {}", backend.name());
                let world = load_world(backend.as_mut(), &arena, &config);
                Engine::External { backend, world }
            }
            None => {
                log::info!("No physics backend - using built-in integrator");
                Engine::Builtin
            }
        };

        Self {
            arena,
            config,
            payloads,
            engine,
        }
    }

    /// Rebuild for new dimensions, keeping payloads, config and backend
    pub fn resized(self, width: f32, height: f32) -> Self {
        let backend = match self.engine {
            Engine::External { backend, .. } => Some(backend),
            Engine::Builtin => None,
        };
        Self::with_backend(width, height, self.payloads, self.config, backend)
    }

    pub fn arena(&self) -> &Arena {
        &self.arena
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn payloads(&self) -> &[Payload] {
        &self.payloads
    }

    pub fn is_inert(&self) -> bool {
        self.arena.is_inert()
    }

    pub fn uses_backend(&self) -> bool {
        matches!(self.engine, Engine::External { .. })
    }

    pub fn gate_state(&self) -> Option<GateState> {
        self.arena.gate_state()
    }

    /// True once every body has come to rest after a release
    pub fn all_settled(&self) -> bool {
        !self.arena.bodies.is_empty() && self.arena.bodies.iter().all(|b| b.settled)
    }

    /// Advance by `dt` seconds; `elapsed` is the time since the field started
    pub fn step(&mut self, dt: f32, elapsed: f32) {
        match &mut self.engine {
            Engine::Builtin => tick::step(&mut self.arena, &self.config, dt, elapsed),
            Engine::External { backend, world } => {
                if self.arena.is_inert() {
                    return;
                }
                let dt = self.config.clamp_dt(dt);
                if dt == 0.0 {
                    return;
                }

                backend.step(dt);
                for (body, handle) in self.arena.bodies.iter_mut().zip(&world.bodies) {
                    if let Some((pos, vel)) = backend.body_state(*handle) {
                        body.pos = pos;
                        body.vel = vel;
                    }
                }
                tick::mark_settled(&mut self.arena, &self.config);
            }
        }
    }

    /// Open the gate. Does nothing if it is already open or there is none.
    pub fn release(&mut self) {
        if !self.arena.open_gate() {
            return;
        }
        if let Engine::External { backend, world } = &mut self.engine {
            if let Some(handle) = world.gate.take() {
                backend.remove(handle);
            }
        }
        log::info!("Gate released ({} bodies)", self.arena.bodies.len());
    }

    /// Restore the initial layout: closed gate, bodies home at rest
    pub fn reset(&mut self) {
        populate(&mut self.arena, &self.payloads, &self.config);
        for body in &mut self.arena.bodies {
            body.vel = Vec2::ZERO;
        }

        if let Engine::External { backend, world } = &mut self.engine {
            if let Some(handle) = world.gate.take() {
                backend.remove(handle);
            }
            for (body, handle) in self.arena.bodies.iter().zip(&world.bodies) {
                backend.teleport(*handle, body.pos, Vec2::ZERO);
            }
            world.gate = self
                .arena
                .obstacles
                .iter()
                .find(|o| o.is_gate() && o.is_solid())
                .map(|gate| backend.insert_static(gate));
        }
        log::info!("Field reset");
    }
}

/// Mirror a freshly populated arena into the backend
fn load_world(backend: &mut dyn PhysicsBackend, arena: &Arena, config: &SimulationConfig) -> BackendWorld {
    backend.clear();
    let mut world = BackendWorld::default();
    if arena.is_inert() {
        return world;
    }

    backend.set_gravity(Vec2::new(0.0, config.gravity));
    for wall in arena.walls() {
        backend.insert_static(&wall);
    }
    for obstacle in arena.containment() {
        let handle = backend.insert_static(obstacle);
        if matches!(obstacle, Obstacle::Gate { .. }) {
            world.gate = Some(handle);
        }
    }
    world.bodies = arena.bodies.iter().map(|b| backend.insert_body(b)).collect();
    world
}
