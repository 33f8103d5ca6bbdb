//! Frame driver
//!
//! One driver owns one field, one painter and one surface. Each frame it
//! computes `dt` from the host clock, steps the field and paints it. Hosts
//! decide *when* frames happen through a [`FrameScheduler`].

use crate::renderer::{Painter, Surface, Theme};
use crate::sim::{Layout, Payload, PhysicsBackend, SimulationConfig, SimulationField};

/// Starts and stops per-frame callbacks for a driver
pub trait FrameScheduler {
    fn start(&mut self);
    fn stop(&mut self);
    fn is_running(&self) -> bool;
}

/// Owns the simulation and its surface for the lifetime of one widget
#[derive(Debug)]
pub struct FrameDriver<S: Surface> {
    field: Option<SimulationField>,
    painter: Painter,
    surface: Option<S>,
    /// Host timestamp of the previous frame (ms)
    last_time: Option<f64>,
    /// Simulated seconds since mount
    elapsed: f32,
    running: bool,
    destroyed: bool,
    drop_logged: bool,
}

impl<S: Surface> FrameDriver<S> {
    /// Build a driver over `surface`. A missing or zero-sized surface leaves
    /// the field inert.
    pub fn mount(
        surface: Option<S>,
        payloads: Vec<Payload>,
        config: SimulationConfig,
        backend: Option<Box<dyn PhysicsBackend>>,
    ) -> Self {
        let size = surface.as_ref().map(|s| s.size()).unwrap_or_default();
        if surface.is_none() {
            log::warn!("No drawing surface - simulation stays inert");
        } else if size.x <= 0.0 || size.y <= 0.0 {
            log::warn!("Drawing surface is {}x{} - simulation stays inert", size.x, size.y);
        }

        let theme = match config.layout {
            Layout::Plinko => Theme::plinko(),
            Layout::Floating => Theme::floating(),
        };
        let field = SimulationField::with_backend(size.x, size.y, payloads, config, backend);
        log::info!(
            "Mounted {} field {}x{} ({} bodies)",
            field.config().layout.as_str(),
            size.x,
            size.y,
            field.arena().bodies.len()
        );

        Self {
            field: Some(field),
            painter: Painter::new(theme),
            surface,
            last_time: None,
            elapsed: 0.0,
            running: false,
            destroyed: false,
            drop_logged: false,
        }
    }

    pub fn field(&self) -> Option<&SimulationField> {
        self.field.as_ref()
    }

    pub fn surface(&self) -> Option<&S> {
        self.surface.as_ref()
    }

    pub fn painter_mut(&mut self) -> &mut Painter {
        &mut self.painter
    }

    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    /// Begin accepting frames. Refused once destroyed.
    pub fn start(&mut self) {
        if self.destroyed {
            log::warn!("Ignoring start on a destroyed driver");
            return;
        }
        if !self.running {
            self.running = true;
            // Time spent stopped is not simulated
            self.last_time = None;
        }
    }

    pub fn stop(&mut self) {
        self.running = false;
    }

    /// Run one frame at host time `now_ms`. Returns whether the host should
    /// schedule another.
    pub fn frame(&mut self, now_ms: f64) -> bool {
        if !self.running || self.destroyed {
            return false;
        }
        let Some(field) = self.field.as_mut() else {
            return false;
        };

        let raw_dt = self
            .last_time
            .map(|last| ((now_ms - last) / 1000.0) as f32)
            .unwrap_or(0.0);
        self.last_time = Some(now_ms);

        let dt = field.config().clamp_dt(raw_dt);
        self.elapsed += dt;
        field.step(dt, self.elapsed);

        if !self.drop_logged && field.all_settled() {
            self.drop_logged = true;
            log::info!("All bodies settled after {:.1}s", self.elapsed);
        }

        if let Some(surface) = self.surface.as_mut() {
            self.painter.paint(field.arena(), surface, self.elapsed);
        }
        true
    }

    /// Rebuild the field for new host dimensions. The old arena is dropped and
    /// the new one fully built before the next frame sees it.
    pub fn resize(&mut self, width: f32, height: f32) {
        if self.destroyed {
            return;
        }
        let (width, height) = if self.surface.is_some() {
            (width, height)
        } else {
            (0.0, 0.0)
        };

        if let Some(field) = self.field.take() {
            log::debug!("Resizing field to {width}x{height}");
            self.field = Some(field.resized(width, height));
        }
        self.drop_logged = false;
    }

    /// Open the gate
    pub fn release(&mut self) {
        if self.destroyed {
            return;
        }
        if let Some(field) = self.field.as_mut() {
            field.release();
        }
    }

    /// Return to the initial layout
    pub fn reset(&mut self) {
        if self.destroyed {
            return;
        }
        if let Some(field) = self.field.as_mut() {
            field.reset();
        }
        self.drop_logged = false;
    }

    /// Stop for good and drop the field and surface
    pub fn destroy(&mut self) {
        if self.destroyed {
            return;
        }
        self.running = false;
        self.destroyed = true;
        self.field = None;
        self.surface = None;
        log::info!("Frame driver destroyed");
    }
}

/// Scheduler driven by hand, with a synthetic clock
#[derive(Debug)]
pub struct ManualScheduler<S: Surface> {
    driver: FrameDriver<S>,
    clock_ms: f64,
}

impl<S: Surface> ManualScheduler<S> {
    pub fn new(driver: FrameDriver<S>) -> Self {
        Self {
            driver,
            clock_ms: 0.0,
        }
    }

    pub fn driver(&self) -> &FrameDriver<S> {
        &self.driver
    }

    pub fn driver_mut(&mut self) -> &mut FrameDriver<S> {
        &mut self.driver
    }

    /// Move the clock forward `dt` seconds and run one frame if started
    pub fn advance(&mut self, dt: f32) -> bool {
        self.clock_ms += dt as f64 * 1000.0;
        self.driver.frame(self.clock_ms)
    }

    /// Advance `frames` times by `dt`
    pub fn run(&mut self, frames: u32, dt: f32) {
        for _ in 0..frames {
            if !self.advance(dt) {
                break;
            }
        }
    }
}

impl<S: Surface> FrameScheduler for ManualScheduler<S> {
    fn start(&mut self) {
        self.driver.start();
    }

    fn stop(&mut self) {
        self.driver.stop();
    }

    fn is_running(&self) -> bool {
        self.driver.is_running()
    }
}
