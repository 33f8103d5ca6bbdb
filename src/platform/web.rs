//! Browser animation loop
//!
//! Binds a [`FrameDriver`] to `requestAnimationFrame`. The pending request id
//! is kept so `stop` can cancel it before it fires.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;

use super::driver::{FrameDriver, FrameScheduler};
use crate::renderer::Surface;

/// `requestAnimationFrame` scheduler sharing its driver with event handlers
pub struct AnimationLoop<S: Surface + 'static> {
    driver: Rc<RefCell<FrameDriver<S>>>,
    pending: Rc<Cell<Option<i32>>>,
}

impl<S: Surface + 'static> Clone for AnimationLoop<S> {
    fn clone(&self) -> Self {
        Self {
            driver: self.driver.clone(),
            pending: self.pending.clone(),
        }
    }
}

impl<S: Surface + 'static> AnimationLoop<S> {
    pub fn new(driver: FrameDriver<S>) -> Self {
        Self {
            driver: Rc::new(RefCell::new(driver)),
            pending: Rc::new(Cell::new(None)),
        }
    }

    pub fn driver(&self) -> &Rc<RefCell<FrameDriver<S>>> {
        &self.driver
    }

    /// Stop, then drop everything the driver holds
    pub fn destroy(&mut self) {
        self.stop();
        self.driver.borrow_mut().destroy();
    }

    fn request_frame(driver: Rc<RefCell<FrameDriver<S>>>, pending: Rc<Cell<Option<i32>>>) {
        let Some(window) = web_sys::window() else {
            return;
        };

        let next = pending.clone();
        let callback = Closure::once_into_js(move |time: f64| {
            next.set(None);
            let again = driver.borrow_mut().frame(time);
            if again {
                Self::request_frame(driver, next);
            }
        });

        match window.request_animation_frame(callback.unchecked_ref()) {
            Ok(id) => pending.set(Some(id)),
            Err(e) => log::warn!("requestAnimationFrame failed: {e:?}"),
        }
    }
}

impl<S: Surface + 'static> FrameScheduler for AnimationLoop<S> {
    fn start(&mut self) {
        self.driver.borrow_mut().start();
        if self.is_running() && self.pending.get().is_none() {
            Self::request_frame(self.driver.clone(), self.pending.clone());
        }
    }

    fn stop(&mut self) {
        self.driver.borrow_mut().stop();
        if let Some(id) = self.pending.take() {
            if let Some(window) = web_sys::window() {
                let _ = window.cancel_animation_frame(id);
            }
        }
    }

    fn is_running(&self) -> bool {
        self.driver.borrow().is_running()
    }
}
