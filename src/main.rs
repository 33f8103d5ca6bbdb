//! Plinko Field entry point
//!
//! On the web, mounts the widget on `#canvas` and wires its controls. Natively,
//! runs a headless drop and prints the final state as JSON.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod web_widget {
    use wasm_bindgen::prelude::*;
    use web_sys::{HtmlCanvasElement, VisibilityState};

    use plinko_field::content;
    use plinko_field::platform::{AnimationLoop, FrameDriver, FrameScheduler};
    use plinko_field::renderer::{CanvasSurface, Theme};
    use plinko_field::settings::Settings;
    use plinko_field::sim::{Layout, SimulationConfig};

    /// Widget height in CSS pixels
    const CANVAS_HEIGHT: u32 = 700;

    type Widget = AnimationLoop<CanvasSurface>;

    /// Match the canvas to its container width; returns the new size
    fn fit_canvas(canvas: &HtmlCanvasElement) -> (u32, u32) {
        let width = canvas
            .parent_element()
            .map(|p| p.client_width())
            .unwrap_or_else(|| canvas.client_width())
            .max(0) as u32;
        canvas.set_width(width);
        canvas.set_height(CANVAS_HEIGHT);
        (width, CANVAS_HEIGHT)
    }

    pub fn run() {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info).expect("Failed to init logger");

        log::info!("Plinko Field starting...");

        let window = web_sys::window().expect("no window");
        let document = window.document().expect("no document");

        let canvas: Option<HtmlCanvasElement> = document
            .get_element_by_id("canvas")
            .and_then(|el| el.dyn_into().ok());

        let layout = canvas
            .as_ref()
            .and_then(|c| c.get_attribute("data-layout"))
            .and_then(|s| Layout::from_str(&s))
            .unwrap_or(Layout::Plinko);
        let (payloads, base_theme) = match layout {
            Layout::Plinko => (content::tech_icons(), Theme::plinko()),
            Layout::Floating => (content::floating_labels(), Theme::floating()),
        };

        let settings = Settings::load();
        let mut config = SimulationConfig::for_layout(layout);
        config.seed = js_sys::Date::now() as u64;
        settings.apply(&mut config);

        let surface = canvas.clone().and_then(|c| {
            fit_canvas(&c);
            CanvasSurface::new(c)
        });
        let mut driver = FrameDriver::mount(surface, payloads, config, None);
        driver.painter_mut().set_theme(settings.theme(base_theme));

        let mut widget = AnimationLoop::new(driver);
        setup_buttons(&widget);
        if let Some(canvas) = canvas {
            setup_resize(&widget, canvas);
        }
        if settings.pause_when_hidden {
            setup_visibility(&widget);
        }
        widget.start();
    }

    fn on_click(id: &str, widget: &Widget, action: fn(&Widget)) {
        let Some(document) = web_sys::window().and_then(|w| w.document()) else {
            return;
        };
        let Some(btn) = document.get_element_by_id(id) else {
            log::debug!("No #{id} button");
            return;
        };

        let widget = widget.clone();
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::MouseEvent| {
            action(&widget);
        });
        let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn setup_buttons(widget: &Widget) {
        on_click("drop-btn", widget, |w| w.driver().borrow_mut().release());
        on_click("reset-btn", widget, |w| w.driver().borrow_mut().reset());
    }

    fn setup_resize(widget: &Widget, canvas: HtmlCanvasElement) {
        let Some(window) = web_sys::window() else {
            return;
        };

        let widget = widget.clone();
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
            let (width, height) = fit_canvas(&canvas);
            widget.driver().borrow_mut().resize(width as f32, height as f32);
        });
        let _ = window.add_event_listener_with_callback("resize", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn setup_visibility(widget: &Widget) {
        let Some(document) = web_sys::window().and_then(|w| w.document()) else {
            return;
        };

        let mut widget = widget.clone();
        let document_clone = document.clone();
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
            if document_clone.visibility_state() == VisibilityState::Hidden {
                widget.stop();
                log::info!("Paused (tab hidden)");
            } else {
                widget.start();
                log::info!("Resumed");
            }
        });
        let _ = document
            .add_event_listener_with_callback("visibilitychange", closure.as_ref().unchecked_ref());
        closure.forget();
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() {
    web_widget::run();
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use plinko_field::content;
    use plinko_field::platform::{FrameDriver, FrameScheduler, ManualScheduler};
    use plinko_field::renderer::DisplayList;
    use plinko_field::sim::SimulationConfig;

    const FRAMES: u32 = 300;
    const DT: f32 = 1.0 / 60.0;

    env_logger::init();
    log::info!("Plinko Field (native) starting...");
    log::info!("Native mode runs a headless drop - build for wasm32 for the web version");

    let config = std::env::args()
        .nth(1)
        .and_then(|path| match std::fs::read_to_string(&path) {
            Ok(json) => SimulationConfig::from_json(&json),
            Err(e) => {
                log::warn!("Cannot read config {path}: {e}");
                None
            }
        })
        .unwrap_or_else(SimulationConfig::plinko);

    let driver = FrameDriver::mount(
        Some(DisplayList::new(400.0, 700.0)),
        content::tech_icons(),
        config,
        None,
    );
    let mut scheduler = ManualScheduler::new(driver);
    scheduler.start();
    scheduler.advance(DT);
    scheduler.driver_mut().release();
    scheduler.run(FRAMES, DT);

    let driver = scheduler.driver();
    let Some(field) = driver.field() else {
        log::error!("Field missing after drop");
        return;
    };
    let snapshot = serde_json::json!({
        "frames": FRAMES,
        "elapsed": driver.elapsed(),
        "gate": field.gate_state(),
        "all_settled": field.all_settled(),
        "bodies": field.arena().bodies,
        "draw_commands": driver.surface().map(|s| s.last_frame().len()),
    });
    match serde_json::to_string_pretty(&snapshot) {
        Ok(json) => println!("{json}"),
        Err(e) => log::error!("Failed to serialize snapshot: {e}"),
    }
}
