use icefield_core::{FrameCallback, FrameScheduler, ScheduleError};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys as web;

/// `requestAnimationFrame`-backed scheduler.
///
/// Each request hands the browser a one-shot closure that frees itself
/// after running, so stopped loops leave nothing behind.
pub struct RafScheduler {
    window: web::Window,
}

impl RafScheduler {
    pub fn new(window: web::Window) -> Self {
        Self { window }
    }
}

impl FrameScheduler for RafScheduler {
    fn request_frame(&self, callback: FrameCallback) -> Result<(), ScheduleError> {
        let js = Closure::once_into_js(move |timestamp_ms: f64| callback(timestamp_ms));
        self.window
            .request_animation_frame(js.unchecked_ref())
            .map(|_| ())
            .map_err(|e| ScheduleError::Rejected(format!("{:?}", e)))
    }
}
