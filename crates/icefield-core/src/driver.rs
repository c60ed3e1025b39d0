use crate::frame_loop::FrameTask;
use crate::scene::{SceneManager, SceneRenderer};
use std::cell::RefCell;
use std::rc::Rc;

/// Top-level per-frame tick: advance the scene camera, then draw.
///
/// Elapsed time is measured from the first timestamp this driver sees, so
/// the orbit starts at `t = 0` regardless of page age.
pub struct FrameDriver<R> {
    scene: Rc<RefCell<SceneManager<R>>>,
    origin_ms: Option<f64>,
    frames: u64,
    render_errors: u64,
}

impl<R: SceneRenderer> FrameDriver<R> {
    pub fn new(scene: Rc<RefCell<SceneManager<R>>>) -> Self {
        Self {
            scene,
            origin_ms: None,
            frames: 0,
            render_errors: 0,
        }
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn render_errors(&self) -> u64 {
        self.render_errors
    }

    /// Milliseconds since the first tick.
    pub fn elapsed_ms(&mut self, timestamp_ms: f64) -> f64 {
        let origin = *self.origin_ms.get_or_insert(timestamp_ms);
        (timestamp_ms - origin).max(0.0)
    }
}

impl<R: SceneRenderer> FrameTask for FrameDriver<R> {
    fn tick(&mut self, timestamp_ms: f64) {
        let elapsed = self.elapsed_ms(timestamp_ms);
        let mut scene = self.scene.borrow_mut();
        scene.update(elapsed);
        if let Err(e) = scene.render() {
            // only the first failure is logged at error level
            if self.render_errors == 0 {
                log::error!("[driver] render failed: {}", e);
            } else {
                log::debug!("[driver] render failed: {}", e);
            }
            self.render_errors += 1;
        }
        self.frames += 1;
    }

    fn finish(&mut self) {
        log::info!(
            "[driver] stopped after {} frames ({} render errors)",
            self.frames,
            self.render_errors
        );
    }
}
