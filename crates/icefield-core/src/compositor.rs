//! Video-backed 2D layers repainted every frame.

use crate::frame_loop::FrameTask;
use crate::viewport::ViewportMetrics;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum SurfaceError {
    #[error("layer `{layer}` failed to draw: {reason}")]
    Draw { layer: String, reason: String },
    #[error("layer `{layer}` failed to start playback: {reason}")]
    Playback { layer: String, reason: String },
}

/// A 2D drawing surface bound to a looping video source.
pub trait LayerSurface {
    fn set_css_size(&mut self, width: f64, height: f64);
    fn set_backing_size(&mut self, width: u32, height: u32);
    /// Back to the identity transform.
    fn reset_transform(&mut self);
    fn scale(&mut self, x: f64, y: f64);
    /// Draw the current video frame into `(0, 0, width, height)` user units.
    fn draw_source(&mut self, width: f64, height: f64) -> Result<(), String>;
    fn play(&mut self) -> Result<(), String>;
}

struct Layer<S> {
    name: String,
    surface: S,
    failing: bool,
}

/// Owns the named layers and paints them at device pixel density.
pub struct Compositor<S> {
    layers: Vec<Layer<S>>,
    viewport: Option<ViewportMetrics>,
    frames: u64,
}

impl<S: LayerSurface> Default for Compositor<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: LayerSurface> Compositor<S> {
    pub fn new() -> Self {
        Self {
            layers: Vec::new(),
            viewport: None,
            frames: 0,
        }
    }

    pub fn with_layer(mut self, name: impl Into<String>, surface: S) -> Self {
        self.layers.push(Layer {
            name: name.into(),
            surface,
            failing: false,
        });
        self
    }

    /// Size every layer for `viewport`. Repeated calls with the same metrics
    /// give the same result: the transform is reset before scaling.
    pub fn configure(&mut self, viewport: &ViewportMetrics) {
        let (bw, bh) = viewport.backing_size();
        for layer in &mut self.layers {
            layer.surface.set_css_size(viewport.width, viewport.height);
            layer.surface.set_backing_size(bw, bh);
            layer.surface.reset_transform();
            layer
                .surface
                .scale(viewport.pixel_scale, viewport.pixel_scale);
        }
        self.viewport = Some(*viewport);
        log::info!(
            "[compositor] {} layers at {}x{} css, {}x{} backing",
            self.layers.len(),
            viewport.width,
            viewport.height,
            bw,
            bh
        );
    }

    /// Ask every video to play. Returns the rejections; none of them is fatal.
    pub fn start_playback(&mut self) -> Vec<SurfaceError> {
        let mut errors = Vec::new();
        for layer in &mut self.layers {
            if let Err(reason) = layer.surface.play() {
                let err = SurfaceError::Playback {
                    layer: layer.name.clone(),
                    reason,
                };
                log::warn!("[compositor] {}", err);
                errors.push(err);
            }
        }
        errors
    }

    /// Paint the current frame of every layer over its full extent.
    /// Failing layers are reported once until they recover.
    pub fn render_frame(&mut self) -> Vec<SurfaceError> {
        let mut errors = Vec::new();
        let Some(viewport) = self.viewport else {
            return errors;
        };
        for layer in &mut self.layers {
            match layer.surface.draw_source(viewport.width, viewport.height) {
                Ok(()) => {
                    if layer.failing {
                        log::info!("[compositor] layer `{}` recovered", layer.name);
                    }
                    layer.failing = false;
                }
                Err(reason) => {
                    let err = SurfaceError::Draw {
                        layer: layer.name.clone(),
                        reason,
                    };
                    if !layer.failing {
                        log::warn!("[compositor] {}", err);
                    }
                    layer.failing = true;
                    errors.push(err);
                }
            }
        }
        self.frames += 1;
        errors
    }

    pub fn layer(&self, name: &str) -> Option<&S> {
        self.layers
            .iter()
            .find(|l| l.name == name)
            .map(|l| &l.surface)
    }

    pub fn layer_names(&self) -> impl Iterator<Item = &str> {
        self.layers.iter().map(|l| l.name.as_str())
    }

    pub fn viewport(&self) -> Option<&ViewportMetrics> {
        self.viewport.as_ref()
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }
}

impl<S: LayerSurface> FrameTask for Compositor<S> {
    fn tick(&mut self, _timestamp_ms: f64) {
        self.render_frame();
    }

    fn finish(&mut self) {
        log::info!("[compositor] stopped after {} frames", self.frames);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Records surface state like a 2D canvas: a current transform scale,
    /// a backing size and the device-pixel extent of the last draw.
    #[derive(Default)]
    struct FakeSurface {
        css: (f64, f64),
        backing: (u32, u32),
        transform: f64,
        drawn: Option<(f64, f64)>,
        fail_draw: bool,
        fail_play: bool,
    }

    impl LayerSurface for FakeSurface {
        fn set_css_size(&mut self, width: f64, height: f64) {
            self.css = (width, height);
        }
        fn set_backing_size(&mut self, width: u32, height: u32) {
            self.backing = (width, height);
            self.transform = 1.0;
        }
        fn reset_transform(&mut self) {
            self.transform = 1.0;
        }
        fn scale(&mut self, x: f64, _y: f64) {
            self.transform *= x;
        }
        fn draw_source(&mut self, width: f64, height: f64) -> Result<(), String> {
            if self.fail_draw {
                return Err("not ready".into());
            }
            self.drawn = Some((width * self.transform, height * self.transform));
            Ok(())
        }
        fn play(&mut self) -> Result<(), String> {
            if self.fail_play {
                Err("autoplay blocked".into())
            } else {
                Ok(())
            }
        }
    }

    fn compositor() -> Compositor<FakeSurface> {
        Compositor::new()
            .with_layer("background", FakeSurface::default())
            .with_layer("grain", FakeSurface::default())
    }

    #[test]
    fn configure_sets_css_and_backing_size() {
        let mut c = compositor();
        c.configure(&ViewportMetrics::new(1920.0, 1080.0, 2.0));
        let bg = c.layer("background").unwrap();
        assert_eq!(bg.css, (1920.0, 1080.0));
        assert_eq!(bg.backing, (3840, 2160));
    }

    #[test]
    fn configure_twice_does_not_compound_scale() {
        let mut c = compositor();
        let vp = ViewportMetrics::new(800.0, 600.0, 2.0);
        c.configure(&vp);
        c.configure(&vp);
        let grain = c.layer("grain").unwrap();
        assert_eq!(grain.backing, (1600, 1200));
        // a unit square covers scale x scale device pixels
        assert_eq!(grain.transform * grain.transform, 4.0);
    }

    #[test]
    fn frame_covers_whole_backing_store() {
        let mut c = compositor();
        c.configure(&ViewportMetrics::new(1920.0, 1080.0, 2.0));
        assert!(c.render_frame().is_empty());
        for name in ["background", "grain"] {
            assert_eq!(c.layer(name).unwrap().drawn, Some((3840.0, 2160.0)));
        }
        assert_eq!(c.frames(), 1);
    }

    #[test]
    fn unconfigured_compositor_draws_nothing() {
        let mut c = compositor();
        c.tick(16.0);
        assert!(c.layer("background").unwrap().drawn.is_none());
    }

    #[test]
    fn draw_failures_do_not_stop_other_layers() {
        let mut c = Compositor::new()
            .with_layer(
                "background",
                FakeSurface {
                    fail_draw: true,
                    ..Default::default()
                },
            )
            .with_layer("grain", FakeSurface::default());
        c.configure(&ViewportMetrics::new(10.0, 10.0, 1.0));
        let errors = c.render_frame();
        assert_eq!(errors.len(), 1);
        assert!(matches!(&errors[0], SurfaceError::Draw { layer, .. } if layer == "background"));
        assert!(c.layer("grain").unwrap().drawn.is_some());
    }

    #[test]
    fn playback_rejection_is_reported() {
        let mut c = Compositor::new().with_layer(
            "grain",
            FakeSurface {
                fail_play: true,
                ..Default::default()
            },
        );
        let errors = c.start_playback();
        assert_eq!(errors.len(), 1);
        assert_eq!(c.layer_names().collect::<Vec<_>>(), vec!["grain"]);
    }
}
