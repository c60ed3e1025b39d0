use crate::audio::WebAnalyser;
use crate::layers::VideoLayer;
use icefield_core::{AnalyserConfig, ElementKind, InitError, PageHost, ViewportMetrics};
use wasm_bindgen::JsCast;
use web_sys as web;

/// Look up `id` and check it is a `T`.
pub fn element_by_id<T: JsCast>(
    document: &web::Document,
    id: &str,
    kind: ElementKind,
) -> Result<T, InitError> {
    let el = document
        .get_element_by_id(id)
        .ok_or_else(|| InitError::MissingElement {
            id: id.to_string(),
            kind,
        })?;
    el.dyn_into::<T>().map_err(|_| InitError::WrongElementType {
        id: id.to_string(),
        kind,
    })
}

/// Viewport size and pixel density, read once.
pub fn read_viewport(window: &web::Window) -> ViewportMetrics {
    let number = |v: Result<wasm_bindgen::JsValue, wasm_bindgen::JsValue>| {
        v.ok().and_then(|v| v.as_f64()).unwrap_or(0.0)
    };
    ViewportMetrics::new(
        number(window.inner_width()),
        number(window.inner_height()),
        window.device_pixel_ratio(),
    )
}

/// Size a canvas: CSS size from the viewport, backing store scaled by the
/// pixel density.
pub fn size_canvas(canvas: &web::HtmlCanvasElement, viewport: &ViewportMetrics) {
    let (w, h) = viewport.backing_size();
    canvas.set_width(w);
    canvas.set_height(h);
    let style = canvas.style();
    _ = style.set_property("width", &format!("{}px", viewport.width));
    _ = style.set_property("height", &format!("{}px", viewport.height));
}

/// The live document as a [`PageHost`].
pub struct WebPage {
    window: web::Window,
    document: web::Document,
}

impl WebPage {
    pub fn new(window: web::Window, document: web::Document) -> Self {
        Self { window, document }
    }

    pub fn document(&self) -> &web::Document {
        &self.document
    }
}

impl PageHost for WebPage {
    type Surface = VideoLayer;
    type Analyser = WebAnalyser;

    fn viewport(&self) -> ViewportMetrics {
        read_viewport(&self.window)
    }

    fn layer_surface(&self, canvas_id: &str, video_id: &str) -> Result<VideoLayer, InitError> {
        let canvas: web::HtmlCanvasElement =
            element_by_id(&self.document, canvas_id, ElementKind::Canvas)?;
        let video: web::HtmlVideoElement =
            element_by_id(&self.document, video_id, ElementKind::Video)?;
        VideoLayer::new(canvas, video)
            .map_err(|e| InitError::Host(format!("#{}: {}", canvas_id, e)))
    }

    fn audio_source(
        &self,
        audio_id: &str,
        config: &AnalyserConfig,
    ) -> Result<Option<WebAnalyser>, InitError> {
        let audio: web::HtmlAudioElement =
            element_by_id(&self.document, audio_id, ElementKind::Audio)?;
        match WebAnalyser::new(&audio, config) {
            Ok(analyser) => Ok(Some(analyser)),
            Err(e) => {
                log::warn!("[audio] analysis graph unavailable: {:?}", e);
                Ok(None)
            }
        }
    }
}
