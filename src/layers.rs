use icefield_core::LayerSurface;
use wasm_bindgen::JsCast;
use web_sys as web;

/// A 2D canvas repainted from a looping `<video>`.
pub struct VideoLayer {
    canvas: web::HtmlCanvasElement,
    ctx: web::CanvasRenderingContext2d,
    video: web::HtmlVideoElement,
}

impl VideoLayer {
    pub fn new(
        canvas: web::HtmlCanvasElement,
        video: web::HtmlVideoElement,
    ) -> anyhow::Result<Self> {
        let ctx = canvas
            .get_context("2d")
            .map_err(|e| anyhow::anyhow!("{:?}", e))?
            .ok_or_else(|| anyhow::anyhow!("2d context unavailable"))?
            .dyn_into::<web::CanvasRenderingContext2d>()
            .map_err(|e| anyhow::anyhow!("{:?}", e))?;
        video.set_loop(true);
        video.set_muted(true);
        Ok(Self { canvas, ctx, video })
    }
}

impl LayerSurface for VideoLayer {
    fn set_css_size(&mut self, width: f64, height: f64) {
        let style = self.canvas.style();
        _ = style.set_property("width", &format!("{}px", width));
        _ = style.set_property("height", &format!("{}px", height));
    }

    fn set_backing_size(&mut self, width: u32, height: u32) {
        self.canvas.set_width(width);
        self.canvas.set_height(height);
    }

    fn reset_transform(&mut self) {
        _ = self.ctx.set_transform(1.0, 0.0, 0.0, 1.0, 0.0, 0.0);
    }

    fn scale(&mut self, x: f64, y: f64) {
        _ = self.ctx.scale(x, y);
    }

    fn draw_source(&mut self, width: f64, height: f64) -> Result<(), String> {
        // nothing decoded yet
        if self.video.ready_state() < 2 {
            return Ok(());
        }
        self.ctx
            .draw_image_with_html_video_element_and_dw_and_dh(&self.video, 0.0, 0.0, width, height)
            .map_err(|e| format!("{:?}", e))
    }

    fn play(&mut self) -> Result<(), String> {
        let promise = self.video.play().map_err(|e| format!("{:?}", e))?;
        // autoplay rejections arrive asynchronously
        let id = self.video.id();
        wasm_bindgen_futures::spawn_local(async move {
            if let Err(e) = wasm_bindgen_futures::JsFuture::from(promise).await {
                log::warn!("[layers] #{} play() rejected: {:?}", id, e);
            }
        });
        Ok(())
    }
}
