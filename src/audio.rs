use icefield_core::{build_or_release, AnalyserConfig, FrequencySource};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use web_sys as web;

/// Web Audio graph `<audio>` → analyser → destination.
///
/// The element is routed through the analyser so it stays audible. The
/// context starts suspended under autoplay rules; a `play` listener on the
/// element resumes it.
pub struct WebAnalyser {
    audio_ctx: web::AudioContext,
    element: web::HtmlAudioElement,
    source: web::MediaElementAudioSourceNode,
    analyser: web::AnalyserNode,
    on_play: Option<Closure<dyn FnMut()>>,
}

impl WebAnalyser {
    /// Build the graph. If any step fails the new context is closed before
    /// the error is returned.
    pub fn new(element: &web::HtmlAudioElement, config: &AnalyserConfig) -> Result<Self, JsValue> {
        let audio_ctx = web::AudioContext::new()?;
        build_or_release(
            audio_ctx,
            |ctx| Self::build(ctx.clone(), element, config),
            |ctx| {
                _ = ctx.close();
            },
        )
    }

    fn build(
        audio_ctx: web::AudioContext,
        element: &web::HtmlAudioElement,
        config: &AnalyserConfig,
    ) -> Result<Self, JsValue> {
        let source = audio_ctx.create_media_element_source(element)?;
        let analyser = audio_ctx.create_analyser()?;
        analyser.set_fft_size(config.fft_size as u32);
        analyser.set_smoothing_time_constant(config.smoothing);
        analyser.set_min_decibels(config.min_decibels);
        analyser.set_max_decibels(config.max_decibels);

        source.connect_with_audio_node(&analyser)?;
        analyser.connect_with_audio_node(&audio_ctx.destination())?;

        let ctx_for_play = audio_ctx.clone();
        let on_play = Closure::wrap(Box::new(move || {
            _ = ctx_for_play.resume();
        }) as Box<dyn FnMut()>);
        element.add_event_listener_with_callback("play", on_play.as_ref().unchecked_ref())?;

        log::info!(
            "[audio] analyser fft={} bins={} smoothing={:.2}",
            analyser.fft_size(),
            analyser.frequency_bin_count(),
            analyser.smoothing_time_constant()
        );
        Ok(Self {
            audio_ctx,
            element: element.clone(),
            source,
            analyser,
            on_play: Some(on_play),
        })
    }
}

impl FrequencySource for WebAnalyser {
    fn fill_byte_frequency_data(&mut self, out: &mut [u8]) {
        let bins = self.analyser.frequency_bin_count() as usize;
        let n = bins.min(out.len());
        self.analyser.get_byte_frequency_data(&mut out[..n]);
    }

    fn dispose(&mut self) {
        if let Some(on_play) = self.on_play.take() {
            _ = self
                .element
                .remove_event_listener_with_callback("play", on_play.as_ref().unchecked_ref());
        }
        _ = self.source.disconnect();
        _ = self.analyser.disconnect();
        _ = self.audio_ctx.close();
    }
}

impl Drop for WebAnalyser {
    fn drop(&mut self) {
        if self.on_play.is_some() {
            self.dispose();
        }
    }
}
