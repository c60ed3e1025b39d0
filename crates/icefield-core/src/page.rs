//! Page bootstrap: resolve every required element, then start the layers.
//!
//! All fatal checks happen in [`prepare_page`]; nothing is scheduled until it
//! has returned `Ok`, so a broken page never leaves a half-started loop.

use crate::analyser::{AnalyserConfig, AudioAnalysis, ConfigError, FrequencySource};
use crate::compositor::{Compositor, LayerSurface};
use crate::constants::*;
use crate::frame_loop::{spawn_loop, FrameScheduler, LoopHandle, ScheduleError};
use crate::viewport::ViewportMetrics;
use std::fmt;
use std::rc::Rc;
use thiserror::Error;

/// DOM ids of the elements the page must provide.
#[derive(Clone, Debug, PartialEq)]
pub struct ElementIds {
    pub audio: String,
    pub background_canvas: String,
    pub grain_canvas: String,
    pub background_video: String,
    pub grain_video: String,
}

impl Default for ElementIds {
    fn default() -> Self {
        Self {
            audio: AUDIO_ELEMENT_ID.into(),
            background_canvas: BACKGROUND_CANVAS_ID.into(),
            grain_canvas: GRAIN_CANVAS_ID.into(),
            background_video: BACKGROUND_VIDEO_ID.into(),
            grain_video: GRAIN_VIDEO_ID.into(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ElementKind {
    Audio,
    Canvas,
    Video,
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ElementKind::Audio => "<audio>",
            ElementKind::Canvas => "<canvas>",
            ElementKind::Video => "<video>",
        })
    }
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum InitError {
    #[error("required {kind} element #{id} is missing")]
    MissingElement { id: String, kind: ElementKind },
    #[error("element #{id} is not a {kind}")]
    WrongElementType { id: String, kind: ElementKind },
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("host error: {0}")]
    Host(String),
}

/// Platform access needed to bring the page up.
pub trait PageHost {
    type Surface: LayerSurface;
    type Analyser: FrequencySource;

    fn viewport(&self) -> ViewportMetrics;

    /// Bind a 2D canvas to a video element. Lookup only, no side effects.
    fn layer_surface(&self, canvas_id: &str, video_id: &str) -> Result<Self::Surface, InitError>;

    /// Resolve the audio element and build its analysis graph. A missing
    /// element is an error; an unsupported audio stack yields `Ok(None)`.
    fn audio_source(
        &self,
        audio_id: &str,
        config: &AnalyserConfig,
    ) -> Result<Option<Self::Analyser>, InitError>;
}

/// Everything resolved and built, nothing running yet.
pub struct PreparedPage<H: PageHost> {
    pub viewport: ViewportMetrics,
    pub compositor: Compositor<H::Surface>,
    pub analysis: AudioAnalysis<H::Analyser>,
}

/// The page after its compositor loop has started.
pub struct RunningPage<A> {
    pub viewport: ViewportMetrics,
    pub analysis: AudioAnalysis<A>,
    pub compositor_loop: LoopHandle,
}

pub fn prepare_page<H: PageHost>(
    host: &H,
    ids: &ElementIds,
    analyser_config: AnalyserConfig,
) -> Result<PreparedPage<H>, InitError> {
    analyser_config.validate()?;
    let viewport = host.viewport();

    let background = host.layer_surface(&ids.background_canvas, &ids.background_video)?;
    let grain = host.layer_surface(&ids.grain_canvas, &ids.grain_video)?;
    let compositor = Compositor::new()
        .with_layer(BACKGROUND_LAYER, background)
        .with_layer(GRAIN_LAYER, grain);

    // audio last: it is the only step that builds anything on the host
    let source = host.audio_source(&ids.audio, &analyser_config)?;
    if source.is_none() {
        log::warn!("[page] audio analysis unavailable, continuing without it");
    }
    let analysis = AudioAnalysis::new(analyser_config, source)?;

    Ok(PreparedPage {
        viewport,
        compositor,
        analysis,
    })
}

impl<H: PageHost> PreparedPage<H>
where
    H::Surface: 'static,
{
    /// Configure surfaces, start playback and spawn the compositor loop.
    pub fn start_layers<S>(
        mut self,
        scheduler: Rc<S>,
    ) -> Result<RunningPage<H::Analyser>, ScheduleError>
    where
        S: FrameScheduler + 'static,
    {
        self.compositor.configure(&self.viewport);
        self.compositor.start_playback();
        let compositor_loop = spawn_loop("compositor", scheduler, self.compositor)?;
        Ok(RunningPage {
            viewport: self.viewport,
            analysis: self.analysis,
            compositor_loop,
        })
    }
}
