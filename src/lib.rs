#![cfg(target_arch = "wasm32")]
use icefield_core::{
    load_scene_model, prepare_page, spawn_loop, AnalyserConfig, ElementIds, FrameDriver,
    LoopHandle, RunningPage, SceneConfig, SceneManager, ViewportMetrics,
};
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::spawn_local;
use web_sys as web;

mod assets;
mod audio;
mod constants;
mod dom;
mod events;
mod frame;
mod input;
mod layers;
mod render;

const SCENE_CANVAS_ID: &str = "scene";

/// Handles the page keeps after init so JS can sample audio or shut down.
struct App {
    page: RunningPage<audio::WebAnalyser>,
    scene_loop: Option<LoopHandle>,
}

impl App {
    fn shutdown(mut self) {
        self.page.compositor_loop.stop();
        if let Some(scene_loop) = self.scene_loop.take() {
            scene_loop.stop();
        }
        self.page.analysis.dispose();
    }
}

thread_local! {
    static APP: RefCell<Option<App>> = const { RefCell::new(None) };
}

#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();
    console_log::init_with_level(log::Level::Info).ok();
    log::info!("icefield starting");

    let window = web::window().ok_or_else(|| JsValue::from_str("no window"))?;
    let document = window
        .document()
        .ok_or_else(|| JsValue::from_str("no document"))?;
    if document.ready_state() == "complete" {
        launch();
    } else {
        let on_load = Closure::once(launch);
        window.add_event_listener_with_callback("load", on_load.as_ref().unchecked_ref())?;
        on_load.forget();
    }
    Ok(())
}

fn launch() {
    spawn_local(async move {
        if let Err(e) = init().await {
            log::error!("init error: {:?}", e);
        }
    });
}

async fn init() -> anyhow::Result<()> {
    if APP.with(|app| app.borrow().is_some()) {
        log::warn!("already initialized");
        return Ok(());
    }
    let window = web::window().ok_or_else(|| anyhow::anyhow!("no window"))?;
    let document = window
        .document()
        .ok_or_else(|| anyhow::anyhow!("no document"))?;

    let host = dom::WebPage::new(window.clone(), document.clone());
    let prepared = prepare_page(&host, &ElementIds::default(), AnalyserConfig::default())?;
    let scheduler = Rc::new(frame::RafScheduler::new(window.clone()));
    let page = prepared.start_layers(scheduler.clone())?;
    let viewport = page.viewport;
    APP.with(|app| {
        *app.borrow_mut() = Some(App {
            page,
            scene_loop: None,
        })
    });

    let canvas = create_scene_canvas(host.document(), &viewport)?;
    let config = SceneConfig::default();
    let renderer = render::GpuRenderer::new(&canvas, &viewport, &config.light).await?;
    let scene = Rc::new(RefCell::new(SceneManager::initialize(
        &config, &viewport, renderer,
    )));
    events::wire_orbit_controls(&canvas, scene.clone());

    let fetcher = assets::FetchAssets::new(window);
    let loading = scene.clone();
    spawn_local(async move {
        load_scene_model(loading, &fetcher).await;
    });

    let scene_loop = spawn_loop("scene", scheduler, FrameDriver::new(scene))?;
    let kept = APP.with(|app| match app.borrow_mut().as_mut() {
        Some(app) => {
            app.scene_loop = Some(scene_loop.clone());
            true
        }
        None => false,
    });
    if !kept {
        // stop() ran while the GPU was initializing
        scene_loop.stop();
    }
    Ok(())
}

fn create_scene_canvas(
    document: &web::Document,
    viewport: &ViewportMetrics,
) -> anyhow::Result<web::HtmlCanvasElement> {
    let canvas: web::HtmlCanvasElement = document
        .create_element("canvas")
        .map_err(|e| anyhow::anyhow!("{:?}", e))?
        .dyn_into()
        .map_err(|e| anyhow::anyhow!("{:?}", e))?;
    canvas.set_id(SCENE_CANVAS_ID);
    dom::size_canvas(&canvas, viewport);
    let style = canvas.style();
    _ = style.set_property("position", "fixed");
    _ = style.set_property("top", "0");
    _ = style.set_property("left", "0");
    _ = style.set_property("touch-action", "none");
    let body = document
        .body()
        .ok_or_else(|| anyhow::anyhow!("document has no body"))?;
    body.append_child(&canvas)
        .map_err(|e| anyhow::anyhow!("{:?}", e))?;
    Ok(canvas)
}

/// Stop both loops and release the audio graph.
#[wasm_bindgen]
pub fn stop() {
    match APP.with(|app| app.borrow_mut().take()) {
        Some(app) => app.shutdown(),
        None => log::warn!("stop: not running"),
    }
}

/// Current frequency snapshot; empty before init or after `stop`.
#[wasm_bindgen(js_name = frequencySnapshot)]
pub fn frequency_snapshot() -> Vec<u8> {
    APP.with(|app| {
        app.borrow_mut()
            .as_mut()
            .map(|app| app.page.analysis.sample().bins().to_vec())
            .unwrap_or_default()
    })
}
