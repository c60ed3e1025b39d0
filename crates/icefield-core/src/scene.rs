//! Scene manager: owns camera, light, controls and the optional model, and
//! drives a platform renderer.

use crate::camera::{orbit_position, Camera, CameraConfig};
use crate::constants::MODEL_PATH;
use crate::controls::OrbitControls;
use crate::light::DirectionalLight;
use crate::model::{load_model, AssetFetcher, Model, ModelError};
use crate::viewport::ViewportMetrics;
use std::cell::RefCell;
use std::fmt::Display;
use std::rc::Rc;

#[derive(Clone, Debug)]
pub struct SceneConfig {
    pub camera: CameraConfig,
    pub light: DirectionalLight,
    pub model_path: String,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            camera: CameraConfig::default(),
            light: DirectionalLight::default(),
            model_path: MODEL_PATH.to_string(),
        }
    }
}

/// Where the asynchronously loaded model currently stands.
#[derive(Debug, Default)]
pub enum ModelSlot {
    #[default]
    Pending,
    Loaded(Model),
    Failed(ModelError),
}

impl ModelSlot {
    pub fn model(&self) -> Option<&Model> {
        match self {
            ModelSlot::Loaded(m) => Some(m),
            _ => None,
        }
    }
}

pub struct SceneState {
    pub camera: Camera,
    pub light: DirectionalLight,
    pub controls: OrbitControls,
    pub model: ModelSlot,
}

/// Platform side of the scene: draws a `SceneState` onto a render surface.
pub trait SceneRenderer {
    type Error: Display;

    /// Prepare GPU resources for a freshly loaded model.
    fn upload_model(&mut self, model: &Model) -> Result<(), Self::Error>;

    /// Draw the scene from its camera.
    fn render(&mut self, scene: &SceneState) -> Result<(), Self::Error>;
}

pub struct SceneManager<R> {
    state: SceneState,
    renderer: R,
    model_path: String,
}

impl<R: SceneRenderer> SceneManager<R> {
    /// Build camera, light and controls; the model slot starts `Pending`.
    pub fn initialize(config: &SceneConfig, viewport: &ViewportMetrics, renderer: R) -> Self {
        let camera = Camera::perspective(&config.camera, viewport.aspect());
        let controls = OrbitControls::new(camera.target);
        log::info!(
            "[scene] camera fov={:.0} aspect={:.3} eye=({:.1},{:.1},{:.1}) shadow_map={}",
            config.camera.fov_degrees,
            camera.aspect,
            camera.eye.x,
            camera.eye.y,
            camera.eye.z,
            config.light.shadow.map_size
        );
        Self {
            state: SceneState {
                camera,
                light: config.light.clone(),
                controls,
                model: ModelSlot::Pending,
            },
            renderer,
            model_path: config.model_path.clone(),
        }
    }

    /// Move the camera along its scripted orbit, then replay whatever the
    /// user has done with the controls so far.
    pub fn update(&mut self, elapsed_ms: f64) {
        self.state.camera.eye = orbit_position(elapsed_ms);
        self.state.controls.apply_view(&mut self.state.camera);
    }

    /// Draw, then let the controls apply pending input.
    pub fn render(&mut self) -> Result<(), R::Error> {
        self.renderer.render(&self.state)?;
        self.state.controls.update(&mut self.state.camera);
        Ok(())
    }

    /// Take ownership of a load result. Failures are reported and leave the
    /// scene usable without a model.
    pub fn attach_model(&mut self, result: Result<Model, ModelError>) {
        self.state.model = match result {
            Ok(model) => match self.renderer.upload_model(&model) {
                Ok(()) => {
                    log::info!("[scene] model attached ({} triangles)", model.triangle_count());
                    ModelSlot::Loaded(model)
                }
                Err(e) => {
                    log::error!("[scene] model upload failed: {}", e);
                    ModelSlot::Failed(ModelError::Upload(e.to_string()))
                }
            },
            Err(e) => {
                log::error!("[scene] model load failed: {}", e);
                ModelSlot::Failed(e)
            }
        };
    }

    pub fn model_path(&self) -> &str {
        &self.model_path
    }

    pub fn has_model(&self) -> bool {
        self.state.model.model().is_some()
    }

    pub fn state(&self) -> &SceneState {
        &self.state
    }

    pub fn controls_mut(&mut self) -> &mut OrbitControls {
        &mut self.state.controls
    }
}

/// Load the scene's model and attach the result. The scene is not borrowed
/// while the fetch is in flight, so frames keep rendering meanwhile.
pub async fn load_scene_model<R, F>(scene: Rc<RefCell<SceneManager<R>>>, fetcher: &F)
where
    R: SceneRenderer,
    F: AssetFetcher,
{
    let path = scene.borrow().model_path().to_string();
    let result = load_model(fetcher, &path).await;
    scene.borrow_mut().attach_model(result);
}
