use glam::Vec3;

// Shared scene, audio and page constants. Config structs take their
// defaults from here.

// Camera
pub const CAMERA_FOV_DEG: f32 = 45.0;
pub const CAMERA_NEAR: f32 = 0.1;
pub const CAMERA_FAR: f32 = 25_000.0;
pub const CAMERA_START: Vec3 = Vec3::new(0.0, 0.0, 12.0);

// Camera path: t = elapsed_ms * ORBIT_RATE_PER_MS
pub const ORBIT_RATE_PER_MS: f64 = 0.0004;
pub const ORBIT_AMPLITUDE_X: f64 = 10.0;
pub const ORBIT_AMPLITUDE_Y: f64 = 20.0;
pub const ORBIT_AMPLITUDE_Z: f64 = 10.0;

// Directional light
pub const LIGHT_COLOR_HEX: u32 = 0xdcfaf3;
pub const LIGHT_INTENSITY: f32 = 5.0;
pub const LIGHT_POSITION: Vec3 = Vec3::new(500.0, 500.0, 500.0);

// Shadow camera
pub const SHADOW_MAP_SIZE: u32 = 4096;
pub const SHADOW_NEAR: f32 = 500.0;
pub const SHADOW_FAR: f32 = 2000.0;
pub const SHADOW_FOV_DEG: f32 = 45.0;

// Analyser (matches the Web Audio AnalyserNode defaults except fft size and smoothing)
pub const ANALYSER_FFT_SIZE: usize = 256;
pub const ANALYSER_SMOOTHING: f64 = 0.95;
pub const ANALYSER_MIN_DECIBELS: f64 = -100.0;
pub const ANALYSER_MAX_DECIBELS: f64 = -30.0;
pub const ANALYSER_FFT_SIZE_MIN: usize = 32;
pub const ANALYSER_FFT_SIZE_MAX: usize = 32_768;

// Orbit controls
pub const CONTROLS_DAMPING_FACTOR: f32 = 0.05;
pub const CONTROLS_ROTATE_SPEED: f32 = 1.0;
pub const CONTROLS_ZOOM_STEP: f32 = 0.95; // scale per wheel notch
pub const CONTROLS_POLAR_EPSILON: f32 = 1e-6;

// Assets
pub const MODEL_PATH: &str = "media/ice.gltf";

// Required page elements
pub const AUDIO_ELEMENT_ID: &str = "audio";
pub const BACKGROUND_CANVAS_ID: &str = "back";
pub const GRAIN_CANVAS_ID: &str = "grain";
pub const BACKGROUND_VIDEO_ID: &str = "liquid";
pub const GRAIN_VIDEO_ID: &str = "risograph";

// Compositor layer names
pub const BACKGROUND_LAYER: &str = "background";
pub const GRAIN_LAYER: &str = "grain";
