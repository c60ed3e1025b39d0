// Rendering and input tuning for the browser front-end. Scene-level values
// (camera, light, analyser) live in `icefield_core`.

// MSAA sample count for the lit pass
pub const MSAA_SAMPLES: u32 = 4;

// Depth bias applied while rendering the shadow map
pub const SHADOW_DEPTH_BIAS_CONSTANT: i32 = 2;
pub const SHADOW_DEPTH_BIAS_SLOPE: f32 = 2.0;
// Comparison bias subtracted in the lit pass before the PCF lookup
pub const SHADOW_COMPARE_BIAS: f32 = 0.0015;

// Ambient term added to the Lambert diffuse
pub const AMBIENT_STRENGTH: f32 = 0.12;

// Transparent clear so the video canvases show through
pub const CLEAR_RGBA: [f64; 4] = [0.0, 0.0, 0.0, 0.0];

// Pointer drags shorter than this (CSS px) are treated as clicks
pub const DRAG_THRESHOLD_PX: f32 = 2.0;

// Right-button or shift-drag pans by this many world units per CSS pixel
pub const PAN_UNITS_PER_PX: f32 = 0.01;

// Wheel events smaller than this are ignored (trackpad jitter)
pub const WHEEL_DEADZONE: f32 = 0.5;
