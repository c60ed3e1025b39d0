// Host-side tests for constants and their relationships.
// The main crate is wasm-only, so we include the pure-Rust modules directly.

#![allow(dead_code)]
mod constants {
    include!("../src/constants.rs");
}

use constants::*;
use icefield_core::{
    ANALYSER_FFT_SIZE, ANALYSER_FFT_SIZE_MAX, ANALYSER_FFT_SIZE_MIN, CAMERA_FAR, CAMERA_NEAR,
    SHADOW_FAR, SHADOW_MAP_SIZE, SHADOW_NEAR,
};

#[test]
#[allow(clippy::assertions_on_constants)]
fn render_constants_are_within_reasonable_bounds() {
    // WebGPU guarantees 1 and 4 samples
    assert!(MSAA_SAMPLES == 1 || MSAA_SAMPLES == 4);
    assert!(AMBIENT_STRENGTH >= 0.0 && AMBIENT_STRENGTH < 1.0);
    assert!(SHADOW_COMPARE_BIAS > 0.0 && SHADOW_COMPARE_BIAS < 0.01);
    assert!(SHADOW_DEPTH_BIAS_SLOPE >= 0.0);
}

#[test]
fn clear_color_is_fully_transparent() {
    assert_eq!(CLEAR_RGBA[3], 0.0);
    // premultiplied: no color without alpha
    assert!(CLEAR_RGBA[..3].iter().all(|&c| c == 0.0));
}

#[test]
#[allow(clippy::assertions_on_constants)]
fn input_constants_are_positive() {
    assert!(DRAG_THRESHOLD_PX > 0.0);
    assert!(PAN_UNITS_PER_PX > 0.0);
    assert!(WHEEL_DEADZONE >= 0.0);
}

#[test]
#[allow(clippy::assertions_on_constants)]
fn scene_constants_have_logical_relationships() {
    assert!(CAMERA_NEAR > 0.0 && CAMERA_FAR > CAMERA_NEAR);
    assert!(SHADOW_FAR > SHADOW_NEAR && SHADOW_NEAR > 0.0);
    assert!(SHADOW_MAP_SIZE.is_power_of_two());
    assert!(ANALYSER_FFT_SIZE.is_power_of_two());
    assert!((ANALYSER_FFT_SIZE_MIN..=ANALYSER_FFT_SIZE_MAX).contains(&ANALYSER_FFT_SIZE));
}
