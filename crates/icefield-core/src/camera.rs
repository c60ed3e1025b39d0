//! Perspective camera and its fixed orbit path.

use crate::constants::*;
use glam::{Mat4, Vec3};

/// Camera settings applied once at scene initialization.
#[derive(Clone, Debug, PartialEq)]
pub struct CameraConfig {
    pub fov_degrees: f32,
    pub near: f32,
    pub far: f32,
    pub position: Vec3,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fov_degrees: CAMERA_FOV_DEG,
            near: CAMERA_NEAR,
            far: CAMERA_FAR,
            position: CAMERA_START,
        }
    }
}

/// Simple right-handed camera description with perspective projection.
#[derive(Clone, Debug)]
pub struct Camera {
    pub eye: Vec3,
    pub target: Vec3,
    pub up: Vec3,
    pub aspect: f32,
    pub fovy_radians: f32,
    pub znear: f32,
    pub zfar: f32,
}

impl Camera {
    pub fn perspective(config: &CameraConfig, aspect: f32) -> Self {
        Self {
            eye: config.position,
            target: Vec3::ZERO,
            up: Vec3::Y,
            aspect,
            fovy_radians: config.fov_degrees.to_radians(),
            znear: config.near,
            zfar: config.far,
        }
    }

    /// Compute the clip-space projection matrix.
    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fovy_radians, self.aspect, self.znear, self.zfar)
    }

    /// Compute the view matrix that transforms world to view space.
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.eye, self.target, self.up)
    }

    pub fn view_projection(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }
}

/// Camera position on the scripted orbit after `elapsed_ms` milliseconds.
///
/// `t = elapsed_ms * 0.0004`, position `(10 cos t, 20 cos t, 10 sin t)`.
/// Evaluated in f64 so long-running pages keep the phase exact.
#[inline]
pub fn orbit_position(elapsed_ms: f64) -> Vec3 {
    let t = elapsed_ms * ORBIT_RATE_PER_MS;
    let (sin_t, cos_t) = t.sin_cos();
    Vec3::new(
        (ORBIT_AMPLITUDE_X * cos_t) as f32,
        (ORBIT_AMPLITUDE_Y * cos_t) as f32,
        (ORBIT_AMPLITUDE_Z * sin_t) as f32,
    )
}
