//! Orbit-style camera controls: rotate, dolly and pan around a target.
//!
//! Pointer input accumulates deltas; `update` applies them to the camera and
//! re-aims it at the target. With damping enabled the deltas decay over
//! several updates instead of being consumed at once.
//!
//! Everything `update` applies is also folded into a running view
//! adjustment. `apply_view` replays it onto a camera whose eye was just
//! placed by a scripted path, so user input outlives the next reposition.

use crate::camera::Camera;
use crate::constants::*;
use glam::Vec3;
use std::f32::consts::PI;

#[derive(Clone, Copy, Debug, Default, PartialEq)]
struct SphericalDelta {
    theta: f32,
    phi: f32,
}

/// Net rotation, zoom and pan applied so far.
#[derive(Clone, Copy, Debug, PartialEq)]
struct ViewAdjust {
    theta: f32,
    phi: f32,
    zoom: f32,
    pan: Vec3,
}

impl Default for ViewAdjust {
    fn default() -> Self {
        Self {
            theta: 0.0,
            phi: 0.0,
            zoom: 1.0,
            pan: Vec3::ZERO,
        }
    }
}

#[inline]
fn spherical_angles(offset: Vec3, radius: f32) -> (f32, f32) {
    let theta = offset.x.atan2(offset.z);
    let phi = (offset.y / radius).clamp(-1.0, 1.0).acos();
    (theta, phi)
}

#[inline]
fn spherical_offset(radius: f32, theta: f32, phi: f32) -> Vec3 {
    let sin_phi = phi.sin();
    Vec3::new(
        radius * sin_phi * theta.sin(),
        radius * phi.cos(),
        radius * sin_phi * theta.cos(),
    )
}

#[derive(Clone, Debug)]
pub struct OrbitControls {
    pub target: Vec3,
    pub enable_damping: bool,
    pub damping_factor: f32,
    pub rotate_speed: f32,
    pub min_distance: f32,
    pub max_distance: f32,
    pub min_polar_angle: f32,
    pub max_polar_angle: f32,
    delta: SphericalDelta,
    scale: f32,
    pan_offset: Vec3,
    view: ViewAdjust,
}

impl Default for OrbitControls {
    fn default() -> Self {
        Self::new(Vec3::ZERO)
    }
}

impl OrbitControls {
    pub fn new(target: Vec3) -> Self {
        Self {
            target,
            enable_damping: false,
            damping_factor: CONTROLS_DAMPING_FACTOR,
            rotate_speed: CONTROLS_ROTATE_SPEED,
            min_distance: 0.0,
            max_distance: f32::INFINITY,
            min_polar_angle: 0.0,
            max_polar_angle: PI,
            delta: SphericalDelta::default(),
            scale: 1.0,
            pan_offset: Vec3::ZERO,
            view: ViewAdjust::default(),
        }
    }

    #[inline]
    pub fn rotate_left(&mut self, angle: f32) {
        self.delta.theta -= angle;
    }

    #[inline]
    pub fn rotate_up(&mut self, angle: f32) {
        self.delta.phi -= angle;
    }

    /// Move toward the target; `factor` < 1 shrinks the orbit radius.
    pub fn dolly(&mut self, factor: f32) {
        if factor.is_finite() && factor > 0.0 {
            self.scale *= factor;
        }
    }

    pub fn dolly_in(&mut self, factor: f32) {
        self.dolly(factor);
    }

    pub fn dolly_out(&mut self, factor: f32) {
        if factor > 0.0 {
            self.dolly(1.0 / factor);
        }
    }

    pub fn pan(&mut self, offset: Vec3) {
        self.pan_offset += offset;
    }

    /// Pan by a screen-space offset, moving along the camera's right and up
    /// axes. Dragging right moves the scene right.
    pub fn pan_view(&mut self, dx: f32, dy: f32, camera: &Camera) {
        let forward = (camera.target - camera.eye).normalize_or_zero();
        let right = forward.cross(camera.up).normalize_or_zero();
        let up = right.cross(forward);
        self.pan(-right * dx + up * dy);
    }

    /// Rotation for a pointer drag of `(dx, dy)` pixels on an element
    /// `element_height` pixels tall. A drag across the full height turns
    /// the camera a full circle.
    pub fn pointer_drag(&mut self, dx: f32, dy: f32, element_height: f32) {
        let h = element_height.max(1.0);
        self.rotate_left(2.0 * PI * dx / h * self.rotate_speed);
        self.rotate_up(2.0 * PI * dy / h * self.rotate_speed);
    }

    /// One wheel event; negative `delta_y` (scroll up) zooms in.
    pub fn wheel(&mut self, delta_y: f32) {
        if delta_y < 0.0 {
            self.dolly_in(CONTROLS_ZOOM_STEP);
        } else if delta_y > 0.0 {
            self.dolly_out(CONTROLS_ZOOM_STEP);
        }
    }

    /// True while unapplied input remains.
    pub fn has_pending_input(&self) -> bool {
        self.delta.theta.abs() > f32::EPSILON
            || self.delta.phi.abs() > f32::EPSILON
            || (self.scale - 1.0).abs() > f32::EPSILON
            || self.pan_offset.length_squared() > f32::EPSILON
    }

    /// True once any input has been applied by `update`.
    pub fn has_view_adjustment(&self) -> bool {
        self.view != ViewAdjust::default()
    }

    #[inline]
    fn clamp_polar(&self, phi: f32) -> f32 {
        phi.clamp(self.min_polar_angle, self.max_polar_angle)
            .clamp(CONTROLS_POLAR_EPSILON, PI - CONTROLS_POLAR_EPSILON)
    }

    /// Apply pending input to `camera`. Returns whether the eye moved.
    pub fn update(&mut self, camera: &mut Camera) -> bool {
        let before = camera.eye;
        let offset = camera.eye - self.target;
        let radius = offset.length();

        let damping = if self.enable_damping {
            self.damping_factor
        } else {
            1.0
        };

        let pan_step = self.pan_offset * damping;
        self.target += pan_step;
        self.view.pan += pan_step;

        if radius > CONTROLS_POLAR_EPSILON {
            let (theta, phi) = spherical_angles(offset, radius);
            let theta_step = self.delta.theta * damping;
            let new_phi = self.clamp_polar(phi + self.delta.phi * damping);
            let new_radius = (radius * self.scale).clamp(self.min_distance, self.max_distance);

            self.view.theta += theta_step;
            self.view.phi += new_phi - phi;
            self.view.zoom *= new_radius / radius;

            camera.eye = self.target + spherical_offset(new_radius, theta + theta_step, new_phi);
        }
        camera.target = self.target;

        if self.enable_damping {
            self.delta.theta *= 1.0 - self.damping_factor;
            self.delta.phi *= 1.0 - self.damping_factor;
            self.pan_offset *= 1.0 - self.damping_factor;
        } else {
            self.delta = SphericalDelta::default();
            self.pan_offset = Vec3::ZERO;
        }
        self.scale = 1.0;

        (camera.eye - before).length_squared() > 1e-8
    }

    /// Replay the accumulated adjustment onto a camera whose eye was just
    /// placed by a scripted path. A no-op until input has been applied.
    pub fn apply_view(&self, camera: &mut Camera) {
        if !self.has_view_adjustment() {
            return;
        }
        camera.eye += self.view.pan;
        camera.target = self.target;

        let offset = camera.eye - self.target;
        let radius = offset.length();
        if radius <= CONTROLS_POLAR_EPSILON {
            return;
        }
        let (theta, phi) = spherical_angles(offset, radius);
        let phi = self.clamp_polar(phi + self.view.phi);
        let radius = (radius * self.view.zoom).clamp(self.min_distance, self.max_distance);
        camera.eye = self.target + spherical_offset(radius, theta + self.view.theta, phi);
    }
}
