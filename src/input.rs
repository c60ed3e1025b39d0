use crate::constants::{DRAG_THRESHOLD_PX, PAN_UNITS_PER_PX, WHEEL_DEADZONE};
use glam::Vec2;

/// What a drag gesture controls.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DragMode {
    #[default]
    Rotate,
    Pan,
}

/// Pointer drag tracking in CSS pixels.
#[derive(Default, Clone, Copy, Debug)]
pub struct DragState {
    pub active: bool,
    pub mode: DragMode,
    pub pointer_id: i32,
    pub last: Vec2,
    pub travelled: f32,
}

/// Orbit-control command derived from a pointer event.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ControlInput {
    Rotate { dx: f32, dy: f32 },
    Pan { dx: f32, dy: f32 },
}

impl DragState {
    pub fn begin(&mut self, pointer_id: i32, pos: Vec2, mode: DragMode) {
        *self = Self {
            active: true,
            mode,
            pointer_id,
            last: pos,
            travelled: 0.0,
        };
    }

    /// Movement since the previous event, or `None` if this pointer is not
    /// dragging.
    pub fn move_to(&mut self, pointer_id: i32, pos: Vec2) -> Option<ControlInput> {
        if !self.active || pointer_id != self.pointer_id {
            return None;
        }
        let d = pos - self.last;
        self.last = pos;
        self.travelled += d.length();
        if d == Vec2::ZERO {
            return None;
        }
        Some(match self.mode {
            DragMode::Rotate => ControlInput::Rotate { dx: d.x, dy: d.y },
            DragMode::Pan => ControlInput::Pan {
                dx: d.x * PAN_UNITS_PER_PX,
                dy: d.y * PAN_UNITS_PER_PX,
            },
        })
    }

    /// Ends the drag. Returns true if the pointer barely moved (a click).
    pub fn end(&mut self, pointer_id: i32) -> bool {
        if !self.active || pointer_id != self.pointer_id {
            return false;
        }
        self.active = false;
        self.travelled < DRAG_THRESHOLD_PX
    }
}

#[inline]
pub fn drag_mode(button: i16, shift: bool) -> DragMode {
    if button == 2 || shift {
        DragMode::Pan
    } else {
        DragMode::Rotate
    }
}

/// Wheel notch direction: -1 zooms in, 1 zooms out, 0 is ignored.
#[inline]
pub fn wheel_notch(delta_y: f32) -> f32 {
    if !delta_y.is_finite() || delta_y.abs() < WHEEL_DEADZONE {
        0.0
    } else {
        delta_y.signum()
    }
}
