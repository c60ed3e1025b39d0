// Host-side tests for pure input functions.
// The main crate is wasm-only, so we include the pure-Rust modules directly.

#![allow(dead_code)]
mod constants {
    include!("../src/constants.rs");
}
mod input {
    include!("../src/input.rs");
}

use glam::Vec2;
use input::*;

#[test]
fn drag_reports_deltas_for_its_pointer() {
    let mut drag = DragState::default();
    drag.begin(7, Vec2::new(100.0, 100.0), DragMode::Rotate);

    let step = drag.move_to(7, Vec2::new(110.0, 95.0));
    assert_eq!(step, Some(ControlInput::Rotate { dx: 10.0, dy: -5.0 }));

    // other pointers are ignored while dragging
    assert_eq!(drag.move_to(8, Vec2::new(0.0, 0.0)), None);
    assert_eq!(drag.last, Vec2::new(110.0, 95.0));
}

#[test]
fn inactive_drag_ignores_moves() {
    let mut drag = DragState::default();
    assert_eq!(drag.move_to(0, Vec2::new(5.0, 5.0)), None);
    assert!(!drag.end(0));
}

#[test]
fn zero_motion_produces_no_input() {
    let mut drag = DragState::default();
    drag.begin(1, Vec2::new(3.0, 3.0), DragMode::Rotate);
    assert_eq!(drag.move_to(1, Vec2::new(3.0, 3.0)), None);
}

#[test]
fn pan_drag_is_scaled_to_world_units() {
    let mut drag = DragState::default();
    drag.begin(1, Vec2::ZERO, DragMode::Pan);
    match drag.move_to(1, Vec2::new(100.0, 0.0)) {
        Some(ControlInput::Pan { dx, dy }) => {
            assert!((dx - 100.0 * constants::PAN_UNITS_PER_PX).abs() < 1e-6);
            assert_eq!(dy, 0.0);
        }
        other => panic!("expected pan, got {:?}", other),
    }
}

#[test]
fn short_drag_is_a_click() {
    let mut drag = DragState::default();
    drag.begin(1, Vec2::ZERO, DragMode::Rotate);
    drag.move_to(1, Vec2::new(1.0, 0.0));
    assert!(drag.end(1));
    assert!(!drag.active);

    drag.begin(1, Vec2::ZERO, DragMode::Rotate);
    drag.move_to(1, Vec2::new(30.0, 40.0));
    assert!(!drag.end(1));
}

#[test]
fn right_button_or_shift_pans() {
    assert_eq!(drag_mode(0, false), DragMode::Rotate);
    assert_eq!(drag_mode(2, false), DragMode::Pan);
    assert_eq!(drag_mode(0, true), DragMode::Pan);
}

#[test]
fn wheel_notch_ignores_jitter() {
    assert_eq!(wheel_notch(-120.0), -1.0);
    assert_eq!(wheel_notch(53.0), 1.0);
    assert_eq!(wheel_notch(0.1), 0.0);
    assert_eq!(wheel_notch(f32::NAN), 0.0);
}
