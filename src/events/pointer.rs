use crate::input::{self, ControlInput, DragState};
use crate::render::GpuRenderer;
use glam::Vec2;
use icefield_core::SceneManager;
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys as web;

type SharedScene = Rc<RefCell<SceneManager<GpuRenderer>>>;

#[derive(Clone)]
struct ControlWiring {
    canvas: web::HtmlCanvasElement,
    scene: SharedScene,
    drag: Rc<RefCell<DragState>>,
}

/// Route pointer and wheel input on the scene canvas to the orbit controls.
/// The controls apply it after the next render.
pub fn wire_orbit_controls(canvas: &web::HtmlCanvasElement, scene: SharedScene) {
    let w = ControlWiring {
        canvas: canvas.clone(),
        scene,
        drag: Rc::new(RefCell::new(DragState::default())),
    };
    wire_pointerdown(&w);
    wire_pointermove(&w);
    wire_pointerup(&w);
    wire_wheel(&w);
    wire_contextmenu(&w);
}

#[inline]
fn client_pos(ev: &web::MouseEvent) -> Vec2 {
    Vec2::new(ev.client_x() as f32, ev.client_y() as f32)
}

fn add_listener<E: wasm_bindgen::convert::FromWasmAbi + 'static>(
    target: &web::EventTarget,
    name: &str,
    handler: impl FnMut(E) + 'static,
) {
    let closure = Closure::wrap(Box::new(handler) as Box<dyn FnMut(E)>);
    let callback: &js_sys::Function = closure.as_ref().unchecked_ref();
    if let Err(e) = target.add_event_listener_with_callback(name, callback) {
        log::warn!("[input] failed to listen for {}: {:?}", name, e);
    }
    closure.forget();
}

fn wire_pointerdown(w: &ControlWiring) {
    let w2 = w.clone();
    add_listener(&w.canvas, "pointerdown", move |ev: web::PointerEvent| {
        let mode = input::drag_mode(ev.button(), ev.shift_key());
        w2.drag
            .borrow_mut()
            .begin(ev.pointer_id(), client_pos(&ev), mode);
        _ = w2.canvas.set_pointer_capture(ev.pointer_id());
        ev.prevent_default();
    });
}

fn wire_pointermove(w: &ControlWiring) {
    let w2 = w.clone();
    add_listener(&w.canvas, "pointermove", move |ev: web::PointerEvent| {
        let step = w2
            .drag
            .borrow_mut()
            .move_to(ev.pointer_id(), client_pos(&ev));
        let Some(step) = step else {
            return;
        };
        let mut scene = w2.scene.borrow_mut();
        match step {
            ControlInput::Rotate { dx, dy } => {
                let height = w2.canvas.client_height() as f32;
                scene.controls_mut().pointer_drag(dx, dy, height);
            }
            ControlInput::Pan { dx, dy } => {
                let camera = scene.state().camera.clone();
                scene.controls_mut().pan_view(dx, dy, &camera);
            }
        }
    });
}

fn wire_pointerup(w: &ControlWiring) {
    for name in ["pointerup", "pointercancel"] {
        let w2 = w.clone();
        add_listener(&w.canvas, name, move |ev: web::PointerEvent| {
            if w2.drag.borrow_mut().end(ev.pointer_id()) {
                log::debug!("[input] click");
            }
            _ = w2.canvas.release_pointer_capture(ev.pointer_id());
        });
    }
}

fn wire_wheel(w: &ControlWiring) {
    let w2 = w.clone();
    add_listener(&w.canvas, "wheel", move |ev: web::WheelEvent| {
        let notch = input::wheel_notch(ev.delta_y() as f32);
        if notch != 0.0 {
            w2.scene.borrow_mut().controls_mut().wheel(notch);
        }
        ev.prevent_default();
    });
}

fn wire_contextmenu(w: &ControlWiring) {
    // right-drag pans; keep the browser menu out of the way
    add_listener(&w.canvas, "contextmenu", move |ev: web::Event| {
        ev.prevent_default();
    });
}
