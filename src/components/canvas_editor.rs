// Canvas editor: the <canvas> element, its mouse/wheel gestures, and the
// pan/reset toolbar.  All handlers translate raw events into messages; the
// reducers own the actual state transitions.

use wasm_bindgen::closure::Closure;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Document, HtmlCanvasElement, MouseEvent, WheelEvent};

use crate::messages::Message;
use crate::state::{apply_wheel_zoom, dispatch_global_message, APP_STATE};

pub fn setup_canvas(document: &Document) -> Result<(), JsValue> {
    let canvas = crate::dom_utils::get_element(document, "workflow-canvas")?
        .dyn_into::<HtmlCanvasElement>()?;

    resize_canvas(&canvas)?;

    let context = canvas
        .get_context("2d")?
        .ok_or_else(|| JsValue::from_str("2d context unavailable"))?
        .dyn_into::<web_sys::CanvasRenderingContext2d>()?;

    APP_STATE.with(|state| {
        let mut state = state.borrow_mut();
        state.canvas = Some(canvas.clone());
        state.context = Some(context);
    });

    setup_mouse_events(&canvas)?;
    setup_wheel_zoom(&canvas)?;
    setup_resize_handler(&canvas)?;
    setup_toolbar(document)?;

    Ok(())
}

/// Match the canvas bitmap to its container, scaled for high-DPI displays.
pub fn resize_canvas(canvas: &HtmlCanvasElement) -> Result<(), JsValue> {
    let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
    let document = window
        .document()
        .ok_or_else(|| JsValue::from_str("no document"))?;

    if let Some(container) = document.get_element_by_id("canvas-container") {
        let width = container.client_width();
        let height = container.client_height();
        let dpr = window.device_pixel_ratio();

        canvas.set_width((width as f64 * dpr) as u32);
        canvas.set_height((height as f64 * dpr) as u32);
        canvas
            .style()
            .set_property("width", &format!("{}px", width))?;
        canvas
            .style()
            .set_property("height", &format!("{}px", height))?;

        APP_STATE.with(|state| {
            let mut state = state.borrow_mut();
            state.canvas_width = width as f64;
            state.canvas_height = height as f64;
        });
    }

    APP_STATE.with(|state| {
        let state = state.borrow();
        crate::canvas::renderer::draw_canvas(&state);
    });
    Ok(())
}

/// Re-apply sizing and redraw; used when the canvas view becomes visible
/// again (its container reports zero size while hidden).
pub fn refresh() -> Result<(), JsValue> {
    let canvas = APP_STATE.with(|state| state.borrow().canvas.clone());
    if let Some(canvas) = canvas {
        resize_canvas(&canvas)?;
    }
    Ok(())
}

fn setup_mouse_events(canvas: &HtmlCanvasElement) -> Result<(), JsValue> {
    // Mousedown decides which gesture starts: pan in pan mode, a connection
    // drag from an output connector, or a node drag from a node body.
    let mousedown = Closure::wrap(Box::new(move |event: MouseEvent| {
        let x = event.offset_x() as f64;
        let y = event.offset_y() as f64;
        let msg = APP_STATE.with(|state| {
            let state = state.borrow();
            if state.pan_mode {
                return Some(Message::StartPan { x, y });
            }
            let (wx, wy) = state.screen_to_world(x, y);
            if let Some(source_id) = state.find_output_connector_at(wx, wy) {
                return Some(Message::StartConnection {
                    source_id,
                    x: wx,
                    y: wy,
                });
            }
            if let Some((node_id, offset_x, offset_y)) = state.find_node_at(wx, wy) {
                return Some(Message::StartNodeDrag {
                    node_id,
                    offset_x,
                    offset_y,
                });
            }
            None
        });
        if let Some(msg) = msg {
            dispatch_global_message(msg);
        }
    }) as Box<dyn FnMut(_)>);
    canvas.add_event_listener_with_callback("mousedown", mousedown.as_ref().unchecked_ref())?;
    mousedown.forget();

    let mousemove = Closure::wrap(Box::new(move |event: MouseEvent| {
        let x = event.offset_x() as f64;
        let y = event.offset_y() as f64;
        let msg = APP_STATE.with(|state| {
            let state = state.borrow();
            if state.panning {
                return Some(Message::UpdatePan { x, y });
            }
            let (wx, wy) = state.screen_to_world(x, y);
            if let Some(node_id) = state.dragging.clone() {
                return Some(Message::UpdateNodePosition {
                    node_id,
                    x: wx - state.drag_offset_x,
                    y: wy - state.drag_offset_y,
                });
            }
            if state.connection.is_some() {
                return Some(Message::UpdateConnection { x: wx, y: wy });
            }
            None
        });
        if let Some(msg) = msg {
            dispatch_global_message(msg);
        }
    }) as Box<dyn FnMut(_)>);
    canvas.add_event_listener_with_callback("mousemove", mousemove.as_ref().unchecked_ref())?;
    mousemove.forget();

    // Mouseup ends whichever gesture is live.  A connection drops onto the
    // target's input connector or anywhere on its body.
    let mouseup = Closure::wrap(Box::new(move |event: MouseEvent| {
        let x = event.offset_x() as f64;
        let y = event.offset_y() as f64;
        let msgs = APP_STATE.with(|state| {
            let state = state.borrow();
            let mut out = Vec::new();
            if state.connection.is_some() {
                let (wx, wy) = state.screen_to_world(x, y);
                let target = state
                    .find_input_connector_at(wx, wy)
                    .or_else(|| state.find_node_at(wx, wy).map(|(id, _, _)| id));
                out.push(match target {
                    Some(target_id) => Message::CompleteConnection { target_id },
                    None => Message::CancelConnection,
                });
            }
            if state.dragging.is_some() {
                out.push(Message::StopNodeDrag);
            }
            if state.panning {
                out.push(Message::StopPan);
            }
            out
        });
        for msg in msgs {
            dispatch_global_message(msg);
        }
    }) as Box<dyn FnMut(_)>);
    canvas.add_event_listener_with_callback("mouseup", mouseup.as_ref().unchecked_ref())?;
    mouseup.forget();

    // Double-click renames a node; an emptied label is left unchanged.
    let dblclick = Closure::wrap(Box::new(move |event: MouseEvent| {
        let x = event.offset_x() as f64;
        let y = event.offset_y() as f64;
        let hit = APP_STATE.with(|state| {
            let state = state.borrow();
            let (wx, wy) = state.screen_to_world(x, y);
            state.find_node_at(wx, wy).map(|(id, _, _)| {
                let label = state.nodes.get(&id).map(|n| n.label.clone()).unwrap_or_default();
                (id, label)
            })
        });
        if let Some((node_id, current)) = hit {
            if let Some(window) = web_sys::window() {
                if let Ok(Some(label)) =
                    window.prompt_with_message_and_default("Rename node", &current)
                {
                    let label = label.trim().to_string();
                    if !label.is_empty() {
                        dispatch_global_message(Message::UpdateNodeLabel { node_id, label });
                    }
                }
            }
        }
    }) as Box<dyn FnMut(_)>);
    canvas.add_event_listener_with_callback("dblclick", dblclick.as_ref().unchecked_ref())?;
    dblclick.forget();

    // Right-click deletes the node under the cursor (and its edges).
    let contextmenu = Closure::wrap(Box::new(move |event: MouseEvent| {
        let x = event.offset_x() as f64;
        let y = event.offset_y() as f64;
        let hit = APP_STATE.with(|state| {
            let state = state.borrow();
            let (wx, wy) = state.screen_to_world(x, y);
            state.find_node_at(wx, wy).map(|(id, _, _)| id)
        });
        if let Some(node_id) = hit {
            event.prevent_default();
            dispatch_global_message(Message::DeleteNode { node_id });
        }
    }) as Box<dyn FnMut(_)>);
    canvas.add_event_listener_with_callback("contextmenu", contextmenu.as_ref().unchecked_ref())?;
    contextmenu.forget();

    Ok(())
}

fn setup_wheel_zoom(canvas: &HtmlCanvasElement) -> Result<(), JsValue> {
    // Plain scrolling stays with the page; zoom needs Ctrl (or ⌘ on Mac).
    let wheel = Closure::wrap(Box::new(move |event: WheelEvent| {
        if !(event.ctrl_key() || event.meta_key()) {
            return;
        }
        event.prevent_default();
        let x = event.offset_x() as f64;
        let y = event.offset_y() as f64;
        let msg = APP_STATE.with(|state| {
            let state = state.borrow();
            let new_zoom = apply_wheel_zoom(state.zoom_level, event.delta_y());
            // Anchor the zoom so the world point under the cursor stays put.
            let (wx, wy) = state.screen_to_world(x, y);
            Message::ZoomCanvas {
                new_zoom,
                viewport_x: wx - x / new_zoom,
                viewport_y: wy - y / new_zoom,
            }
        });
        dispatch_global_message(msg);
    }) as Box<dyn FnMut(_)>);
    canvas.add_event_listener_with_callback("wheel", wheel.as_ref().unchecked_ref())?;
    wheel.forget();
    Ok(())
}

fn setup_resize_handler(canvas: &HtmlCanvasElement) -> Result<(), JsValue> {
    let canvas_clone = canvas.clone();
    let resize = Closure::wrap(Box::new(move || {
        if let Err(e) = resize_canvas(&canvas_clone) {
            web_sys::console::warn_1(&format!("Failed to resize canvas: {:?}", e).into());
        }
    }) as Box<dyn FnMut()>);
    web_sys::window()
        .ok_or_else(|| JsValue::from_str("no window"))?
        .add_event_listener_with_callback("resize", resize.as_ref().unchecked_ref())?;
    resize.forget();
    Ok(())
}

fn setup_toolbar(document: &Document) -> Result<(), JsValue> {
    let pan_toggle = crate::dom_utils::get_element(document, "pan-toggle")?;
    let pan_toggle_clone = pan_toggle.clone();
    let on_pan = Closure::wrap(Box::new(move |_: MouseEvent| {
        dispatch_global_message(Message::TogglePanMode);
        let pan_mode = APP_STATE.with(|state| state.borrow().pan_mode);
        if pan_mode {
            let _ = pan_toggle_clone.class_list().add_1("active");
        } else {
            let _ = pan_toggle_clone.class_list().remove_1("active");
        }
    }) as Box<dyn FnMut(_)>);
    pan_toggle.add_event_listener_with_callback("click", on_pan.as_ref().unchecked_ref())?;
    on_pan.forget();

    let reset_btn = crate::dom_utils::get_element(document, "reset-workflow-btn")?;
    let on_reset = Closure::wrap(Box::new(move |_: MouseEvent| {
        let confirmed = web_sys::window()
            .and_then(|w| w.confirm_with_message("Clear the canvas?").ok())
            .unwrap_or(false);
        if confirmed {
            dispatch_global_message(Message::ResetWorkflow);
        }
    }) as Box<dyn FnMut(_)>);
    reset_btn.add_event_listener_with_callback("click", on_reset.as_ref().unchecked_ref())?;
    on_reset.forget();

    Ok(())
}
