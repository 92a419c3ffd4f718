//! Thin helpers for the repetitive DOM lookups and show/hide patterns the
//! components share.

use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Document, Element, HtmlInputElement};

pub fn document() -> Result<Document, JsValue> {
    web_sys::window()
        .and_then(|w| w.document())
        .ok_or_else(|| JsValue::from_str("no document available"))
}

/// Fetch an element by id, erroring with the id so failures are findable.
pub fn get_element(document: &Document, id: &str) -> Result<Element, JsValue> {
    document
        .get_element_by_id(id)
        .ok_or_else(|| JsValue::from_str(&format!("#{} not found", id)))
}

/// Fetch an `<input>` by id and cast it.
pub fn html_input(document: &Document, id: &str) -> Result<HtmlInputElement, JsValue> {
    get_element(document, id)?
        .dyn_into::<HtmlInputElement>()
        .map_err(|_| JsValue::from_str(&format!("#{} is not an <input>", id)))
}

/// Toggle visibility by class so CSS owns the transition.
pub fn show(el: &Element) {
    let _ = el.class_list().remove_1("hidden");
    let _ = el.class_list().add_1("visible");
}

pub fn hide(el: &Element) {
    let _ = el.class_list().remove_1("visible");
    let _ = el.class_list().add_1("hidden");
}

/// Mark a view tab button as the active one.
pub fn set_active(btn: &Element) {
    btn.set_class_name("tab-button active");
}

pub fn set_inactive(btn: &Element) {
    btn.set_class_name("tab-button");
}

/// Remove all children of an element before re-rendering into it.
pub fn clear_children(el: &Element) {
    while let Some(child) = el.first_child() {
        let _ = el.remove_child(&child);
    }
}
