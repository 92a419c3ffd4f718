//! Tiny toast helper.  Creates a `#toast-root` container once per page and
//! appends toast divs that auto-remove after a few seconds.

use gloo_timers::callback::Timeout;
use wasm_bindgen::JsCast;
use web_sys::{Document, Element, HtmlElement};

const TOAST_LIFETIME_MS: u32 = 4000;

#[derive(Debug, Clone, Copy)]
pub enum ToastKind {
    Success,
    Error,
    Info,
}

pub fn success(msg: &str) {
    show(msg, ToastKind::Success);
}

pub fn error(msg: &str) {
    show(msg, ToastKind::Error);
}

#[allow(dead_code)]
pub fn info(msg: &str) {
    show(msg, ToastKind::Info);
}

pub fn show(message: &str, kind: ToastKind) {
    let document = match web_sys::window().and_then(|w| w.document()) {
        Some(d) => d,
        None => return,
    };
    let root = match ensure_root(&document) {
        Some(r) => r,
        None => return,
    };

    let toast = match document.create_element("div") {
        Ok(el) => el,
        Err(_) => return,
    };
    toast.set_class_name(match kind {
        ToastKind::Success => "toast toast-success",
        ToastKind::Error => "toast toast-error",
        ToastKind::Info => "toast toast-info",
    });
    toast.set_text_content(Some(message));

    // Prepend so the newest appears on top.
    let _ = root.prepend_with_node_1(&toast);

    let toast_el: HtmlElement = toast.unchecked_into();
    Timeout::new(TOAST_LIFETIME_MS, move || {
        if let Some(parent) = toast_el.parent_node() {
            let _ = parent.remove_child(&toast_el);
        }
    })
    .forget();

    ensure_styles(&document);
}

fn ensure_root(document: &Document) -> Option<Element> {
    if let Some(el) = document.get_element_by_id("toast-root") {
        return Some(el);
    }
    let root = document.create_element("div").ok()?;
    root.set_id("toast-root");
    root.set_class_name("toast-root");
    document.body()?.append_child(&root).ok()?;
    Some(root)
}

fn ensure_styles(document: &Document) {
    if document.get_element_by_id("toast-styles").is_some() {
        return;
    }

    let css = "
.toast-root{position:fixed;top:16px;right:16px;display:flex;flex-direction:column;gap:8px;z-index:9999;font-family:system-ui,sans-serif}
.toast{padding:10px 16px;border-radius:6px;color:#fff;box-shadow:0 2px 4px rgba(0,0,0,.1);opacity:0;animation:toast-in .2s forwards}
.toast-success{background:#16a34a}
.toast-error{background:#dc2626}
.toast-info{background:#2563eb}
@keyframes toast-in{to{opacity:1}}
";

    if let Ok(style) = document.create_element("style") {
        style.set_id("toast-styles");
        style.set_text_content(Some(css));
        if let Some(head) = document.head() {
            let _ = head.append_child(&style);
        }
    }
}
