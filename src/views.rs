// View switching between the dashboard and the canvas editor.

use wasm_bindgen::prelude::*;

use crate::dom_utils;
use crate::state::APP_STATE;
use crate::storage::ActiveView;

/// Show the active view and re-render its contents.  Safe to call from any
/// command closure; failures are logged rather than propagated.
pub fn render_active_view() {
    if let Err(e) = render() {
        web_sys::console::warn_1(&format!("Failed to render view: {:?}", e).into());
    }
}

fn render() -> Result<(), JsValue> {
    let document = dom_utils::document()?;
    let active = APP_STATE.with(|state| state.borrow().active_view);

    let dashboard_root = dom_utils::get_element(&document, "dashboard-root")?;
    let canvas_view = dom_utils::get_element(&document, "canvas-view")?;
    let dashboard_tab = dom_utils::get_element(&document, "dashboard-tab")?;
    let canvas_tab = dom_utils::get_element(&document, "canvas-tab")?;

    match active {
        ActiveView::Dashboard => {
            dom_utils::show(&dashboard_root);
            dom_utils::hide(&canvas_view);
            dom_utils::set_active(&dashboard_tab);
            dom_utils::set_inactive(&canvas_tab);
            crate::components::dashboard::render(&document)?;
        }
        ActiveView::Canvas => {
            dom_utils::hide(&dashboard_root);
            dom_utils::show(&canvas_view);
            dom_utils::set_active(&canvas_tab);
            dom_utils::set_inactive(&dashboard_tab);
            // The container reports zero size while hidden, so re-measure
            // now that it is visible.
            crate::components::canvas_editor::refresh()?;
            crate::components::chat_view::refresh()?;
        }
    }

    crate::components::user_menu::render(&document)?;

    let result = APP_STATE.with(|state| {
        let state = state.borrow();
        crate::storage::save_view_state(&state)
    });
    if let Err(e) = result {
        web_sys::console::warn_1(&format!("Failed to save view state: {:?}", e).into());
    }

    Ok(())
}
