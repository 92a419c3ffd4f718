use wasm_bindgen::closure::Closure;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::Document;

pub mod canvas;
pub mod components;
pub mod constants;
pub mod conversation;
pub mod dom_utils;
pub mod intent;
pub mod messages;
pub mod models;
pub mod registry;
pub mod reducers;
pub mod scheduling;
pub mod state;
pub mod storage;
pub mod toast;
pub mod update;
pub mod utils;
pub mod views;

// Main entry point for the WASM application
#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();

    let window = web_sys::window().ok_or_else(|| JsValue::from_str("no global window exists"))?;
    let document = window
        .document()
        .ok_or_else(|| JsValue::from_str("no document on window"))?;

    create_base_ui(&document)?;
    create_tab_navigation(&document)?;

    // Restore user, projects, viewport, and active view from the previous
    // session before any component reads state.
    state::APP_STATE.with(|state_ref| {
        let mut state = state_ref.borrow_mut();
        if let Err(e) = storage::load_state(&mut state) {
            web_sys::console::warn_1(&format!("Failed to load saved state: {:?}", e).into());
        }
    });

    components::canvas_editor::setup_canvas(&document)?;
    components::chat_view::setup_chat(&document)?;
    components::node_palette::setup_palette(&document)?;

    views::render_active_view();

    Ok(())
}

// Build the static page skeleton the components render into.
fn create_base_ui(document: &Document) -> Result<(), JsValue> {
    let body = document
        .body()
        .ok_or_else(|| JsValue::from_str("document has no body"))?;

    let app = document.create_element("div")?;
    app.set_id("app");
    body.append_child(&app)?;

    let header = document.create_element("header")?;
    header.set_id("app-header");
    let title = document.create_element("h1")?;
    title.set_text_content(Some("Autom8"));
    header.append_child(&title)?;
    let user_menu = document.create_element("div")?;
    user_menu.set_id("user-menu-root");
    header.append_child(&user_menu)?;
    app.append_child(&header)?;

    let dashboard = document.create_element("div")?;
    dashboard.set_id("dashboard-root");
    dashboard.set_class_name("visible");
    app.append_child(&dashboard)?;

    // Canvas view: palette | canvas+toolbar | chat panel
    let canvas_view = document.create_element("div")?;
    canvas_view.set_id("canvas-view");
    canvas_view.set_class_name("hidden");

    let palette = document.create_element("div")?;
    palette.set_id("node-palette");
    canvas_view.append_child(&palette)?;

    let canvas_container = document.create_element("div")?;
    canvas_container.set_id("canvas-container");
    let toolbar = document.create_element("div")?;
    toolbar.set_id("canvas-toolbar");
    let pan_toggle = document.create_element("button")?;
    pan_toggle.set_id("pan-toggle");
    pan_toggle.set_text_content(Some("Pan"));
    toolbar.append_child(&pan_toggle)?;
    let reset_btn = document.create_element("button")?;
    reset_btn.set_id("reset-workflow-btn");
    reset_btn.set_text_content(Some("Clear"));
    toolbar.append_child(&reset_btn)?;
    canvas_container.append_child(&toolbar)?;
    let canvas = document.create_element("canvas")?;
    canvas.set_id("workflow-canvas");
    canvas_container.append_child(&canvas)?;
    canvas_view.append_child(&canvas_container)?;

    let chat_panel = document.create_element("div")?;
    chat_panel.set_id("chat-panel");
    let chat_messages = document.create_element("div")?;
    chat_messages.set_id("chat-messages");
    chat_panel.append_child(&chat_messages)?;
    let input_row = document.create_element("div")?;
    input_row.set_id("chat-input-row");
    let chat_input = document.create_element("input")?;
    chat_input.set_id("chat-input");
    chat_input.set_attribute("placeholder", "Describe a workflow to run or build…")?;
    input_row.append_child(&chat_input)?;
    let chat_send = document.create_element("button")?;
    chat_send.set_id("chat-send");
    chat_send.set_text_content(Some("Send"));
    input_row.append_child(&chat_send)?;
    chat_panel.append_child(&input_row)?;
    canvas_view.append_child(&chat_panel)?;

    app.append_child(&canvas_view)?;

    inject_base_styles(document)?;
    Ok(())
}

fn create_tab_navigation(document: &Document) -> Result<(), JsValue> {
    let header = dom_utils::get_element(document, "app-header")?;

    let tabs = document.create_element("div")?;
    tabs.set_id("tabs-container");

    let dashboard_tab = document.create_element("button")?;
    dashboard_tab.set_id("dashboard-tab");
    dashboard_tab.set_class_name("tab-button active");
    dashboard_tab.set_text_content(Some("Dashboard"));
    tabs.append_child(&dashboard_tab)?;

    let canvas_tab = document.create_element("button")?;
    canvas_tab.set_id("canvas-tab");
    canvas_tab.set_class_name("tab-button");
    canvas_tab.set_text_content(Some("Canvas"));
    tabs.append_child(&canvas_tab)?;

    header.append_child(&tabs)?;

    let on_dashboard = Closure::wrap(Box::new(move |_: web_sys::MouseEvent| {
        state::dispatch_global_message(messages::Message::ToggleView(
            storage::ActiveView::Dashboard,
        ));
    }) as Box<dyn FnMut(_)>);
    dashboard_tab
        .add_event_listener_with_callback("click", on_dashboard.as_ref().unchecked_ref())?;
    on_dashboard.forget();

    let on_canvas = Closure::wrap(Box::new(move |_: web_sys::MouseEvent| {
        state::dispatch_global_message(messages::Message::ToggleView(storage::ActiveView::Canvas));
    }) as Box<dyn FnMut(_)>);
    canvas_tab.add_event_listener_with_callback("click", on_canvas.as_ref().unchecked_ref())?;
    on_canvas.forget();

    Ok(())
}

fn inject_base_styles(document: &Document) -> Result<(), JsValue> {
    let css = "
*{box-sizing:border-box}
body{margin:0;font-family:system-ui,-apple-system,sans-serif;color:#1e293b}
#app{display:flex;flex-direction:column;height:100vh}
#app-header{display:flex;align-items:center;gap:24px;padding:8px 16px;border-bottom:1px solid #e2e8f0}
#app-header h1{font-size:18px;margin:0}
#user-menu-root{margin-left:auto;display:flex;gap:8px;align-items:center}
.tab-button{padding:6px 14px;border:none;background:none;cursor:pointer;border-bottom:2px solid transparent}
.tab-button.active{border-bottom-color:#6366f1;font-weight:600}
.hidden{display:none}
#dashboard-root.visible{display:flex;gap:24px;padding:24px;flex:1}
#canvas-view.visible{display:flex;flex:1;min-height:0}
.dashboard-panel{flex:1}
.create-row{display:flex;gap:8px;margin-bottom:12px}
.project-list,.workflow-list{list-style:none;padding:0;margin:0}
.project-item,.workflow-item{display:flex;justify-content:space-between;padding:8px;border-bottom:1px solid #e2e8f0}
.project-item.active{background:#eef2ff}
.project-name,.workflow-name{cursor:pointer}
.delete-button{color:#dc2626;background:none;border:none;cursor:pointer}
#node-palette{display:flex;flex-direction:column;gap:8px;padding:12px;border-right:1px solid #e2e8f0}
.palette-button{padding:8px 12px;cursor:pointer}
#canvas-container{position:relative;flex:1;min-width:0}
#canvas-toolbar{position:absolute;top:12px;left:12px;z-index:10;display:flex;gap:8px}
#pan-toggle.active{background:#6366f1;color:#fff}
#chat-panel{width:320px;display:flex;flex-direction:column;border-left:1px solid #e2e8f0}
#chat-messages{flex:1;overflow-y:auto;padding:12px;display:flex;flex-direction:column;gap:8px}
.chat-message{padding:8px 12px;border-radius:8px;max-width:90%}
.chat-message.user{background:#6366f1;color:#fff;align-self:flex-end}
.chat-message.assistant{background:#f1f5f9;align-self:flex-start;white-space:pre-wrap}
.execution-log{background:#0f172a;color:#e2e8f0;border-radius:8px;padding:8px 12px;font-family:ui-monospace,monospace;font-size:12px}
.log-row.success{color:#86efac}
.log-row.error{color:#fca5a5}
.log-row.running{color:#fcd34d}
#chat-input-row{display:flex;gap:8px;padding:12px;border-top:1px solid #e2e8f0}
#chat-input{flex:1}
";
    let style = document.create_element("style")?;
    style.set_id("app-styles");
    style.set_text_content(Some(css));
    if let Some(head) = document.head() {
        head.append_child(&style)?;
    }
    Ok(())
}
