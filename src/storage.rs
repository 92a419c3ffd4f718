use std::cell::RefCell;

use gloo_timers::callback::Timeout;
use serde_json::{from_str, to_string};
use wasm_bindgen::prelude::*;
use web_sys::Storage;

use crate::constants::AUTOSAVE_DEBOUNCE_MS;
use crate::models::{ProjectStore, User};
use crate::state::AppState;

// localStorage keys.  The user blob and project store are independent so
// logging out does not clear saved work.
const USER_KEY: &str = "autom8_user";
const PROJECT_STORE_KEY: &str = "autom8-project-storage";
const VIEWPORT_KEY: &str = "autom8_viewport";
const ACTIVE_VIEW_KEY: &str = "autom8_active_view";

// Structure to store viewport data
#[derive(serde::Serialize, serde::Deserialize)]
struct ViewportData {
    x: f64,
    y: f64,
    zoom: f64,
}

// Store the active view (Dashboard or Canvas)
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum ActiveView {
    Dashboard,
    Canvas,
}

fn local_storage() -> Result<Storage, JsValue> {
    let window = web_sys::window().ok_or_else(|| JsValue::from_str("no global window exists"))?;
    window
        .local_storage()?
        .ok_or_else(|| JsValue::from_str("no local storage exists"))
}

/// Write (or clear) the signed-in user.
pub fn save_user(user: Option<&User>) -> Result<(), JsValue> {
    let storage = local_storage()?;
    match user {
        Some(user) => {
            let user_str = to_string(user).map_err(|e| JsValue::from_str(&e.to_string()))?;
            storage.set_item(USER_KEY, &user_str)?;
        }
        None => storage.remove_item(USER_KEY)?,
    }
    Ok(())
}

/// Load the user saved by a previous session, if any.  A corrupt blob is
/// treated as signed-out rather than an error.
pub fn load_user() -> Result<Option<User>, JsValue> {
    let storage = local_storage()?;
    if let Some(user_str) = storage.get_item(USER_KEY)? {
        match from_str::<User>(&user_str) {
            Ok(user) => return Ok(Some(user)),
            Err(e) => {
                web_sys::console::warn_1(&format!("Failed to parse saved user: {}", e).into());
            }
        }
    }
    Ok(None)
}

/// Write the whole project store as one JSON blob.
pub fn save_project_store(store: &ProjectStore) -> Result<(), JsValue> {
    let storage = local_storage()?;
    let store_str = to_string(store).map_err(|e| JsValue::from_str(&e.to_string()))?;
    storage.set_item(PROJECT_STORE_KEY, &store_str)?;
    Ok(())
}

/// Load the project store, falling back to an empty one when absent or
/// unparseable.
pub fn load_project_store() -> Result<ProjectStore, JsValue> {
    let storage = local_storage()?;
    if let Some(store_str) = storage.get_item(PROJECT_STORE_KEY)? {
        match from_str::<ProjectStore>(&store_str) {
            Ok(store) => return Ok(store),
            Err(e) => {
                web_sys::console::error_1(
                    &format!("Failed to parse project store: {}", e).into(),
                );
            }
        }
    }
    Ok(ProjectStore::default())
}

/// Save viewport position, zoom, and the active view so a reload lands
/// where the user left off.
pub fn save_view_state(app_state: &AppState) -> Result<(), JsValue> {
    let storage = local_storage()?;

    let viewport_data = ViewportData {
        x: app_state.viewport_x,
        y: app_state.viewport_y,
        zoom: app_state.zoom_level,
    };
    let viewport_str =
        to_string(&viewport_data).map_err(|e| JsValue::from_str(&e.to_string()))?;
    storage.set_item(VIEWPORT_KEY, &viewport_str)?;

    let active_view_str =
        to_string(&app_state.active_view).map_err(|e| JsValue::from_str(&e.to_string()))?;
    storage.set_item(ACTIVE_VIEW_KEY, &active_view_str)?;

    Ok(())
}

/// Restore user, project store, viewport, and active view into `app_state`.
pub fn load_state(app_state: &mut AppState) -> Result<(), JsValue> {
    app_state.user = load_user()?;
    app_state.project_store = load_project_store()?;

    let storage = local_storage()?;
    if let Some(viewport_str) = storage.get_item(VIEWPORT_KEY)? {
        if let Ok(viewport) = from_str::<ViewportData>(&viewport_str) {
            app_state.viewport_x = viewport.x;
            app_state.viewport_y = viewport.y;
            app_state.zoom_level = viewport.zoom;
            app_state.clamp_zoom();
        }
    }
    if let Some(active_view_str) = storage.get_item(ACTIVE_VIEW_KEY)? {
        if let Ok(view) = from_str::<ActiveView>(&active_view_str) {
            app_state.active_view = view;
        }
    }

    Ok(())
}

// ----------------------------------------------------------------------
// Autosave debounce.  Mutating the canvas arms a 1 s timer; arming again
// replaces the pending timer, so only the last mutation in a burst writes
// through.
// ----------------------------------------------------------------------

thread_local! {
    static AUTOSAVE_TIMER: RefCell<Option<Timeout>> = RefCell::new(None);
}

/// (Re)arm the debounce timer.  Dropping the previous `Timeout` cancels it.
pub fn schedule_autosave() {
    let timer = Timeout::new(AUTOSAVE_DEBOUNCE_MS, || {
        AUTOSAVE_TIMER.with(|t| t.borrow_mut().take());
        crate::state::dispatch_global_message(crate::messages::Message::FlushAutosave);
    });
    AUTOSAVE_TIMER.with(|t| {
        *t.borrow_mut() = Some(timer);
    });
}

/// Drop any pending autosave without firing it.  Used when the canvas is
/// being torn down or replaced wholesale.
pub fn cancel_autosave() {
    AUTOSAVE_TIMER.with(|t| {
        t.borrow_mut().take();
    });
}
