// Node palette: one button per node type; clicking adds a node of that
// type at the viewport center.

use wasm_bindgen::closure::Closure;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Document, MouseEvent};

use crate::messages::Message;
use crate::models::NodeType;
use crate::state::dispatch_global_message;

const PALETTE_TYPES: [NodeType; 5] = [
    NodeType::Trigger,
    NodeType::Action,
    NodeType::Function,
    NodeType::Webhook,
    NodeType::Schedule,
];

pub fn setup_palette(document: &Document) -> Result<(), JsValue> {
    let palette = crate::dom_utils::get_element(document, "node-palette")?;
    crate::dom_utils::clear_children(&palette);

    for node_type in PALETTE_TYPES {
        let button = document.create_element("button")?;
        button.set_class_name("palette-button");
        button.set_text_content(Some(node_type.display_name()));
        palette.append_child(&button)?;

        let on_click = Closure::wrap(Box::new(move |_: MouseEvent| {
            dispatch_global_message(Message::AddNode {
                node_type,
                label: format!("New {}", node_type.display_name()),
            });
        }) as Box<dyn FnMut(_)>);
        button.add_event_listener_with_callback("click", on_click.as_ref().unchecked_ref())?;
        on_click.forget();
    }

    Ok(())
}
