// Chat panel: the transcript, the input row, and the pending indicator.

use wasm_bindgen::closure::Closure;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Document, Element, KeyboardEvent, MouseEvent};

use crate::messages::Message;
use crate::models::{ChatMessage, ExecutionStatus};
use crate::state::{dispatch_global_message, APP_STATE};

pub fn setup_chat(document: &Document) -> Result<(), JsValue> {
    let input = crate::dom_utils::html_input(document, "chat-input")?;

    let input_clone = input.clone();
    let on_input = Closure::wrap(Box::new(move |_: web_sys::Event| {
        dispatch_global_message(Message::UpdateChatInput(input_clone.value()));
    }) as Box<dyn FnMut(_)>);
    input.add_event_listener_with_callback("input", on_input.as_ref().unchecked_ref())?;
    on_input.forget();

    let input_clone = input.clone();
    let on_keydown = Closure::wrap(Box::new(move |event: KeyboardEvent| {
        if event.key() == "Enter" {
            event.prevent_default();
            dispatch_global_message(Message::UpdateChatInput(input_clone.value()));
            dispatch_global_message(Message::SubmitChatMessage);
        }
    }) as Box<dyn FnMut(_)>);
    input.add_event_listener_with_callback("keydown", on_keydown.as_ref().unchecked_ref())?;
    on_keydown.forget();

    let send_btn = crate::dom_utils::get_element(document, "chat-send")?;
    let input_clone = input.clone();
    let on_send = Closure::wrap(Box::new(move |_: MouseEvent| {
        dispatch_global_message(Message::UpdateChatInput(input_clone.value()));
        dispatch_global_message(Message::SubmitChatMessage);
    }) as Box<dyn FnMut(_)>);
    send_btn.add_event_listener_with_callback("click", on_send.as_ref().unchecked_ref())?;
    on_send.forget();

    refresh()
}

/// Re-render the transcript from state and sync the input box.
pub fn refresh() -> Result<(), JsValue> {
    let document = crate::dom_utils::document()?;
    let container = crate::dom_utils::get_element(&document, "chat-messages")?;

    let (messages, pending, input_value) = APP_STATE.with(|state| {
        let state = state.borrow();
        (
            state.chat_messages.clone(),
            state.assistant_pending,
            state.chat_input.clone(),
        )
    });

    render_transcript(&document, &container, &messages, pending)?;

    if let Ok(input) = crate::dom_utils::html_input(&document, "chat-input") {
        if input.value() != input_value {
            input.set_value(&input_value);
        }
    }

    // Keep the newest message in view.
    container.set_scroll_top(container.scroll_height());
    Ok(())
}

/// Build the transcript DOM into `container`.  Kept separate from state
/// access so it can be exercised against a detached element.
pub fn render_transcript(
    document: &Document,
    container: &Element,
    messages: &[ChatMessage],
    pending: bool,
) -> Result<(), JsValue> {
    crate::dom_utils::clear_children(container);

    for message in messages {
        match message {
            ChatMessage::User { text } => {
                let bubble = document.create_element("div")?;
                bubble.set_class_name("chat-message user");
                bubble.set_text_content(Some(text));
                container.append_child(&bubble)?;
            }
            ChatMessage::Assistant { text } => {
                let bubble = document.create_element("div")?;
                bubble.set_class_name("chat-message assistant");
                bubble.set_text_content(Some(text));
                container.append_child(&bubble)?;
            }
            ChatMessage::ExecutionLog { entries } => {
                let card = document.create_element("div")?;
                card.set_class_name("execution-log");
                for entry in entries {
                    let row = document.create_element("div")?;
                    row.set_class_name(match entry.status {
                        ExecutionStatus::Running => "log-row running",
                        ExecutionStatus::Success => "log-row success",
                        ExecutionStatus::Error => "log-row error",
                    });
                    let text = match (&entry.error, &entry.message) {
                        (Some(err), _) => format!("{} — {}", entry.node_name, err),
                        (None, Some(msg)) => format!("{} — {}", entry.node_name, msg),
                        (None, None) => entry.node_name.clone(),
                    };
                    row.set_text_content(Some(&text));
                    card.append_child(&row)?;
                }
                container.append_child(&card)?;
            }
        }
    }

    if pending {
        let indicator = document.create_element("div")?;
        indicator.set_class_name("chat-message assistant pending");
        indicator.set_text_content(Some("…"));
        container.append_child(&indicator)?;
    }

    Ok(())
}

#[cfg(all(test, target_arch = "wasm32"))]
mod tests {
    use super::*;
    use crate::models::ExecutionLogEntry;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    fn doc() -> Document {
        web_sys::window().unwrap().document().unwrap()
    }

    #[wasm_bindgen_test]
    fn transcript_renders_each_message_kind() {
        let document = doc();
        let container = document.create_element("div").unwrap();

        let messages = vec![
            ChatMessage::User {
                text: "run welcome email".into(),
            },
            ChatMessage::Assistant {
                text: "Running it now.".into(),
            },
            ChatMessage::ExecutionLog {
                entries: vec![ExecutionLogEntry {
                    node_id: "n1".into(),
                    node_name: "Send email".into(),
                    status: ExecutionStatus::Error,
                    timestamp_ms: 0.0,
                    message: None,
                    error: Some("Step failed: upstream service did not respond".into()),
                }],
            },
        ];

        render_transcript(&document, &container, &messages, true).unwrap();

        assert_eq!(container.children().length(), 4); // 3 messages + pending
        let log_row = container
            .query_selector(".execution-log .log-row.error")
            .unwrap()
            .unwrap();
        assert!(log_row
            .text_content()
            .unwrap()
            .contains("upstream service did not respond"));
    }

    #[wasm_bindgen_test]
    fn rerender_replaces_rather_than_appends() {
        let document = doc();
        let container = document.create_element("div").unwrap();
        let messages = vec![ChatMessage::User { text: "hi".into() }];

        render_transcript(&document, &container, &messages, false).unwrap();
        render_transcript(&document, &container, &messages, false).unwrap();

        assert_eq!(container.children().length(), 1);
    }
}
