// Chat domain reducer: the transcript, the assistant turn cycle, and the
// staggered execution-log reveal.

use crate::conversation;
use crate::messages::{Command, Message};
use crate::models::{ChatMessage, ExecutionStatus, NodeStatus};
use crate::state::AppState;
use crate::utils;

pub fn update(state: &mut AppState, msg: &Message, commands: &mut Vec<Command>) -> bool {
    match msg {
        Message::UpdateChatInput(text) => {
            state.chat_input = text.clone();
            false
        }

        Message::SubmitChatMessage => {
            let text = state.chat_input.trim().to_string();
            // One turn at a time: ignore submits while a reply is pending.
            if text.is_empty() || state.assistant_pending {
                return false;
            }
            state.chat_input.clear();
            state.chat_messages.push(ChatMessage::User { text: text.clone() });
            state.assistant_pending = true;
            commands.push(Command::ScheduleAssistantReply { text });
            commands.push(refresh_chat());
            true
        }

        Message::AssistantTurn(text) => {
            let context = state.conversation_context.take();
            let response = conversation::respond(
                &mut state.registry,
                context,
                text,
                utils::now_ms(),
                conversation::failure_roll(),
            );

            state.chat_messages.push(ChatMessage::Assistant {
                text: response.text,
            });
            state.conversation_context = response.context;
            state.assistant_pending = false;

            // A non-empty node set means the engine deployed a workflow to
            // the canvas (trigger, edit, or freshly created).
            if !response.nodes.is_empty() {
                state.set_workflow(response.nodes, response.edges);
                state.active_view = crate::storage::ActiveView::Canvas;
                commands.push(Command::update_ui(|| {
                    crate::views::render_active_view();
                }));
                commands.push(Command::ScheduleAutosave);
            }

            if let Some(logs) = response.logs {
                commands.push(Command::PlayExecutionLogs(logs));
            }
            commands.push(refresh_chat());
            true
        }

        Message::ShowExecutionLogEntry(entry) => {
            if let Some(node) = state.nodes.get_mut(&entry.node_id) {
                node.status = Some(match entry.status {
                    ExecutionStatus::Running => NodeStatus::Running,
                    ExecutionStatus::Success => NodeStatus::Success,
                    ExecutionStatus::Error => NodeStatus::Error,
                });
            }
            // Entries accumulate into one trailing log card rather than one
            // bubble per step.
            match state.chat_messages.last_mut() {
                Some(ChatMessage::ExecutionLog { entries }) => entries.push(entry.clone()),
                _ => state.chat_messages.push(ChatMessage::ExecutionLog {
                    entries: vec![entry.clone()],
                }),
            }
            commands.push(refresh_chat());
            true
        }

        _ => false,
    }
}

fn refresh_chat() -> Command {
    Command::update_ui(|| {
        if let Err(e) = crate::components::chat_view::refresh() {
            web_sys::console::warn_1(&format!("Failed to refresh chat view: {:?}", e).into());
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ExecutionLogEntry;

    fn dispatch(state: &mut AppState, msg: Message) -> Vec<Command> {
        let mut commands = Vec::new();
        update(state, &msg, &mut commands);
        commands
    }

    #[test]
    fn submit_pushes_user_message_and_schedules_reply() {
        let mut state = AppState::new();
        state.chat_input = "  run welcome email  ".into();
        let commands = dispatch(&mut state, Message::SubmitChatMessage);

        assert!(state.assistant_pending);
        assert!(state.chat_input.is_empty());
        assert!(matches!(
            state.chat_messages.last(),
            Some(ChatMessage::User { text }) if text == "run welcome email"
        ));
        assert!(commands
            .iter()
            .any(|c| matches!(c, Command::ScheduleAssistantReply { text } if text == "run welcome email")));
    }

    #[test]
    fn empty_or_pending_submit_is_ignored() {
        let mut state = AppState::new();
        state.chat_input = "   ".into();
        let commands = dispatch(&mut state, Message::SubmitChatMessage);
        assert!(state.chat_messages.is_empty());
        assert!(commands.is_empty());

        state.chat_input = "hello".into();
        state.assistant_pending = true;
        dispatch(&mut state, Message::SubmitChatMessage);
        assert!(state.chat_messages.is_empty());
    }

    #[test]
    fn successful_trigger_deploys_nodes_and_plays_logs() {
        let mut state = AppState::new();
        let commands = dispatch(
            &mut state,
            Message::AssistantTurn("run the welcome email workflow for alice@example.com".into()),
        );

        assert!(!state.assistant_pending);
        assert!(!state.nodes.is_empty());
        assert_eq!(state.active_view, crate::storage::ActiveView::Canvas);
        assert!(commands
            .iter()
            .any(|c| matches!(c, Command::PlayExecutionLogs(logs) if !logs.is_empty())));
    }

    #[test]
    fn log_entries_accumulate_into_one_card_and_set_node_status() {
        let mut state = AppState::new();
        dispatch(
            &mut state,
            Message::AssistantTurn("run the welcome email workflow for alice@example.com".into()),
        );
        let node_ids: Vec<String> = state.nodes.keys().cloned().collect();

        for (i, id) in node_ids.iter().enumerate() {
            let entry = ExecutionLogEntry {
                node_id: id.clone(),
                node_name: format!("step {}", i),
                status: ExecutionStatus::Success,
                timestamp_ms: i as f64 * 800.0,
                message: None,
                error: None,
            };
            dispatch(&mut state, Message::ShowExecutionLogEntry(entry));
        }

        let log_cards = state
            .chat_messages
            .iter()
            .filter(|m| matches!(m, ChatMessage::ExecutionLog { .. }))
            .count();
        assert_eq!(log_cards, 1);
        assert!(state
            .nodes
            .values()
            .all(|n| n.status == Some(NodeStatus::Success)));
    }

    #[test]
    fn context_survives_between_turns() {
        let mut state = AppState::new();
        // Trigger without the required email: engine should ask and park a
        // collecting-params context.
        dispatch(
            &mut state,
            Message::AssistantTurn("run the welcome email workflow".into()),
        );
        assert!(state.conversation_context.is_some());

        // Supplying the email on the next turn completes the flow.
        dispatch(
            &mut state,
            Message::AssistantTurn("alice@example.com".into()),
        );
        assert!(state.conversation_context.is_none());
        assert!(!state.nodes.is_empty());
    }
}
