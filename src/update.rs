// src/update.rs
//
// Top-level reducer: routes each message to its domain reducer.  Returns
// whether state changed in a way that needs a redraw.

use crate::messages::{Command, Message};
use crate::reducers;
use crate::state::AppState;

pub fn update(state: &mut AppState, msg: &Message, commands: &mut Vec<Command>) -> bool {
    match msg {
        Message::ToggleView(view) => {
            if state.active_view == *view {
                return false;
            }
            // Leaving the canvas flushes any pending autosave so nothing
            // is lost if the tab closes from the dashboard.
            if state.active_view == crate::storage::ActiveView::Canvas {
                commands.push(Command::send(Message::FlushAutosave));
            }
            state.active_view = *view;
            commands.push(Command::update_ui(|| {
                crate::views::render_active_view();
            }));
            true
        }

        Message::UpdateChatInput(..)
        | Message::SubmitChatMessage
        | Message::AssistantTurn(..)
        | Message::ShowExecutionLogEntry(..) => reducers::chat::update(state, msg, commands),

        Message::AddNode { .. }
        | Message::DeleteNode { .. }
        | Message::UpdateNodePosition { .. }
        | Message::UpdateNodeLabel { .. }
        | Message::AddEdge { .. }
        | Message::RemoveEdge { .. }
        | Message::SetWorkflow { .. }
        | Message::ResetWorkflow
        | Message::TogglePanMode
        | Message::StartPan { .. }
        | Message::UpdatePan { .. }
        | Message::StopPan
        | Message::ZoomCanvas { .. }
        | Message::StartNodeDrag { .. }
        | Message::StopNodeDrag
        | Message::StartConnection { .. }
        | Message::UpdateConnection { .. }
        | Message::CompleteConnection { .. }
        | Message::CancelConnection => reducers::canvas::update(state, msg, commands),

        Message::CreateProject { .. }
        | Message::SelectProject { .. }
        | Message::DeleteProject { .. }
        | Message::CreateStoredWorkflow { .. }
        | Message::OpenStoredWorkflow { .. }
        | Message::DeleteStoredWorkflow { .. }
        | Message::FlushAutosave
        | Message::LoginUser { .. }
        | Message::LogoutUser => reducers::project::update(state, msg, commands),
    }
}
