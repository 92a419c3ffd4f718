// Canvas domain reducer: node/edge mutations, the view transform, and the
// three mouse gestures (pan, node drag, connection drag).

use crate::messages::{Command, Message};
use crate::models::Node;
use crate::state::{AppState, ConnectionDrag};
use crate::utils;

pub fn update(state: &mut AppState, msg: &Message, commands: &mut Vec<Command>) -> bool {
    match msg {
        Message::AddNode { node_type, label } => {
            let (x, y) = state.viewport_center();
            let node = Node::new(utils::new_id("node"), *node_type, label.clone(), x, y);
            state.add_node(node);
            commands.push(Command::ScheduleAutosave);
            true
        }

        Message::DeleteNode { node_id } => {
            state.remove_node(node_id);
            commands.push(Command::ScheduleAutosave);
            true
        }

        Message::UpdateNodePosition { node_id, x, y } => {
            state.update_node_position(node_id, *x, *y);
            true
        }

        Message::UpdateNodeLabel { node_id, label } => {
            state.update_node_label(node_id, label);
            commands.push(Command::ScheduleAutosave);
            true
        }

        Message::AddEdge { source, target } => {
            state.add_edge(source, target);
            commands.push(Command::ScheduleAutosave);
            true
        }

        Message::RemoveEdge { edge_id } => {
            state.remove_edge(edge_id);
            commands.push(Command::ScheduleAutosave);
            true
        }

        Message::SetWorkflow { nodes, edges } => {
            state.set_workflow(nodes.clone(), edges.clone());
            commands.push(Command::ScheduleAutosave);
            true
        }

        Message::ResetWorkflow => {
            // A run may still be revealing log entries; clearing the canvas
            // must stop the transcript from growing too.
            crate::scheduling::cancel_playback();
            state.reset_workflow();
            commands.push(Command::ScheduleAutosave);
            true
        }

        Message::TogglePanMode => {
            state.pan_mode = !state.pan_mode;
            // Abandon any half-finished gesture when the mode flips.
            state.panning = false;
            state.dragging = None;
            state.connection = None;
            true
        }

        Message::StartPan { x, y } => {
            if !state.pan_mode {
                return false;
            }
            state.panning = true;
            state.pan_last_x = *x;
            state.pan_last_y = *y;
            false
        }

        Message::UpdatePan { x, y } => {
            if !state.panning {
                return false;
            }
            // Deltas are screen pixels; divide by zoom so the world moves
            // 1:1 under the cursor.
            state.viewport_x -= (x - state.pan_last_x) / state.zoom_level;
            state.viewport_y -= (y - state.pan_last_y) / state.zoom_level;
            state.pan_last_x = *x;
            state.pan_last_y = *y;
            true
        }

        Message::StopPan => {
            state.panning = false;
            commands.push(persist_view_state());
            false
        }

        Message::ZoomCanvas {
            new_zoom,
            viewport_x,
            viewport_y,
        } => {
            state.zoom_level = *new_zoom;
            state.clamp_zoom();
            state.viewport_x = *viewport_x;
            state.viewport_y = *viewport_y;
            commands.push(persist_view_state());
            true
        }

        Message::StartNodeDrag {
            node_id,
            offset_x,
            offset_y,
        } => {
            state.dragging = Some(node_id.clone());
            state.drag_offset_x = *offset_x;
            state.drag_offset_y = *offset_y;
            false
        }

        Message::StopNodeDrag => {
            if state.dragging.take().is_some() {
                commands.push(Command::ScheduleAutosave);
            }
            false
        }

        Message::StartConnection { source_id, x, y } => {
            state.connection = Some(ConnectionDrag {
                source_id: source_id.clone(),
                x: *x,
                y: *y,
            });
            true
        }

        Message::UpdateConnection { x, y } => {
            if let Some(conn) = state.connection.as_mut() {
                conn.x = *x;
                conn.y = *y;
                return true;
            }
            false
        }

        Message::CompleteConnection { target_id } => {
            if let Some(conn) = state.connection.take() {
                state.add_edge(&conn.source_id, target_id);
                commands.push(Command::ScheduleAutosave);
                return true;
            }
            false
        }

        Message::CancelConnection => state.connection.take().is_some(),

        _ => false,
    }
}

fn persist_view_state() -> Command {
    Command::update_ui(|| {
        let result = crate::state::APP_STATE.with(|state| {
            let state = state.borrow();
            crate::storage::save_view_state(&state)
        });
        if let Err(e) = result {
            web_sys::console::warn_1(&format!("Failed to save view state: {:?}", e).into());
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NodeType;
    use crate::state::apply_wheel_zoom;

    fn dispatch(state: &mut AppState, msg: Message) -> Vec<Command> {
        let mut commands = Vec::new();
        update(state, &msg, &mut commands);
        commands
    }

    #[test]
    fn add_node_lands_at_viewport_center_and_arms_autosave() {
        let mut state = AppState::new();
        let commands = dispatch(
            &mut state,
            Message::AddNode {
                node_type: NodeType::Action,
                label: "Send email".into(),
            },
        );
        assert_eq!(state.nodes.len(), 1);
        let node = state.nodes.values().next().unwrap();
        let (cx, cy) = state.viewport_center();
        assert_eq!((node.x, node.y), (cx, cy));
        assert!(commands
            .iter()
            .any(|c| matches!(c, Command::ScheduleAutosave)));
    }

    #[test]
    fn pan_requires_pan_mode() {
        let mut state = AppState::new();
        dispatch(&mut state, Message::StartPan { x: 10.0, y: 10.0 });
        assert!(!state.panning);

        dispatch(&mut state, Message::TogglePanMode);
        dispatch(&mut state, Message::StartPan { x: 10.0, y: 10.0 });
        assert!(state.panning);

        dispatch(&mut state, Message::UpdatePan { x: 30.0, y: 10.0 });
        // Dragging right pulls the viewport left (content follows cursor).
        assert_eq!(state.viewport_x, -20.0);
        assert_eq!(state.viewport_y, 0.0);
    }

    #[test]
    fn pan_delta_scales_with_zoom() {
        let mut state = AppState::new();
        state.zoom_level = 2.0;
        dispatch(&mut state, Message::TogglePanMode);
        dispatch(&mut state, Message::StartPan { x: 0.0, y: 0.0 });
        dispatch(&mut state, Message::UpdatePan { x: 40.0, y: 0.0 });
        assert_eq!(state.viewport_x, -20.0);
    }

    #[test]
    fn zoom_message_clamps_out_of_range_values() {
        let mut state = AppState::new();
        dispatch(
            &mut state,
            Message::ZoomCanvas {
                new_zoom: 9.0,
                viewport_x: 0.0,
                viewport_y: 0.0,
            },
        );
        assert_eq!(state.zoom_level, 2.0);

        dispatch(
            &mut state,
            Message::ZoomCanvas {
                new_zoom: 0.01,
                viewport_x: 0.0,
                viewport_y: 0.0,
            },
        );
        assert_eq!(state.zoom_level, 0.5);
    }

    #[test]
    fn wheel_zoom_helper_matches_clamp_bounds() {
        let mut zoom = 1.9;
        zoom = apply_wheel_zoom(zoom, -1.0);
        assert_eq!(zoom, 2.0);
        let mut zoom = 0.52;
        zoom = apply_wheel_zoom(zoom, 1.0);
        assert_eq!(zoom, 0.5);
    }

    #[test]
    fn connection_gesture_creates_edge_only_on_complete() {
        let mut state = AppState::new();
        state.add_node(Node::new("a", NodeType::Trigger, "a", 0.0, 0.0));
        state.add_node(Node::new("b", NodeType::Action, "b", 300.0, 0.0));

        dispatch(
            &mut state,
            Message::StartConnection {
                source_id: "a".into(),
                x: 200.0,
                y: 40.0,
            },
        );
        dispatch(&mut state, Message::UpdateConnection { x: 280.0, y: 40.0 });
        assert!(state.edges.is_empty());

        dispatch(&mut state, Message::CancelConnection);
        assert!(state.connection.is_none());
        assert!(state.edges.is_empty());

        dispatch(
            &mut state,
            Message::StartConnection {
                source_id: "a".into(),
                x: 200.0,
                y: 40.0,
            },
        );
        dispatch(
            &mut state,
            Message::CompleteConnection {
                target_id: "b".into(),
            },
        );
        assert_eq!(state.edges.len(), 1);
        assert_eq!(state.edges[0].source, "a");
        assert_eq!(state.edges[0].target, "b");
    }

    #[test]
    fn toggling_pan_mode_abandons_gestures()  {
        let mut state = AppState::new();
        state.add_node(Node::new("a", NodeType::Trigger, "a", 0.0, 0.0));
        dispatch(
            &mut state,
            Message::StartConnection {
                source_id: "a".into(),
                x: 0.0,
                y: 0.0,
            },
        );
        dispatch(&mut state, Message::TogglePanMode);
        assert!(state.pan_mode);
        assert!(state.connection.is_none());
    }
}
