// Project domain reducer: the dashboard's project/workflow CRUD, the
// autosave write-through, and the local account.

use crate::messages::{Command, Message};
use crate::models::{Project, StoredWorkflow, User};
use crate::state::AppState;
use crate::storage::ActiveView;
use crate::utils;

pub fn update(state: &mut AppState, msg: &Message, commands: &mut Vec<Command>) -> bool {
    match msg {
        Message::CreateProject { name } => {
            let now = utils::now_rfc3339();
            let project = Project {
                id: utils::new_id("project"),
                name: name.clone(),
                description: None,
                created_at: now.clone(),
                updated_at: now,
                workflows: Vec::new(),
            };
            state.project_store.active_project_id = Some(project.id.clone());
            state.project_store.active_workflow_id = None;
            state.project_store.projects.push(project);
            commands.push(Command::PersistProjectStore);
            commands.push(refresh_dashboard());
            true
        }

        Message::SelectProject { project_id } => {
            if state.project_store.project(project_id).is_none() {
                return false;
            }
            state.project_store.active_project_id = Some(project_id.clone());
            state.project_store.active_workflow_id = None;
            commands.push(Command::PersistProjectStore);
            commands.push(refresh_dashboard());
            true
        }

        Message::DeleteProject { project_id } => {
            // Removes the project's workflows too and clears any active
            // pointers into it.
            state.project_store.delete_project(project_id);
            commands.push(Command::PersistProjectStore);
            commands.push(refresh_dashboard());
            true
        }

        Message::CreateStoredWorkflow { name } => {
            let project_id = match state.project_store.active_project_id.clone() {
                Some(id) => id,
                None => return false,
            };
            let now = utils::now_rfc3339();
            let workflow = StoredWorkflow {
                id: utils::new_id("workflow"),
                project_id: Some(project_id.clone()),
                name: name.clone(),
                description: None,
                nodes: Vec::new(),
                edges: Vec::new(),
                created_at: now.clone(),
                updated_at: now,
            };
            let workflow_id = workflow.id.clone();
            if let Some(project) = state.project_store.project_mut(&project_id) {
                project.workflows.push(workflow_id.clone());
                project.updated_at = utils::now_rfc3339();
            }
            state
                .project_store
                .workflows
                .insert(workflow_id.clone(), workflow);
            state.project_store.active_workflow_id = Some(workflow_id);

            // A new workflow starts from a blank canvas.
            state.reset_workflow();
            state.active_view = ActiveView::Canvas;
            commands.push(Command::PersistProjectStore);
            commands.push(Command::update_ui(|| {
                crate::views::render_active_view();
            }));
            true
        }

        Message::OpenStoredWorkflow { workflow_id } => {
            let (nodes, edges, project_id) =
                match state.project_store.workflows.get(workflow_id) {
                    Some(wf) => (wf.nodes.clone(), wf.edges.clone(), wf.project_id.clone()),
                    None => return false,
                };
            if project_id.is_some() {
                state.project_store.active_project_id = project_id;
            }
            state.project_store.active_workflow_id = Some(workflow_id.clone());
            // Stop any still-running log reveal before swapping the canvas.
            crate::scheduling::cancel_playback();
            state.set_workflow(nodes, edges);
            state.clear_node_statuses();
            state.active_view = ActiveView::Canvas;
            commands.push(Command::update_ui(|| {
                crate::views::render_active_view();
            }));
            true
        }

        Message::DeleteStoredWorkflow { workflow_id } => {
            state.project_store.delete_workflow(workflow_id);
            commands.push(Command::PersistProjectStore);
            commands.push(refresh_dashboard());
            true
        }

        Message::FlushAutosave => {
            crate::storage::cancel_autosave();
            if let Some(workflow_id) = state.project_store.active_workflow_id.clone() {
                let nodes: Vec<_> = state.nodes.values().cloned().collect();
                let edges = state.edges.clone();
                let project_id = match state.project_store.workflows.get_mut(&workflow_id) {
                    Some(wf) => {
                        wf.nodes = nodes;
                        wf.edges = edges;
                        wf.updated_at = utils::now_rfc3339();
                        wf.project_id.clone()
                    }
                    None => return false,
                };
                if let Some(project_id) = project_id {
                    if let Some(project) = state.project_store.project_mut(&project_id) {
                        project.updated_at = utils::now_rfc3339();
                    }
                }
                state.state_modified = false;
                commands.push(Command::PersistProjectStore);
            }
            false
        }

        Message::LoginUser { name, email } => {
            state.user = Some(User {
                name: name.clone(),
                email: email.clone(),
            });
            commands.push(Command::PersistUser);
            commands.push(refresh_dashboard());
            true
        }

        Message::LogoutUser => {
            state.user = None;
            commands.push(Command::PersistUser);
            commands.push(refresh_dashboard());
            true
        }

        _ => false,
    }
}

fn refresh_dashboard() -> Command {
    Command::update_ui(|| {
        crate::views::render_active_view();
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Node, NodeType};

    fn dispatch(state: &mut AppState, msg: Message) -> Vec<Command> {
        let mut commands = Vec::new();
        update(state, &msg, &mut commands);
        commands
    }

    fn with_project_and_workflow(state: &mut AppState) -> (String, String) {
        dispatch(state, Message::CreateProject { name: "CRM".into() });
        let project_id = state.project_store.active_project_id.clone().unwrap();
        dispatch(
            state,
            Message::CreateStoredWorkflow {
                name: "Lead intake".into(),
            },
        );
        let workflow_id = state.project_store.active_workflow_id.clone().unwrap();
        (project_id, workflow_id)
    }

    #[test]
    fn create_project_activates_it_and_persists() {
        let mut state = AppState::new();
        let commands = dispatch(&mut state, Message::CreateProject { name: "CRM".into() });
        assert_eq!(state.project_store.projects.len(), 1);
        assert!(state.project_store.active_project_id.is_some());
        assert!(commands
            .iter()
            .any(|c| matches!(c, Command::PersistProjectStore)));
    }

    #[test]
    fn create_workflow_requires_an_active_project() {
        let mut state = AppState::new();
        let commands = dispatch(
            &mut state,
            Message::CreateStoredWorkflow { name: "x".into() },
        );
        assert!(state.project_store.workflows.is_empty());
        assert!(commands.is_empty());
    }

    #[test]
    fn flush_autosave_writes_canvas_into_active_workflow() {
        let mut state = AppState::new();
        let (_, workflow_id) = with_project_and_workflow(&mut state);

        state.add_node(Node::new("n1", NodeType::Trigger, "Start", 0.0, 0.0));
        state.add_node(Node::new("n2", NodeType::Action, "Do it", 260.0, 0.0));
        state.add_edge("n1", "n2");

        dispatch(&mut state, Message::FlushAutosave);

        let wf = &state.project_store.workflows[&workflow_id];
        assert_eq!(wf.nodes.len(), 2);
        assert_eq!(wf.edges.len(), 1);
        assert!(!state.state_modified);
    }

    #[test]
    fn deleting_a_project_cascades_its_workflows() {
        let mut state = AppState::new();
        let (project_id, workflow_id) = with_project_and_workflow(&mut state);

        dispatch(&mut state, Message::DeleteProject { project_id });

        assert!(state.project_store.projects.is_empty());
        assert!(!state.project_store.workflows.contains_key(&workflow_id));
        assert!(state.project_store.active_project_id.is_none());
        assert!(state.project_store.active_workflow_id.is_none());
    }

    #[test]
    fn open_workflow_loads_it_onto_the_canvas() {
        let mut state = AppState::new();
        let (_, workflow_id) = with_project_and_workflow(&mut state);
        state.add_node(Node::new("n1", NodeType::Trigger, "Start", 0.0, 0.0));
        dispatch(&mut state, Message::FlushAutosave);

        // Wander off and come back.
        state.reset_workflow();
        state.active_view = ActiveView::Dashboard;
        dispatch(&mut state, Message::OpenStoredWorkflow { workflow_id });

        assert_eq!(state.nodes.len(), 1);
        assert_eq!(state.active_view, ActiveView::Canvas);
    }

    #[test]
    fn login_and_logout_persist_the_user_blob() {
        let mut state = AppState::new();
        let commands = dispatch(
            &mut state,
            Message::LoginUser {
                name: "Alice".into(),
                email: "alice@example.com".into(),
            },
        );
        assert!(state.user.is_some());
        assert!(commands.iter().any(|c| matches!(c, Command::PersistUser)));

        dispatch(&mut state, Message::LogoutUser);
        assert!(state.user.is_none());
    }
}
