use std::cell::RefCell;
use std::collections::HashMap;

use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

use crate::constants::{MAX_ZOOM, MIN_ZOOM, NODE_HEIGHT, NODE_WIDTH, WHEEL_ZOOM_FACTOR};
use crate::messages::{Command, Message};
use crate::models::{
    ChatMessage, ConversationContext, Edge, Node, ProjectStore, User,
};
use crate::registry::WorkflowRegistry;
use crate::storage::ActiveView;
use crate::update::update;
use crate::utils::new_id;

/// In-flight connection gesture: a floating endpoint tracked in world
/// coordinates until the mouse is released.
#[derive(Clone, Debug)]
pub struct ConnectionDrag {
    pub source_id: String,
    pub x: f64,
    pub y: f64,
}

// Store global application state
pub struct AppState {
    // Assistant
    pub registry: WorkflowRegistry,
    pub conversation_context: Option<ConversationContext>,
    pub chat_messages: Vec<ChatMessage>,
    pub chat_input: String,
    pub assistant_pending: bool,

    // Canvas model
    pub nodes: HashMap<String, Node>,
    pub edges: Vec<Edge>,

    // Canvas element and rendering context
    pub canvas: Option<HtmlCanvasElement>,
    pub context: Option<CanvasRenderingContext2d>,
    pub canvas_width: f64,
    pub canvas_height: f64,

    // View transform, independent of the model
    pub viewport_x: f64,
    pub viewport_y: f64,
    pub zoom_level: f64,

    // Interaction state
    pub pan_mode: bool,
    pub panning: bool,
    pub pan_last_x: f64,
    pub pan_last_y: f64,
    pub dragging: Option<String>,
    pub drag_offset_x: f64,
    pub drag_offset_y: f64,
    pub connection: Option<ConnectionDrag>,

    // Persistence
    pub project_store: ProjectStore,
    pub user: Option<User>,

    pub active_view: ActiveView,
    // Whether the canvas changed since the last write-through to the store
    pub state_modified: bool,
}

impl AppState {
    pub fn new() -> Self {
        Self {
            registry: WorkflowRegistry::with_demo_workflows(),
            conversation_context: None,
            chat_messages: Vec::new(),
            chat_input: String::new(),
            assistant_pending: false,
            nodes: HashMap::new(),
            edges: Vec::new(),
            canvas: None,
            context: None,
            canvas_width: 800.0,
            canvas_height: 600.0,
            viewport_x: 0.0,
            viewport_y: 0.0,
            zoom_level: 1.0,
            pan_mode: false,
            panning: false,
            pan_last_x: 0.0,
            pan_last_y: 0.0,
            dragging: None,
            drag_offset_x: 0.0,
            drag_offset_y: 0.0,
            connection: None,
            project_store: ProjectStore::default(),
            user: None,
            active_view: ActiveView::Dashboard,
            state_modified: false,
        }
    }

    // ------------------------------------------------------------------
    // Canvas model operations.  All synchronous, in-memory, and total over
    // the node/edge sets.
    // ------------------------------------------------------------------

    /// Append a node.  The id is caller-supplied; uniqueness is the
    /// caller's responsibility.
    pub fn add_node(&mut self, node: Node) {
        self.nodes.insert(node.id.clone(), node);
        self.state_modified = true;
    }

    /// Remove a node and every edge touching it, restoring the invariant
    /// that no edge references a missing node.
    pub fn remove_node(&mut self, node_id: &str) {
        self.nodes.remove(node_id);
        self.edges
            .retain(|e| e.source != node_id && e.target != node_id);
        self.state_modified = true;
    }

    /// Replace a node's position; no-op if the id is absent.
    pub fn update_node_position(&mut self, node_id: &str, x: f64, y: f64) {
        if let Some(node) = self.nodes.get_mut(node_id) {
            node.x = x;
            node.y = y;
            self.state_modified = true;
        }
    }

    pub fn update_node_label(&mut self, node_id: &str, label: &str) {
        if let Some(node) = self.nodes.get_mut(node_id) {
            node.label = label.to_string();
            self.state_modified = true;
        }
    }

    /// Append an edge.  No cycle or duplicate check; self-loops allowed.
    pub fn add_edge(&mut self, source: &str, target: &str) -> String {
        let edge = Edge::new(new_id("edge"), source, target);
        let id = edge.id.clone();
        self.edges.push(edge);
        self.state_modified = true;
        id
    }

    pub fn remove_edge(&mut self, edge_id: &str) {
        self.edges.retain(|e| e.id != edge_id);
        self.state_modified = true;
    }

    /// Wholesale replace the active node/edge set (no merging with prior
    /// state).  Used when the assistant deploys a workflow or the user opens
    /// a saved one.
    pub fn set_workflow(&mut self, nodes: Vec<Node>, edges: Vec<Edge>) {
        self.nodes = nodes.into_iter().map(|n| (n.id.clone(), n)).collect();
        self.edges = edges;
        self.state_modified = true;
    }

    /// Clear nodes, edges, and per-node execution status.
    pub fn reset_workflow(&mut self) {
        self.nodes.clear();
        self.edges.clear();
        self.connection = None;
        self.dragging = None;
        self.state_modified = true;
    }

    pub fn clear_node_statuses(&mut self) {
        for node in self.nodes.values_mut() {
            node.status = None;
        }
    }

    // ------------------------------------------------------------------
    // Coordinate transforms & hit testing
    // ------------------------------------------------------------------

    /// Screen pixel -> world coordinate under the current view transform.
    pub fn screen_to_world(&self, x: f64, y: f64) -> (f64, f64) {
        (
            x / self.zoom_level + self.viewport_x,
            y / self.zoom_level + self.viewport_y,
        )
    }

    /// Node under the world point, with the grab offset from its top-left
    /// corner.  Nodes paint in map iteration order, so the last hit is the
    /// one drawn on top when bodies overlap.
    pub fn find_node_at(&self, wx: f64, wy: f64) -> Option<(String, f64, f64)> {
        let mut hit = None;
        for (id, node) in &self.nodes {
            if wx >= node.x && wx <= node.x + NODE_WIDTH && wy >= node.y && wy <= node.y + NODE_HEIGHT
            {
                hit = Some((id.clone(), wx - node.x, wy - node.y));
            }
        }
        hit
    }

    /// Node whose *output* connector (right-center) is under the point.
    pub fn find_output_connector_at(&self, wx: f64, wy: f64) -> Option<String> {
        self.find_connector_at(wx, wy, true)
    }

    /// Node whose *input* connector (left-center) is under the point.
    pub fn find_input_connector_at(&self, wx: f64, wy: f64) -> Option<String> {
        self.find_connector_at(wx, wy, false)
    }

    fn find_connector_at(&self, wx: f64, wy: f64, output: bool) -> Option<String> {
        let radius = crate::constants::CONNECTOR_RADIUS * 1.5;
        for (id, node) in &self.nodes {
            let cx = if output { node.x + NODE_WIDTH } else { node.x };
            let cy = node.y + NODE_HEIGHT / 2.0;
            let dx = wx - cx;
            let dy = wy - cy;
            if dx * dx + dy * dy <= radius * radius {
                return Some(id.clone());
            }
        }
        None
    }

    /// World position where a palette-created node lands: the viewport
    /// center, nudged so the node body is centered.
    pub fn viewport_center(&self) -> (f64, f64) {
        let x = self.viewport_x + (self.canvas_width / self.zoom_level) / 2.0 - NODE_WIDTH / 2.0;
        let y = self.viewport_y + (self.canvas_height / self.zoom_level) / 2.0 - NODE_HEIGHT / 2.0;
        (x, y)
    }

    pub fn clamp_zoom(&mut self) {
        self.zoom_level = self.zoom_level.clamp(MIN_ZOOM, MAX_ZOOM);
    }

    // New dispatch method to handle messages; returns the side effects the
    // reducers requested.
    pub fn dispatch(&mut self, msg: Message) -> Vec<Command> {
        let mut commands = Vec::new();
        update(self, &msg, &mut commands);
        commands
    }
}

/// Multiplicative wheel zoom, clamped to the allowed range.  Pure so the
/// bound can be property-tested without a canvas.
pub fn apply_wheel_zoom(zoom: f64, delta_y: f64) -> f64 {
    let factor = if delta_y > 0.0 {
        1.0 / WHEEL_ZOOM_FACTOR
    } else {
        WHEEL_ZOOM_FACTOR
    };
    (zoom * factor).clamp(MIN_ZOOM, MAX_ZOOM)
}

// We use thread_local to store our app state
thread_local! {
    pub static APP_STATE: RefCell<AppState> = RefCell::new(AppState::new());
}

// Global helper for dispatching messages with side effects executed outside
// the state borrow.
pub fn dispatch_global_message(msg: Message) {
    let commands = APP_STATE.with(|state| {
        let mut state = state.borrow_mut();
        state.dispatch(msg)
    });
    execute_commands(commands);

    // Keep the canvas in sync after every state change; the renderer is a
    // no-op until the canvas element is mounted.
    APP_STATE.with(|state| {
        let state = state.borrow();
        crate::canvas::renderer::draw_canvas(&state);
    });
}

fn execute_commands(commands: Vec<Command>) {
    for cmd in commands {
        match cmd {
            Command::SendMessage(msg) => dispatch_global_message(msg),
            Command::UpdateUI(f) => f(),
            Command::ScheduleAssistantReply { text } => {
                let delay = crate::scheduling::reply_latency_ms();
                gloo_timers::callback::Timeout::new(delay, move || {
                    dispatch_global_message(Message::AssistantTurn(text));
                })
                .forget();
            }
            Command::PlayExecutionLogs(entries) => {
                let plan = crate::scheduling::log_playback_plan(entries);
                crate::scheduling::run_plan(plan, |entry| {
                    dispatch_global_message(Message::ShowExecutionLogEntry(entry));
                });
            }
            Command::ScheduleAutosave => {
                crate::storage::schedule_autosave();
            }
            Command::PersistProjectStore => {
                let result = APP_STATE.with(|state| {
                    let state = state.borrow();
                    crate::storage::save_project_store(&state.project_store)
                });
                if let Err(e) = result {
                    web_sys::console::warn_1(
                        &format!("Failed to persist project store: {:?}", e).into(),
                    );
                }
            }
            Command::PersistUser => {
                let result = APP_STATE.with(|state| {
                    let state = state.borrow();
                    crate::storage::save_user(state.user.as_ref())
                });
                if let Err(e) = result {
                    web_sys::console::warn_1(&format!("Failed to persist user: {:?}", e).into());
                }
            }
            Command::NoOp => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NodeType;
    use proptest::prelude::*;

    fn node(id: &str, x: f64, y: f64) -> Node {
        Node::new(id, NodeType::Action, id, x, y)
    }

    #[test]
    fn remove_node_cascades_incident_edges() {
        let mut state = AppState::new();
        state.add_node(node("a", 0.0, 0.0));
        state.add_node(node("b", 300.0, 0.0));
        state.add_node(node("c", 600.0, 0.0));
        state.add_edge("a", "b");
        state.add_edge("b", "c");
        state.add_edge("b", "b"); // self-loop is allowed
        state.add_edge("a", "c");

        state.remove_node("b");

        assert!(!state.nodes.contains_key("b"));
        assert_eq!(state.edges.len(), 1);
        assert!(state
            .edges
            .iter()
            .all(|e| e.source != "b" && e.target != "b"));
    }

    #[test]
    fn set_workflow_replaces_wholesale() {
        let mut state = AppState::new();
        state.add_node(node("old", 0.0, 0.0));
        state.add_edge("old", "old");

        let nodes = vec![node("n1", 0.0, 0.0), node("n2", 260.0, 0.0)];
        let edges = vec![Edge::new("e1", "n1", "n2")];
        state.set_workflow(nodes.clone(), edges.clone());

        assert_eq!(state.nodes.len(), 2);
        assert!(state.nodes.contains_key("n1") && state.nodes.contains_key("n2"));
        assert!(!state.nodes.contains_key("old"));
        assert_eq!(state.edges, edges);
    }

    #[test]
    fn update_position_is_noop_for_missing_node() {
        let mut state = AppState::new();
        state.update_node_position("ghost", 10.0, 10.0);
        assert!(state.nodes.is_empty());

        state.add_node(node("a", 0.0, 0.0));
        state.update_node_position("a", 42.0, 7.0);
        assert_eq!(state.nodes["a"].x, 42.0);
        assert_eq!(state.nodes["a"].y, 7.0);
    }

    #[test]
    fn reset_workflow_clears_everything() {
        let mut state = AppState::new();
        state.add_node(node("a", 0.0, 0.0));
        state.add_edge("a", "a");
        state.connection = Some(ConnectionDrag {
            source_id: "a".into(),
            x: 0.0,
            y: 0.0,
        });
        state.reset_workflow();
        assert!(state.nodes.is_empty());
        assert!(state.edges.is_empty());
        assert!(state.connection.is_none());
    }

    #[test]
    fn overlapping_hit_matches_paint_order() {
        let mut state = AppState::new();
        state.add_node(node("under", 100.0, 100.0));
        state.add_node(node("over", 100.0, 100.0));

        // The renderer paints in map iteration order, so the node iterated
        // last sits on top; the hit test must agree with what the user sees.
        let topmost = state.nodes.keys().last().cloned().unwrap();
        let (hit, _, _) = state.find_node_at(150.0, 140.0).unwrap();
        assert_eq!(hit, topmost);
    }

    #[test]
    fn connector_hit_testing_distinguishes_sides() {
        let mut state = AppState::new();
        state.add_node(node("a", 100.0, 100.0));
        // Right-center is the output; left-center is the input.
        let (out_x, out_y) = (100.0 + crate::constants::NODE_WIDTH, 140.0);
        assert_eq!(state.find_output_connector_at(out_x, out_y), Some("a".into()));
        assert_eq!(state.find_input_connector_at(out_x, out_y), None);
        assert_eq!(state.find_input_connector_at(100.0, 140.0), Some("a".into()));
    }

    proptest! {
        // Zoom never leaves [0.5, 2.0] regardless of wheel sequence.
        #[test]
        fn wheel_zoom_stays_clamped(deltas in prop::collection::vec(-120.0f64..120.0, 0..64)) {
            let mut zoom = 1.0;
            for d in deltas {
                zoom = apply_wheel_zoom(zoom, d);
                prop_assert!((0.5..=2.0).contains(&zoom));
            }
        }

        // Cascade invariant holds for arbitrary removal orders.
        #[test]
        fn no_dangling_edges_after_removals(remove_order in prop::collection::vec(0usize..6, 1..6)) {
            let mut state = AppState::new();
            let ids: Vec<String> = (0..6).map(|i| format!("n{}", i)).collect();
            for (i, id) in ids.iter().enumerate() {
                state.add_node(node(id, i as f64 * 50.0, 0.0));
            }
            for i in 0..5 {
                state.add_edge(&ids[i], &ids[i + 1]);
            }
            for idx in remove_order {
                state.remove_node(&ids[idx]);
                for edge in &state.edges {
                    prop_assert!(state.nodes.contains_key(&edge.source));
                    prop_assert!(state.nodes.contains_key(&edge.target));
                }
            }
        }
    }
}
