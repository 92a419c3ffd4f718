// src/messages.rs
//
// The events that can occur in the UI, plus the side effects reducers may
// request.  State changes stay pure; effects run after the borrow ends.
//
use crate::models::{Edge, ExecutionLogEntry, Node, NodeType};
use crate::storage::ActiveView;

#[derive(Debug, Clone)]
pub enum Message {
    // View switching
    ToggleView(ActiveView),

    // Chat / assistant
    UpdateChatInput(String),
    SubmitChatMessage,
    // Fired by the latency timer: run one engine turn for the given text.
    AssistantTurn(String),
    ShowExecutionLogEntry(ExecutionLogEntry),

    // Canvas model
    AddNode {
        node_type: NodeType,
        label: String,
    },
    DeleteNode {
        node_id: String,
    },
    UpdateNodePosition {
        node_id: String,
        x: f64,
        y: f64,
    },
    UpdateNodeLabel {
        node_id: String,
        label: String,
    },
    AddEdge {
        source: String,
        target: String,
    },
    RemoveEdge {
        edge_id: String,
    },
    SetWorkflow {
        nodes: Vec<Node>,
        edges: Vec<Edge>,
    },
    ResetWorkflow,

    // View transform & gestures
    TogglePanMode,
    StartPan {
        x: f64,
        y: f64,
    },
    UpdatePan {
        x: f64,
        y: f64,
    },
    StopPan,
    ZoomCanvas {
        new_zoom: f64,
        viewport_x: f64,
        viewport_y: f64,
    },
    StartNodeDrag {
        node_id: String,
        offset_x: f64,
        offset_y: f64,
    },
    StopNodeDrag,
    StartConnection {
        source_id: String,
        x: f64,
        y: f64,
    },
    UpdateConnection {
        x: f64,
        y: f64,
    },
    CompleteConnection {
        target_id: String,
    },
    CancelConnection,

    // Projects & persisted workflows
    CreateProject {
        name: String,
    },
    SelectProject {
        project_id: String,
    },
    DeleteProject {
        project_id: String,
    },
    CreateStoredWorkflow {
        name: String,
    },
    OpenStoredWorkflow {
        workflow_id: String,
    },
    DeleteStoredWorkflow {
        workflow_id: String,
    },
    // Debounce timer fired: write the canvas through to the project store.
    FlushAutosave,

    // Local account
    LoginUser {
        name: String,
        email: String,
    },
    LogoutUser,
}

/// Commands represent side effects that should be executed after state
/// updates: timers, persistence, and DOM refreshes.
pub enum Command {
    /// Chain another message to be processed.
    SendMessage(Message),

    /// Execute a UI update function after state changes.
    UpdateUI(Box<dyn FnOnce() + 'static>),

    /// Start the fake-latency timer for an assistant turn.
    ScheduleAssistantReply { text: String },

    /// Reveal execution log entries on the staggered playback plan.
    PlayExecutionLogs(Vec<ExecutionLogEntry>),

    /// (Re)arm the 1s autosave debounce; replaces any pending timer.
    ScheduleAutosave,

    /// Write the project store blob to localStorage immediately.
    PersistProjectStore,

    /// Write (or clear) the `autom8_user` blob.
    PersistUser,

    /// Represents no side effect.
    NoOp,
}

impl Command {
    /// Helper to create a SendMessage command.
    pub fn send(msg: Message) -> Self {
        Command::SendMessage(msg)
    }

    /// Helper to create a NoOp command.
    pub fn none() -> Self {
        Command::NoOp
    }

    /// Helper to create an UpdateUI command.
    pub fn update_ui<F>(f: F) -> Self
    where
        F: FnOnce() + 'static,
    {
        Command::UpdateUI(Box::new(f))
    }
}
