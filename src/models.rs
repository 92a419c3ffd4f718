use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// The kind of step a canvas node represents.
#[derive(Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Debug)]
#[serde(rename_all = "snake_case")]
pub enum NodeType {
    Trigger,
    Action,
    Function,
    Webhook,
    Schedule,
}

impl NodeType {
    pub fn display_name(&self) -> &'static str {
        match self {
            NodeType::Trigger => "Trigger",
            NodeType::Action => "Action",
            NodeType::Function => "Function",
            NodeType::Webhook => "Webhook",
            NodeType::Schedule => "Schedule",
        }
    }
}

/// Visual state of a node while a simulated run plays back.
#[derive(Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Debug)]
#[serde(rename_all = "snake_case")]
pub enum NodeStatus {
    Idle,
    Running,
    Success,
    Error,
}

/// Node represents a visual step on the workflow canvas.
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
pub struct Node {
    pub id: String,
    pub node_type: NodeType,
    pub label: String,
    pub x: f64,
    pub y: f64,
    #[serde(default)]
    pub status: Option<NodeStatus>,
}

impl Node {
    pub fn new(
        id: impl Into<String>,
        node_type: NodeType,
        label: impl Into<String>,
        x: f64,
        y: f64,
    ) -> Self {
        Self {
            id: id.into(),
            node_type,
            label: label.into(),
            x,
            y,
            status: None,
        }
    }
}

/// Directed link between two nodes.  Both endpoints must exist in the canvas;
/// self-loops (`source == target`) are permitted.
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
pub struct Edge {
    pub id: String,
    pub source: String,
    pub target: String,
}

impl Edge {
    pub fn new(
        id: impl Into<String>,
        source: impl Into<String>,
        target: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            source: source.into(),
            target: target.into(),
        }
    }
}

/// Registry template for a workflow.  Templates are cloned when deployed to
/// the canvas so interactive edits never alias registry storage.
#[derive(Clone, Serialize, Deserialize, Debug)]
pub struct WorkflowDefinition {
    pub key: String,
    pub name: String,
    pub description: String,
    pub required_params: Vec<String>,
    pub can_fail: bool,
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
}

/// Which multi-turn exchange the assistant is in the middle of.
#[derive(Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Debug)]
#[serde(rename_all = "snake_case")]
pub enum ConversationStep {
    CollectingParams,
    AwaitingName,
}

/// Transient state carried between turns of a multi-turn exchange.  Created
/// when a required parameter is missing or a naming flow begins; cleared once
/// the flow completes or fails.
#[derive(Clone, Serialize, Deserialize, Debug)]
pub struct ConversationContext {
    pub intent: crate::intent::Intent,
    pub workflow_key: Option<String>,
    pub parameters: HashMap<String, String>,
    pub missing_params: Vec<String>,
    pub step: ConversationStep,
    pub original_message: Option<String>,
}

/// Per-node status of a simulated run.
#[derive(Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Debug)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionStatus {
    Running,
    Success,
    Error,
}

/// One synthetic log line per node, produced by the conversation engine.
/// Immutable once generated; consumed for display only.
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
pub struct ExecutionLogEntry {
    pub node_id: String,
    pub node_name: String,
    pub status: ExecutionStatus,
    pub timestamp_ms: f64,
    pub message: Option<String>,
    pub error: Option<String>,
}

/// A chat transcript entry.  A message is one of these variants from the
/// moment it is constructed; logs are never bolted onto a text message.
#[derive(Clone, Serialize, Deserialize, Debug)]
pub enum ChatMessage {
    User { text: String },
    Assistant { text: String },
    ExecutionLog { entries: Vec<ExecutionLogEntry> },
}

/// Locally persisted "account".  Presence in localStorage implies logged in.
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
pub struct User {
    pub name: String,
    pub email: String,
}

/// A persisted project grouping saved workflows.
#[derive(Clone, Serialize, Deserialize, Debug)]
pub struct Project {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub created_at: String,
    pub updated_at: String,
    pub workflows: Vec<String>,
}

/// A user-persisted workflow instance (as opposed to a registry template).
#[derive(Clone, Serialize, Deserialize, Debug)]
pub struct StoredWorkflow {
    pub id: String,
    #[serde(default)]
    pub project_id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
    pub created_at: String,
    pub updated_at: String,
}

/// Everything serialized under the `autom8-project-storage` key.
#[derive(Clone, Serialize, Deserialize, Debug, Default)]
pub struct ProjectStore {
    pub projects: Vec<Project>,
    pub workflows: HashMap<String, StoredWorkflow>,
    pub active_project_id: Option<String>,
    pub active_workflow_id: Option<String>,
}

impl ProjectStore {
    pub fn project(&self, id: &str) -> Option<&Project> {
        self.projects.iter().find(|p| p.id == id)
    }

    pub fn project_mut(&mut self, id: &str) -> Option<&mut Project> {
        self.projects.iter_mut().find(|p| p.id == id)
    }

    /// Remove a project together with every workflow it owns.  Clears the
    /// active pointers when they referenced the deleted entities.
    pub fn delete_project(&mut self, id: &str) {
        let owned: Vec<String> = self
            .project(id)
            .map(|p| p.workflows.clone())
            .unwrap_or_default();
        for wf_id in &owned {
            self.workflows.remove(wf_id);
            if self.active_workflow_id.as_deref() == Some(wf_id.as_str()) {
                self.active_workflow_id = None;
            }
        }
        self.projects.retain(|p| p.id != id);
        if self.active_project_id.as_deref() == Some(id) {
            self.active_project_id = None;
        }
    }

    pub fn delete_workflow(&mut self, id: &str) {
        self.workflows.remove(id);
        for project in &mut self.projects {
            project.workflows.retain(|w| w != id);
        }
        if self.active_workflow_id.as_deref() == Some(id) {
            self.active_workflow_id = None;
        }
    }
}
