//! In-memory workflow template registry.
//!
//! Seeded at startup with the demo workflows; `register` is an upsert so a
//! user creating a workflow whose derived key collides with an existing one
//! silently replaces it (accepted behavior, see DESIGN.md).

use std::collections::HashMap;

use crate::models::{Edge, Node, NodeType, WorkflowDefinition};

pub struct WorkflowRegistry {
    workflows: HashMap<String, WorkflowDefinition>,
    // Preserves seeding/registration order for stable listings.
    order: Vec<String>,
}

impl WorkflowRegistry {
    pub fn new() -> Self {
        Self {
            workflows: HashMap::new(),
            order: Vec::new(),
        }
    }

    /// Registry pre-populated with the demo templates the assistant knows.
    pub fn with_demo_workflows() -> Self {
        let mut registry = Self::new();
        for def in demo_workflows() {
            registry.register(def);
        }
        registry
    }

    pub fn get(&self, key: &str) -> Option<&WorkflowDefinition> {
        self.workflows.get(key)
    }

    /// Deep copy of a template for canvas activation.  The clone owns its
    /// node and edge vectors outright, so later canvas edits cannot reach
    /// back into the stored template.
    pub fn activate(&self, key: &str) -> Option<WorkflowDefinition> {
        self.workflows.get(key).cloned()
    }

    pub fn list(&self) -> Vec<&WorkflowDefinition> {
        self.order
            .iter()
            .filter_map(|key| self.workflows.get(key))
            .collect()
    }

    /// Upsert a definition under its own key.
    pub fn register(&mut self, def: WorkflowDefinition) {
        if !self.workflows.contains_key(&def.key) {
            self.order.push(def.key.clone());
        }
        self.workflows.insert(def.key.clone(), def);
    }

    pub fn len(&self) -> usize {
        self.workflows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.workflows.is_empty()
    }
}

impl Default for WorkflowRegistry {
    fn default() -> Self {
        Self::with_demo_workflows()
    }
}

fn chain(key: &str, steps: &[(NodeType, &str)]) -> (Vec<Node>, Vec<Edge>) {
    let nodes: Vec<Node> = steps
        .iter()
        .enumerate()
        .map(|(i, (node_type, label))| {
            Node::new(
                format!("{}_{}", key, i + 1),
                *node_type,
                *label,
                120.0 + i as f64 * 260.0,
                180.0,
            )
        })
        .collect();
    let edges = nodes
        .windows(2)
        .enumerate()
        .map(|(i, pair)| {
            Edge::new(
                format!("{}_e{}", key, i + 1),
                pair[0].id.clone(),
                pair[1].id.clone(),
            )
        })
        .collect();
    (nodes, edges)
}

fn demo_workflows() -> Vec<WorkflowDefinition> {
    let mut defs = Vec::new();

    let (nodes, edges) = chain(
        "welcome_email",
        &[
            (NodeType::Trigger, "New signup"),
            (NodeType::Function, "Personalize template"),
            (NodeType::Action, "Send welcome email"),
        ],
    );
    defs.push(WorkflowDefinition {
        key: "welcome_email".into(),
        name: "Welcome Email".into(),
        description: "Sends a personalized welcome email to new signups".into(),
        required_params: vec!["email".into()],
        can_fail: false,
        nodes,
        edges,
    });

    let (nodes, edges) = chain(
        "lead_capture",
        &[
            (NodeType::Webhook, "Form submission"),
            (NodeType::Function, "Score lead"),
            (NodeType::Action, "Add to CRM"),
            (NodeType::Action, "Notify sales"),
        ],
    );
    defs.push(WorkflowDefinition {
        key: "lead_capture".into(),
        name: "Lead Capture".into(),
        description: "Captures form leads, scores them, and syncs to the CRM".into(),
        required_params: vec!["email".into()],
        can_fail: true,
        nodes,
        edges,
    });

    let (nodes, edges) = chain(
        "data_sync",
        &[
            (NodeType::Schedule, "Every hour"),
            (NodeType::Function, "Transform rows"),
            (NodeType::Action, "Sync to Google Sheets"),
        ],
    );
    defs.push(WorkflowDefinition {
        key: "data_sync".into(),
        name: "Data Sync".into(),
        description: "Hourly sync of records into a Google Sheet".into(),
        required_params: vec![],
        can_fail: true,
        nodes,
        edges,
    });

    let (nodes, edges) = chain(
        "social_media_post",
        &[
            (NodeType::Schedule, "Daily at 9am"),
            (NodeType::Function, "Pick best content"),
            (NodeType::Action, "Publish post"),
        ],
    );
    defs.push(WorkflowDefinition {
        key: "social_media_post".into(),
        name: "Social Media Post".into(),
        description: "Publishes scheduled posts across social channels".into(),
        required_params: vec![],
        can_fail: false,
        nodes,
        edges,
    });

    let (nodes, edges) = chain(
        "support_ticket_triage",
        &[
            (NodeType::Webhook, "New ticket"),
            (NodeType::Function, "Classify urgency"),
            (NodeType::Action, "Assign to agent"),
        ],
    );
    defs.push(WorkflowDefinition {
        key: "support_ticket_triage".into(),
        name: "Support Ticket Triage".into(),
        description: "Classifies incoming tickets and routes them to the right agent".into(),
        required_params: vec![],
        can_fail: false,
        nodes,
        edges,
    });

    defs
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seeded_registry_has_demo_workflows() {
        let registry = WorkflowRegistry::with_demo_workflows();
        assert_eq!(registry.len(), 5);
        assert!(registry.get("welcome_email").is_some());
        assert!(registry.get("support_ticket_triage").is_some());
        assert!(registry.get("nope").is_none());
    }

    #[test]
    fn templates_are_wired_chains() {
        let registry = WorkflowRegistry::with_demo_workflows();
        let def = registry.get("lead_capture").unwrap();
        assert_eq!(def.nodes.len(), 4);
        assert_eq!(def.edges.len(), 3);
        for edge in &def.edges {
            assert!(def.nodes.iter().any(|n| n.id == edge.source));
            assert!(def.nodes.iter().any(|n| n.id == edge.target));
        }
    }

    #[test]
    fn register_is_an_upsert() {
        let mut registry = WorkflowRegistry::with_demo_workflows();
        let mut replacement = registry.get("data_sync").unwrap().clone();
        replacement.description = "replaced".into();
        registry.register(replacement);
        assert_eq!(registry.len(), 5);
        assert_eq!(registry.get("data_sync").unwrap().description, "replaced");
        // Listing order is stable across the upsert.
        assert_eq!(registry.list()[2].key, "data_sync");
    }

    #[test]
    fn activation_clones_do_not_alias_the_template() {
        let registry = WorkflowRegistry::with_demo_workflows();
        let mut live = registry.activate("welcome_email").unwrap();
        live.nodes[0].label = "mutated".into();
        live.nodes.remove(1);
        assert_eq!(registry.get("welcome_email").unwrap().nodes[0].label, "New signup");
        assert_eq!(registry.get("welcome_email").unwrap().nodes.len(), 3);
    }
}
