//! The mock assistant's conversation engine.
//!
//! A small, explicit state machine: each turn takes the user's message plus
//! the optional context left over from the previous turn and produces an
//! [`AssistantResponse`].  Nothing here talks to the DOM or a network — the
//! caller supplies the start timestamp and the failure roll, which keeps
//! every path deterministic under test.

use std::collections::HashMap;

use crate::intent::{self, Intent};
use crate::models::{
    ConversationContext, ConversationStep, Edge, ExecutionLogEntry, ExecutionStatus, Node,
    NodeType, WorkflowDefinition,
};
use crate::registry::WorkflowRegistry;

/// Milliseconds between consecutive synthetic log entries.
pub const LOG_STEP_MS: f64 = 800.0;

/// Probability that a `can_fail` workflow's final node errors out.
pub const FAILURE_PROBABILITY: f64 = 0.3;

const APOLOGY_TEXT: &str =
    "Sorry, something went wrong on my end. Let's start over — what would you like to do?";

/// Everything one assistant turn can hand back to the UI.
pub struct AssistantResponse {
    pub text: String,
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
    pub context: Option<ConversationContext>,
    pub logs: Option<Vec<ExecutionLogEntry>>,
    pub workflow_list: Option<Vec<(String, String)>>,
}

impl AssistantResponse {
    fn text_only(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            nodes: Vec::new(),
            edges: Vec::new(),
            context: None,
            logs: None,
            workflow_list: None,
        }
    }
}

/// Draw the random number deciding whether a `can_fail` run errors.  Kept
/// separate from [`respond`] so the engine itself stays deterministic.
pub fn failure_roll() -> f64 {
    rand::random::<f64>()
}

/// Advance the conversation one turn.
pub fn respond(
    registry: &mut WorkflowRegistry,
    context: Option<ConversationContext>,
    message: &str,
    start_ms: f64,
    roll: f64,
) -> AssistantResponse {
    if let Some(ctx) = context {
        return continue_flow(registry, ctx, message, start_ms, roll);
    }

    match intent::parse(message) {
        Intent::TriggerWorkflow => {
            let params = intent::extract_parameters(message);
            match intent::extract_workflow_name(message, registry) {
                Some(key) => trigger_workflow(registry, &key, params, start_ms, roll),
                None => not_found_response(registry),
            }
        }
        Intent::CreateWorkflow => AssistantResponse {
            context: Some(ConversationContext {
                intent: Intent::CreateWorkflow,
                workflow_key: None,
                parameters: HashMap::new(),
                missing_params: Vec::new(),
                step: ConversationStep::AwaitingName,
                original_message: Some(message.to_string()),
            }),
            ..AssistantResponse::text_only(
                "Great — let's build a new workflow. What should it be called?",
            )
        },
        Intent::EditWorkflow => match intent::extract_workflow_name(message, registry)
            .and_then(|key| registry.activate(&key))
        {
            Some(def) => {
                AssistantResponse {
                    nodes: def.nodes,
                    edges: def.edges,
                    ..AssistantResponse::text_only(format!(
                        "I've loaded \"{}\" onto the canvas. Drag nodes around or draw new \
                         connections to change it.",
                        def.name
                    ))
                }
            }
            None => not_found_response(registry),
        },
        Intent::MonitorWorkflow => match intent::extract_workflow_name(message, registry)
            .and_then(|key| registry.activate(&key))
        {
            Some(def) => {
                let logs = generate_execution_logs(&def, start_ms, false);
                AssistantResponse {
                    nodes: def.nodes.clone(),
                    edges: def.edges.clone(),
                    logs: Some(logs),
                    ..AssistantResponse::text_only(format!(
                        "Here's the latest run of \"{}\" — every step completed cleanly.",
                        def.name
                    ))
                }
            }
            None => AssistantResponse::text_only(format!(
                "Which workflow would you like to check on? I know about: {}.",
                known_names(registry)
            )),
        },
        Intent::ListWorkflows => {
            let entries: Vec<(String, String)> = registry
                .list()
                .iter()
                .map(|def| (def.name.clone(), def.description.clone()))
                .collect();
            let bullets = entries
                .iter()
                .map(|(name, desc)| format!("• {} — {}", name, desc))
                .collect::<Vec<_>>()
                .join("\n");
            AssistantResponse {
                workflow_list: Some(entries),
                ..AssistantResponse::text_only(format!(
                    "Here's everything I can run for you:\n{}",
                    bullets
                ))
            }
        }
        Intent::Unknown => fallback_response(message),
    }
}

fn continue_flow(
    registry: &mut WorkflowRegistry,
    mut ctx: ConversationContext,
    message: &str,
    start_ms: f64,
    roll: f64,
) -> AssistantResponse {
    match ctx.step {
        ConversationStep::CollectingParams => {
            let key = match ctx.workflow_key.clone() {
                Some(key) => key,
                // Context without a workflow cannot be advanced; apologize
                // and drop it rather than crash.
                None => return AssistantResponse::text_only(APOLOGY_TEXT),
            };
            if let Some(param) = ctx.missing_params.first().cloned() {
                ctx.parameters.insert(param, message.trim().to_string());
            }
            trigger_workflow(registry, &key, ctx.parameters, start_ms, roll)
        }
        ConversationStep::AwaitingName => {
            let name = message.trim().to_string();
            if name.is_empty() {
                return AssistantResponse {
                    context: Some(ctx),
                    ..AssistantResponse::text_only("I still need a name for the workflow.")
                };
            }
            let original = ctx.original_message.clone().unwrap_or_default();
            let def = synthesize_workflow(&name, &original);
            let nodes = def.nodes.clone();
            let edges = def.edges.clone();
            let display = def.name.clone();
            registry.register(def);
            AssistantResponse {
                nodes,
                edges,
                ..AssistantResponse::text_only(format!(
                    "Done! I've created \"{}\" and put it on the canvas. You can trigger it \
                     any time by name.",
                    display
                ))
            }
        }
    }
}

/// Terminal trigger case: ask for the first missing parameter, or "execute"
/// by generating the canned log sequence.
fn trigger_workflow(
    registry: &WorkflowRegistry,
    key: &str,
    parameters: HashMap<String, String>,
    start_ms: f64,
    roll: f64,
) -> AssistantResponse {
    let def = match registry.activate(key) {
        Some(def) => def,
        None => return not_found_response(registry),
    };

    let missing: Vec<String> = def
        .required_params
        .iter()
        .filter(|p| !parameters.contains_key(*p))
        .cloned()
        .collect();

    if let Some(first) = missing.first() {
        let ask = format!(
            "I can run \"{}\" — I just need the {} first. What should it be?",
            def.name, first
        );
        return AssistantResponse {
            context: Some(ConversationContext {
                intent: Intent::TriggerWorkflow,
                workflow_key: Some(key.to_string()),
                parameters,
                missing_params: missing,
                step: ConversationStep::CollectingParams,
                original_message: None,
            }),
            ..AssistantResponse::text_only(ask)
        };
    }

    let should_fail = def.can_fail && roll < FAILURE_PROBABILITY;
    let logs = generate_execution_logs(&def, start_ms, should_fail);
    let text = if should_fail {
        format!(
            "I started \"{}\", but the final step failed. The run log is below.",
            def.name
        )
    } else {
        format!(
            "Running \"{}\" now — all {} steps completed successfully.",
            def.name,
            def.nodes.len()
        )
    };
    AssistantResponse {
        nodes: def.nodes.clone(),
        edges: def.edges.clone(),
        logs: Some(logs),
        ..AssistantResponse::text_only(text)
    }
}

/// One synthetic entry per node in template order, spaced [`LOG_STEP_MS`]
/// apart.  When `should_fail` is set, exactly the last entry is an error.
pub fn generate_execution_logs(
    def: &WorkflowDefinition,
    start_ms: f64,
    should_fail: bool,
) -> Vec<ExecutionLogEntry> {
    let last = def.nodes.len().saturating_sub(1);
    def.nodes
        .iter()
        .enumerate()
        .map(|(i, node)| {
            let fails = should_fail && i == last;
            ExecutionLogEntry {
                node_id: node.id.clone(),
                node_name: node.label.clone(),
                status: if fails {
                    ExecutionStatus::Error
                } else {
                    ExecutionStatus::Success
                },
                timestamp_ms: start_ms + i as f64 * LOG_STEP_MS,
                message: if fails {
                    None
                } else {
                    Some(format!("Completed {}", node.label))
                },
                error: fails.then(|| "Step failed: upstream service did not respond".to_string()),
            }
        })
        .collect()
}

/// Build the default 2-node template for a user-named workflow, salted with
/// extra steps when the original request mentioned certain integrations.
fn synthesize_workflow(name: &str, original_message: &str) -> WorkflowDefinition {
    let key = intent::derive_key(name);
    let hint = original_message.to_lowercase();

    let mut steps: Vec<(NodeType, String)> = vec![
        (NodeType::Trigger, "Manual trigger".to_string()),
        (NodeType::Action, format!("Run {}", name.trim())),
    ];
    if hint.contains("webhook") {
        steps.insert(0, (NodeType::Webhook, "Incoming webhook".to_string()));
    }
    if hint.contains("google sheets") {
        steps.push((NodeType::Action, "Update Google Sheets".to_string()));
    }
    if hint.contains("email") {
        steps.push((NodeType::Action, "Send email".to_string()));
    }

    let nodes: Vec<Node> = steps
        .iter()
        .enumerate()
        .map(|(i, (node_type, label))| {
            Node::new(
                format!("{}_{}", key, i + 1),
                *node_type,
                label.clone(),
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

    WorkflowDefinition {
        key,
        name: name.trim().to_string(),
        description: "Custom workflow".to_string(),
        required_params: Vec::new(),
        can_fail: false,
        nodes,
        edges,
    }
}

fn known_names(registry: &WorkflowRegistry) -> String {
    registry
        .list()
        .iter()
        .map(|def| def.name.clone())
        .collect::<Vec<_>>()
        .join(", ")
}

fn not_found_response(registry: &WorkflowRegistry) -> AssistantResponse {
    AssistantResponse::text_only(format!(
        "I couldn't find that workflow. The ones I know are: {}.",
        known_names(registry)
    ))
}

/// Secondary heuristic for free text that matched no intent rule: three
/// canned demo responses keyed by crude keyword.
fn fallback_response(message: &str) -> AssistantResponse {
    let lower = message.to_lowercase();
    let text = if lower.contains("social") {
        "Social automation is a great fit — try \"trigger the Social Media Post workflow\" \
         to see it in action."
    } else if lower.contains("support") || lower.contains("ticket") {
        "For support automation, the Support Ticket Triage workflow classifies and routes \
         incoming tickets. Say \"run support ticket triage\" to watch it go."
    } else {
        "I can trigger, create, monitor, or list workflows for you. Try \"list workflows\" \
         to see what's available."
    };
    AssistantResponse::text_only(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> WorkflowRegistry {
        WorkflowRegistry::with_demo_workflows()
    }

    #[test]
    fn trigger_with_missing_param_asks_for_it() {
        let mut reg = registry();
        let resp = respond(&mut reg, None, "trigger the Welcome Email workflow", 0.0, 0.9);
        let ctx = resp.context.expect("collecting context");
        assert_eq!(ctx.step, ConversationStep::CollectingParams);
        assert_eq!(ctx.missing_params[0], "email");
        assert!(resp.text.contains("email"));
        assert!(resp.nodes.is_empty());
        assert!(resp.logs.is_none());
    }

    #[test]
    fn supplying_the_param_executes_on_the_next_turn() {
        let mut reg = registry();
        let first = respond(&mut reg, None, "run welcome email", 0.0, 0.9);
        let resp = respond(&mut reg, first.context, "jane@example.com", 1000.0, 0.9);
        assert!(resp.context.is_none(), "context cleared after execution");
        let logs = resp.logs.expect("execution logs");
        assert_eq!(logs.len(), 3);
        assert!(logs.iter().all(|l| l.status == ExecutionStatus::Success));
        assert_eq!(resp.nodes.len(), 3);
    }

    #[test]
    fn multi_param_collection_asks_each_param_in_turn() {
        let mut reg = registry();
        let mut def = reg.activate("welcome_email").expect("seeded template");
        def.key = "vip_onboarding".into();
        def.name = "VIP Onboarding".into();
        def.required_params = vec!["email".into(), "name".into()];
        reg.register(def);

        let first = respond(&mut reg, None, "run vip onboarding", 0.0, 0.9);
        let ctx = first.context.expect("collecting first param");
        assert_eq!(ctx.missing_params, vec!["email".to_string(), "name".to_string()]);
        assert!(first.text.contains("email"));

        // Supplying the email advances to asking for the name.
        let second = respond(&mut reg, Some(ctx), "vip@example.com", 0.0, 0.9);
        let ctx = second.context.expect("collecting second param");
        assert_eq!(ctx.step, ConversationStep::CollectingParams);
        assert_eq!(ctx.missing_params, vec!["name".to_string()]);
        assert_eq!(
            ctx.parameters.get("email").map(String::as_str),
            Some("vip@example.com")
        );
        assert!(second.text.contains("name"));
        assert!(second.logs.is_none());

        let third = respond(&mut reg, Some(ctx), "Jane", 0.0, 0.9);
        assert!(third.context.is_none());
        assert!(third.logs.is_some());
    }

    #[test]
    fn inline_email_skips_the_collecting_step() {
        let mut reg = registry();
        let resp = respond(
            &mut reg,
            None,
            "run welcome email for jane@example.com",
            0.0,
            0.9,
        );
        assert!(resp.context.is_none());
        assert!(resp.logs.is_some());
    }

    #[test]
    fn successful_logs_are_spaced_800ms_apart() {
        let reg = registry();
        let def = reg.get("data_sync").unwrap();
        let logs = generate_execution_logs(def, 5000.0, false);
        assert_eq!(logs.len(), def.nodes.len());
        for (i, entry) in logs.iter().enumerate() {
            assert_eq!(entry.status, ExecutionStatus::Success);
            assert_eq!(entry.timestamp_ms, 5000.0 + i as f64 * 800.0);
            if i > 0 {
                assert!(entry.timestamp_ms > logs[i - 1].timestamp_ms);
            }
        }
    }

    #[test]
    fn failing_run_errors_exactly_the_last_entry() {
        let reg = registry();
        let def = reg.get("lead_capture").unwrap();
        let logs = generate_execution_logs(def, 0.0, true);
        let (last, rest) = logs.split_last().unwrap();
        assert_eq!(last.status, ExecutionStatus::Error);
        assert!(last.error.is_some());
        assert!(rest.iter().all(|l| l.status == ExecutionStatus::Success));
    }

    #[test]
    fn can_fail_workflow_respects_the_roll() {
        let mut reg = registry();
        let failing = respond(&mut reg, None, "run data sync", 0.0, 0.1);
        assert!(failing
            .logs
            .unwrap()
            .iter()
            .any(|l| l.status == ExecutionStatus::Error));
        let ok = respond(&mut reg, None, "run data sync", 0.0, 0.9);
        assert!(ok
            .logs
            .unwrap()
            .iter()
            .all(|l| l.status == ExecutionStatus::Success));
    }

    #[test]
    fn unknown_workflow_is_not_found_without_context() {
        let mut reg = registry();
        let resp = respond(&mut reg, None, "trigger the mystery machine", 0.0, 0.9);
        assert!(resp.text.contains("couldn't find"));
        assert!(resp.nodes.is_empty() && resp.edges.is_empty());
        assert!(resp.context.is_none());
    }

    #[test]
    fn list_workflows_enumerates_every_name() {
        let mut reg = registry();
        let resp = respond(&mut reg, None, "list workflows", 0.0, 0.9);
        let list = resp.workflow_list.expect("workflow list");
        assert_eq!(list.len(), reg.len());
        for def in reg.list() {
            assert!(resp.text.contains(&def.name), "missing {}", def.name);
        }
    }

    #[test]
    fn create_flow_names_registers_and_salts() {
        let mut reg = registry();
        let before = reg.len();
        let first = respond(
            &mut reg,
            None,
            "create a workflow that posts to google sheets",
            0.0,
            0.9,
        );
        let ctx = first.context.expect("awaiting name");
        assert_eq!(ctx.step, ConversationStep::AwaitingName);

        let second = respond(&mut reg, Some(ctx), "Sheet Sync Deluxe", 0.0, 0.9);
        assert!(second.context.is_none());
        assert_eq!(reg.len(), before + 1);
        let def = reg.get("sheet_sync_deluxe").expect("registered under derived key");
        assert!(def
            .nodes
            .iter()
            .any(|n| n.label == "Update Google Sheets"));
        assert_eq!(second.nodes.len(), def.nodes.len());
    }

    #[test]
    fn monitor_produces_clean_run_or_asks_which() {
        let mut reg = registry();
        let found = respond(&mut reg, None, "check on lead capture", 0.0, 0.1);
        let logs = found.logs.expect("monitor logs");
        // Monitoring never fails, even for can_fail workflows.
        assert!(logs.iter().all(|l| l.status == ExecutionStatus::Success));

        let missing = respond(&mut reg, None, "how is everything doing", 0.0, 0.9);
        assert!(missing.text.contains("Which workflow"));
        assert!(missing.text.contains("Welcome Email"));
    }

    #[test]
    fn keyword_fallback_picks_canned_responses() {
        let mut reg = registry();
        let social = respond(&mut reg, None, "tell me about social stuff", 0.0, 0.9);
        assert!(social.text.contains("Social"));
        let support = respond(&mut reg, None, "we get too many tickets", 0.0, 0.9);
        assert!(support.text.contains("Triage"));
        let other = respond(&mut reg, None, "hello", 0.0, 0.9);
        assert!(other.text.contains("list workflows"));
    }

    #[test]
    fn malformed_context_yields_apology_and_clears() {
        let mut reg = registry();
        let ctx = ConversationContext {
            intent: Intent::TriggerWorkflow,
            workflow_key: None,
            parameters: HashMap::new(),
            missing_params: vec!["email".into()],
            step: ConversationStep::CollectingParams,
            original_message: None,
        };
        let resp = respond(&mut reg, Some(ctx), "jane@example.com", 0.0, 0.9);
        assert!(resp.text.starts_with("Sorry"));
        assert!(resp.context.is_none());
    }
}
