//! Intent classification for the mock assistant.
//!
//! Free text is matched against a fixed, ordered set of case-insensitive
//! regex rules; the first matching rule wins and anything that matches none
//! of them is `Unknown`.  Everything in this module is a pure function so it
//! can be exercised without a browser.

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::registry::WorkflowRegistry;

#[derive(Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Debug)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    TriggerWorkflow,
    CreateWorkflow,
    EditWorkflow,
    MonitorWorkflow,
    ListWorkflows,
    Unknown,
}

lazy_static! {
    // Ordered rule set: first match wins.  "list" must outrank "trigger" so
    // that "show me my workflows" is not mistaken for a run request.
    static ref INTENT_RULES: Vec<(Regex, Intent)> = vec![
        (
            Regex::new(r"(?i)\b(list|show( me)?|what)\b.*\bworkflows\b").unwrap(),
            Intent::ListWorkflows,
        ),
        (
            Regex::new(r"(?i)\b(create|build|make|set up|new)\b.*\bworkflow").unwrap(),
            Intent::CreateWorkflow,
        ),
        (
            Regex::new(r"(?i)\b(edit|modify|change|update)\b.*\bworkflow").unwrap(),
            Intent::EditWorkflow,
        ),
        (
            Regex::new(r"(?i)\b(monitor|status|health|how is|check on)\b").unwrap(),
            Intent::MonitorWorkflow,
        ),
        (
            Regex::new(r"(?i)\b(trigger|run|execute|start|launch|fire)\b").unwrap(),
            Intent::TriggerWorkflow,
        ),
    ];
    static ref EMAIL_RE: Regex =
        Regex::new(r"[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}").unwrap();
    static ref FOR_NAME_RE: Regex = Regex::new(r"\bfor\s+([A-Z][a-z]+)\b").unwrap();
}

/// Classify a free-text message into an [`Intent`].
pub fn parse(message: &str) -> Intent {
    for (rule, intent) in INTENT_RULES.iter() {
        if rule.is_match(message) {
            return *intent;
        }
    }
    Intent::Unknown
}

/// Resolve a registry key by substring-matching known workflow display names
/// inside the message.  Longer names are tried first so that e.g.
/// "welcome email campaign" cannot be shadowed by a shorter prefix.
pub fn extract_workflow_name(message: &str, registry: &WorkflowRegistry) -> Option<String> {
    let haystack = message.to_lowercase();
    let mut candidates: Vec<(&str, &str)> = registry
        .list()
        .iter()
        .map(|def| (def.name.as_str(), def.key.as_str()))
        .collect();
    candidates.sort_by_key(|(name, _)| std::cmp::Reverse(name.len()));
    candidates
        .into_iter()
        .find(|(name, _)| haystack.contains(&name.to_lowercase()))
        .map(|(_, key)| key.to_string())
}

/// Pull recognizable parameters out of a message: an email address via regex
/// and a person's name via the `for <Capitalized>` heuristic.
pub fn extract_parameters(message: &str) -> HashMap<String, String> {
    let mut params = HashMap::new();
    if let Some(m) = EMAIL_RE.find(message) {
        params.insert("email".to_string(), m.as_str().to_string());
    }
    if let Some(caps) = FOR_NAME_RE.captures(message) {
        params.insert("name".to_string(), caps[1].to_string());
    }
    params
}

/// Derive a registry key from a display name: lowercase, whitespace runs
/// become single underscores.
pub fn derive_key(name: &str) -> String {
    name.trim()
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::WorkflowRegistry;

    #[test]
    fn trigger_phrases_classify_as_trigger() {
        assert_eq!(parse("trigger the Welcome Email workflow"), Intent::TriggerWorkflow);
        assert_eq!(parse("please run data sync"), Intent::TriggerWorkflow);
        assert_eq!(parse("Execute the lead capture flow"), Intent::TriggerWorkflow);
    }

    #[test]
    fn list_outranks_trigger() {
        assert_eq!(parse("list workflows"), Intent::ListWorkflows);
        assert_eq!(parse("show me all my workflows please"), Intent::ListWorkflows);
    }

    #[test]
    fn create_edit_monitor() {
        assert_eq!(parse("create a new workflow"), Intent::CreateWorkflow);
        assert_eq!(parse("I want to edit my workflow"), Intent::EditWorkflow);
        assert_eq!(parse("check on the status of data sync"), Intent::MonitorWorkflow);
    }

    #[test]
    fn gibberish_is_unknown() {
        assert_eq!(parse("hello there"), Intent::Unknown);
        assert_eq!(parse(""), Intent::Unknown);
    }

    #[test]
    fn workflow_name_resolves_to_key() {
        let registry = WorkflowRegistry::with_demo_workflows();
        assert_eq!(
            extract_workflow_name("trigger the Welcome Email workflow", &registry),
            Some("welcome_email".to_string())
        );
        assert_eq!(extract_workflow_name("run something unrelated", &registry), None);
    }

    #[test]
    fn parameter_extraction() {
        let params = extract_parameters("send it to jane.doe@example.com for Jane");
        assert_eq!(params.get("email").map(String::as_str), Some("jane.doe@example.com"));
        assert_eq!(params.get("name").map(String::as_str), Some("Jane"));
        assert!(extract_parameters("no parameters here").is_empty());
    }

    #[test]
    fn key_derivation_collapses_whitespace() {
        assert_eq!(derive_key("My  Fancy   Flow"), "my_fancy_flow");
        assert_eq!(derive_key("  Welcome Email "), "welcome_email");
    }
}
