//! Typed steps decoded from raw step objects.
//!
//! Decoding happens per instruction, right before dispatch, so a malformed
//! step late in the stream does not stop earlier steps from running.

use action_primitives::{ActionError, ScrollBehavior};
use formpilot_core_types::ActionKind;
use serde_json::Value;

use crate::errors::FlowError;
use crate::program::RawStep;

pub const DEFAULT_WAIT_MS: u64 = 500;
pub const DEFAULT_WAIT_FOR_TIMEOUT_MS: u64 = 5000;
pub const DEFAULT_KEY_DELAY_MS: u64 = 100;
pub const DEFAULT_HIGHLIGHT_MS: u64 = 800;

/// Shown in place of the action name when a step has none.
pub const MISSING_ACTION: &str = "(missing)";

/// One fully-templated instruction with only the fields its handler reads.
#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    Wait {
        ms: u64,
    },
    WaitFor {
        selector: String,
        timeout_ms: u64,
    },
    Click {
        selector: String,
    },
    Type {
        selector: String,
        text: String,
        clear: bool,
    },
    Paste {
        selector: String,
        text: String,
    },
    KeySequence {
        selector: Option<String>,
        keys: Vec<String>,
        delay_ms: u64,
    },
    Scroll {
        x: f64,
        y: f64,
        behavior: ScrollBehavior,
    },
    Focus {
        selector: String,
    },
    SetValue {
        selector: String,
        value: String,
    },
    Highlight {
        selector: String,
        duration_ms: u64,
    },
}

impl Step {
    pub fn kind(&self) -> ActionKind {
        match self {
            Step::Wait { .. } => ActionKind::Wait,
            Step::WaitFor { .. } => ActionKind::WaitFor,
            Step::Click { .. } => ActionKind::Click,
            Step::Type { .. } => ActionKind::Type,
            Step::Paste { .. } => ActionKind::Paste,
            Step::KeySequence { .. } => ActionKind::KeySequence,
            Step::Scroll { .. } => ActionKind::Scroll,
            Step::Focus { .. } => ActionKind::Focus,
            Step::SetValue { .. } => ActionKind::SetValue,
            Step::Highlight { .. } => ActionKind::Highlight,
        }
    }

    /// Selector the step targets, if any.
    pub fn selector(&self) -> Option<&str> {
        match self {
            Step::Wait { .. } | Step::Scroll { .. } => None,
            Step::KeySequence { selector, .. } => selector.as_deref(),
            Step::WaitFor { selector, .. }
            | Step::Click { selector }
            | Step::Type { selector, .. }
            | Step::Paste { selector, .. }
            | Step::Focus { selector }
            | Step::SetValue { selector, .. }
            | Step::Highlight { selector, .. } => Some(selector),
        }
    }

    /// Decode a raw step whose action is already known.
    pub fn decode(kind: ActionKind, raw: &RawStep) -> Result<Self, ActionError> {
        let action = kind.as_str();
        let step = match kind {
            ActionKind::Wait => Step::Wait {
                ms: millis(raw, "ms", DEFAULT_WAIT_MS),
            },
            ActionKind::WaitFor => Step::WaitFor {
                selector: required_selector(raw, action)?,
                timeout_ms: millis(raw, "timeoutMs", DEFAULT_WAIT_FOR_TIMEOUT_MS),
            },
            ActionKind::Click => Step::Click {
                selector: required_selector(raw, action)?,
            },
            ActionKind::Type => Step::Type {
                selector: required_selector(raw, action)?,
                text: text(raw, "text"),
                clear: flag(raw, "clear", true),
            },
            ActionKind::Paste => Step::Paste {
                selector: required_selector(raw, action)?,
                text: text(raw, "text"),
            },
            ActionKind::KeySequence => {
                let keys = keys(raw);
                if keys.is_empty() {
                    return Err(ActionError::missing(action, "keys"));
                }
                Step::KeySequence {
                    selector: optional_selector(raw),
                    keys,
                    delay_ms: millis(raw, "delayMs", DEFAULT_KEY_DELAY_MS),
                }
            }
            ActionKind::Scroll => Step::Scroll {
                x: number(raw, "x"),
                y: number(raw, "y"),
                behavior: behavior(raw)?,
            },
            ActionKind::Focus => Step::Focus {
                selector: required_selector(raw, action)?,
            },
            ActionKind::SetValue => Step::SetValue {
                selector: required_selector(raw, action)?,
                value: text(raw, "value"),
            },
            ActionKind::Highlight => Step::Highlight {
                selector: required_selector(raw, action)?,
                duration_ms: millis(raw, "durationMs", DEFAULT_HIGHLIGHT_MS),
            },
        };
        Ok(step)
    }
}

/// Action name as written in the step, for progress lines.
pub fn action_name(raw: &RawStep) -> String {
    match raw.get("action") {
        Some(Value::String(name)) => name.clone(),
        Some(Value::Null) | None => MISSING_ACTION.to_string(),
        Some(other) => other.to_string(),
    }
}

/// Resolve the step's handler; anything outside the instruction set fails.
pub fn action_of(raw: &RawStep) -> Result<ActionKind, FlowError> {
    match raw.get("action") {
        Some(Value::String(name)) => name
            .parse()
            .map_err(|_| FlowError::UnknownAction(name.clone())),
        _ => Err(FlowError::UnknownAction(action_name(raw))),
    }
}

fn optional_selector(raw: &RawStep) -> Option<String> {
    match raw.get("selector") {
        Some(Value::String(selector)) if !selector.trim().is_empty() => Some(selector.clone()),
        _ => None,
    }
}

fn required_selector(raw: &RawStep, action: &str) -> Result<String, ActionError> {
    optional_selector(raw).ok_or_else(|| ActionError::missing(action, "selector"))
}

fn text(raw: &RawStep, key: &str) -> String {
    match raw.get(key) {
        Some(Value::String(text)) => text.clone(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        _ => String::new(),
    }
}

fn millis(raw: &RawStep, key: &str, default: u64) -> u64 {
    let value = match raw.get(key) {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    match value {
        Some(ms) if ms.is_finite() => ms.max(0.0).round() as u64,
        _ => default,
    }
}

fn number(raw: &RawStep, key: &str) -> f64 {
    match raw.get(key) {
        Some(Value::Number(n)) => n.as_f64().unwrap_or(0.0),
        Some(Value::String(s)) => s.trim().parse().unwrap_or(0.0),
        _ => 0.0,
    }
}

fn flag(raw: &RawStep, key: &str, default: bool) -> bool {
    match raw.get(key) {
        Some(Value::Bool(b)) => *b,
        Some(Value::String(s)) if s.eq_ignore_ascii_case("false") => false,
        Some(Value::String(s)) if s.eq_ignore_ascii_case("true") => true,
        _ => default,
    }
}

fn keys(raw: &RawStep) -> Vec<String> {
    match raw.get("keys") {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|item| match item {
                Value::String(key) => Some(key.clone()),
                Value::Number(n) => Some(n.to_string()),
                _ => None,
            })
            .collect(),
        // a bare name is one key, not one key per character
        Some(Value::String(key)) if !key.is_empty() => vec![key.clone()],
        _ => Vec::new(),
    }
}

fn behavior(raw: &RawStep) -> Result<ScrollBehavior, ActionError> {
    match raw.get("behavior") {
        Some(Value::String(name)) => name.parse().map_err(ActionError::Validation),
        _ => Ok(ScrollBehavior::default()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn raw(value: Value) -> RawStep {
        match value {
            Value::Object(map) => map,
            other => panic!("not an object: {other}"),
        }
    }

    fn decode(value: Value) -> Result<Step, FlowError> {
        let step = raw(value);
        let kind = action_of(&step)?;
        Ok(Step::decode(kind, &step)?)
    }

    #[test]
    fn defaults_fill_missing_fields() {
        assert_eq!(decode(json!({"action": "wait"})).unwrap(), Step::Wait { ms: 500 });
        assert_eq!(
            decode(json!({"action": "waitFor", "selector": "#a"})).unwrap(),
            Step::WaitFor { selector: "#a".into(), timeout_ms: 5000 }
        );
        assert_eq!(
            decode(json!({"action": "type", "selector": "#a"})).unwrap(),
            Step::Type { selector: "#a".into(), text: String::new(), clear: true }
        );
        assert_eq!(
            decode(json!({"action": "keySequence", "keys": ["Tab"]})).unwrap(),
            Step::KeySequence { selector: None, keys: vec!["Tab".into()], delay_ms: 100 }
        );
        assert_eq!(
            decode(json!({"action": "scroll"})).unwrap(),
            Step::Scroll { x: 0.0, y: 0.0, behavior: ScrollBehavior::Smooth }
        );
        assert_eq!(
            decode(json!({"action": "setValue", "selector": "#v"})).unwrap(),
            Step::SetValue { selector: "#v".into(), value: String::new() }
        );
        assert_eq!(
            decode(json!({"action": "highlight", "selector": "h1"})).unwrap(),
            Step::Highlight { selector: "h1".into(), duration_ms: 800 }
        );
    }

    #[test]
    fn selector_is_required_where_declared() {
        for action in ["waitFor", "click", "type", "paste", "focus", "setValue", "highlight"] {
            let err = decode(json!({ "action": action })).unwrap_err();
            assert_eq!(err.to_string(), format!("{action} requires selector"));
        }
        let err = decode(json!({"action": "click", "selector": ""})).unwrap_err();
        assert_eq!(err.to_string(), "click requires selector");
    }

    #[test]
    fn key_sequence_requires_keys() {
        let err = decode(json!({"action": "keySequence", "selector": "#q", "keys": []})).unwrap_err();
        assert_eq!(err.to_string(), "keySequence requires keys");
        let err = decode(json!({"action": "keySequence"})).unwrap_err();
        assert_eq!(err.to_string(), "keySequence requires keys");
    }

    #[test]
    fn bare_key_name_is_a_single_key() {
        assert_eq!(
            decode(json!({"action": "keySequence", "keys": "Enter"})).unwrap(),
            Step::KeySequence { selector: None, keys: vec!["Enter".into()], delay_ms: 100 }
        );
        assert_eq!(
            decode(json!({"action": "keySequence", "keys": ["a", 1, null]})).unwrap(),
            Step::KeySequence { selector: None, keys: vec!["a".into(), "1".into()], delay_ms: 100 }
        );
    }

    #[test]
    fn unknown_and_missing_actions_are_rejected() {
        let err = decode(json!({"action": "doesNotExist"})).unwrap_err();
        assert_eq!(err, FlowError::UnknownAction("doesNotExist".into()));
        let err = decode(json!({"selector": "#a"})).unwrap_err();
        assert_eq!(err.to_string(), "Unknown action: (missing)");
    }

    #[test]
    fn templated_strings_coerce_to_numbers_and_flags() {
        assert_eq!(
            decode(json!({"action": "wait", "ms": "250"})).unwrap(),
            Step::Wait { ms: 250 }
        );
        assert_eq!(decode(json!({"action": "wait", "ms": -5})).unwrap(), Step::Wait { ms: 0 });
        assert_eq!(
            decode(json!({"action": "type", "selector": "#a", "text": 42, "clear": "false"}))
                .unwrap(),
            Step::Type { selector: "#a".into(), text: "42".into(), clear: false }
        );
        assert_eq!(
            decode(json!({"action": "scroll", "y": "600", "behavior": "instant"})).unwrap(),
            Step::Scroll { x: 0.0, y: 600.0, behavior: ScrollBehavior::Instant }
        );
    }

    #[test]
    fn unknown_scroll_behavior_is_a_validation_error() {
        let err = decode(json!({"action": "scroll", "behavior": "sideways"})).unwrap_err();
        assert!(matches!(err, FlowError::Action(ActionError::Validation(_))));
    }

    #[test]
    fn kind_and_selector_accessors() {
        let step = decode(json!({"action": "paste", "selector": "#q", "text": "x"})).unwrap();
        assert_eq!(step.kind(), ActionKind::Paste);
        assert_eq!(step.selector(), Some("#q"));
        assert_eq!(Step::Wait { ms: 1 }.selector(), None);
    }
}
