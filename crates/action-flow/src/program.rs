//! Program input: raw step objects as authored, before templating.

use std::num::NonZeroUsize;

use serde_json::{json, Map, Value};

use crate::errors::FlowError;

/// One authored step: string keys to JSON values, always carrying `action`.
pub type RawStep = Map<String, Value>;

/// Parse program text (a JSON array of step objects).
pub fn parse_program(text: &str) -> Result<Vec<RawStep>, FlowError> {
    let value: Value =
        serde_json::from_str(text).map_err(|err| FlowError::InvalidProgram(err.to_string()))?;

    let Value::Array(items) = value else {
        return Err(FlowError::InvalidProgram(
            "expected an array of steps".to_string(),
        ));
    };

    items
        .into_iter()
        .enumerate()
        .map(|(index, item)| match item {
            Value::Object(step) => Ok(step),
            other => Err(FlowError::InvalidProgram(format!(
                "step {} must be an object, found {}",
                index + 1,
                kind_name(&other)
            ))),
        })
        .collect()
}

/// Built-in sample: search the current row's value and scroll the results.
pub fn example_program() -> Vec<RawStep> {
    let steps = json!([
        { "action": "wait", "ms": 1000 },
        { "action": "highlight", "selector": "input, textarea", "durationMs": 800 },
        { "action": "waitFor", "selector": "input[type='search']", "timeoutMs": 5000 },
        { "action": "paste", "selector": "input[type='search']", "text": "{{value}}" },
        { "action": "keySequence", "keys": ["Enter"], "delayMs": 150 },
        { "action": "wait", "ms": 500 },
        { "action": "scroll", "y": 600, "behavior": "smooth" }
    ]);

    match steps {
        Value::Array(items) => items
            .into_iter()
            .filter_map(|item| match item {
                Value::Object(step) => Some(step),
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    }
}

/// Lenient repeat-count parsing: leading integer digits, anything below one
/// (or unparsable) becomes one.
pub fn parse_repeat_count(input: &str) -> NonZeroUsize {
    let trimmed = input.trim_start();
    let (negative, digits) = match trimmed.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, trimmed.strip_prefix('+').unwrap_or(trimmed)),
    };
    let digits: String = digits.chars().take_while(char::is_ascii_digit).collect();

    if negative {
        return NonZeroUsize::MIN;
    }
    digits
        .parse::<usize>()
        .ok()
        .and_then(NonZeroUsize::new)
        .unwrap_or(NonZeroUsize::MIN)
}

fn kind_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
