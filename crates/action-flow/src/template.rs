//! Placeholder substitution for step fields.
//!
//! Recognised forms (case-sensitive, inner whitespace allowed):
//! `{{index}}`, `{{value}}` and `{{row.<field>}}`. Substitution is a single
//! pass over each string leaf, so text coming from a row is never scanned
//! for placeholders again, and nested objects are walked leaf by leaf
//! instead of being re-serialised.

use std::borrow::Cow;

use data_rows::Row;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde_json::Value;

static PLACEHOLDER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\{\{\s*(?:(index)|(value)|row\.([A-Za-z0-9_-]+))\s*\}\}")
        .expect("placeholder pattern is valid")
});

/// Templating context for one row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowContext {
    /// 1-based row ordinal
    pub index: usize,
    /// Value of the row's first field, empty for an empty row
    pub value: String,
    pub row: Row,
}

impl RowContext {
    pub fn new(index: usize, value: impl Into<String>) -> Self {
        Self {
            index,
            value: value.into(),
            row: Row::new(),
        }
    }

    pub fn for_row(index: usize, row: &Row) -> Self {
        Self {
            index,
            value: row.values().next().cloned().unwrap_or_default(),
            row: row.clone(),
        }
    }

    /// Context used when a run has no dataset.
    pub fn synthetic() -> Self {
        Self::new(1, "")
    }
}

/// Substitute placeholders in one string.
pub fn apply_template_str<'a>(text: &'a str, ctx: &RowContext) -> Cow<'a, str> {
    PLACEHOLDER.replace_all(text, |caps: &Captures<'_>| {
        if caps.get(1).is_some() {
            ctx.index.to_string()
        } else if caps.get(2).is_some() {
            ctx.value.clone()
        } else {
            caps.get(3)
                .and_then(|field| ctx.row.get(field.as_str()))
                .cloned()
                .unwrap_or_default()
        }
    })
}

/// Substitute placeholders in every string leaf of `value`; other leaves
/// are returned unchanged.
pub fn apply_template(value: &Value, ctx: &RowContext) -> Value {
    match value {
        Value::String(text) => Value::String(apply_template_str(text, ctx).into_owned()),
        Value::Array(items) => Value::Array(
            items
                .iter()
                .map(|item| apply_template(item, ctx))
                .collect(),
        ),
        Value::Object(fields) => Value::Object(
            fields
                .iter()
                .map(|(key, item)| (key.clone(), apply_template(item, ctx)))
                .collect(),
        ),
        Value::Null | Value::Bool(_) | Value::Number(_) => value.clone(),
    }
}
