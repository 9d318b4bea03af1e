//! Row expansion: program x rows x repeat into one flat instruction stream.

use std::num::NonZeroUsize;

use data_rows::Row;
use serde_json::Value;
use tracing::debug;

use crate::program::RawStep;
use crate::template::{apply_template, RowContext};

/// Build the instruction stream.
///
/// Each row's templated copy of `program` is appended `repeat` times back to
/// back before the next row starts. With no rows, a single synthetic row
/// (index 1, empty value, no fields) is used.
pub fn expand(program: &[RawStep], rows: &[Row], repeat: NonZeroUsize) -> Vec<RawStep> {
    let contexts: Vec<RowContext> = if rows.is_empty() {
        vec![RowContext::synthetic()]
    } else {
        rows.iter()
            .enumerate()
            .map(|(i, row)| RowContext::for_row(i + 1, row))
            .collect()
    };

    let mut stream = Vec::with_capacity(contexts.len() * repeat.get() * program.len());
    for ctx in &contexts {
        let templated: Vec<RawStep> = program.iter().map(|step| template_step(step, ctx)).collect();
        for _ in 0..repeat.get() {
            stream.extend(templated.iter().cloned());
        }
    }

    debug!(
        program_len = program.len(),
        rows = rows.len(),
        repeat = repeat.get(),
        stream_len = stream.len(),
        "expanded program"
    );
    stream
}

fn template_step(step: &RawStep, ctx: &RowContext) -> RawStep {
    step.iter()
        .map(|(key, value)| (key.clone(), apply_template(value, ctx)))
        .collect::<serde_json::Map<String, Value>>()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn program() -> Vec<RawStep> {
        vec![
            json!({"action": "paste", "selector": "#q", "text": "{{index}}:{{value}}"}),
            json!({"action": "keySequence", "keys": ["{{row.key}}"]}),
        ]
        .into_iter()
        .map(|v| v.as_object().cloned().unwrap())
        .collect()
    }

    fn rows() -> Vec<Row> {
        ["a", "b", "c"]
            .iter()
            .map(|v| {
                let mut row = Row::new();
                row.insert("q".into(), v.to_string());
                row.insert("key".into(), format!("K{v}"));
                row
            })
            .collect()
    }

    fn texts(stream: &[RawStep]) -> Vec<String> {
        stream
            .iter()
            .map(|s| match s.get("text") {
                Some(Value::String(t)) => t.clone(),
                _ => s["keys"][0].as_str().unwrap_or_default().to_string(),
            })
            .collect()
    }

    #[test]
    fn blocks_are_contiguous_per_row() {
        let repeat = NonZeroUsize::new(2).unwrap();
        let stream = expand(&program(), &rows(), repeat);
        assert_eq!(stream.len(), 3 * 2 * 2);
        assert_eq!(
            texts(&stream),
            vec![
                "1:a", "Ka", "1:a", "Ka", "2:b", "Kb", "2:b", "Kb", "3:c", "Kc", "3:c", "Kc"
            ]
        );
    }

    #[test]
    fn empty_rows_match_a_single_empty_row() {
        let repeat = NonZeroUsize::new(3).unwrap();
        let without = expand(&program(), &[], repeat);
        let with_empty = expand(&program(), &[Row::new()], repeat);
        assert_eq!(without, with_empty);
        assert_eq!(without.len(), 3 * 2);
        assert_eq!(without[0]["text"], json!("1:"));
        assert_eq!(without[1]["keys"], json!([""]));
    }

    #[test]
    fn source_program_is_untouched_and_fields_keep_order() {
        let program = program();
        let stream = expand(&program, &rows(), NonZeroUsize::MIN);
        assert_eq!(program[0]["text"], json!("{{index}}:{{value}}"));
        let keys: Vec<&String> = stream[0].keys().collect();
        assert_eq!(keys, ["action", "selector", "text"]);
    }

    #[test]
    fn empty_program_expands_to_nothing() {
        assert!(expand(&[], &rows(), NonZeroUsize::new(4).unwrap()).is_empty());
    }
}
