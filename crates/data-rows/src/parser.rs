use csv::WriterBuilder;
use serde::Serialize;
use thiserror::Error;
use tracing::debug;

use crate::Row;

#[derive(Debug, Error)]
pub enum RowsError {
    #[error("failed to encode rows: {0}")]
    Encode(String),
}

/// Parsed dataset: distinct field names in header order plus the rows.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RowSet {
    pub fields: Vec<String>,
    pub rows: Vec<Row>,
}

impl RowSet {
    pub fn parse(text: &str) -> Self {
        let mut lines = text
            .split(['\r', '\n'])
            .map(str::trim)
            .filter(|line| !line.is_empty());

        let Some(header_line) = lines.next() else {
            return Self::default();
        };

        let headers = split_line(header_line);
        let rows: Vec<Row> = lines
            .map(|line| {
                let values = split_line(line);
                if values.len() > headers.len() {
                    debug!(
                        extra = values.len() - headers.len(),
                        "dropping values beyond header count"
                    );
                }
                let mut row = Row::with_capacity(headers.len());
                for (index, header) in headers.iter().enumerate() {
                    let value = values.get(index).cloned().unwrap_or_default();
                    row.insert(header.clone(), value);
                }
                row
            })
            .collect();

        let mut fields: Vec<String> = Vec::with_capacity(headers.len());
        for header in headers {
            if !fields.contains(&header) {
                fields.push(header);
            }
        }

        Self { fields, rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Human-readable one-liner describing what was loaded.
    pub fn summary(&self) -> String {
        match self.rows.first() {
            None => "No CSV loaded.".to_string(),
            Some(first) => {
                let fields: Vec<&str> = first.keys().map(String::as_str).collect();
                format!(
                    "Loaded {} row(s). Fields: {}",
                    self.rows.len(),
                    fields.join(", ")
                )
            }
        }
    }

    /// Re-encode as CSV text, quoting only where needed.
    pub fn to_csv(&self) -> Result<String, RowsError> {
        let mut writer = WriterBuilder::new()
            .terminator(csv::Terminator::Any(b'\n'))
            .from_writer(Vec::new());
        writer
            .write_record(&self.fields)
            .map_err(|err| RowsError::Encode(err.to_string()))?;
        for row in &self.rows {
            let record: Vec<&str> = self
                .fields
                .iter()
                .map(|field| row.get(field).map(String::as_str).unwrap_or(""))
                .collect();
            writer
                .write_record(&record)
                .map_err(|err| RowsError::Encode(err.to_string()))?;
        }
        let bytes = writer
            .into_inner()
            .map_err(|err| RowsError::Encode(err.to_string()))?;
        String::from_utf8(bytes).map_err(|err| RowsError::Encode(err.to_string()))
    }
}

/// Parse dataset text into rows (header line excluded).
pub fn parse_rows(text: &str) -> Vec<Row> {
    RowSet::parse(text).rows
}

/// Split one line on commas.
///
/// Every unescaped `"` toggles quoted mode wherever it appears in a field;
/// `""` inside quotes is a literal quote. Commas only separate outside
/// quotes. Each field is trimmed once it is complete. An unterminated quote
/// simply runs to the end of the line.
fn split_line(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(ch) = chars.next() {
        match ch {
            '"' if in_quotes && chars.peek() == Some(&'"') => {
                current.push('"');
                chars.next();
            }
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => {
                fields.push(current.trim().to_string());
                current.clear();
            }
            other => current.push(other),
        }
    }

    if in_quotes {
        debug!("unterminated quote; field runs to end of line");
    }
    fields.push(current.trim().to_string());
    fields
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn empty_input_yields_no_rows() {
        assert!(parse_rows("").is_empty());
        assert!(parse_rows("  \n\r\n   ").is_empty());
    }

    #[test]
    fn header_only_input_yields_no_rows() {
        let set = RowSet::parse("name,email\n");
        assert!(set.is_empty());
        assert_eq!(set.fields, vec!["name", "email"]);
    }

    #[test]
    fn mixed_line_endings_and_blank_lines() {
        let rows = parse_rows("name,city\r\n\r\n  ada , london \rgrace,nyc\n\n");
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0]["name"], "ada");
        assert_eq!(rows[0]["city"], "london");
        assert_eq!(rows[1]["name"], "grace");
    }

    #[test]
    fn short_rows_are_padded_and_long_rows_truncated() {
        let rows = parse_rows("a,b,c\n1\n1,2,3,4,5");
        assert_eq!(rows[0]["a"], "1");
        assert_eq!(rows[0]["b"], "");
        assert_eq!(rows[0]["c"], "");
        assert_eq!(rows[1].len(), 3);
        assert_eq!(rows[1]["c"], "3");
    }

    #[test]
    fn quoted_field_with_comma_and_escaped_quote() {
        let rows = parse_rows("id,note\n7,\"say \"\"hi\"\", then, leave\"");
        assert_eq!(rows[0]["note"], "say \"hi\", then, leave");
    }

    #[test]
    fn quote_after_leading_whitespace_still_opens_quoting() {
        let rows = parse_rows("id, note\n1, \"a, b\"");
        assert_eq!(rows[0]["id"], "1");
        assert_eq!(rows[0]["note"], "a, b");

        let rows = parse_rows("x,y\nx ,   \"a, b\"   ");
        assert_eq!(rows[0]["x"], "x");
        assert_eq!(rows[0]["y"], "a, b");
    }

    #[test]
    fn quotes_inside_a_field_toggle_quoting() {
        let rows = parse_rows("id,note\n1,x\"a,b\"y");
        assert_eq!(rows[0].len(), 2);
        assert_eq!(rows[0]["note"], "xa,by");
    }

    #[test]
    fn unbalanced_quote_mid_field_swallows_the_rest() {
        let rows = parse_rows("a,b,c\n1,x\"y,z");
        assert_eq!(rows[0]["a"], "1");
        assert_eq!(rows[0]["b"], "xy,z");
        assert_eq!(rows[0]["c"], "");
    }

    #[test]
    fn quoted_headers_are_split_the_same_way() {
        let set = RowSet::parse("\"last, first\" , email\n\"Lovelace, Ada\",ada@example.com");
        assert_eq!(set.fields, vec!["last, first", "email"]);
        assert_eq!(set.rows[0]["last, first"], "Lovelace, Ada");
    }

    #[test]
    fn duplicate_headers_overwrite_keeping_first_position() {
        let set = RowSet::parse("k,v,k\n1,2,3");
        assert_eq!(set.fields, vec!["k", "v"]);
        let keys: Vec<&String> = set.rows[0].keys().collect();
        assert_eq!(keys, vec!["k", "v"]);
        assert_eq!(set.rows[0]["k"], "3");
    }

    #[test]
    fn unterminated_quote_does_not_fail() {
        let rows = parse_rows("a,b\n\"open,still open");
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["a"], "open,still open");
        assert_eq!(rows[0]["b"], "");
    }

    #[test]
    fn summary_lists_fields_of_first_row() {
        assert_eq!(RowSet::default().summary(), "No CSV loaded.");
        let set = RowSet::parse("query,lang\nrust,en\nzig,de");
        assert_eq!(set.summary(), "Loaded 2 row(s). Fields: query, lang");
    }

    #[test]
    fn to_csv_quotes_values_that_need_it() {
        let set = RowSet::parse("id,note\n1,\"a, b\"");
        let text = set.to_csv().unwrap();
        assert_eq!(text, "id,note\n1,\"a, b\"\n");
        assert_eq!(RowSet::parse(&text), set);
    }

    fn dataset() -> impl Strategy<Value = (Vec<String>, Vec<Vec<String>>)> {
        prop::collection::btree_set("[a-z][a-z0-9_]{0,5}", 1..5).prop_flat_map(|headers| {
            let headers: Vec<String> = headers.into_iter().collect();
            let width = headers.len();
            let rows = prop::collection::vec(
                prop::collection::vec("[A-Za-z0-9][A-Za-z0-9 ._-]{0,8}[A-Za-z0-9]", width),
                0..6,
            );
            (Just(headers), rows)
        })
    }

    /// Values that may contain commas, written quoted with random padding
    /// around the quotes.
    fn quoted_dataset() -> impl Strategy<Value = (Vec<String>, Vec<Vec<(String, String, String)>>)> {
        prop::collection::btree_set("[a-z][a-z0-9_]{0,5}", 1..5).prop_flat_map(|headers| {
            let headers: Vec<String> = headers.into_iter().collect();
            let width = headers.len();
            let cell = (" {0,3}", "[A-Za-z0-9][A-Za-z0-9 ,._-]{0,8}[A-Za-z0-9]", " {0,3}");
            let rows = prop::collection::vec(
                prop::collection::vec(
                    cell.prop_map(|(pre, value, post)| (pre.to_string(), value, post.to_string())),
                    width,
                ),
                0..6,
            );
            (Just(headers), rows)
        })
    }

    proptest! {
        #[test]
        fn padded_quoted_values_keep_their_commas((headers, cells) in quoted_dataset()) {
            let mut text = headers.join(",");
            text.push('\n');
            for row in &cells {
                let encoded: Vec<String> = row
                    .iter()
                    .map(|(pre, value, post)| format!("{pre}\"{value}\"{post}"))
                    .collect();
                text.push_str(&encoded.join(","));
                text.push('\n');
            }

            let parsed = parse_rows(&text);
            prop_assert_eq!(parsed.len(), cells.len());
            for (row, expected) in parsed.iter().zip(&cells) {
                let actual: Vec<&String> = row.values().collect();
                let expected: Vec<&String> = expected.iter().map(|(_, value, _)| value).collect();
                prop_assert_eq!(actual, expected);
            }
        }

        #[test]
        fn plain_rows_survive_serialize_then_parse((headers, values) in dataset()) {
            let mut text = headers.join(",");
            text.push('\n');
            for row in &values {
                text.push_str(&row.join(","));
                text.push('\n');
            }

            let parsed = parse_rows(&text);
            prop_assert_eq!(parsed.len(), values.len());
            for (row, expected) in parsed.iter().zip(&values) {
                let actual: Vec<&String> = row.values().collect();
                let expected: Vec<&String> = expected.iter().collect();
                prop_assert_eq!(actual, expected);
            }
        }
    }
}
