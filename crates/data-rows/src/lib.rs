//! Tabular dataset parsing
//!
//! Turns delimited text with a header line into an ordered sequence of
//! field -> value rows. Parsing is best-effort: malformed quoting never
//! produces an error, it only produces odd values.

mod parser;

pub use parser::{parse_rows, RowSet, RowsError};

/// One dataset row: field name -> value, in header order.
pub type Row = indexmap::IndexMap<String, String>;
