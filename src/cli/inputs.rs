//! Loading of programs, datasets and page fixtures from disk.

use std::num::NonZeroUsize;
use std::path::Path;

use action_flow::{example_program, parse_program, parse_repeat_count, RawStep};
use action_primitives::PageFixture;
use anyhow::{Context, Result};
use data_rows::RowSet;
use tokio::fs;
use tracing::{debug, info};

/// Program at `path`, or the built-in example when no path is given.
pub async fn load_program(path: Option<&Path>) -> Result<Vec<RawStep>> {
    let Some(path) = path else {
        info!("No program given, using the built-in example");
        return Ok(example_program());
    };
    let text = fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read program {}", path.display()))?;
    let program = parse_program(&text)
        .with_context(|| format!("Failed to parse program {}", path.display()))?;
    debug!(path = %path.display(), steps = program.len(), "program loaded");
    Ok(program)
}

pub async fn load_rows(path: Option<&Path>) -> Result<RowSet> {
    let Some(path) = path else {
        return Ok(RowSet::default());
    };
    let text = fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read dataset {}", path.display()))?;
    let rows = RowSet::parse(&text);
    info!(path = %path.display(), "{}", rows.summary());
    Ok(rows)
}

pub async fn load_page(path: Option<&Path>) -> Result<PageFixture> {
    let Some(path) = path else {
        return Ok(PageFixture::default());
    };
    let text = fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read page fixture {}", path.display()))?;
    let page: PageFixture = serde_yaml::from_str(&text)
        .with_context(|| format!("Failed to parse page fixture {}", path.display()))?;
    debug!(path = %path.display(), elements = page.elements.len(), "page fixture loaded");
    Ok(page)
}

/// clap value parser for `--repeat`; never rejects input.
pub fn repeat_arg(input: &str) -> Result<NonZeroUsize, String> {
    Ok(parse_repeat_count(input))
}
