use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use super::context::CliContext;
use super::inputs::load_rows;
use super::output::{to_json, OutputFormat};

#[derive(Args, Clone, Debug)]
pub struct RowsArgs {
    /// CSV file with a header line
    pub csv: PathBuf,

    /// Re-emit the parsed dataset as normalised CSV
    #[arg(long)]
    pub csv_out: bool,
}

pub async fn cmd_rows(args: RowsArgs, ctx: &CliContext) -> Result<()> {
    let rows = load_rows(Some(&args.csv)).await?;

    if args.csv_out {
        print!("{}", rows.to_csv().context("Failed to re-encode dataset")?);
        return Ok(());
    }

    match ctx.output() {
        OutputFormat::Human => println!("{}", rows.summary()),
        OutputFormat::Json => println!("{}", to_json(&rows, true)?),
    }
    Ok(())
}
