use std::num::NonZeroUsize;
use std::path::PathBuf;

use action_flow::expand;
use anyhow::Result;
use clap::Args;
use serde_json::Value;

use super::context::CliContext;
use super::inputs::{load_program, load_rows, repeat_arg};
use super::output::{to_json, OutputFormat};

#[derive(Args, Clone, Debug)]
pub struct ExpandArgs {
    /// Step program (JSON array); defaults to the built-in example
    #[arg(long, value_name = "FILE")]
    pub steps: Option<PathBuf>,

    /// CSV dataset; each row gets its own templated copy of the program
    #[arg(long, value_name = "CSV")]
    pub rows: Option<PathBuf>,

    /// Times each row's copy is repeated (values below 1 count as 1)
    #[arg(long, default_value = "1", value_parser = repeat_arg)]
    pub repeat: NonZeroUsize,
}

pub async fn cmd_expand(args: ExpandArgs, ctx: &CliContext) -> Result<()> {
    let program = load_program(args.steps.as_deref()).await?;
    let rows = load_rows(args.rows.as_deref()).await?;
    let stream = expand(&program, &rows.rows, args.repeat);

    match ctx.output() {
        OutputFormat::Json => println!("{}", to_json(&stream, true)?),
        OutputFormat::Human => {
            for (index, step) in stream.iter().enumerate() {
                let action = step
                    .get("action")
                    .and_then(Value::as_str)
                    .unwrap_or_default();
                println!("{:>4}  {:<12} {}", index + 1, action, to_json(step, false)?);
            }
            println!("{} instruction(s)", stream.len());
        }
    }
    Ok(())
}
