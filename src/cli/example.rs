use action_flow::example_program;
use anyhow::Result;
use clap::Args;

use super::output::to_json;

#[derive(Args, Clone, Debug)]
pub struct ExampleArgs {
    /// Print on a single line instead of pretty-printed
    #[arg(long)]
    pub compact: bool,
}

pub async fn cmd_example(args: ExampleArgs) -> Result<()> {
    println!("{}", to_json(&example_program(), !args.compact)?);
    Ok(())
}
