use super::env::CliArgs;
use super::{cmd_example, cmd_expand, cmd_rows, cmd_run};
use crate::cli::commands::Commands;
use crate::cli::context::CliContext;
use anyhow::Result;

pub async fn dispatch(cli: &CliArgs, ctx: &CliContext) -> Result<()> {
    match cli.command.clone() {
        Commands::Run(args) => cmd_run(args, ctx).await,
        Commands::Expand(args) => cmd_expand(args, ctx).await,
        Commands::Rows(args) => cmd_rows(args, ctx).await,
        Commands::Example(args) => cmd_example(args).await,
    }
}
