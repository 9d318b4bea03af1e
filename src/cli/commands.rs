use clap::Subcommand;

use super::example::ExampleArgs;
use super::expand::ExpandArgs;
use super::rows::RowsArgs;
use super::run::RunArgs;

#[derive(Subcommand, Clone)]
pub enum Commands {
    /// Expand a step program over a dataset and run it against a rehearsal page
    Run(RunArgs),

    /// Print the instruction stream a program expands to
    Expand(ExpandArgs),

    /// Parse a CSV dataset and summarise it
    Rows(RowsArgs),

    /// Print the built-in example program
    Example(ExampleArgs),
}
