pub mod app;
pub mod commands;
pub mod context;
pub mod dispatch;
pub mod env;
pub mod example;
pub mod expand;
pub mod inputs;
pub mod output;
pub mod rows;
pub mod run;
pub mod runtime;

pub use example::{cmd_example, ExampleArgs};
pub use expand::{cmd_expand, ExpandArgs};
pub use rows::{cmd_rows, RowsArgs};
pub use run::{cmd_run, RunArgs};
