//! Data-driven step interpretation
//!
//! Turns a step program plus tabular rows into a flat instruction stream
//! (templating + expansion), and runs that stream against a target surface
//! with progress reporting and cooperative cancellation.

pub mod errors;
pub mod executor;
pub mod expand;
pub mod program;
pub mod step;
pub mod template;

pub use errors::FlowError;
pub use executor::{
    AutomationRunner, CommandAck, ControlCommand, RunOutcome, RunReport, RunStateSnapshot,
};
pub use expand::expand;
pub use program::{example_program, parse_program, parse_repeat_count, RawStep};
pub use step::Step;
pub use template::{apply_template, apply_template_str, RowContext};
