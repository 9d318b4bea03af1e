//! Action Primitives - the instruction set executed against a target surface
//!
//! This crate provides the building blocks the step interpreter dispatches to:
//! - The `TargetSurface` port that owns the live document
//! - A bounded polling wait for elements (`wait_for_element`)
//! - One primitive per action kind: wait, waitFor, click, type, paste,
//!   keySequence, scroll, focus, setValue, highlight
//! - `MemorySurface`, an in-memory document for rehearsals and tests

pub mod errors;
pub mod memory;
pub mod ports;
mod primitives;
pub mod types;
mod waiting;

pub use errors::*;
pub use memory::{ElementFixture, MemorySurface, PageFixture, SurfaceEvent};
pub use ports::*;
pub use primitives::*;
pub use types::*;
pub use waiting::*;
