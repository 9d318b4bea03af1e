//! Error types for action primitives

use formpilot_core_types::SurfaceError;
use thiserror::Error;

/// Failure of a single action handler. Every variant aborts the run.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ActionError {
    /// A required field is missing or has the wrong shape
    #[error("{0}")]
    Validation(String),

    /// `waitFor` (or a handler's implicit lookup) ran out of time
    #[error("Timeout waiting for selector: {selector}")]
    LookupTimeout { selector: String, timeout_ms: u64 },

    /// keySequence without a selector found nothing focused
    #[error("No active element to send keys to.")]
    NoActiveElement,

    /// A suspension observed the stop request
    #[error("{0}")]
    Interrupted(String),

    /// The target surface rejected a capability call
    #[error("{0}")]
    Surface(#[from] SurfaceError),
}

impl ActionError {
    pub fn missing(action: &str, field: &str) -> Self {
        ActionError::Validation(format!("{action} requires {field}"))
    }

    /// Whether this failure came from a stop request rather than the page.
    pub fn is_interruption(&self) -> bool {
        matches!(self, ActionError::Interrupted(_))
    }
}
