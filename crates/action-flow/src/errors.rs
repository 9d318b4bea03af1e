//! Flow execution error types

use action_primitives::{ActionError, STOPPED_BY_USER};
use thiserror::Error;

/// Run-level errors. Handler failures arrive wrapped in `Action`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FlowError {
    /// Program text is not a JSON array of step objects
    #[error("Invalid JSON: {0}")]
    InvalidProgram(String),

    /// The `action` field names no handler
    #[error("Unknown action: {0}")]
    UnknownAction(String),

    /// A run is already in progress on this runner
    #[error("Automation already running.")]
    AlreadyRunning,

    /// The run observed a stop request at an instruction boundary
    #[error("{}", STOPPED_BY_USER)]
    Cancelled,

    #[error(transparent)]
    Action(#[from] ActionError),
}

impl FlowError {
    /// Stop requests surface either at a boundary or inside an interruptible wait.
    pub fn is_cancellation(&self) -> bool {
        match self {
            FlowError::Cancelled => true,
            FlowError::Action(err) => err.is_interruption(),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_matches_status_strings() {
        assert_eq!(
            FlowError::UnknownAction("doesNotExist".into()).to_string(),
            "Unknown action: doesNotExist"
        );
        assert_eq!(FlowError::Cancelled.to_string(), "Automation stopped by user.");
        assert_eq!(
            FlowError::AlreadyRunning.to_string(),
            "Automation already running."
        );
        assert_eq!(
            FlowError::from(ActionError::missing("focus", "selector")).to_string(),
            "focus requires selector"
        );
    }

    #[test]
    fn interrupted_actions_count_as_cancellation() {
        let err = FlowError::from(ActionError::Interrupted(STOPPED_BY_USER.to_string()));
        assert!(err.is_cancellation());
        assert!(!FlowError::UnknownAction("x".into()).is_cancellation());
    }
}
