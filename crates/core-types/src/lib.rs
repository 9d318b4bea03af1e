use std::fmt;
use std::str::FromStr;

use thiserror::Error;
use uuid::Uuid;

/// Error raised by a target surface capability.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SurfaceError {
    /// The element handle no longer refers to a live element
    #[error("element detached: {0}")]
    Detached(String),

    /// The surface refused the requested operation
    #[error("surface rejected operation: {0}")]
    Rejected(String),

    /// Transport or host failure
    #[error("surface unavailable: {0}")]
    Unavailable(String),
}

/// Opaque handle to an element owned by the target surface.
#[cfg_attr(feature = "serde-full", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct ElementId(pub String);

impl ElementId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg_attr(feature = "serde-full", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct RunId(pub String);

impl RunId {
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }
}

impl Default for RunId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The closed instruction set understood by the interpreter.
#[cfg_attr(feature = "serde-full", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde-full", serde(rename_all = "camelCase"))]
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum ActionKind {
    Wait,
    WaitFor,
    Click,
    Type,
    Paste,
    KeySequence,
    Scroll,
    Focus,
    SetValue,
    Highlight,
}

impl ActionKind {
    pub const ALL: [ActionKind; 10] = [
        ActionKind::Wait,
        ActionKind::WaitFor,
        ActionKind::Click,
        ActionKind::Type,
        ActionKind::Paste,
        ActionKind::KeySequence,
        ActionKind::Scroll,
        ActionKind::Focus,
        ActionKind::SetValue,
        ActionKind::Highlight,
    ];

    /// Wire name as it appears in the `action` field of a step.
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionKind::Wait => "wait",
            ActionKind::WaitFor => "waitFor",
            ActionKind::Click => "click",
            ActionKind::Type => "type",
            ActionKind::Paste => "paste",
            ActionKind::KeySequence => "keySequence",
            ActionKind::Scroll => "scroll",
            ActionKind::Focus => "focus",
            ActionKind::SetValue => "setValue",
            ActionKind::Highlight => "highlight",
        }
    }

    /// Whether the action resolves a `selector` before doing anything else.
    pub fn requires_selector(&self) -> bool {
        !matches!(
            self,
            ActionKind::Wait | ActionKind::Scroll | ActionKind::KeySequence
        )
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown action: {0}")]
pub struct UnknownActionKind(pub String);

impl FromStr for ActionKind {
    type Err = UnknownActionKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ActionKind::ALL
            .iter()
            .copied()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| UnknownActionKind(s.to_string()))
    }
}
