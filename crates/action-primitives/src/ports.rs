use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;
use formpilot_core_types::{ElementId, SurfaceError};
use serde::{Deserialize, Serialize};

/// Capability interface to the host surface that owns the live document.
///
/// Implementations dispatch real input events; the interpreter only ever
/// talks to the document through this trait.
#[async_trait]
pub trait TargetSurface: Send + Sync {
    async fn query_selector(&self, selector: &str) -> Result<Option<ElementId>, SurfaceError>;

    async fn active_element(&self) -> Result<Option<ElementId>, SurfaceError>;

    async fn click(&self, element: &ElementId) -> Result<(), SurfaceError>;

    async fn focus(&self, element: &ElementId) -> Result<(), SurfaceError>;

    async fn read_value(&self, element: &ElementId) -> Result<String, SurfaceError>;

    /// Replace the element value, then fire `input` and `change`.
    async fn set_value(&self, element: &ElementId, text: &str) -> Result<(), SurfaceError>;

    async fn dispatch_key(
        &self,
        element: &ElementId,
        key: &str,
        phase: KeyPhase,
    ) -> Result<(), SurfaceError>;

    async fn scroll_by(&self, x: f64, y: f64, behavior: ScrollBehavior)
        -> Result<(), SurfaceError>;

    /// Mark the element visually; the surface reverts it after `duration_ms`.
    async fn apply_transient_style(
        &self,
        element: &ElementId,
        duration_ms: u64,
    ) -> Result<(), SurfaceError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyPhase {
    Down,
    Up,
}

/// Scroll behaviour forwarded to the surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ScrollBehavior {
    #[default]
    Smooth,
    Instant,
    Auto,
}

impl ScrollBehavior {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScrollBehavior::Smooth => "smooth",
            ScrollBehavior::Instant => "instant",
            ScrollBehavior::Auto => "auto",
        }
    }
}

impl fmt::Display for ScrollBehavior {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ScrollBehavior {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "smooth" => Ok(ScrollBehavior::Smooth),
            "instant" => Ok(ScrollBehavior::Instant),
            "auto" => Ok(ScrollBehavior::Auto),
            other => Err(format!("unsupported scroll behavior '{other}'")),
        }
    }
}
