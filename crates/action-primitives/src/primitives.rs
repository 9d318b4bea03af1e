//! Action primitives implementation
//!
//! One primitive per action kind:
//! 1. wait / waitFor - fixed pause and bounded element poll
//! 2. click, focus - resolve then invoke
//! 3. type, paste, setValue - resolve then write the field value
//! 4. keySequence - down/up key pairs against a target or the focused element
//! 5. scroll - scroll the viewport, then settle
//! 6. highlight - transient marking plus a pause of the same length

mod click;
mod highlight;
mod keys;
mod scroll;
mod type_text;
mod wait;

pub use click::*;
pub use highlight::*;
pub use keys::*;
pub use scroll::*;
pub use type_text::*;
pub use wait::*;

use async_trait::async_trait;
use formpilot_core_types::ElementId;
use std::sync::Arc;

use crate::{
    errors::ActionError,
    ports::{ScrollBehavior, TargetSurface},
    types::{ActionReport, ExecCtx},
    waiting::wait_for_element,
};

/// Action primitives trait
///
/// The interpreter dispatches every decoded step to exactly one of these.
/// Implementations must not suspend anywhere other than the documented
/// pauses and polls.
#[async_trait]
pub trait ActionPrimitives: Send + Sync {
    async fn wait(&self, ctx: &ExecCtx, ms: u64) -> Result<ActionReport, ActionError>;

    async fn wait_for(
        &self,
        ctx: &ExecCtx,
        selector: &str,
        timeout_ms: u64,
    ) -> Result<ActionReport, ActionError>;

    async fn click(&self, ctx: &ExecCtx, selector: &str) -> Result<ActionReport, ActionError>;

    /// Focus, optionally clear, then append `text` to the current value
    async fn type_text(
        &self,
        ctx: &ExecCtx,
        selector: &str,
        text: &str,
        clear: bool,
    ) -> Result<ActionReport, ActionError>;

    async fn paste(
        &self,
        ctx: &ExecCtx,
        selector: &str,
        text: &str,
    ) -> Result<ActionReport, ActionError>;

    async fn key_sequence(
        &self,
        ctx: &ExecCtx,
        selector: Option<&str>,
        keys: &[String],
        delay_ms: u64,
    ) -> Result<ActionReport, ActionError>;

    async fn scroll(
        &self,
        ctx: &ExecCtx,
        x: f64,
        y: f64,
        behavior: ScrollBehavior,
    ) -> Result<ActionReport, ActionError>;

    async fn focus(&self, ctx: &ExecCtx, selector: &str) -> Result<ActionReport, ActionError>;

    async fn set_value(
        &self,
        ctx: &ExecCtx,
        selector: &str,
        value: &str,
    ) -> Result<ActionReport, ActionError>;

    async fn highlight(
        &self,
        ctx: &ExecCtx,
        selector: &str,
        duration_ms: u64,
    ) -> Result<ActionReport, ActionError>;
}

/// Default implementation of action primitives over a target surface
pub struct DefaultActionPrimitives {
    surface: Arc<dyn TargetSurface>,
}

impl DefaultActionPrimitives {
    pub fn new(surface: Arc<dyn TargetSurface>) -> Self {
        Self { surface }
    }

    pub fn surface(&self) -> &dyn TargetSurface {
        self.surface.as_ref()
    }

    /// Resolve `selector` with the policy's implicit lookup budget.
    pub async fn resolve(&self, ctx: &ExecCtx, selector: &str) -> Result<ElementId, ActionError> {
        wait_for_element(
            self.surface(),
            ctx,
            selector,
            ctx.policy.lookup_timeout_ms,
        )
        .await
    }
}

#[async_trait]
impl ActionPrimitives for DefaultActionPrimitives {
    async fn wait(&self, ctx: &ExecCtx, ms: u64) -> Result<ActionReport, ActionError> {
        wait::execute_wait(ctx, ms).await
    }

    async fn wait_for(
        &self,
        ctx: &ExecCtx,
        selector: &str,
        timeout_ms: u64,
    ) -> Result<ActionReport, ActionError> {
        wait::execute_wait_for(self, ctx, selector, timeout_ms).await
    }

    async fn click(&self, ctx: &ExecCtx, selector: &str) -> Result<ActionReport, ActionError> {
        click::execute_click(self, ctx, selector).await
    }

    async fn type_text(
        &self,
        ctx: &ExecCtx,
        selector: &str,
        text: &str,
        clear: bool,
    ) -> Result<ActionReport, ActionError> {
        type_text::execute_type_text(self, ctx, selector, text, clear).await
    }

    async fn paste(
        &self,
        ctx: &ExecCtx,
        selector: &str,
        text: &str,
    ) -> Result<ActionReport, ActionError> {
        type_text::execute_paste(self, ctx, selector, text).await
    }

    async fn key_sequence(
        &self,
        ctx: &ExecCtx,
        selector: Option<&str>,
        keys: &[String],
        delay_ms: u64,
    ) -> Result<ActionReport, ActionError> {
        keys::execute_key_sequence(self, ctx, selector, keys, delay_ms).await
    }

    async fn scroll(
        &self,
        ctx: &ExecCtx,
        x: f64,
        y: f64,
        behavior: ScrollBehavior,
    ) -> Result<ActionReport, ActionError> {
        scroll::execute_scroll(self, ctx, x, y, behavior).await
    }

    async fn focus(&self, ctx: &ExecCtx, selector: &str) -> Result<ActionReport, ActionError> {
        click::execute_focus(self, ctx, selector).await
    }

    async fn set_value(
        &self,
        ctx: &ExecCtx,
        selector: &str,
        value: &str,
    ) -> Result<ActionReport, ActionError> {
        type_text::execute_set_value(self, ctx, selector, value).await
    }

    async fn highlight(
        &self,
        ctx: &ExecCtx,
        selector: &str,
        duration_ms: u64,
    ) -> Result<ActionReport, ActionError> {
        highlight::execute_highlight(self, ctx, selector, duration_ms).await
    }
}

/// Reject empty selectors before any suspension.
fn require_selector(action: &str, selector: &str) -> Result<(), ActionError> {
    if selector.trim().is_empty() {
        return Err(ActionError::missing(action, "selector"));
    }
    Ok(())
}
