//! Scroll primitive - scroll the viewport by an offset

use crate::{
    errors::ActionError,
    ports::ScrollBehavior,
    primitives::DefaultActionPrimitives,
    types::{ActionReport, ExecCtx},
    waiting::pause,
};
use chrono::Utc;
use formpilot_core_types::ActionKind;
use std::time::Instant;
use tracing::{debug, info};

/// Scroll by (`x`, `y`), then hold for the policy's settle time regardless
/// of behaviour.
pub async fn execute_scroll(
    primitives: &DefaultActionPrimitives,
    ctx: &ExecCtx,
    x: f64,
    y: f64,
    behavior: ScrollBehavior,
) -> Result<ActionReport, ActionError> {
    let started_at = Utc::now();
    let start_instant = Instant::now();

    info!(
        action_id = %ctx.action_id,
        x,
        y,
        behavior = %behavior,
        "Executing scroll primitive"
    );

    primitives.surface().scroll_by(x, y, behavior).await?;

    debug!("Waiting for scroll to settle");
    pause(ctx, ctx.policy.scroll_settle_ms).await?;

    let latency_ms = start_instant.elapsed().as_millis() as u64;
    Ok(ActionReport::success(ActionKind::Scroll, started_at, latency_ms))
}
