//! Click and focus primitives

use crate::{
    errors::ActionError,
    primitives::{require_selector, DefaultActionPrimitives},
    types::{ActionReport, ExecCtx},
};
use chrono::Utc;
use formpilot_core_types::ActionKind;
use std::time::Instant;
use tracing::{debug, info};

/// Execute click primitive
///
/// Steps:
/// 1. Validate selector
/// 2. Wait for the element (implicit lookup budget)
/// 3. Invoke the surface click capability
pub async fn execute_click(
    primitives: &DefaultActionPrimitives,
    ctx: &ExecCtx,
    selector: &str,
) -> Result<ActionReport, ActionError> {
    let started_at = Utc::now();
    let start_instant = Instant::now();

    require_selector("click", selector)?;
    info!(action_id = %ctx.action_id, selector, "Executing click primitive");

    let element = primitives.resolve(ctx, selector).await?;
    debug!(action_id = %ctx.action_id, element = %element, "Dispatching click");
    primitives.surface().click(&element).await?;

    let latency_ms = start_instant.elapsed().as_millis() as u64;
    Ok(ActionReport::success(ActionKind::Click, started_at, latency_ms).with_selector(selector))
}

pub async fn execute_focus(
    primitives: &DefaultActionPrimitives,
    ctx: &ExecCtx,
    selector: &str,
) -> Result<ActionReport, ActionError> {
    let started_at = Utc::now();
    let start_instant = Instant::now();

    require_selector("focus", selector)?;
    info!(action_id = %ctx.action_id, selector, "Executing focus primitive");

    let element = primitives.resolve(ctx, selector).await?;
    primitives.surface().focus(&element).await?;

    let latency_ms = start_instant.elapsed().as_millis() as u64;
    Ok(ActionReport::success(ActionKind::Focus, started_at, latency_ms).with_selector(selector))
}
