//! Wait primitives - fixed pause and explicit wait-for-selector

use crate::{
    errors::ActionError,
    primitives::{require_selector, DefaultActionPrimitives},
    types::{ActionReport, ExecCtx},
    waiting::{pause, wait_for_element},
};
use chrono::Utc;
use formpilot_core_types::ActionKind;
use std::time::Instant;
use tracing::{debug, info};

/// Suspend for `ms` milliseconds. Never fails unless the policy lets a
/// stop request interrupt it.
pub async fn execute_wait(ctx: &ExecCtx, ms: u64) -> Result<ActionReport, ActionError> {
    let started_at = Utc::now();
    let start_instant = Instant::now();

    debug!(action_id = %ctx.action_id, ms, "Executing wait primitive");
    pause(ctx, ms).await?;

    let latency_ms = start_instant.elapsed().as_millis() as u64;
    Ok(ActionReport::success(ActionKind::Wait, started_at, latency_ms))
}

/// Poll for `selector` until it resolves or `timeout_ms` elapses.
pub async fn execute_wait_for(
    primitives: &DefaultActionPrimitives,
    ctx: &ExecCtx,
    selector: &str,
    timeout_ms: u64,
) -> Result<ActionReport, ActionError> {
    let started_at = Utc::now();
    let start_instant = Instant::now();

    require_selector("waitFor", selector)?;
    info!(
        action_id = %ctx.action_id,
        selector,
        timeout_ms,
        "Executing waitFor primitive"
    );

    wait_for_element(primitives.surface(), ctx, selector, timeout_ms).await?;

    let latency_ms = start_instant.elapsed().as_millis() as u64;
    Ok(ActionReport::success(ActionKind::WaitFor, started_at, latency_ms).with_selector(selector))
}
