use crate::{
    errors::ActionError,
    primitives::{require_selector, DefaultActionPrimitives},
    types::{ActionReport, ExecCtx},
    waiting::pause,
};
use chrono::Utc;
use formpilot_core_types::ActionKind;
use std::time::Instant;
use tracing::info;

pub async fn execute_highlight(
    primitives: &DefaultActionPrimitives,
    ctx: &ExecCtx,
    selector: &str,
    duration_ms: u64,
) -> Result<ActionReport, ActionError> {
    let started_at = Utc::now();
    let start_instant = Instant::now();

    require_selector("highlight", selector)?;
    info!(
        action_id = %ctx.action_id,
        selector,
        duration_ms,
        "Executing highlight primitive"
    );

    let element = primitives.resolve(ctx, selector).await?;
    primitives
        .surface()
        .apply_transient_style(&element, duration_ms)
        .await?;
    pause(ctx, duration_ms).await?;

    let latency_ms = start_instant.elapsed().as_millis() as u64;
    Ok(ActionReport::success(ActionKind::Highlight, started_at, latency_ms)
        .with_selector(selector))
}
