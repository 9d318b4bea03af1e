//! Field-writing primitives: type, paste and setValue

use crate::{
    errors::ActionError,
    primitives::{require_selector, DefaultActionPrimitives},
    types::{ActionReport, ExecCtx},
};
use chrono::Utc;
use formpilot_core_types::ActionKind;
use std::time::Instant;
use tracing::{debug, info};

/// Execute type primitive
///
/// Focuses the field, optionally clears it, then appends `text` to
/// whatever value the field holds. Each write fires input/change on the
/// surface side.
pub async fn execute_type_text(
    primitives: &DefaultActionPrimitives,
    ctx: &ExecCtx,
    selector: &str,
    text: &str,
    clear: bool,
) -> Result<ActionReport, ActionError> {
    let started_at = Utc::now();
    let start_instant = Instant::now();

    require_selector("type", selector)?;
    info!(
        action_id = %ctx.action_id,
        selector,
        text_length = text.len(),
        clear,
        "Executing type primitive"
    );

    let surface = primitives.surface();
    let element = primitives.resolve(ctx, selector).await?;
    surface.focus(&element).await?;
    if clear {
        debug!(action_id = %ctx.action_id, "Clearing field before typing");
        surface.set_value(&element, "").await?;
    }
    let current = surface.read_value(&element).await?;
    surface
        .set_value(&element, &format!("{current}{text}"))
        .await?;

    let latency_ms = start_instant.elapsed().as_millis() as u64;
    Ok(ActionReport::success(ActionKind::Type, started_at, latency_ms).with_selector(selector))
}

/// Focus the field and replace its value in one write.
pub async fn execute_paste(
    primitives: &DefaultActionPrimitives,
    ctx: &ExecCtx,
    selector: &str,
    text: &str,
) -> Result<ActionReport, ActionError> {
    let started_at = Utc::now();
    let start_instant = Instant::now();

    require_selector("paste", selector)?;
    info!(
        action_id = %ctx.action_id,
        selector,
        text_length = text.len(),
        "Executing paste primitive"
    );

    let element = primitives.resolve(ctx, selector).await?;
    primitives.surface().focus(&element).await?;
    primitives.surface().set_value(&element, text).await?;

    let latency_ms = start_instant.elapsed().as_millis() as u64;
    Ok(ActionReport::success(ActionKind::Paste, started_at, latency_ms).with_selector(selector))
}

pub async fn execute_set_value(
    primitives: &DefaultActionPrimitives,
    ctx: &ExecCtx,
    selector: &str,
    value: &str,
) -> Result<ActionReport, ActionError> {
    let started_at = Utc::now();
    let start_instant = Instant::now();

    require_selector("setValue", selector)?;
    info!(action_id = %ctx.action_id, selector, "Executing setValue primitive");

    let element = primitives.resolve(ctx, selector).await?;
    primitives.surface().set_value(&element, value).await?;

    let latency_ms = start_instant.elapsed().as_millis() as u64;
    Ok(ActionReport::success(ActionKind::SetValue, started_at, latency_ms)
        .with_selector(selector))
}
