//! Key sequence primitive

use crate::{
    errors::ActionError,
    primitives::DefaultActionPrimitives,
    ports::KeyPhase,
    types::{ActionReport, ExecCtx},
    waiting::pause,
};
use chrono::Utc;
use formpilot_core_types::ActionKind;
use std::time::Instant;
use tracing::{debug, info};

/// Execute keySequence primitive
///
/// Targets `selector` when given, otherwise the focused element. Each key
/// is a down/up pair followed by `delay_ms` (skipped when zero).
pub async fn execute_key_sequence(
    primitives: &DefaultActionPrimitives,
    ctx: &ExecCtx,
    selector: Option<&str>,
    keys: &[String],
    delay_ms: u64,
) -> Result<ActionReport, ActionError> {
    let started_at = Utc::now();
    let start_instant = Instant::now();

    if keys.is_empty() {
        return Err(ActionError::missing("keySequence", "keys"));
    }
    info!(
        action_id = %ctx.action_id,
        selector = selector.unwrap_or("<focused>"),
        keys = keys.len(),
        delay_ms,
        "Executing keySequence primitive"
    );

    let surface = primitives.surface();
    let target = match selector.filter(|s| !s.trim().is_empty()) {
        Some(selector) => primitives.resolve(ctx, selector).await?,
        None => surface
            .active_element()
            .await?
            .ok_or(ActionError::NoActiveElement)?,
    };
    surface.focus(&target).await?;

    for key in keys {
        debug!(action_id = %ctx.action_id, key = %key, "Pressing key");
        surface.dispatch_key(&target, key, KeyPhase::Down).await?;
        surface.dispatch_key(&target, key, KeyPhase::Up).await?;
        if delay_ms > 0 {
            pause(ctx, delay_ms).await?;
        }
    }

    let latency_ms = start_instant.elapsed().as_millis() as u64;
    let report = ActionReport::success(ActionKind::KeySequence, started_at, latency_ms);
    Ok(match selector {
        Some(selector) => report.with_selector(selector),
        None => report,
    })
}
