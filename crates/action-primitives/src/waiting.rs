//! Suspensions used by the primitives: fixed pauses and the bounded
//! element poll.

use crate::{errors::ActionError, ports::TargetSurface, types::ExecCtx};
use formpilot_core_types::ElementId;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::time::{sleep, Instant};
use tracing::{debug, warn};

pub const STOPPED_BY_USER: &str = "Automation stopped by user.";

/// Timing knobs shared by all primitives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WaitPolicy {
    /// Delay between two element lookups
    pub poll_interval_ms: u64,

    /// Lookup budget for handlers that implicitly wait for their selector
    pub lookup_timeout_ms: u64,

    /// Settle pause after a scroll
    pub scroll_settle_ms: u64,

    /// When set, pauses and polls end early once the run is asked to stop.
    /// Off by default: a running handler finishes its own waits.
    pub interrupt_on_cancel: bool,
}

impl Default for WaitPolicy {
    fn default() -> Self {
        Self {
            poll_interval_ms: 200,
            lookup_timeout_ms: 5000,
            scroll_settle_ms: 300,
            interrupt_on_cancel: false,
        }
    }
}

/// Suspend for `ms`, honouring the policy's interruption setting.
pub async fn pause(ctx: &ExecCtx, ms: u64) -> Result<(), ActionError> {
    let duration = Duration::from_millis(ms);
    if !ctx.policy.interrupt_on_cancel {
        sleep(duration).await;
        return Ok(());
    }

    if ctx.is_cancelled() {
        return Err(ActionError::Interrupted(STOPPED_BY_USER.to_string()));
    }
    tokio::select! {
        _ = sleep(duration) => Ok(()),
        _ = ctx.cancel_token.cancelled() => {
            debug!(action_id = %ctx.action_id, "pause interrupted by stop request");
            Err(ActionError::Interrupted(STOPPED_BY_USER.to_string()))
        }
    }
}

/// Poll the surface for `selector` every poll interval until it resolves or
/// `timeout_ms` has elapsed since the first lookup.
pub async fn wait_for_element(
    surface: &dyn TargetSurface,
    ctx: &ExecCtx,
    selector: &str,
    timeout_ms: u64,
) -> Result<ElementId, ActionError> {
    let start = Instant::now();
    let budget = Duration::from_millis(timeout_ms);
    let mut attempts = 0u32;

    while start.elapsed() < budget {
        attempts += 1;
        if let Some(element) = surface.query_selector(selector).await? {
            debug!(
                action_id = %ctx.action_id,
                selector,
                attempts,
                element = %element,
                "selector resolved"
            );
            return Ok(element);
        }
        pause(ctx, ctx.policy.poll_interval_ms).await?;
    }

    warn!(
        action_id = %ctx.action_id,
        selector,
        timeout_ms,
        attempts,
        "selector lookup timed out"
    );
    Err(ActionError::LookupTimeout {
        selector: selector.to_string(),
        timeout_ms,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemorySurface;

    #[test]
    fn default_policy_matches_reference_timings() {
        let policy = WaitPolicy::default();
        assert_eq!(policy.poll_interval_ms, 200);
        assert_eq!(policy.lookup_timeout_ms, 5000);
        assert_eq!(policy.scroll_settle_ms, 300);
        assert!(!policy.interrupt_on_cancel);
    }

    #[tokio::test(start_paused = true)]
    async fn lookup_times_out_after_budget_not_before() {
        let surface = MemorySurface::new();
        let ctx = ExecCtx::detached("test#1");
        let start = Instant::now();

        let err = wait_for_element(&surface, &ctx, "#never", 1000)
            .await
            .unwrap_err();

        let elapsed = start.elapsed();
        assert!(matches!(err, ActionError::LookupTimeout { timeout_ms: 1000, .. }));
        assert!(elapsed >= Duration::from_millis(1000), "{elapsed:?}");
        assert!(elapsed <= Duration::from_millis(1200), "{elapsed:?}");
        assert_eq!(surface.query_count(), 5);
    }

    #[tokio::test(start_paused = true)]
    async fn lookup_picks_up_late_elements() {
        let surface = MemorySurface::new();
        surface.add_element_after("#late", "", Duration::from_millis(450));
        let ctx = ExecCtx::detached("test#2");
        let start = Instant::now();

        let element = wait_for_element(&surface, &ctx, "#late", 5000).await.unwrap();

        assert_eq!(surface.selector_of(&element).as_deref(), Some("#late"));
        let elapsed = start.elapsed();
        assert!(elapsed >= Duration::from_millis(600), "{elapsed:?}");
        assert!(elapsed < Duration::from_millis(800), "{elapsed:?}");
    }

    #[tokio::test(start_paused = true)]
    async fn default_poll_ignores_stop_request() {
        let surface = MemorySurface::new();
        let ctx = ExecCtx::detached("test#3");
        ctx.cancel_token.cancel();

        let err = wait_for_element(&surface, &ctx, "#missing", 400)
            .await
            .unwrap_err();
        assert!(matches!(err, ActionError::LookupTimeout { .. }));
    }

    #[tokio::test(start_paused = true)]
    async fn interrupting_policy_ends_poll_on_stop() {
        let surface = MemorySurface::new();
        let policy = WaitPolicy {
            interrupt_on_cancel: true,
            ..WaitPolicy::default()
        };
        let ctx = ExecCtx::new("test#4", tokio_util::sync::CancellationToken::new(), policy);
        let token = ctx.cancel_token.clone();
        tokio::spawn(async move {
            sleep(Duration::from_millis(300)).await;
            token.cancel();
        });

        let start = Instant::now();
        let err = wait_for_element(&surface, &ctx, "#missing", 5000)
            .await
            .unwrap_err();

        assert!(err.is_interruption());
        let elapsed = start.elapsed();
        assert!(elapsed >= Duration::from_millis(300), "{elapsed:?}");
        assert!(elapsed < Duration::from_millis(400), "{elapsed:?}");
    }
}
