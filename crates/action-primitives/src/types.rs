//! Core data types for action primitives

use chrono::{DateTime, Utc};
use formpilot_core_types::ActionKind;
use serde::Serialize;
use tokio_util::sync::CancellationToken;

use crate::waiting::WaitPolicy;

/// Execution context handed to every primitive
///
/// Carries the per-run cancellation token and the wait policy; the token
/// is only consulted by suspensions when the policy asks for it.
#[derive(Clone, Debug)]
pub struct ExecCtx {
    /// Identifier used in logs, `<run id>#<step>`
    pub action_id: String,

    pub cancel_token: CancellationToken,

    pub policy: WaitPolicy,
}

impl ExecCtx {
    pub fn new(action_id: impl Into<String>, cancel_token: CancellationToken, policy: WaitPolicy) -> Self {
        Self {
            action_id: action_id.into(),
            cancel_token,
            policy,
        }
    }

    /// Context with a fresh token and default policy, for one-off calls.
    pub fn detached(action_id: impl Into<String>) -> Self {
        Self::new(action_id, CancellationToken::new(), WaitPolicy::default())
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel_token.is_cancelled()
    }
}

/// Record of one executed primitive.
#[derive(Debug, Clone, Serialize)]
pub struct ActionReport {
    pub action: ActionKind,

    /// Selector the action resolved, if any
    pub selector: Option<String>,

    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub started_at: DateTime<Utc>,

    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub finished_at: DateTime<Utc>,

    pub latency_ms: u64,
}

impl ActionReport {
    pub fn success(action: ActionKind, started_at: DateTime<Utc>, latency_ms: u64) -> Self {
        Self {
            action,
            selector: None,
            started_at,
            finished_at: Utc::now(),
            latency_ms,
        }
    }

    pub fn with_selector(mut self, selector: impl Into<String>) -> Self {
        self.selector = Some(selector.into());
        self
    }
}
