//! Step interpreter
//!
//! `AutomationRunner` owns the run state for one target surface. A run
//! walks the instruction stream in order; before each instruction it checks
//! for a stop request, resolves the handler, reports progress, decodes the
//! step and dispatches it to the action primitives. Every run ends in one
//! of three outcomes (completed, failed, cancelled) and always resets the
//! run state and reports the idle badge on the way out.

use std::sync::Arc;

use action_primitives::{
    ActionPrimitives, ActionReport, DefaultActionPrimitives, ExecCtx, TargetSurface, WaitPolicy,
};
use chrono::{DateTime, Utc};
use formpilot_core_types::RunId;
use formpilot_event_bus::{EventBus, StatusEvent};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::errors::FlowError;
use crate::program::RawStep;
use crate::step::{action_of, action_name, Step};

pub const STATUS_RUNNING: &str = "Automation running...";
pub const STATUS_COMPLETED: &str = "Automation completed.";
pub const STATUS_STOPPING: &str = "Stopping automation...";
pub const REASON_ALREADY_RUNNING: &str = "already_running";

/// Inbound commands of the control channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ControlCommand {
    #[serde(rename = "run-automation")]
    Start {
        #[serde(default)]
        steps: Vec<RawStep>,
    },
    #[serde(rename = "stop-automation")]
    Stop,
}

/// Reply to a control command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandAck {
    pub ok: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl CommandAck {
    pub fn accepted() -> Self {
        Self {
            ok: true,
            reason: None,
        }
    }

    pub fn rejected(reason: impl Into<String>) -> Self {
        Self {
            ok: false,
            reason: Some(reason.into()),
        }
    }
}

/// Terminal state of a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum RunOutcome {
    Completed,
    Failed { message: String },
    Cancelled,
}

impl RunOutcome {
    /// Terminal status line for this outcome.
    pub fn status_text(&self) -> String {
        match self {
            RunOutcome::Completed => STATUS_COMPLETED.to_string(),
            RunOutcome::Failed { message } => format!("Error: {message}"),
            RunOutcome::Cancelled => format!("Error: {}", FlowError::Cancelled),
        }
    }
}

/// Summary of one finished run.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub run_id: RunId,
    pub outcome: RunOutcome,
    pub steps_total: usize,
    pub steps_completed: usize,
    pub actions: Vec<ActionReport>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

/// Observable run state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct RunStateSnapshot {
    pub is_running: bool,
    pub cancel_requested: bool,
}

#[derive(Debug, Default)]
struct RunState {
    running: bool,
    cancel: CancellationToken,
}

/// Claim on the run state; releasing it returns the runner to idle.
///
/// A run that finishes normally reports the idle badge itself. If the run
/// task is dropped mid-way (aborted), the guard clears the badge instead.
struct RunGuard {
    state: Arc<Mutex<RunState>>,
    cancel: CancellationToken,
    bus: Arc<dyn EventBus<StatusEvent>>,
    finished: bool,
}

impl RunGuard {
    fn finish(mut self) {
        self.finished = true;
    }
}

impl Drop for RunGuard {
    fn drop(&mut self) {
        {
            let mut state = self.state.lock();
            state.running = false;
            state.cancel = CancellationToken::new();
        }
        if self.finished {
            return;
        }

        warn!("run abandoned before reaching a terminal state");
        let bus = Arc::clone(&self.bus);
        match tokio::runtime::Handle::try_current() {
            Ok(runtime) => {
                runtime.spawn(async move {
                    if let Err(err) = bus.publish(StatusEvent::idle_badge()).await {
                        debug!(error = %err, "idle badge not delivered");
                    }
                });
            }
            Err(_) => debug!("no runtime to clear the badge from"),
        }
    }
}

/// Interpreter bound to one target surface and one status channel.
pub struct AutomationRunner {
    primitives: Arc<dyn ActionPrimitives>,
    bus: Arc<dyn EventBus<StatusEvent>>,
    policy: WaitPolicy,
    state: Arc<Mutex<RunState>>,
}

impl AutomationRunner {
    pub fn new(
        primitives: Arc<dyn ActionPrimitives>,
        bus: Arc<dyn EventBus<StatusEvent>>,
        policy: WaitPolicy,
    ) -> Self {
        Self {
            primitives,
            bus,
            policy,
            state: Arc::new(Mutex::new(RunState::default())),
        }
    }

    /// Runner over the default primitives for `surface`.
    pub fn with_surface(
        surface: Arc<dyn TargetSurface>,
        bus: Arc<dyn EventBus<StatusEvent>>,
        policy: WaitPolicy,
    ) -> Self {
        Self::new(
            Arc::new(DefaultActionPrimitives::new(surface)),
            bus,
            policy,
        )
    }

    pub fn policy(&self) -> &WaitPolicy {
        &self.policy
    }

    pub fn state(&self) -> RunStateSnapshot {
        let state = self.state.lock();
        RunStateSnapshot {
            is_running: state.running,
            cancel_requested: state.running && state.cancel.is_cancelled(),
        }
    }

    /// Run `instructions` to completion on the current task.
    ///
    /// Rejected with `AlreadyRunning` when another run holds the state; the
    /// in-progress run is left untouched.
    pub async fn run(&self, instructions: Vec<RawStep>) -> Result<RunReport, FlowError> {
        let guard = self.claim().await?;
        Ok(self.drive(guard, instructions).await)
    }

    /// Claim the run state now and drive the run on a spawned task.
    pub async fn start(
        self: &Arc<Self>,
        instructions: Vec<RawStep>,
    ) -> Result<JoinHandle<RunReport>, FlowError> {
        let guard = self.claim().await?;
        let runner = Arc::clone(self);
        Ok(tokio::spawn(async move {
            runner.drive(guard, instructions).await
        }))
    }

    /// Request a stop. Returns whether a run was in progress to observe it.
    pub async fn stop(&self) -> bool {
        let was_running = {
            let state = self.state.lock();
            if state.running {
                state.cancel.cancel();
            }
            state.running
        };
        info!(was_running, "stop requested");
        self.report(StatusEvent::status(STATUS_STOPPING)).await;
        was_running
    }

    /// Apply one control command.
    pub async fn handle(self: &Arc<Self>, command: ControlCommand) -> CommandAck {
        match command {
            ControlCommand::Start { steps } => match self.start(steps).await {
                Ok(_detached) => CommandAck::accepted(),
                Err(_) => CommandAck::rejected(REASON_ALREADY_RUNNING),
            },
            ControlCommand::Stop => {
                self.stop().await;
                CommandAck::accepted()
            }
        }
    }

    /// Apply commands until the sender side closes.
    pub async fn serve_commands(self: Arc<Self>, mut commands: mpsc::Receiver<ControlCommand>) {
        while let Some(command) = commands.recv().await {
            let ack = self.handle(command).await;
            debug!(ok = ack.ok, reason = ?ack.reason, "control command handled");
        }
        debug!("control channel closed");
    }

    async fn claim(&self) -> Result<RunGuard, FlowError> {
        let claimed = {
            let mut state = self.state.lock();
            if state.running {
                None
            } else {
                state.running = true;
                state.cancel = CancellationToken::new();
                Some(state.cancel.clone())
            }
        };

        match claimed {
            Some(cancel) => Ok(RunGuard {
                state: Arc::clone(&self.state),
                cancel,
                bus: Arc::clone(&self.bus),
                finished: false,
            }),
            None => {
                warn!("run rejected: automation already running");
                self.report(StatusEvent::status(FlowError::AlreadyRunning.to_string()))
                    .await;
                Err(FlowError::AlreadyRunning)
            }
        }
    }

    async fn drive(&self, guard: RunGuard, instructions: Vec<RawStep>) -> RunReport {
        let run_id = RunId::new();
        let started_at = Utc::now();
        let total = instructions.len();
        let mut actions = Vec::with_capacity(total);

        info!(%run_id, steps = total, "automation started");
        self.report(StatusEvent::running_badge()).await;
        self.report(StatusEvent::status(STATUS_RUNNING)).await;

        let result = self
            .execute_all(&run_id, &guard.cancel, &instructions, &mut actions)
            .await;

        let outcome = match result {
            Ok(()) => RunOutcome::Completed,
            Err(err) if err.is_cancellation() => RunOutcome::Cancelled,
            Err(err) => RunOutcome::Failed {
                message: err.to_string(),
            },
        };

        match &outcome {
            RunOutcome::Completed => info!(%run_id, "automation completed"),
            RunOutcome::Cancelled => info!(%run_id, completed = actions.len(), "automation stopped"),
            RunOutcome::Failed { message } => {
                warn!(%run_id, completed = actions.len(), error = %message, "automation failed")
            }
        }
        self.report(StatusEvent::status(outcome.status_text())).await;

        guard.finish();
        self.report(StatusEvent::idle_badge()).await;

        RunReport {
            run_id,
            outcome,
            steps_total: total,
            steps_completed: actions.len(),
            actions,
            started_at,
            finished_at: Utc::now(),
        }
    }

    async fn execute_all(
        &self,
        run_id: &RunId,
        cancel: &CancellationToken,
        instructions: &[RawStep],
        actions: &mut Vec<ActionReport>,
    ) -> Result<(), FlowError> {
        let total = instructions.len();
        for (index, raw) in instructions.iter().enumerate() {
            if cancel.is_cancelled() {
                return Err(FlowError::Cancelled);
            }

            let kind = action_of(raw)?;
            self.report(StatusEvent::status(format!(
                "Step {}/{}: {}",
                index + 1,
                total,
                action_name(raw)
            )))
            .await;

            let step = Step::decode(kind, raw)?;
            let ctx = ExecCtx::new(format!("{run_id}#{}", index + 1), cancel.clone(), self.policy);
            debug!(action_id = %ctx.action_id, action = %kind, selector = ?step.selector(), "executing step");

            let report = self.dispatch(&ctx, &step).await?;
            actions.push(report);
        }
        Ok(())
    }

    async fn dispatch(&self, ctx: &ExecCtx, step: &Step) -> Result<ActionReport, FlowError> {
        let primitives = self.primitives.as_ref();
        let report = match step {
            Step::Wait { ms } => primitives.wait(ctx, *ms).await?,
            Step::WaitFor {
                selector,
                timeout_ms,
            } => primitives.wait_for(ctx, selector, *timeout_ms).await?,
            Step::Click { selector } => primitives.click(ctx, selector).await?,
            Step::Type {
                selector,
                text,
                clear,
            } => primitives.type_text(ctx, selector, text, *clear).await?,
            Step::Paste { selector, text } => primitives.paste(ctx, selector, text).await?,
            Step::KeySequence {
                selector,
                keys,
                delay_ms,
            } => {
                primitives
                    .key_sequence(ctx, selector.as_deref(), keys, *delay_ms)
                    .await?
            }
            Step::Scroll { x, y, behavior } => primitives.scroll(ctx, *x, *y, *behavior).await?,
            Step::Focus { selector } => primitives.focus(ctx, selector).await?,
            Step::SetValue { selector, value } => {
                primitives.set_value(ctx, selector, value).await?
            }
            Step::Highlight {
                selector,
                duration_ms,
            } => primitives.highlight(ctx, selector, *duration_ms).await?,
        };
        Ok(report)
    }

    async fn report(&self, event: StatusEvent) {
        if let Err(err) = self.bus.publish(event).await {
            debug!(error = %err, "status event not delivered");
        }
    }
}
