//! Run state: the per-run context and the observable result.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

use super::error::StepError;

/// Lifecycle of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RunStatus {
    Pending,
    Running,
    Succeeded,
    Failed,
    Aborted,
}

impl RunStatus {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            RunStatus::Succeeded | RunStatus::Failed | RunStatus::Aborted
        )
    }
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RunStatus::Pending => "pending",
            RunStatus::Running => "running",
            RunStatus::Succeeded => "succeeded",
            RunStatus::Failed => "failed",
            RunStatus::Aborted => "aborted",
        };
        f.write_str(s)
    }
}

/// What happened to one attempted step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum StepOutcome {
    Succeeded { output_text: String },
    Failed { message: String },
    Aborted,
}

impl From<StepError> for StepOutcome {
    fn from(err: StepError) -> Self {
        match err {
            StepError::Failed(message) => StepOutcome::Failed { message },
            StepError::Aborted => StepOutcome::Aborted,
        }
    }
}

/// Outcome of one step attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunResultStep {
    pub step_index: usize,
    pub step_id: String,
    pub input_prompt: String,
    pub outcome: StepOutcome,
}

impl RunResultStep {
    /// The produced text, present only when the step succeeded.
    pub fn output_text(&self) -> Option<&str> {
        match &self.outcome {
            StepOutcome::Succeeded { output_text } => Some(output_text),
            _ => None,
        }
    }

    /// The error, present only when the step did not succeed.
    pub fn error(&self) -> Option<StepError> {
        match &self.outcome {
            StepOutcome::Succeeded { .. } => None,
            StepOutcome::Failed { message } => Some(StepError::Failed(message.clone())),
            StepOutcome::Aborted => Some(StepError::Aborted),
        }
    }
}

/// Observable outcome of a run.
///
/// Updated in place while the run progresses and frozen once `status` is
/// terminal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunResult {
    pub prompt_id: String,
    pub status: RunStatus,
    pub steps: Vec<RunResultStep>,
    pub started_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,
}

impl RunResult {
    pub(crate) fn new(prompt_id: impl Into<String>) -> Self {
        Self {
            prompt_id: prompt_id.into(),
            status: RunStatus::Pending,
            steps: Vec::new(),
            started_at: None,
            finished_at: None,
        }
    }

    pub(crate) fn begin(&mut self) {
        if self.status == RunStatus::Pending {
            self.status = RunStatus::Running;
            self.started_at = Some(Utc::now());
        }
    }

    pub(crate) fn record(&mut self, step: RunResultStep) {
        if self.status == RunStatus::Running {
            self.steps.push(step);
        }
    }

    pub(crate) fn finish(&mut self, status: RunStatus) {
        debug_assert!(status.is_terminal());
        if self.status.is_terminal() {
            return;
        }
        self.status = status;
        self.finished_at = Some(Utc::now());
    }

    /// Output of the last successful step, if any.
    pub fn final_output(&self) -> Option<&str> {
        self.steps.iter().rev().find_map(RunResultStep::output_text)
    }
}

/// Ephemeral state owned by the runner for the lifetime of one run.
#[derive(Debug)]
pub struct RunContext {
    pub prompt_id: String,
    pub variables: HashMap<String, String>,
    /// Output of step `i` at index `i`; append-only.
    pub step_outputs: Vec<String>,
    pub cancel: CancellationToken,
}

impl RunContext {
    pub(crate) fn new(prompt_id: impl Into<String>, variables: HashMap<String, String>) -> Self {
        Self {
            prompt_id: prompt_id.into(),
            variables,
            step_outputs: Vec::new(),
            cancel: CancellationToken::new(),
        }
    }
}

/// Read-only view of an in-progress run.
///
/// Every read copies the whole [`RunResult`] under a single borrow, so a
/// snapshot never pairs a new status with stale steps.
#[derive(Debug, Clone)]
pub struct RunHandle {
    rx: watch::Receiver<RunResult>,
}

impl RunHandle {
    pub(crate) fn new(rx: watch::Receiver<RunResult>) -> Self {
        Self { rx }
    }

    /// Current state of the run. Never blocks.
    pub fn snapshot(&self) -> RunResult {
        self.rx.borrow().clone()
    }

    pub fn status(&self) -> RunStatus {
        self.rx.borrow().status
    }

    /// A receiver that is notified on every update of the run.
    pub fn subscribe(&self) -> watch::Receiver<RunResult> {
        self.rx.clone()
    }

    /// Waits until the run reaches a terminal state and returns that
    /// snapshot.
    pub async fn wait(&self) -> RunResult {
        let mut rx = self.rx.clone();
        // An error means the run task went away without finishing; the last
        // published state is still the best answer.
        let _ = rx.wait_for(|r| r.status.is_terminal()).await;
        let result = rx.borrow().clone();
        result
    }
}
