//! Caller-side cancellation of a run.

use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use super::run::RunResult;

/// Stops a run from outside its own control flow.
///
/// Cheap to clone; every clone targets the same run. Cancelling is
/// idempotent, and once the run is terminal it has no effect at all.
#[derive(Debug, Clone)]
pub struct CancelHandle {
    token: CancellationToken,
    result: watch::Receiver<RunResult>,
}

impl CancelHandle {
    pub(crate) fn new(token: CancellationToken, result: watch::Receiver<RunResult>) -> Self {
        Self { token, result }
    }

    /// Requests cancellation of the run.
    pub fn cancel(&self) {
        let terminal = self.result.borrow().status.is_terminal();
        if terminal || self.token.is_cancelled() {
            return;
        }
        debug!(prompt_id = %self.result.borrow().prompt_id, "cancellation requested");
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }
}
