//! Executes a single rendered step against a generator.

use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use super::error::StepError;
use super::generator::Generator;

/// Drives one step: hands the rendered prompt to the generator and reports
/// the output, a failure, or an abort.
///
/// No retries happen here.
#[derive(Clone)]
pub struct StepExecutor {
    generator: Arc<dyn Generator>,
}

impl StepExecutor {
    pub fn new(generator: Arc<dyn Generator>) -> Self {
        Self { generator }
    }

    /// Runs the prompt, racing the generator call against `cancel`.
    ///
    /// Once `cancel` fires the pending call is dropped and
    /// [`StepError::Aborted`] is returned, even if the call would have
    /// succeeded.
    pub async fn execute(
        &self,
        rendered_prompt: &str,
        cancel: &CancellationToken,
    ) -> Result<String, StepError> {
        if cancel.is_cancelled() {
            return Err(StepError::Aborted);
        }

        let outcome = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                debug!("generation abandoned after cancellation");
                return Err(StepError::Aborted);
            }
            res = self.generator.generate(rendered_prompt, cancel) => res,
        };

        outcome.map_err(StepError::from)
    }
}
