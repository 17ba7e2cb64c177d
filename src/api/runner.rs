//! The chain runner: drives a chain step by step.

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{error, info, instrument, warn};

use super::{
    cancel::CancelHandle,
    error::{StepError, ValidationError},
    executor::StepExecutor,
    generator::Generator,
    model::ChainPrompt,
    run::{RunContext, RunHandle, RunResult, RunResultStep, RunStatus, StepOutcome},
    template::render,
};

/// Runs chains against one generator.
///
/// Each call to [`ChainRunner::start`] creates an independent run with its
/// own context, result and cancellation token.
#[derive(Clone)]
pub struct ChainRunner {
    executor: StepExecutor,
}

impl ChainRunner {
    pub fn new(generator: Arc<dyn Generator>) -> Self {
        Self {
            executor: StepExecutor::new(generator),
        }
    }

    /// Validates the chain and its variables, then starts the run in the
    /// background.
    ///
    /// Must be called from within a tokio runtime. On validation failure no
    /// run is created.
    #[instrument(name = "chain_start", skip(self, chain, vars), fields(prompt_id = %chain.id))]
    pub fn start(
        &self,
        chain: &ChainPrompt,
        vars: HashMap<String, String>,
    ) -> Result<(RunHandle, CancelHandle), ValidationError> {
        let variables = chain.resolve_variables(&vars)?;
        let ctx = RunContext::new(chain.id.clone(), variables);

        let mut result = RunResult::new(chain.id.clone());
        result.begin();
        let (tx, rx) = watch::channel(result);

        let handle = RunHandle::new(rx.clone());
        let cancel = CancelHandle::new(ctx.cancel.clone(), rx);

        info!(steps = chain.steps.len(), "run_started");
        let chain = chain.clone();
        let executor = self.executor.clone();
        tokio::spawn(async move {
            drive(&chain, ctx, &executor, &tx).await;
        });

        Ok((handle, cancel))
    }

    /// Starts a run and waits for its terminal result.
    pub async fn run(
        &self,
        chain: &ChainPrompt,
        vars: HashMap<String, String>,
    ) -> Result<RunResult, ValidationError> {
        let (handle, _cancel) = self.start(chain, vars)?;
        Ok(handle.wait().await)
    }
}

/// The run loop. Steps go strictly in order; the first failure or abort
/// ends the run.
async fn drive(
    chain: &ChainPrompt,
    mut ctx: RunContext,
    executor: &StepExecutor,
    tx: &watch::Sender<RunResult>,
) {
    for (index, step) in chain.steps.iter().enumerate() {
        if ctx.cancel.is_cancelled() {
            warn!(prompt_id = %ctx.prompt_id, next_step = index, "run_aborted");
            tx.send_modify(|r| r.finish(RunStatus::Aborted));
            return;
        }

        let input_prompt = render(&step.prompt, &ctx.variables, &ctx.step_outputs);
        info!(prompt_id = %ctx.prompt_id, step_index = index, step_id = %step.id, "step_started");

        let outcome = executor.execute(&input_prompt, &ctx.cancel).await;
        let (status, outcome) = match outcome {
            Ok(output_text) => {
                info!(
                    prompt_id = %ctx.prompt_id,
                    step_index = index,
                    step_id = %step.id,
                    output_len = output_text.len(),
                    "step_completed"
                );
                ctx.step_outputs.push(output_text.clone());
                (None, StepOutcome::Succeeded { output_text })
            }
            Err(StepError::Aborted) => {
                warn!(prompt_id = %ctx.prompt_id, step_index = index, step_id = %step.id, "run_aborted");
                (Some(RunStatus::Aborted), StepOutcome::Aborted)
            }
            Err(StepError::Failed(message)) => {
                error!(
                    prompt_id = %ctx.prompt_id,
                    step_index = index,
                    step_id = %step.id,
                    error = %message,
                    "step_failed"
                );
                (Some(RunStatus::Failed), StepOutcome::Failed { message })
            }
        };

        let record = RunResultStep {
            step_index: index,
            step_id: step.id.clone(),
            input_prompt,
            outcome,
        };
        tx.send_modify(|r| {
            r.record(record);
            if let Some(status) = status {
                r.finish(status);
            }
        });
        if status.is_some() {
            return;
        }
    }

    info!(prompt_id = %ctx.prompt_id, steps = ctx.step_outputs.len(), "run_finished");
    tx.send_modify(|r| r.finish(RunStatus::Succeeded));
}
