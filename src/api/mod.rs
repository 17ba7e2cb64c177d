//! Library API: chain definitions, the run engine and the chain store.

mod cancel;
mod error;
mod executor;
mod generator;
mod model;
mod run;
mod runner;
mod store;
pub mod template;

pub use cancel::CancelHandle;
pub use error::{GenerationError, RunError, StepError, StoreError, ValidationError};
pub use executor::StepExecutor;
pub use generator::{EchoGenerator, Generator, LlmGenerator};
pub use model::{ChainPrompt, ChainStep, ChainVariable};
pub use run::{RunContext, RunHandle, RunResult, RunResultStep, RunStatus, StepOutcome};
pub use runner::ChainRunner;
pub use store::{ChainRepository, ChainStore};

use std::collections::HashMap;

/// Loads a stored chain by id or name and starts it.
pub fn start_stored(
    runner: &ChainRunner,
    repo: &ChainStore,
    id_or_name: &str,
    vars: HashMap<String, String>,
) -> Result<(RunHandle, CancelHandle), RunError> {
    let chain = repo.find_chain(id_or_name)?;
    Ok(runner.start(&chain, vars)?)
}
