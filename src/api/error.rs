//! Error types for the library API.

use thiserror::Error;

/// Errors raised synchronously when a chain cannot be started.
///
/// A run that fails validation never leaves the `pending` state; no
/// `RunResult` is ever published for it.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// The chain has no id.
    #[error("Chain has an empty id")]
    EmptyChainId,

    /// The chain id cannot be used as a file name in the store.
    #[error("Chain id '{0}' must not contain path separators or start with '.'")]
    InvalidChainId(String),

    /// A declared variable has neither a caller-supplied value nor a default.
    #[error("Variable '{0}' has no value and no default")]
    MissingVariable(String),

    /// A declared variable has an empty key.
    #[error("Variable at position {0} has an empty key")]
    EmptyVariableKey(usize),

    /// A key that `{{key}}` references can never match.
    #[error("Variable key '{0}' may only contain letters, digits and '_'")]
    InvalidVariableKey(String),

    /// Two declared variables share the same key.
    #[error("Variable '{0}' is declared more than once")]
    DuplicateVariable(String),

    /// A step has an empty id.
    #[error("Step at position {0} has an empty id")]
    EmptyStepId(usize),

    /// Two steps share the same id.
    #[error("Step id '{0}' is used more than once")]
    DuplicateStepId(String),
}

/// Errors surfaced by a text-generation backend.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GenerationError {
    /// Network or provider failure.
    #[error("Generation service unavailable: {0}")]
    Unavailable(String),

    /// The provider answered with no usable text.
    #[error("Generation service returned an empty response")]
    EmptyResponse,

    /// Cancellation was observed while the call was outstanding.
    #[error("Generation aborted")]
    Aborted,
}

/// Why a single step did not produce output.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StepError {
    /// The backend reported an error; carries a human-readable message.
    #[error("{0}")]
    Failed(String),

    /// The run was cancelled while this step was in flight.
    #[error("Stopped by user")]
    Aborted,
}

impl From<GenerationError> for StepError {
    fn from(err: GenerationError) -> Self {
        match err {
            GenerationError::Aborted => StepError::Aborted,
            other => StepError::Failed(other.to_string()),
        }
    }
}

/// Errors related to the chain store (file access, parsing).
#[derive(Error, Debug)]
pub enum StoreError {
    /// The requested chain could not be found by its ID or name.
    #[error("Chain '{0}' not found")]
    NotFound(String),

    /// A given name matches multiple chains.
    #[error("Name '{0}' is ambiguous (multiple chains match)")]
    AmbiguousName(String),

    /// The ID would resolve to a path outside the store directory.
    #[error("Invalid chain ID '{0}'")]
    InvalidId(String),

    /// A chain with this ID is already stored.
    #[error("Chain '{0}' already exists")]
    AlreadyExists(String),

    /// An underlying file I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to serialize or deserialize a chain definition.
    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// A comprehensive error type for the facade operations of the library.
#[derive(Error, Debug)]
pub enum RunError {
    /// The chain or its variables failed validation.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// An error originating from the chain store.
    #[error(transparent)]
    Store(#[from] StoreError),
}
