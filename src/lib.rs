pub mod api;
pub mod cli;
pub mod commands;
pub mod core;
pub mod ui;

pub use api::{
    CancelHandle, ChainPrompt, ChainRunner, ChainStore, RunError, RunHandle, RunResult, RunStatus,
};
