//! Defines the command-line interface structure using clap.

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "chain-prompt", version, about = "Run multi-step prompt chains")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Cmd,
}

#[derive(Subcommand)]
pub enum Cmd {
    /// List all stored chains
    List,
    /// Show a chain's variables and steps
    Get { id: String },
    /// Delete a chain by ID
    Delete { id: String },
    /// Render every step of a chain without calling a provider
    Render {
        id: String,
        #[arg(long = "var", help = "Variable assignments in key=value format")]
        vars: Vec<String>,
    },
    /// Execute a chain step by step with a provider
    Run {
        /// ID or name of the chain to run
        id: String,
        /// Variable assignments in key=value format
        #[arg(long = "var")]
        vars: Vec<String>,
        /// Provider from config.toml (defaults to `default_provider`)
        #[arg(long, env = "CHAIN_PROMPT_PROVIDER")]
        provider: Option<String>,
        /// Abort the run after this many seconds
        #[arg(long)]
        timeout: Option<u64>,
        /// Prompt for variables that have no value and no default
        #[arg(long)]
        ask: bool,
        /// Print the final run result as JSON
        #[arg(long)]
        json: bool,
    },
    /// Manage chain definitions
    #[command(subcommand)]
    Chain(ChainCmd),
}

#[derive(Subcommand)]
pub enum ChainCmd {
    /// Create a new chain interactively
    New,
    /// Import a YAML chain definition
    Import {
        /// Path to the YAML file defining the chain
        file: String,
        /// The ID to assign to the chain (defaults to the file's `id`)
        #[arg(long)]
        id: Option<String>,
    },
    /// Edit a chain's name and description
    Edit { id: String },
    /// Append a step to an existing chain
    AddStep {
        id: String,
        #[arg(long, help = "Step ID (defaults to step-<n>)")]
        step_id: Option<String>,
        #[arg(long, help = "Display name of the step")]
        name: Option<String>,
        #[arg(long, help = "Prompt template; opens an editor when omitted")]
        prompt: Option<String>,
    },
    /// Remove a step from a chain by its position
    RmStep {
        id: String,
        #[arg(help = "Zero-based position of the step")]
        index: usize,
    },
}
