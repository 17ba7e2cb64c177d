use crate::cli::{ChainCmd, Cmd};
use crate::core::config::Config;
use crate::core::storage::AppCtx;

pub mod chain;
pub mod delete;
pub mod get;
pub mod list;
pub mod render;
pub mod run;

/// Dispatches the parsed command to the appropriate handler.
pub async fn dispatch(command: Cmd, ctx: &AppCtx, config: &Config) -> Result<(), String> {
    match command {
        Cmd::List => list::run(ctx),
        Cmd::Get { id } => get::run(ctx, &id),
        Cmd::Delete { id } => delete::run(ctx, &id),
        Cmd::Render { id, vars } => render::run(ctx, &id, &vars),
        Cmd::Run {
            id,
            vars,
            provider,
            timeout,
            ask,
            json,
        } => {
            let opts = run::RunOptions {
                provider,
                timeout,
                ask,
                json,
            };
            run::run(ctx, config, &id, &vars, opts).await
        }
        Cmd::Chain(chain_cmd) => match chain_cmd {
            ChainCmd::New => chain::new::run(ctx),
            ChainCmd::Import { file, id } => chain::import::run(ctx, &file, id.as_deref()),
            ChainCmd::Edit { id } => chain::edit::run(ctx, &id),
            ChainCmd::AddStep {
                id,
                step_id,
                name,
                prompt,
            } => chain::add_step::run(ctx, &id, step_id, name, prompt),
            ChainCmd::RmStep { id, index } => chain::rm_step::run(ctx, &id, index),
        },
    }
}
