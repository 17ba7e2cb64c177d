use crate::api::{ChainRepository, ChainStep};
use crate::core::storage::AppCtx;
use console::style;
use dialoguer::Editor;

/// Append a step to an existing chain.
pub fn run(
    ctx: &AppCtx,
    chain_id: &str,
    step_id: Option<String>,
    name: Option<String>,
    prompt: Option<String>,
) -> Result<(), String> {
    let store = ctx.store();
    let mut chain = store.find_chain(chain_id).map_err(|e| e.to_string())?;
    let index = chain.steps.len();

    let prompt = match prompt {
        Some(p) => p,
        None => Editor::new()
            .edit("Enter prompt content. Use {{var}} for variables and {{step:N}} for earlier outputs.")
            .map_err(|e| format!("Editor error: {}", e))?
            .unwrap_or_default(),
    };

    let mut step = ChainStep::new(step_id.unwrap_or_else(|| format!("step-{}", index)), prompt.trim_end());
    step.name = name;
    chain.add_step(step);
    chain.validate().map_err(|e| e.to_string())?;

    store.save(&chain).map_err(|e| e.to_string())?;
    println!(
        "{} Added step #{} to chain '{}'.",
        style("•").green().bold(),
        index,
        style(&chain.id).yellow()
    );
    Ok(())
}
