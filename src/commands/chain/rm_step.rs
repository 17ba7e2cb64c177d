use crate::api::ChainRepository;
use crate::core::storage::AppCtx;
use console::style;
use dialoguer::Confirm;

/// Remove a step from a chain by position.
pub fn run(ctx: &AppCtx, chain_id: &str, index: usize) -> Result<(), String> {
    let store = ctx.store();
    let mut chain = store.find_chain(chain_id).map_err(|e| e.to_string())?;

    let Some(step) = chain.steps.get(index) else {
        return Err(format!("Step {} not found in chain '{}'.", index, chain.id));
    };

    if !Confirm::new()
        .with_prompt(format!("Are you sure you want to delete step {} ({})?", index, step.display_name()))
        .default(false)
        .interact()
        .unwrap_or(false)
    {
        println!("Deletion cancelled.");
        return Ok(());
    }

    chain.remove_step(index);
    store.save(&chain).map_err(|e| e.to_string())?;
    println!("{} Step {} removed.", style("•").green().bold(), index);
    if index < chain.steps.len() {
        println!(
            "{}",
            style("Later steps moved up; check their {{step:N}} references.").yellow()
        );
    }
    Ok(())
}
