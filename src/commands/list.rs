use crate::api::ChainRepository;
use crate::core::storage::AppCtx;
use console::style;

/// List every saved chain.
pub fn run(ctx: &AppCtx) -> Result<(), String> {
    let chains = ctx.store().list().map_err(|e| e.to_string())?;
    if chains.is_empty() {
        println!("No chains stored yet. Import one with `chain-prompt chain import <file>`.");
        return Ok(());
    }

    for chain in chains {
        println!(
            "{} {} {}",
            style(&chain.id).yellow(),
            style(&chain.name).cyan().bold(),
            style(format!("({} steps)", chain.steps.len())).dim()
        );
        for (index, step) in chain.steps.iter().enumerate() {
            println!("  {} {}. {}", style("└─").green(), index, step.display_name());
        }
    }
    Ok(())
}
