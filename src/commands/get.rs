use crate::core::storage::AppCtx;
use console::style;

/// Display a chain definition.
pub fn run(ctx: &AppCtx, id: &str) -> Result<(), String> {
    let chain = ctx.store().find_chain(id).map_err(|e| e.to_string())?;

    println!("{} {}", style("ID:").green().bold(), chain.id);
    println!("{} {}", style("Name:").green().bold(), chain.name);
    if let Some(description) = &chain.description {
        println!("{} {}", style("Description:").green().bold(), description);
    }
    println!(
        "{} {} / {}",
        style("Created / updated:").green().bold(),
        chain.created_at.format("%Y-%m-%d %H:%M:%S"),
        chain.updated_at.format("%Y-%m-%d %H:%M:%S")
    );

    if !chain.variables.is_empty() {
        println!("{}", style("Variables:").green().bold());
        for var in &chain.variables {
            match &var.default {
                Some(default) => println!("  {} = {}", style(&var.key).cyan(), default),
                None => println!("  {} {}", style(&var.key).cyan(), style("(required)").dim()),
            }
        }
    }

    println!("{}", style("Steps:").green().bold());
    for (index, step) in chain.steps.iter().enumerate() {
        println!("  {}. {}", index, style(step.display_name()).cyan());
        for line in step.prompt.lines() {
            println!("     {}", line);
        }
    }
    Ok(())
}
