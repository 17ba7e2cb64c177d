use crate::api::ChainRepository;
use crate::core::storage::AppCtx;
use console::style;

/// Delete a chain.
pub fn run(ctx: &AppCtx, id: &str) -> Result<(), String> {
    ctx.store().delete(id).map_err(|e| e.to_string())?;
    println!("{} chain {} deleted", style("•").green().bold(), id);
    Ok(())
}
