use crate::api::ChainPrompt;
use crate::core::storage::AppCtx;
use console::style;
use std::fs;

/// Import a YAML chain definition into the store.
pub fn run(ctx: &AppCtx, file_path: &str, id: Option<&str>) -> Result<(), String> {
    let content = fs::read_to_string(file_path)
        .map_err(|e| format!("Failed to read chain definition file '{}': {}", file_path, e))?;

    let mut chain: ChainPrompt =
        serde_yaml::from_str(&content).map_err(|e| format!("Invalid chain definition: {}", e))?;
    if let Some(id) = id {
        chain.id = id.to_string();
    }
    if chain.id.trim().is_empty() {
        return Err("The chain has no ID; pass one with --id".to_string());
    }
    chain.validate().map_err(|e| format!("Invalid chain definition: {}", e))?;
    chain.touch();

    ctx.store().insert(&chain).map_err(|e| e.to_string())?;

    println!(
        "{} Successfully imported chain '{}' ({} steps).",
        style("✔").green(),
        style(&chain.id).yellow(),
        chain.steps.len()
    );
    Ok(())
}
