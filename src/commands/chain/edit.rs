use crate::api::ChainRepository;
use crate::core::storage::AppCtx;
use crate::ui::theme;
use console::style;
use dialoguer::Input;

/// Edit the name and description of an existing chain.
pub fn run(ctx: &AppCtx, id: &str) -> Result<(), String> {
    let store = ctx.store();
    let mut chain = store.find_chain(id).map_err(|e| e.to_string())?;
    let theme = theme();

    let new_name: String = Input::with_theme(&theme)
        .with_prompt("New chain name")
        .default(chain.name.clone())
        .interact_text()
        .map_err(|e| format!("Input error: {}", e))?;

    let new_description: String = Input::with_theme(&theme)
        .with_prompt("Description (optional)")
        .default(chain.description.clone().unwrap_or_default())
        .allow_empty(true)
        .interact_text()
        .map_err(|e| format!("Input error: {}", e))?;

    chain.rename(new_name.trim());
    chain.description = Some(new_description.trim().to_string()).filter(|d| !d.is_empty());

    store.save(&chain).map_err(|e| e.to_string())?;
    println!("{} Chain '{}' updated.", style("•").green().bold(), chain.id);
    Ok(())
}
