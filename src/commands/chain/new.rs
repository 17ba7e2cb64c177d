use crate::api::{ChainPrompt, ChainRepository, ChainStep};
use crate::core::storage::AppCtx;
use crate::core::utils::new_id;
use crate::ui::theme;
use console::style;
use dialoguer::{Confirm, Editor, Input};

/// Creates a new chain interactively.
pub fn run(ctx: &AppCtx) -> Result<(), String> {
    let theme = theme();

    let name: String = Input::with_theme(&theme)
        .with_prompt("Chain name")
        .interact_text()
        .map_err(|e| format!("Name error: {}", e))?;
    if name.trim().is_empty() {
        return Err("Name cannot be empty".to_string());
    }

    let mut chain = ChainPrompt::new(new_id(&ctx.chains_dir), name.trim());

    let vars_line: String = Input::with_theme(&theme)
        .with_prompt("Variables (comma-separated, key or key=default)")
        .allow_empty(true)
        .interact_text()
        .map_err(|e| format!("Variables error: {}", e))?;
    for entry in vars_line.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        match entry.split_once('=') {
            Some((key, default)) => chain.set_variable(key.trim(), Some(default.trim().to_string())),
            None => chain.set_variable(entry, None),
        }
    }

    println!("Now, let's add steps. Use {{{{var}}}} for variables and {{{{step:N}}}} for the output of step N.");
    loop {
        let index = chain.steps.len();
        if !Confirm::with_theme(&theme)
            .with_prompt(format!("Add step #{}?", index))
            .default(true)
            .interact()
            .map_err(|e| format!("Confirmation error: {}", e))?
        {
            break;
        }

        let step_name: String = Input::with_theme(&theme)
            .with_prompt(format!("Name for step #{} (optional)", index))
            .allow_empty(true)
            .interact_text()
            .map_err(|e| format!("Name error: {}", e))?;

        let prompt = Editor::new()
            .edit("Enter the prompt template.")
            .map_err(|e| format!("Editor error: {}", e))?
            .unwrap_or_default();

        let mut step = ChainStep::new(format!("step-{}", index), prompt.trim_end());
        if !step_name.trim().is_empty() {
            step.name = Some(step_name.trim().to_string());
        }
        chain.add_step(step);
        println!("  {} Added step #{}", style("└─").green(), index);
    }

    chain.validate().map_err(|e| e.to_string())?;
    ctx.store().save(&chain).map_err(|e| e.to_string())?;

    println!(
        "\n{} Chain '{}' saved with ID {}.",
        style("✔").green().bold(),
        style(&chain.name).cyan(),
        style(&chain.id).yellow()
    );
    Ok(())
}
