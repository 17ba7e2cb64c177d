use crate::api::template::{references, render};
use crate::core::storage::AppCtx;
use crate::core::utils::parse_vars;
use console::style;

/// Render every step of a chain with the given variables and print it.
///
/// Nothing is executed, so `{{step:N}}` references render empty.
pub fn run(ctx: &AppCtx, id: &str, vars: &[String]) -> Result<(), String> {
    let chain = ctx.store().find_chain(id).map_err(|e| e.to_string())?;
    let supplied = parse_vars(vars)?;
    let bindings = chain.resolve_variables(&supplied).map_err(|e| e.to_string())?;

    for (index, step) in chain.steps.iter().enumerate() {
        println!("{}", style(format!("# {}. {}", index, step.display_name())).green().bold());
        println!("{}", render(&step.prompt, &bindings, &[]));

        let refs = references(&step.prompt);
        for key in refs.variables.iter().filter(|k| !bindings.contains_key(*k)) {
            println!("{} unresolved variable '{}'", style("warning:").yellow(), key);
        }
        for ordinal in refs.steps.iter().filter(|n| **n >= index) {
            println!(
                "{} step {} refers to step {}, which has not run yet",
                style("warning:").yellow(),
                index,
                ordinal
            );
        }
    }
    Ok(())
}
