use crate::api::{ChainPrompt, ChainRunner, RunResult, RunStatus};
use crate::core::config::{build_providers, select_provider, Config};
use crate::core::storage::AppCtx;
use crate::core::utils::parse_vars;
use crate::ui::{status_label, step_line, theme};
use console::style;
use dialoguer::Input;
use spinners::{Spinner, Spinners};
use std::collections::HashMap;
use std::time::Duration;

/// Flags of the `run` command.
pub struct RunOptions {
    pub provider: Option<String>,
    pub timeout: Option<u64>,
    pub ask: bool,
    pub json: bool,
}

/// Execute a stored chain and print its progress.
///
/// Ctrl-C and `--timeout` both cancel the run; the steps finished so far are
/// still reported.
pub async fn run(
    ctx: &AppCtx,
    config: &Config,
    id: &str,
    vars: &[String],
    opts: RunOptions,
) -> Result<(), String> {
    let chain = ctx.store().find_chain(id).map_err(|e| e.to_string())?;
    let mut supplied = parse_vars(vars)?;
    if opts.ask {
        ask_missing(&chain, &mut supplied)?;
    }

    let providers = build_providers(config)?;
    let generator = select_provider(config, &providers, opts.provider.as_deref())?;
    let runner = ChainRunner::new(generator);

    let (handle, cancel) = runner
        .start(&chain, supplied)
        .map_err(|e| format!("Cannot start chain '{}': {}", chain.id, e))?;

    let on_interrupt = cancel.clone();
    let interrupt = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            on_interrupt.cancel();
        }
    });
    let timer = opts.timeout.map(|secs| {
        let on_deadline = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(secs)).await;
            on_deadline.cancel();
        })
    });

    if !opts.json {
        println!("Executing chain '{}'...", style(&chain.name).yellow());
    }

    let mut updates = handle.subscribe();
    let mut spinner = (!opts.json && !chain.steps.is_empty()).then(|| step_spinner(&chain, 0));
    let mut shown = 0;
    loop {
        let snapshot = updates.borrow_and_update().clone();
        if !opts.json {
            for step in &snapshot.steps[shown..] {
                let line = step_line(step);
                match spinner.take() {
                    Some(mut sp) => sp.stop_with_message(line),
                    None => println!("{}", line),
                }
            }
            if snapshot.steps.len() > shown && !snapshot.status.is_terminal() {
                spinner = Some(step_spinner(&chain, snapshot.steps.len()));
            }
        }
        shown = snapshot.steps.len();

        if snapshot.status.is_terminal() || updates.changed().await.is_err() {
            break;
        }
    }

    let result = handle.wait().await;
    interrupt.abort();
    if let Some(timer) = timer {
        timer.abort();
    }

    if let Some(mut sp) = spinner.take() {
        sp.stop_with_message(status_label(result.status));
    } else if !opts.json {
        println!("{}", status_label(result.status));
    }
    report(&result, chain.steps.len(), opts.json)?;

    match result.status {
        RunStatus::Succeeded => Ok(()),
        status => Err(format!("Chain '{}' {}", chain.id, status)),
    }
}

fn step_spinner(chain: &ChainPrompt, index: usize) -> Spinner {
    let name = chain
        .steps
        .get(index)
        .map(|s| s.display_name().to_string())
        .unwrap_or_default();
    Spinner::new(Spinners::Dots9, format!("Running step {} ({})...", index, name))
}

fn ask_missing(chain: &ChainPrompt, supplied: &mut HashMap<String, String>) -> Result<(), String> {
    let missing: Vec<String> = chain
        .missing_variables(supplied)
        .into_iter()
        .map(str::to_string)
        .collect();
    let theme = theme();
    for key in missing {
        let value: String = Input::with_theme(&theme)
            .with_prompt(format!("Value for '{}'", key))
            .allow_empty(true)
            .interact_text()
            .map_err(|e| format!("Input error: {}", e))?;
        supplied.insert(key, value);
    }
    Ok(())
}

fn report(result: &RunResult, total_steps: usize, json: bool) -> Result<(), String> {
    if json {
        let out = serde_json::to_string_pretty(result).map_err(|e| e.to_string())?;
        println!("{}", out);
        return Ok(());
    }
    if result.status == RunStatus::Succeeded {
        if let Some(output) = result.final_output() {
            println!("\n{}", output);
        }
    }
    if let (Some(start), Some(end)) = (result.started_at, result.finished_at) {
        let elapsed = end - start;
        println!(
            "{}",
            style(format!(
                "{} of {} steps attempted in {:.1}s",
                result.steps.len(),
                total_steps,
                elapsed.num_milliseconds() as f64 / 1000.0
            ))
            .dim()
        );
    }
    Ok(())
}
