use console::style;
use dialoguer::theme::ColorfulTheme;

use crate::api::{RunResultStep, RunStatus, StepOutcome};

/// Prompt theme shared by the interactive commands.
pub fn theme() -> ColorfulTheme {
    ColorfulTheme {
        prompt_prefix: style("?".to_string()).cyan().bold(),
        success_prefix: style("•".to_string()).green().bold(),
        ..ColorfulTheme::default()
    }
}

/// One-line summary of an attempted step.
pub fn step_line(step: &RunResultStep) -> String {
    let marker = match &step.outcome {
        StepOutcome::Succeeded { .. } => style("✔").green(),
        StepOutcome::Failed { .. } => style("✘").red(),
        StepOutcome::Aborted => style("■").yellow(),
    };
    let detail = match &step.outcome {
        StepOutcome::Succeeded { output_text } => {
            format!("{} chars", output_text.chars().count())
        }
        StepOutcome::Failed { message } => message.clone(),
        StepOutcome::Aborted => "stopped by user".to_string(),
    };
    format!(
        "{} step {} ({}) {}",
        marker,
        step.step_index,
        style(&step.step_id).cyan(),
        style(detail).dim()
    )
}

/// Colored final status.
pub fn status_label(status: RunStatus) -> String {
    match status {
        RunStatus::Succeeded => style("Chain execution complete.").green().to_string(),
        RunStatus::Failed => style("Chain execution failed.").red().to_string(),
        RunStatus::Aborted => style("Chain execution stopped.").yellow().to_string(),
        other => style(other).dim().to_string(),
    }
}
