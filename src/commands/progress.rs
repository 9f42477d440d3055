//! Progress display for an event following a template.

use anyhow::Result;
use colored::Colorize;

use super::common::{load_stages, resolve_template, Workspace};
use crate::models::EventWorkflow;
use crate::progress::{event_progress, format_percentage, EventProgress, StageStatus};

/// Show completion and per-phase steppers.
///
/// `current` is a stage id, id prefix or name within the template. Without
/// it the event counts as not started.
pub fn show(workspace: &Workspace, template_ref: &str, current: Option<&str>) -> Result<()> {
    let mut runner = workspace.runner()?;
    let template_id = resolve_template(&runner, template_ref)?;
    let stages = load_stages(&mut runner, template_id)?;

    let current_stage = match current {
        Some(reference) => {
            let prefix = reference.to_lowercase();
            let found = stages.iter().find(|s| {
                s.name.eq_ignore_ascii_case(reference) || s.id.to_string().starts_with(&prefix)
            });
            match found {
                Some(stage) => Some(stage.id),
                None => anyhow::bail!("Stage '{reference}' is not part of this template"),
            }
        }
        None => None,
    };

    let event = EventWorkflow::new(template_id, current_stage);
    let report = event_progress(runner.store(), &event);
    print_report(&report, workspace.config().display.percent_decimals);
    Ok(())
}

fn print_report(report: &EventProgress, decimals: usize) {
    let percentage = format_percentage(report.progress.percentage, decimals);
    match &report.progress.current_stage {
        Some(stage) => println!(
            "{} {} {}",
            "Progress".bold(),
            percentage.green().bold(),
            format!("(at {})", stage.name).dimmed()
        ),
        None => println!("{} {}", "Progress".bold(), percentage.dimmed()),
    }

    if report.steppers.is_empty() {
        println!("{}", "(template has no stages)".dimmed());
        return;
    }

    for stepper in &report.steppers {
        println!("\n{}", stepper.phase.label().bold());
        for step in &stepper.steps {
            let line = match step.status {
                StageStatus::Completed => format!("  {} {}", "✓".green(), step.stage.name.dimmed()),
                StageStatus::Current => format!("  {} {}", "●".yellow().bold(), step.stage.name.bold()),
                StageStatus::Upcoming => format!("  {} {}", "○".dimmed(), step.stage.name),
            };
            println!("{line}");
        }
    }
}
