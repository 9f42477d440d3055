//! Stage commands
//! Usage: stagehand stage [list|add|edit|delete|move]

use anyhow::Result;
use colored::Colorize;
use tracing::warn;

use super::common::{
    describe_stage, finish, load_stages, resolve_stage, resolve_template, Workspace,
};
use crate::models::{AutomationKind, Phase, StageDraft, StagePatch, TemplateId, TriggerTiming};
use crate::mutation::{CreateStage, DeleteStage, MutationRunner, UpdateStage};
use crate::reorder::{self, StageMove};
use crate::service::StageService;

/// Fields for `stage add`.
#[derive(Debug, Clone)]
pub struct StageAdd {
    pub name: String,
    pub phase: Phase,
    pub order: Option<u32>,
    pub automation: Option<AutomationKind>,
    pub trigger: Option<TriggerTiming>,
    pub email_template: Option<String>,
    pub task: Option<String>,
}

/// Optional fields for `stage edit`.
#[derive(Debug, Clone, Default)]
pub struct StageEdit {
    pub name: Option<String>,
    pub phase: Option<Phase>,
    pub order: Option<u32>,
    pub automation: Option<AutomationKind>,
    /// Turn automation off
    pub manual: bool,
    pub trigger: Option<TriggerTiming>,
    pub email_template: Option<String>,
    pub task: Option<String>,
}

impl StageAdd {
    pub fn into_draft(self) -> StageDraft {
        let mut draft = StageDraft::new(self.name, self.phase);
        draft.order = self.order;
        draft.is_automated = self.automation.is_some();
        draft.automation_kind = self.automation;
        draft.trigger_timing = self.trigger.unwrap_or_default();
        draft.email_template = self.email_template;
        draft.task_description = self.task.unwrap_or_default();
        draft
    }
}

impl StageEdit {
    pub fn into_patch(self) -> StagePatch {
        let is_automated = match (self.manual, self.automation) {
            (true, _) => Some(false),
            (false, Some(_)) => Some(true),
            (false, None) => None,
        };
        StagePatch {
            name: self.name,
            phase: self.phase,
            order: self.order,
            is_automated,
            automation_kind: self.automation.filter(|_| !self.manual).map(Some),
            trigger_timing: self.trigger,
            email_template: self.email_template.map(Some),
            task_description: self.task,
        }
    }
}

/// Print every stage of a template grouped by phase.
pub fn list(workspace: &Workspace, template_ref: &str) -> Result<()> {
    let mut runner = workspace.runner()?;
    let template_id = resolve_template(&runner, template_ref)?;
    load_stages(&mut runner, template_id)?;
    print_stages(&runner, template_id);
    Ok(())
}

pub fn add(workspace: &Workspace, template_ref: &str, add: StageAdd) -> Result<()> {
    let mut runner = workspace.runner()?;
    let template_id = resolve_template(&runner, template_ref)?;
    load_stages(&mut runner, template_id)?;

    if let Some(stage) = finish(runner.run(CreateStage::new(template_id, add.into_draft())))? {
        println!(
            "  {} Added {} to {} at order {}",
            "✓".green().bold(),
            stage.name.bold(),
            stage.phase.label(),
            stage.order
        );
    }
    refresh_and_print(&mut runner, template_id);
    Ok(())
}

pub fn edit(workspace: &Workspace, stage_ref: &str, edit: StageEdit) -> Result<()> {
    let mut runner = workspace.runner()?;
    let stage_id = resolve_stage(&mut runner, stage_ref)?;
    let template_id = runner
        .store()
        .template_of(stage_id)
        .ok_or_else(|| anyhow::anyhow!("Stage '{stage_ref}' not found"))?;

    if let Some(stage) = finish(runner.run(UpdateStage::new(stage_id, edit.into_patch())))? {
        println!("  {} Updated {}", "✓".green().bold(), stage.name.bold());
    }
    refresh_and_print(&mut runner, template_id);
    Ok(())
}

/// Delete a stage; the rest of its group closes the gap.
pub fn delete(workspace: &Workspace, stage_ref: &str) -> Result<()> {
    let mut runner = workspace.runner()?;
    let stage_id = resolve_stage(&mut runner, stage_ref)?;
    let Some(stage) = runner.store().stage(stage_id).cloned() else {
        anyhow::bail!("Stage '{stage_ref}' not found");
    };

    finish(runner.run(DeleteStage::new(stage_id)))?;
    println!("  {} Deleted {}", "✓".green().bold(), stage.name.bold());
    refresh_and_print(&mut runner, stage.template_id);
    Ok(())
}

/// Move the stage at 1-based position `from` to position `to`.
pub fn move_stage(
    workspace: &Workspace,
    template_ref: &str,
    phase: Phase,
    from: usize,
    to: usize,
) -> Result<()> {
    let mut runner = workspace.runner()?;
    let template_id = resolve_template(&runner, template_ref)?;
    load_stages(&mut runner, template_id)?;

    let mv = StageMove {
        template_id,
        phase,
        from: from.saturating_sub(1),
        to: to.saturating_sub(1),
    };
    if finish(reorder::reorder(&mut runner, mv))?.is_some() {
        println!("  {} Reordered {}", "✓".green().bold(), phase.label());
    }
    refresh_and_print(&mut runner, template_id);
    Ok(())
}

/// Bring invalidated views up to date before showing them.
fn refresh_and_print<S: StageService>(runner: &mut MutationRunner<S>, template_id: TemplateId) {
    if let Err(err) = runner.refresh() {
        warn!(error = %err, "Refresh after mutation failed, showing cached view");
    }
    print_stages(runner, template_id);
}

fn print_stages<S: StageService>(runner: &MutationRunner<S>, template_id: TemplateId) {
    let store = runner.store();
    if let Some(template) = store.template(template_id) {
        println!("\n{}", template.name.bold());
    }

    for phase in Phase::ALL {
        let group = store.stages_for_phase(template_id, phase);
        println!("{} {}", phase.label().bold(), format!("({})", group.len()).dimmed());
        if group.is_empty() {
            println!("     {}", "(none)".dimmed());
        }
        for stage in &group {
            println!("  {}", describe_stage(stage));
        }
    }
}
