//! Template commands
//! Usage: stagehand template [list|create|edit|activate|deactivate|delete]

use anyhow::Result;
use colored::Colorize;

use super::common::{finish, resolve_template, short_id, Workspace};
use crate::models::template::templates_for_category;
use crate::models::{CategoryScope, TemplateDraft, TemplatePatch, WorkflowTemplate};
use crate::mutation::{CreateTemplate, DeleteTemplate, UpdateTemplate};

/// Optional fields for `template edit`.
#[derive(Debug, Clone, Default)]
pub struct TemplateEdit {
    pub name: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
}

/// `all` (or an empty string) clears the category restriction.
pub fn parse_scope(category: &str) -> CategoryScope {
    if category.trim().is_empty() || category.eq_ignore_ascii_case("all") {
        CategoryScope::All
    } else {
        CategoryScope::Category(category.trim().to_string())
    }
}

/// List templates. With a category, only active templates usable for it.
pub fn list(workspace: &Workspace, category: Option<String>) -> Result<()> {
    let runner = workspace.runner()?;
    let all = runner.store().templates();
    let templates = match &category {
        Some(category) => templates_for_category(all, category),
        None => all,
    };

    if templates.is_empty() {
        println!("{}", "(no templates)".dimmed());
        return Ok(());
    }

    println!("{}", "Templates".bold());
    println!("{}", "─".repeat(40).dimmed());
    for template in templates {
        print_template(template);
    }
    Ok(())
}

pub fn create(
    workspace: &Workspace,
    name: String,
    description: Option<String>,
    category: Option<String>,
) -> Result<()> {
    let mut runner = workspace.runner()?;
    let mut draft = TemplateDraft::new(name);
    draft.description = description.unwrap_or_default();
    if let Some(category) = category {
        draft.scope = parse_scope(&category);
    }

    if let Some(template) = finish(runner.run(CreateTemplate::new(draft)))? {
        println!(
            "  {} Created template {} {}",
            "✓".green().bold(),
            template.name.bold(),
            template.id.to_string().dimmed()
        );
    }
    Ok(())
}

pub fn edit(workspace: &Workspace, reference: &str, edit: TemplateEdit) -> Result<()> {
    let mut runner = workspace.runner()?;
    let template_id = resolve_template(&runner, reference)?;
    let patch = TemplatePatch {
        name: edit.name,
        description: edit.description,
        scope: edit.category.as_deref().map(parse_scope),
        is_active: None,
    };

    if let Some(template) = finish(runner.run(UpdateTemplate::new(template_id, patch)))? {
        println!("  {} Updated template", "✓".green().bold());
        print_template(&template);
    }
    Ok(())
}

pub fn activate(workspace: &Workspace, reference: &str) -> Result<()> {
    set_active(workspace, reference, true)
}

/// Deactivated templates keep their stages.
pub fn deactivate(workspace: &Workspace, reference: &str) -> Result<()> {
    set_active(workspace, reference, false)
}

fn set_active(workspace: &Workspace, reference: &str, is_active: bool) -> Result<()> {
    let mut runner = workspace.runner()?;
    let template_id = resolve_template(&runner, reference)?;

    if let Some(template) = finish(runner.run(UpdateTemplate::set_active(template_id, is_active)))? {
        let state = if template.is_active {
            "activated".green()
        } else {
            "deactivated".yellow()
        };
        println!(
            "  {} Template {} {state}",
            "✓".green().bold(),
            template.name.bold()
        );
    }
    Ok(())
}

/// Delete a template and all of its stages.
pub fn delete(workspace: &Workspace, reference: &str) -> Result<()> {
    let mut runner = workspace.runner()?;
    let template_id = resolve_template(&runner, reference)?;
    let name = runner
        .store()
        .template(template_id)
        .map(|t| t.name.clone())
        .unwrap_or_default();

    finish(runner.run(DeleteTemplate::new(template_id)))?;
    println!("  {} Deleted template {}", "✓".green().bold(), name.bold());
    Ok(())
}

fn print_template(template: &WorkflowTemplate) {
    let status = if template.is_active {
        "active".green()
    } else {
        "inactive".dimmed()
    };
    println!(
        "  {} {} ({}) [{status}]",
        short_id(&template.id).dimmed(),
        template.name.bold(),
        template.scope
    );
    if !template.description.is_empty() {
        println!("      {}", template.description.dimmed());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_scope() {
        assert_eq!(parse_scope("all"), CategoryScope::All);
        assert_eq!(parse_scope("  "), CategoryScope::All);
        assert_eq!(
            parse_scope(" Wedding "),
            CategoryScope::Category("Wedding".into())
        );
    }
}
