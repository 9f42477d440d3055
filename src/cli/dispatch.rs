use anyhow::Result;
use stagehand::commands::stage::{StageAdd, StageEdit};
use stagehand::commands::template::TemplateEdit;
use stagehand::commands::{init, progress, stage, template, Workspace};

use super::types::Commands;
use super::types_stage::StageCommands;
use super::types_template::TemplateCommands;

pub fn dispatch(command: Commands, workspace: &Workspace) -> Result<()> {
    match command {
        Commands::Init => init::execute(workspace.base()),
        Commands::Template { command } => match command {
            TemplateCommands::List { category } => template::list(workspace, category),
            TemplateCommands::Create {
                name,
                description,
                category,
            } => template::create(workspace, name, description, category),
            TemplateCommands::Edit {
                template: reference,
                name,
                description,
                category,
            } => template::edit(
                workspace,
                &reference,
                TemplateEdit {
                    name,
                    description,
                    category,
                },
            ),
            TemplateCommands::Activate { template: reference } => {
                template::activate(workspace, &reference)
            }
            TemplateCommands::Deactivate { template: reference } => {
                template::deactivate(workspace, &reference)
            }
            TemplateCommands::Delete { template: reference } => {
                template::delete(workspace, &reference)
            }
        },
        Commands::Stage { command } => match command {
            StageCommands::List { template } => stage::list(workspace, &template),
            StageCommands::Add {
                template,
                name,
                phase,
                order,
                automation,
                trigger,
                email_template,
                task,
            } => stage::add(
                workspace,
                &template,
                StageAdd {
                    name,
                    phase,
                    order,
                    automation,
                    trigger,
                    email_template,
                    task,
                },
            ),
            StageCommands::Edit {
                stage: reference,
                name,
                phase,
                order,
                automation,
                manual,
                trigger,
                email_template,
                task,
            } => stage::edit(
                workspace,
                &reference,
                StageEdit {
                    name,
                    phase,
                    order,
                    automation,
                    manual,
                    trigger,
                    email_template,
                    task,
                },
            ),
            StageCommands::Delete { stage: reference } => stage::delete(workspace, &reference),
            StageCommands::Move {
                template,
                phase,
                from,
                to,
            } => stage::move_stage(workspace, &template, phase, from, to),
        },
        Commands::Progress { template, current } => {
            progress::show(workspace, &template, current.as_deref())
        }
    }
}
