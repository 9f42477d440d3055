use clap::{Parser, Subcommand};
use std::path::PathBuf;

use super::types_stage::StageCommands;
use super::types_template::TemplateCommands;

#[derive(Parser)]
#[command(name = "stagehand")]
#[command(about = "Workflow stage ordering and progress for event templates", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Config file (default: ./.stagehand/config.toml, then the user config dir)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create .stagehand/ with a default config and an empty catalog
    Init,

    /// Manage workflow templates
    Template {
        #[command(subcommand)]
        command: TemplateCommands,
    },

    /// Manage the stages of a template
    Stage {
        #[command(subcommand)]
        command: StageCommands,
    },

    /// Show how far an event has progressed through a template
    Progress {
        /// Template id, id prefix or name
        template: String,

        /// Stage the event is currently at (id, id prefix or name)
        #[arg(long)]
        current: Option<String>,
    },
}
