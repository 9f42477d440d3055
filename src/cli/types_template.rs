//! Template-related CLI command types

use clap::Subcommand;
use stagehand::validation::clap_name_validator;

#[derive(Subcommand)]
pub enum TemplateCommands {
    /// List templates
    List {
        /// Only active templates usable for this event category
        #[arg(long)]
        category: Option<String>,
    },

    /// Create a template (starts active)
    Create {
        /// Template name (max 200 characters)
        #[arg(value_parser = clap_name_validator)]
        name: String,

        #[arg(short, long)]
        description: Option<String>,

        /// Restrict to one event category ("all" for every category)
        #[arg(short, long)]
        category: Option<String>,
    },

    /// Edit template metadata
    Edit {
        /// Template id, id prefix or name
        template: String,

        #[arg(long, value_parser = clap_name_validator)]
        name: Option<String>,

        #[arg(short, long)]
        description: Option<String>,

        /// Event category ("all" for every category)
        #[arg(short, long)]
        category: Option<String>,
    },

    /// Make a template available for new events
    Activate {
        template: String,
    },

    /// Hide a template from new events; its stages are kept
    Deactivate {
        template: String,
    },

    /// Delete a template and all of its stages
    Delete {
        template: String,
    },
}
