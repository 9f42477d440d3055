//! Stage-related CLI command types

use clap::Subcommand;
use stagehand::models::{AutomationKind, Phase, TriggerTiming};
use stagehand::validation::{
    clap_automation_validator, clap_name_validator, clap_order_validator, clap_phase_validator,
    clap_position_validator, clap_trigger_validator,
};

#[derive(Subcommand)]
pub enum StageCommands {
    /// List the stages of a template by phase
    List {
        /// Template id, id prefix or name
        template: String,
    },

    /// Add a stage (appended to its phase unless --order is given)
    Add {
        /// Template id, id prefix or name
        template: String,

        /// Stage name (max 200 characters)
        #[arg(value_parser = clap_name_validator)]
        name: String,

        /// lead, production or post-production
        #[arg(short, long, value_parser = clap_phase_validator)]
        phase: Phase,

        /// 1-based position in the phase; later stages shift down
        #[arg(short, long, value_parser = clap_order_validator)]
        order: Option<u32>,

        /// Automate the stage: email or task
        #[arg(long, value_parser = clap_automation_validator)]
        automation: Option<AutomationKind>,

        /// ON_CREATION, AFTER_<n>_DAYS, BEFORE_<n>_DAYS or a custom token
        #[arg(long, value_parser = clap_trigger_validator)]
        trigger: Option<TriggerTiming>,

        /// Email template (email automation only)
        #[arg(long)]
        email_template: Option<String>,

        /// Task description
        #[arg(long)]
        task: Option<String>,
    },

    /// Edit a stage; changing --phase appends it to the new phase
    Edit {
        /// Stage id or id prefix
        stage: String,

        #[arg(long, value_parser = clap_name_validator)]
        name: Option<String>,

        #[arg(short, long, value_parser = clap_phase_validator)]
        phase: Option<Phase>,

        #[arg(short, long, value_parser = clap_order_validator)]
        order: Option<u32>,

        #[arg(long, value_parser = clap_automation_validator, conflicts_with = "manual")]
        automation: Option<AutomationKind>,

        /// Turn automation off
        #[arg(long)]
        manual: bool,

        #[arg(long, value_parser = clap_trigger_validator)]
        trigger: Option<TriggerTiming>,

        #[arg(long)]
        email_template: Option<String>,

        #[arg(long)]
        task: Option<String>,
    },

    /// Delete a stage; the rest of its phase is renumbered
    Delete {
        /// Stage id or id prefix
        stage: String,
    },

    /// Move a stage within its phase
    Move {
        /// Template id, id prefix or name
        template: String,

        #[arg(value_parser = clap_phase_validator)]
        phase: Phase,

        /// Current 1-based position
        #[arg(value_parser = clap_position_validator)]
        from: usize,

        /// New 1-based position
        #[arg(value_parser = clap_position_validator)]
        to: usize,
    },
}
