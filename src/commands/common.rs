//! Helpers shared across command implementations.
//!
//! - Workspace discovery and the catalog-backed mutation runner
//! - Resolving template and stage references typed by the user
//! - Printing mutation outcomes

use anyhow::{bail, Context, Result};
use colored::Colorize;
use std::path::{Path, PathBuf};

use crate::config::Config;
use crate::models::constants::DATA_DIR;
use crate::models::{StageId, TemplateId, WorkflowStage, WorkflowTemplate};
use crate::mutation::{MutationError, MutationRunner, Settled};
use crate::service::{FileService, StageService};

/// Length of the id prefix shown in listings.
const SHORT_ID_LEN: usize = 8;

/// Resolved working context for one CLI invocation.
#[derive(Debug, Clone)]
pub struct Workspace {
    base: PathBuf,
    config: Config,
}

impl Workspace {
    pub fn new(base: impl Into<PathBuf>, config: Config) -> Self {
        Self {
            base: base.into(),
            config,
        }
    }

    pub fn base(&self) -> &Path {
        &self.base
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn catalog_path(&self) -> PathBuf {
        self.config.catalog_path(&self.base)
    }

    /// Runner over the catalog file, with the template list loaded.
    pub fn runner(&self) -> Result<MutationRunner<FileService>> {
        let mut runner = MutationRunner::new(FileService::new(self.catalog_path()));
        let templates = runner
            .service()
            .list_templates()
            .context("Failed to load templates")?;
        runner.store_mut().confirm_templates(templates);
        Ok(runner)
    }
}

/// Find the directory holding `.stagehand/` by walking up from `start`.
///
/// Falls back to `start` itself so `init` can create it there.
pub fn find_base(start: &Path) -> PathBuf {
    start
        .ancestors()
        .find(|dir| dir.join(DATA_DIR).is_dir())
        .unwrap_or(start)
        .to_path_buf()
}

pub fn short_id(id: &uuid::Uuid) -> String {
    id.to_string().chars().take(SHORT_ID_LEN).collect()
}

/// Resolve a template by full id, unique id prefix or case-insensitive name.
pub fn resolve_template<S: StageService>(
    runner: &MutationRunner<S>,
    reference: &str,
) -> Result<TemplateId> {
    let templates = runner.store().templates();
    let matches: Vec<&WorkflowTemplate> = templates
        .iter()
        .copied()
        .filter(|t| {
            t.id.to_string().starts_with(&reference.to_lowercase())
                || t.name.eq_ignore_ascii_case(reference)
        })
        .collect();

    match matches.as_slice() {
        [template] => Ok(template.id),
        [] => bail!("Template '{reference}' not found"),
        _ => bail!(
            "Template reference '{reference}' is ambiguous ({} matches)",
            matches.len()
        ),
    }
}

/// Fetch and cache the stages of one template.
pub fn load_stages<S: StageService>(
    runner: &mut MutationRunner<S>,
    template_id: TemplateId,
) -> Result<Vec<WorkflowStage>> {
    let stages = runner
        .service()
        .fetch_stages(template_id)
        .with_context(|| format!("Failed to load stages of template {template_id}"))?;
    runner.store_mut().confirm_stages(template_id, stages);
    Ok(runner.store().full_ordered_stages(template_id))
}

/// Resolve a stage by full id or unique id prefix across every template.
///
/// Loads the stages of each template into the store on the way.
pub fn resolve_stage<S: StageService>(
    runner: &mut MutationRunner<S>,
    reference: &str,
) -> Result<StageId> {
    let template_ids: Vec<TemplateId> = runner.store().templates().iter().map(|t| t.id).collect();
    let prefix = reference.to_lowercase();

    let mut matches = Vec::new();
    for template_id in template_ids {
        let stages = load_stages(runner, template_id)?;
        matches.extend(
            stages
                .into_iter()
                .filter(|s| s.id.to_string().starts_with(&prefix))
                .map(|s| s.id),
        );
    }

    match matches.as_slice() {
        [stage_id] => Ok(*stage_id),
        [] => bail!("Stage '{reference}' not found"),
        _ => bail!(
            "Stage reference '{reference}' is ambiguous ({} matches)",
            matches.len()
        ),
    }
}

/// Print the user-facing side of a mutation outcome.
///
/// Notices go to stderr in yellow and are not errors. Returns the confirmed
/// value if there is one.
pub fn finish<T>(outcome: Result<Settled<T>, MutationError>) -> Result<Option<T>> {
    match outcome {
        Ok(Settled::Confirmed(value)) => Ok(Some(value)),
        Ok(Settled::Corrected { value, notice }) => {
            eprintln!("{} {}", "!".yellow().bold(), notice.to_string().yellow());
            Ok(value)
        }
        Ok(Settled::Unchanged) => {
            println!("{}", "Nothing to change".dimmed());
            Ok(None)
        }
        Err(err) => Err(err.into()),
    }
}

/// One-line description of a stage for listings.
pub fn describe_stage(stage: &WorkflowStage) -> String {
    let mut line = format!(
        "{:>3}. {} {}",
        stage.order,
        stage.name,
        short_id(&stage.id).dimmed()
    );
    if let Some(kind) = stage.automation_kind.filter(|_| stage.is_automated) {
        line.push_str(&format!(
            " {}",
            format!("[{kind} {}]", stage.trigger_timing).cyan()
        ));
    }
    line
}
