use anyhow::Context;
use std::path::{Path, PathBuf};

use super::{Catalog, ReorderRequest, ServiceError, StageService, StageWrite};
use crate::fs::locking::{locked_read, locked_update};
use crate::models::{
    StageDraft, StageId, StagePatch, TemplateDraft, TemplateId, TemplatePatch, WorkflowStage,
    WorkflowTemplate,
};

/// Catalog persisted as a JSON file.
///
/// Every call is a self-contained locked read or read-modify-write, so
/// several processes can share one file. Storage failures surface as
/// [`ServiceError::Transport`].
#[derive(Debug, Clone)]
pub struct FileService {
    path: PathBuf,
}

impl FileService {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read<T>(&self, query: impl FnOnce(&Catalog) -> Result<T, ServiceError>) -> Result<T, ServiceError> {
        if !self.path.exists() {
            return Err(ServiceError::Transport(format!(
                "catalog not found at {} (run 'stagehand init' first)",
                self.path.display()
            )));
        }
        let content = locked_read(&self.path).map_err(transport)?;
        let catalog = parse_catalog(&content).map_err(transport)?;
        query(&catalog)
    }

    fn write<T>(
        &self,
        mutate: impl FnOnce(&mut Catalog) -> Result<T, ServiceError>,
    ) -> Result<T, ServiceError> {
        if !self.path.exists() {
            return Err(ServiceError::Transport(format!(
                "catalog not found at {} (run 'stagehand init' first)",
                self.path.display()
            )));
        }
        locked_update(&self.path, |content| {
            let mut catalog = parse_catalog(content)?;
            // Domain errors abort the update before anything is written
            let value = mutate(&mut catalog)?;
            let serialized =
                serde_json::to_string_pretty(&catalog).context("Failed to serialize catalog")?;
            Ok((serialized, value))
        })
        .map_err(|err| match err.downcast::<ServiceError>() {
            Ok(service_error) => service_error,
            Err(other) => transport(other),
        })
    }
}

fn parse_catalog(content: &str) -> anyhow::Result<Catalog> {
    if content.trim().is_empty() {
        return Ok(Catalog::new());
    }
    serde_json::from_str(content).context("Failed to parse catalog")
}

fn transport(err: anyhow::Error) -> ServiceError {
    ServiceError::Transport(format!("{err:#}"))
}

impl StageService for FileService {
    fn fetch_stages(&self, template_id: TemplateId) -> Result<Vec<WorkflowStage>, ServiceError> {
        self.read(|catalog| catalog.stages(template_id))
    }

    fn create_stage(
        &self,
        template_id: TemplateId,
        draft: &StageDraft,
    ) -> Result<StageWrite, ServiceError> {
        self.write(|catalog| catalog.create_stage(template_id, draft))
    }

    fn update_stage(
        &self,
        stage_id: StageId,
        patch: &StagePatch,
    ) -> Result<StageWrite, ServiceError> {
        self.write(|catalog| catalog.update_stage(stage_id, patch))
    }

    fn delete_stage(&self, stage_id: StageId) -> Result<(), ServiceError> {
        self.write(|catalog| catalog.delete_stage(stage_id))
    }

    fn reorder_stages(&self, request: &ReorderRequest) -> Result<Vec<WorkflowStage>, ServiceError> {
        self.write(|catalog| catalog.reorder(request))
    }

    fn list_templates(&self) -> Result<Vec<WorkflowTemplate>, ServiceError> {
        self.read(|catalog| Ok(catalog.templates()))
    }

    fn create_template(&self, draft: &TemplateDraft) -> Result<WorkflowTemplate, ServiceError> {
        self.write(|catalog| catalog.create_template(draft))
    }

    fn update_template(
        &self,
        template_id: TemplateId,
        patch: &TemplatePatch,
    ) -> Result<WorkflowTemplate, ServiceError> {
        self.write(|catalog| catalog.update_template(template_id, patch))
    }

    fn delete_template(&self, template_id: TemplateId) -> Result<(), ServiceError> {
        self.write(|catalog| catalog.delete_template(template_id))
    }
}
