use std::cell::{Cell, RefCell, RefMut};

use super::{Catalog, ReorderRequest, ServiceError, StageService, StageWrite};
use crate::models::{
    StageDraft, StageId, StagePatch, TemplateDraft, TemplateId, TemplatePatch, WorkflowStage,
    WorkflowTemplate,
};

/// In-process service over a [`Catalog`].
///
/// Single-threaded by construction. Counts every request and can be told
/// to fail the next one, which is how tests drive rollback and conflict
/// paths.
#[derive(Debug, Default)]
pub struct MemoryService {
    catalog: RefCell<Catalog>,
    fail_next: RefCell<Option<ServiceError>>,
    requests: Cell<usize>,
}

impl MemoryService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_catalog(catalog: Catalog) -> Self {
        Self {
            catalog: RefCell::new(catalog),
            ..Self::default()
        }
    }

    /// Make the next request fail with `error` without touching the catalog.
    pub fn fail_next(&self, error: ServiceError) {
        *self.fail_next.borrow_mut() = Some(error);
    }

    /// Number of requests received so far, failed ones included.
    pub fn requests(&self) -> usize {
        self.requests.get()
    }

    /// Direct access to the records, standing in for another actor.
    pub fn catalog_mut(&self) -> RefMut<'_, Catalog> {
        self.catalog.borrow_mut()
    }

    pub fn snapshot(&self) -> Catalog {
        self.catalog.borrow().clone()
    }

    fn call<T>(
        &self,
        handler: impl FnOnce(&mut Catalog) -> Result<T, ServiceError>,
    ) -> Result<T, ServiceError> {
        self.requests.set(self.requests.get() + 1);
        if let Some(error) = self.fail_next.borrow_mut().take() {
            return Err(error);
        }
        handler(&mut self.catalog.borrow_mut())
    }
}

impl StageService for MemoryService {
    fn fetch_stages(&self, template_id: TemplateId) -> Result<Vec<WorkflowStage>, ServiceError> {
        self.call(|catalog| catalog.stages(template_id))
    }

    fn create_stage(
        &self,
        template_id: TemplateId,
        draft: &StageDraft,
    ) -> Result<StageWrite, ServiceError> {
        self.call(|catalog| catalog.create_stage(template_id, draft))
    }

    fn update_stage(
        &self,
        stage_id: StageId,
        patch: &StagePatch,
    ) -> Result<StageWrite, ServiceError> {
        self.call(|catalog| catalog.update_stage(stage_id, patch))
    }

    fn delete_stage(&self, stage_id: StageId) -> Result<(), ServiceError> {
        self.call(|catalog| catalog.delete_stage(stage_id))
    }

    fn reorder_stages(&self, request: &ReorderRequest) -> Result<Vec<WorkflowStage>, ServiceError> {
        self.call(|catalog| catalog.reorder(request))
    }

    fn list_templates(&self) -> Result<Vec<WorkflowTemplate>, ServiceError> {
        self.call(|catalog| Ok(catalog.templates()))
    }

    fn create_template(&self, draft: &TemplateDraft) -> Result<WorkflowTemplate, ServiceError> {
        self.call(|catalog| catalog.create_template(draft))
    }

    fn update_template(
        &self,
        template_id: TemplateId,
        patch: &TemplatePatch,
    ) -> Result<WorkflowTemplate, ServiceError> {
        self.call(|catalog| catalog.update_template(template_id, patch))
    }

    fn delete_template(&self, template_id: TemplateId) -> Result<(), ServiceError> {
        self.call(|catalog| catalog.delete_template(template_id))
    }
}
