use super::{Mutation, Reconciled};
use crate::models::{TemplateDraft, TemplateId, TemplatePatch, WorkflowTemplate};
use crate::service::{ServiceError, StageService};
use crate::store::{QueryScope, StageStore};
use crate::validation;

#[derive(Debug, Clone)]
pub struct CreateTemplate {
    provisional: WorkflowTemplate,
    draft: TemplateDraft,
}

impl CreateTemplate {
    pub fn new(draft: TemplateDraft) -> Self {
        Self {
            provisional: WorkflowTemplate::from_draft(&draft),
            draft,
        }
    }

    pub fn provisional_id(&self) -> TemplateId {
        self.provisional.id
    }
}

impl Mutation for CreateTemplate {
    type Response = WorkflowTemplate;
    type Output = WorkflowTemplate;

    fn describe(&self) -> String {
        format!("Create template '{}'", self.draft.name)
    }

    fn validate(&self, _store: &StageStore) -> Result<(), ServiceError> {
        validation::validate_template_draft(&self.draft)
    }

    fn scopes(&self, _store: &StageStore) -> Vec<QueryScope> {
        vec![QueryScope::Templates]
    }

    fn apply(&self, store: &mut StageStore) {
        store.put_template(self.provisional.clone());
    }

    fn submit<S: StageService + ?Sized>(
        &self,
        service: &S,
    ) -> Result<WorkflowTemplate, ServiceError> {
        service.create_template(&self.draft)
    }

    fn reconcile(
        &self,
        store: &mut StageStore,
        template: WorkflowTemplate,
    ) -> Reconciled<WorkflowTemplate> {
        store.remove_template(self.provisional.id);
        store.confirm_template(template.clone());
        store.confirm_stages(template.id, Vec::new());
        Reconciled::Confirmed(template)
    }
}

/// Edit template metadata, including activation.
#[derive(Debug, Clone)]
pub struct UpdateTemplate {
    template_id: TemplateId,
    patch: TemplatePatch,
}

impl UpdateTemplate {
    pub fn new(template_id: TemplateId, patch: TemplatePatch) -> Self {
        Self { template_id, patch }
    }

    pub fn set_active(template_id: TemplateId, is_active: bool) -> Self {
        Self::new(
            template_id,
            TemplatePatch {
                is_active: Some(is_active),
                ..Default::default()
            },
        )
    }
}

impl Mutation for UpdateTemplate {
    type Response = WorkflowTemplate;
    type Output = WorkflowTemplate;

    fn describe(&self) -> String {
        match self.patch.is_active {
            Some(true) if self.patch.is_only_activation() => {
                format!("Activate template {}", self.template_id)
            }
            Some(false) if self.patch.is_only_activation() => {
                format!("Deactivate template {}", self.template_id)
            }
            _ => format!("Update template {}", self.template_id),
        }
    }

    fn validate(&self, _store: &StageStore) -> Result<(), ServiceError> {
        if self.patch.is_empty() {
            return Err(ServiceError::validation("patch", "nothing to update"));
        }
        validation::validate_template_patch(&self.patch)
    }

    fn scopes(&self, _store: &StageStore) -> Vec<QueryScope> {
        vec![QueryScope::Templates, QueryScope::Template(self.template_id)]
    }

    fn apply(&self, store: &mut StageStore) {
        if let Some(mut template) = store.template(self.template_id).cloned() {
            template.apply_patch(&self.patch);
            store.put_template(template);
        }
    }

    fn submit<S: StageService + ?Sized>(
        &self,
        service: &S,
    ) -> Result<WorkflowTemplate, ServiceError> {
        service.update_template(self.template_id, &self.patch)
    }

    fn reconcile(
        &self,
        store: &mut StageStore,
        template: WorkflowTemplate,
    ) -> Reconciled<WorkflowTemplate> {
        store.confirm_template(template.clone());
        Reconciled::Confirmed(template)
    }
}

/// Delete a template together with its stages.
#[derive(Debug, Clone)]
pub struct DeleteTemplate {
    template_id: TemplateId,
}

impl DeleteTemplate {
    pub fn new(template_id: TemplateId) -> Self {
        Self { template_id }
    }
}

impl Mutation for DeleteTemplate {
    type Response = ();
    type Output = ();

    fn describe(&self) -> String {
        format!("Delete template {}", self.template_id)
    }

    fn scopes(&self, _store: &StageStore) -> Vec<QueryScope> {
        vec![
            QueryScope::Templates,
            QueryScope::Template(self.template_id),
            QueryScope::Stages(self.template_id),
        ]
    }

    fn apply(&self, store: &mut StageStore) {
        store.remove_template(self.template_id);
    }

    fn submit<S: StageService + ?Sized>(&self, service: &S) -> Result<(), ServiceError> {
        service.delete_template(self.template_id)
    }

    fn reconcile(&self, store: &mut StageStore, _response: ()) -> Reconciled<()> {
        store.confirm_template_removed(self.template_id);
        Reconciled::Confirmed(())
    }
}
