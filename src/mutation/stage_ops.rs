use uuid::Uuid;

use super::{Mutation, Reconciled};
use crate::models::{StageDraft, StageId, StagePatch, TemplateId, WorkflowStage};
use crate::ordering;
use crate::service::{ServiceError, StageService, StageWrite};
use crate::store::{QueryScope, StageStore};
use crate::validation;

/// Add a stage to a template.
///
/// The stage is shown immediately under a provisional id, which the
/// server-assigned id replaces on success.
#[derive(Debug, Clone)]
pub struct CreateStage {
    template_id: TemplateId,
    draft: StageDraft,
    provisional_id: StageId,
}

impl CreateStage {
    pub fn new(template_id: TemplateId, draft: StageDraft) -> Self {
        Self {
            template_id,
            draft,
            provisional_id: Uuid::new_v4(),
        }
    }

    pub fn provisional_id(&self) -> StageId {
        self.provisional_id
    }
}

impl Mutation for CreateStage {
    type Response = StageWrite;
    type Output = WorkflowStage;

    fn describe(&self) -> String {
        format!("Create stage '{}'", self.draft.name)
    }

    fn validate(&self, _store: &StageStore) -> Result<(), ServiceError> {
        validation::validate_stage_draft(&self.draft)
    }

    fn scopes(&self, _store: &StageStore) -> Vec<QueryScope> {
        vec![QueryScope::Stages(self.template_id)]
    }

    fn apply(&self, store: &mut StageStore) {
        let mut stage = WorkflowStage::from_draft(self.template_id, &self.draft, 0);
        stage.id = self.provisional_id;
        let order = self.draft.order;
        store.patch_stages(self.template_id, |stages| {
            ordering::insert_stage(stages, stage, order);
        });
    }

    fn submit<S: StageService + ?Sized>(&self, service: &S) -> Result<StageWrite, ServiceError> {
        service.create_stage(self.template_id, &self.draft)
    }

    fn reconcile(&self, store: &mut StageStore, write: StageWrite) -> Reconciled<WorkflowStage> {
        if let Some(corrected) = write.corrected {
            store.confirm_stages(self.template_id, corrected);
            return Reconciled::Corrected {
                value: write.stage,
                reason: "Stage orders were renumbered".into(),
            };
        }

        let guessed = store
            .stage(self.provisional_id)
            .map(|s| (s.phase, s.order));
        let stage = write.stage;
        let placed_as_guessed = guessed == Some((stage.phase, stage.order));
        store.confirm_stage_as(self.provisional_id, stage.clone());

        if placed_as_guessed {
            Reconciled::Confirmed(stage)
        } else {
            Reconciled::Corrected {
                reason: format!("Stage '{}' was placed at order {}", stage.name, stage.order),
                value: stage,
            }
        }
    }
}

/// Partial update of one stage, including phase and order changes.
#[derive(Debug, Clone)]
pub struct UpdateStage {
    stage_id: StageId,
    patch: StagePatch,
}

impl UpdateStage {
    pub fn new(stage_id: StageId, patch: StagePatch) -> Self {
        Self { stage_id, patch }
    }
}

impl Mutation for UpdateStage {
    type Response = StageWrite;
    type Output = WorkflowStage;

    fn describe(&self) -> String {
        format!("Update stage {}", self.stage_id)
    }

    fn validate(&self, store: &StageStore) -> Result<(), ServiceError> {
        if self.patch.is_empty() {
            return Err(ServiceError::validation("patch", "nothing to update"));
        }
        let current = store
            .stage(self.stage_id)
            .ok_or_else(|| ServiceError::NotFound(format!("stage {}", self.stage_id)))?;
        validation::validate_stage_patch(current, &self.patch)
    }

    fn scopes(&self, store: &StageStore) -> Vec<QueryScope> {
        let mut scopes = vec![QueryScope::Stage(self.stage_id)];
        if let Some(template_id) = store.template_of(self.stage_id) {
            scopes.push(QueryScope::Stages(template_id));
        }
        scopes
    }

    fn apply(&self, store: &mut StageStore) {
        let Some(template_id) = store.template_of(self.stage_id) else {
            return;
        };
        store.patch_stages(template_id, |stages| {
            ordering::apply_stage_patch(stages, self.stage_id, &self.patch);
        });
    }

    fn submit<S: StageService + ?Sized>(&self, service: &S) -> Result<StageWrite, ServiceError> {
        service.update_stage(self.stage_id, &self.patch)
    }

    fn reconcile(&self, store: &mut StageStore, write: StageWrite) -> Reconciled<WorkflowStage> {
        match write.corrected {
            Some(corrected) => {
                store.confirm_stages(write.stage.template_id, corrected);
                Reconciled::Corrected {
                    value: write.stage,
                    reason: "Stage orders were renumbered".into(),
                }
            }
            None => {
                store.confirm_stage(write.stage.clone());
                Reconciled::Confirmed(write.stage)
            }
        }
    }
}

/// Remove a stage and close the gap in its group.
#[derive(Debug, Clone)]
pub struct DeleteStage {
    stage_id: StageId,
}

impl DeleteStage {
    pub fn new(stage_id: StageId) -> Self {
        Self { stage_id }
    }
}

impl Mutation for DeleteStage {
    type Response = ();
    type Output = ();

    fn describe(&self) -> String {
        format!("Delete stage {}", self.stage_id)
    }

    fn validate(&self, store: &StageStore) -> Result<(), ServiceError> {
        match store.stage(self.stage_id) {
            Some(_) => Ok(()),
            None => Err(ServiceError::NotFound(format!("stage {}", self.stage_id))),
        }
    }

    fn scopes(&self, store: &StageStore) -> Vec<QueryScope> {
        let mut scopes = vec![QueryScope::Stage(self.stage_id)];
        if let Some(template_id) = store.template_of(self.stage_id) {
            scopes.push(QueryScope::Stages(template_id));
        }
        scopes
    }

    fn apply(&self, store: &mut StageStore) {
        remove_locally(store, self.stage_id);
    }

    fn submit<S: StageService + ?Sized>(&self, service: &S) -> Result<(), ServiceError> {
        service.delete_stage(self.stage_id)
    }

    /// The service returns no content; the local renumbering stands until
    /// the invalidated list is refetched.
    fn reconcile(&self, store: &mut StageStore, _response: ()) -> Reconciled<()> {
        remove_locally(store, self.stage_id);
        Reconciled::Confirmed(())
    }
}

fn remove_locally(store: &mut StageStore, stage_id: StageId) {
    let Some(template_id) = store.template_of(stage_id) else {
        return;
    };
    store.patch_stages(template_id, |stages| {
        ordering::remove_stage(stages, stage_id);
    });
}
