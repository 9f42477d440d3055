use chrono::Utc;
use uuid::Uuid;

use super::types::{StageDraft, StagePatch, WorkflowStage};
use crate::models::TemplateId;

impl WorkflowStage {
    /// Build a stage from a draft at an explicit position.
    ///
    /// The id is freshly generated; callers acting for the server keep it,
    /// optimistic callers treat it as provisional.
    pub fn from_draft(template_id: TemplateId, draft: &StageDraft, order: u32) -> Self {
        let now = Utc::now();

        Self {
            id: Uuid::new_v4(),
            template_id,
            name: draft.name.clone(),
            phase: draft.phase,
            order,
            is_automated: draft.is_automated,
            automation_kind: draft.automation_kind,
            trigger_timing: draft.trigger_timing.clone(),
            email_template: draft.email_template.clone(),
            task_description: draft.task_description.clone(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Total rank within a template: `(phase rank, order)`.
    pub fn rank_key(&self) -> (u8, u32) {
        (self.phase.rank(), self.order)
    }

    /// Apply every non-order field of a patch.
    ///
    /// Phase and order are positional and handled by the ordering helpers,
    /// which need to see the whole group.
    pub fn apply_fields(&mut self, patch: &StagePatch) {
        if let Some(name) = &patch.name {
            self.name = name.clone();
        }
        if let Some(is_automated) = patch.is_automated {
            self.is_automated = is_automated;
            if !is_automated {
                self.automation_kind = None;
                self.email_template = None;
            }
        }
        if let Some(kind) = patch.automation_kind {
            self.automation_kind = kind;
        }
        if let Some(timing) = &patch.trigger_timing {
            self.trigger_timing = timing.clone();
        }
        if let Some(email_template) = &patch.email_template {
            self.email_template = email_template.clone();
        }
        if let Some(task) = &patch.task_description {
            self.task_description = task.clone();
        }
        self.updated_at = Utc::now();
    }
}
