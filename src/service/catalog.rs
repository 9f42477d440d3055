//! Authoritative template and stage records
//!
//! The catalog is the server side of the contract: it assigns ids, enforces
//! the density invariant on every write and detects reorder conflicts. Both
//! service implementations wrap one.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use super::{ReorderRequest, ServiceError, StageWrite};
use crate::models::{
    StageDraft, StageId, StagePatch, TemplateDraft, TemplateId, TemplatePatch, WorkflowStage,
    WorkflowTemplate,
};
use crate::ordering;
use crate::validation;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    #[serde(default)]
    templates: BTreeMap<TemplateId, WorkflowTemplate>,
    #[serde(default)]
    stages: BTreeMap<TemplateId, Vec<WorkflowStage>>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Templates sorted by name.
    pub fn templates(&self) -> Vec<WorkflowTemplate> {
        let mut templates: Vec<WorkflowTemplate> = self.templates.values().cloned().collect();
        templates.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        templates
    }

    pub fn template(&self, template_id: TemplateId) -> Result<&WorkflowTemplate, ServiceError> {
        self.templates
            .get(&template_id)
            .ok_or_else(|| ServiceError::NotFound(format!("template {template_id}")))
    }

    pub fn create_template(
        &mut self,
        draft: &TemplateDraft,
    ) -> Result<WorkflowTemplate, ServiceError> {
        validation::validate_template_draft(draft)?;
        let template = WorkflowTemplate::from_draft(draft);
        self.templates.insert(template.id, template.clone());
        self.stages.insert(template.id, Vec::new());
        Ok(template)
    }

    pub fn update_template(
        &mut self,
        template_id: TemplateId,
        patch: &TemplatePatch,
    ) -> Result<WorkflowTemplate, ServiceError> {
        validation::validate_template_patch(patch)?;
        let template = self
            .templates
            .get_mut(&template_id)
            .ok_or_else(|| ServiceError::NotFound(format!("template {template_id}")))?;
        template.apply_patch(patch);
        Ok(template.clone())
    }

    /// Removes the template and cascades to its stages.
    pub fn delete_template(&mut self, template_id: TemplateId) -> Result<(), ServiceError> {
        if self.templates.remove(&template_id).is_none() {
            return Err(ServiceError::NotFound(format!("template {template_id}")));
        }
        self.stages.remove(&template_id);
        Ok(())
    }

    /// Stages of a template in total rank order.
    pub fn stages(&self, template_id: TemplateId) -> Result<Vec<WorkflowStage>, ServiceError> {
        self.template(template_id)?;
        let mut stages = self.stages.get(&template_id).cloned().unwrap_or_default();
        ordering::sort_by_rank(&mut stages);
        Ok(stages)
    }

    pub fn stage(&self, stage_id: StageId) -> Result<&WorkflowStage, ServiceError> {
        self.stages
            .values()
            .flat_map(|stages| stages.iter())
            .find(|s| s.id == stage_id)
            .ok_or_else(|| ServiceError::NotFound(format!("stage {stage_id}")))
    }

    pub fn create_stage(
        &mut self,
        template_id: TemplateId,
        draft: &StageDraft,
    ) -> Result<StageWrite, ServiceError> {
        validation::validate_stage_draft(draft)?;
        self.template(template_id)?;

        let stage = WorkflowStage::from_draft(template_id, draft, 0);
        let stage_id = stage.id;
        let list = self.stages.entry(template_id).or_default();
        let renumbered = ordering::insert_stage(list, stage, draft.order);

        self.write_result(template_id, stage_id, !renumbered.is_empty())
    }

    /// Applies a partial update; any renumbering of other stages is reported
    /// back as a correction.
    pub fn update_stage(
        &mut self,
        stage_id: StageId,
        patch: &StagePatch,
    ) -> Result<StageWrite, ServiceError> {
        let current = self.stage(stage_id)?.clone();
        validation::validate_stage_patch(&current, patch)?;

        let template_id = current.template_id;
        let list = self.stages.entry(template_id).or_default();
        let renumbered = ordering::apply_stage_patch(list, stage_id, patch);

        self.write_result(template_id, stage_id, !renumbered.is_empty())
    }

    pub fn delete_stage(&mut self, stage_id: StageId) -> Result<(), ServiceError> {
        let template_id = self.stage(stage_id)?.template_id;
        if let Some(list) = self.stages.get_mut(&template_id) {
            ordering::remove_stage(list, stage_id);
        }
        Ok(())
    }

    /// Applies a whole-group order mapping atomically.
    ///
    /// The mapping must name exactly the stages currently in the group and
    /// assign them `1..=n`. Anything else means the caller worked from a
    /// stale view, which is reported as a conflict and leaves the group
    /// untouched.
    pub fn reorder(&mut self, request: &ReorderRequest) -> Result<Vec<WorkflowStage>, ServiceError> {
        self.template(request.template_id)?;
        let phase = request.stage_type;
        let list = self.stages.entry(request.template_id).or_default();

        let group: BTreeSet<StageId> = ordering::group_ids(list, phase).into_iter().collect();
        let proposed: BTreeSet<StageId> = request.order_mapping.keys().copied().collect();
        if group != proposed {
            return Err(ServiceError::Conflict(format!(
                "order mapping names {} stage(s) but {phase} group has {} (modified concurrently)",
                proposed.len(),
                group.len()
            )));
        }

        if !ordering::is_permutation(&request.order_mapping) {
            return Err(ServiceError::Conflict(format!(
                "proposed orders for {phase} collide or leave gaps"
            )));
        }

        ordering::apply_mapping(list, &request.order_mapping);
        Ok(ordering::group(list, phase).into_iter().cloned().collect())
    }

    fn write_result(
        &self,
        template_id: TemplateId,
        stage_id: StageId,
        renumbered: bool,
    ) -> Result<StageWrite, ServiceError> {
        let stage = self.stage(stage_id)?.clone();
        let corrected = if renumbered {
            Some(self.stages(template_id)?)
        } else {
            None
        };
        Ok(StageWrite { stage, corrected })
    }
}
