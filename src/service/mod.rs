//! Persistence service contract
//!
//! The store never talks to storage directly; every read and write goes
//! through a [`StageService`]. The service is authoritative: whatever it
//! returns replaces local speculation.

mod catalog;
mod file;
mod memory;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::{
    Phase, StageDraft, StageId, StagePatch, TemplateDraft, TemplateId, TemplatePatch,
    WorkflowStage, WorkflowTemplate,
};
use crate::ordering::OrderMapping;

pub use catalog::Catalog;
pub use file::FileService;
pub use memory::MemoryService;

/// Failure reported by the persistence service.
///
/// Variants map one-to-one onto how the mutation controller reacts, so
/// callers branch on the variant and never on the message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ServiceError {
    /// Input rejected (missing name, non-positive order, bad automation config)
    #[error("Invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    /// Order collision or concurrent modification
    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Not found: {0}")]
    NotFound(String),

    /// Network, storage or server failure
    #[error("Transport failure: {0}")]
    Transport(String),
}

impl ServiceError {
    pub fn validation(field: impl Into<String>, reason: impl Into<String>) -> Self {
        ServiceError::Validation {
            field: field.into(),
            reason: reason.into(),
        }
    }

    pub fn is_conflict(&self) -> bool {
        matches!(self, ServiceError::Conflict(_))
    }
}

/// Result of a stage create or update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageWrite {
    pub stage: WorkflowStage,
    /// Full stage list of the template when the service had to renumber
    /// stages other than the one written.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub corrected: Option<Vec<WorkflowStage>>,
}

/// One atomic reorder of a whole phase group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReorderRequest {
    pub template_id: TemplateId,
    pub stage_type: Phase,
    pub order_mapping: OrderMapping,
}

pub trait StageService {
    /// All stages of a template, sorted by phase rank then order.
    fn fetch_stages(&self, template_id: TemplateId) -> Result<Vec<WorkflowStage>, ServiceError>;

    fn create_stage(
        &self,
        template_id: TemplateId,
        draft: &StageDraft,
    ) -> Result<StageWrite, ServiceError>;

    fn update_stage(&self, stage_id: StageId, patch: &StagePatch)
        -> Result<StageWrite, ServiceError>;

    /// Deletes the stage; the caller renumbers its local copy of the group.
    fn delete_stage(&self, stage_id: StageId) -> Result<(), ServiceError>;

    /// Returns the canonical post-reorder list for the group.
    fn reorder_stages(&self, request: &ReorderRequest) -> Result<Vec<WorkflowStage>, ServiceError>;

    fn list_templates(&self) -> Result<Vec<WorkflowTemplate>, ServiceError>;

    fn create_template(&self, draft: &TemplateDraft) -> Result<WorkflowTemplate, ServiceError>;

    fn update_template(
        &self,
        template_id: TemplateId,
        patch: &TemplatePatch,
    ) -> Result<WorkflowTemplate, ServiceError>;

    /// Deletes the template and every stage it owns.
    fn delete_template(&self, template_id: TemplateId) -> Result<(), ServiceError>;
}
