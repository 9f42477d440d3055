use serde::{Deserialize, Serialize};

use crate::models::{StageId, TemplateId};

/// The slice of an event the progress engine reads.
///
/// Events are owned elsewhere; nothing in this crate writes to one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventWorkflow {
    #[serde(default)]
    pub workflow_template: Option<TemplateId>,
    /// `None` means the event has not entered any stage yet
    #[serde(default)]
    pub current_stage: Option<StageId>,
}

impl EventWorkflow {
    pub fn new(workflow_template: TemplateId, current_stage: Option<StageId>) -> Self {
        Self {
            workflow_template: Some(workflow_template),
            current_stage,
        }
    }
}
