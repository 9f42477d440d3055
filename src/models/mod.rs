pub mod constants;
pub mod event;
pub mod phase;
pub mod stage;
pub mod template;

/// Server-assigned stage identifier.
pub type StageId = uuid::Uuid;

/// Server-assigned template identifier.
pub type TemplateId = uuid::Uuid;

pub use event::EventWorkflow;
pub use phase::Phase;
pub use stage::{AutomationKind, StageDraft, StagePatch, TriggerTiming, WorkflowStage};
pub use template::{CategoryScope, TemplateDraft, TemplatePatch, WorkflowTemplate};
