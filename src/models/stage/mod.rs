mod methods;
mod types;

#[cfg(test)]
mod tests;

pub use types::{AutomationKind, StageDraft, StagePatch, TriggerTiming, WorkflowStage};
