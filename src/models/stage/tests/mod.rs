use uuid::Uuid;

use crate::models::phase::Phase;
use crate::models::stage::{StageDraft, WorkflowStage};

fn create_test_stage(name: &str, phase: Phase, order: u32) -> WorkflowStage {
    WorkflowStage::from_draft(Uuid::from_u128(1), &StageDraft::new(name, phase), order)
}
