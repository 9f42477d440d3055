//! Reorder Protocol
//!
//! Turns a move gesture inside one (template, phase) group into a
//! whole-group order mapping and submits it as a single atomic request.
//! Stages never change phase here; that is a stage edit.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::models::{Phase, StageId, TemplateId, WorkflowStage};
use crate::mutation::{Mutation, MutationError, MutationRunner, Reconciled, Settled};
use crate::ordering::{self, OrderMapping};
use crate::service::{ReorderRequest, ServiceError, StageService};
use crate::store::{QueryScope, StageStore};
use crate::validation;

/// A move gesture: the stage at index `from` of the group lands at `to`.
///
/// Indices are zero-based positions in the group as currently displayed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageMove {
    pub template_id: TemplateId,
    pub phase: Phase,
    pub from: usize,
    pub to: usize,
}

/// The request a move produces plus what the user asked for.
#[derive(Debug, Clone, PartialEq)]
pub struct ReorderPlan {
    pub request: ReorderRequest,
    pub moved: StageId,
    pub from: usize,
    pub to: usize,
}

/// Compute the mapping for a move.
///
/// Returns `Ok(None)` when the move cannot change anything: groups with fewer
/// than two stages, or a stage dropped on its own position. `to` past the end
/// of the group is clamped to the last position.
pub fn plan_move(group: &[WorkflowStage], mv: StageMove) -> Result<Option<ReorderPlan>, ServiceError> {
    if group.len() < 2 {
        return Ok(None);
    }
    if mv.from >= group.len() {
        return Err(ServiceError::validation(
            "from",
            format!("position {} is outside a group of {}", mv.from, group.len()),
        ));
    }

    let to = mv.to.min(group.len() - 1);
    if to == mv.from {
        return Ok(None);
    }

    let mut ids: Vec<StageId> = group.iter().map(|s| s.id).collect();
    let moved = ids[mv.from];
    ordering::splice(&mut ids, mv.from, to);

    Ok(Some(ReorderPlan {
        request: ReorderRequest {
            template_id: mv.template_id,
            stage_type: mv.phase,
            order_mapping: ordering::mapping_for(&ids),
        },
        moved,
        from: mv.from,
        to,
    }))
}

/// Whole-group reorder intent.
#[derive(Debug, Clone)]
pub struct ReorderStages {
    request: ReorderRequest,
}

impl ReorderStages {
    pub fn new(request: ReorderRequest) -> Self {
        Self { request }
    }

    pub fn mapping(&self) -> &OrderMapping {
        &self.request.order_mapping
    }
}

impl Mutation for ReorderStages {
    type Response = Vec<WorkflowStage>;
    type Output = Vec<WorkflowStage>;

    fn describe(&self) -> String {
        format!("Reorder {} stages", self.request.stage_type.label())
    }

    fn validate(&self, _store: &StageStore) -> Result<(), ServiceError> {
        if !ordering::is_permutation(&self.request.order_mapping) {
            return Err(ServiceError::validation(
                "order_mapping",
                "orders must be exactly 1..n",
            ));
        }
        Ok(())
    }

    fn scopes(&self, _store: &StageStore) -> Vec<QueryScope> {
        vec![QueryScope::Stages(self.request.template_id)]
    }

    fn apply(&self, store: &mut StageStore) {
        let mapping = &self.request.order_mapping;
        store.patch_stages(self.request.template_id, |stages| {
            ordering::apply_mapping(stages, mapping);
        });
    }

    fn submit<S: StageService + ?Sized>(
        &self,
        service: &S,
    ) -> Result<Vec<WorkflowStage>, ServiceError> {
        service.reorder_stages(&self.request)
    }

    fn reconcile(
        &self,
        store: &mut StageStore,
        group: Vec<WorkflowStage>,
    ) -> Reconciled<Vec<WorkflowStage>> {
        let accepted = group
            .iter()
            .all(|s| self.request.order_mapping.get(&s.id) == Some(&s.order));
        store.confirm_group(self.request.template_id, self.request.stage_type, group.clone());

        if accepted {
            Reconciled::Confirmed(group)
        } else {
            Reconciled::Corrected {
                value: group,
                reason: "Stage order was corrected".into(),
            }
        }
    }
}

/// Move a stage within its group.
///
/// No-op moves settle as [`Settled::Unchanged`] without a request.
pub fn reorder<S: StageService>(
    runner: &mut MutationRunner<S>,
    mv: StageMove,
) -> Result<Settled<Vec<WorkflowStage>>, MutationError> {
    let group = runner.store().stages_for_phase(mv.template_id, mv.phase);
    let Some(plan) = plan_move(&group, mv).map_err(MutationError::Rejected)? else {
        debug!(phase = %mv.phase, from = mv.from, to = mv.to, "Move is a no-op");
        return Ok(Settled::Unchanged);
    };

    debug!(
        stage_id = %plan.moved,
        from = plan.from,
        to = plan.to,
        "Submitting reorder"
    );
    runner.run(ReorderStages::new(plan.request))
}

/// Move the stage with `stage_id` to a 1-based `order` in its group.
pub fn move_stage<S: StageService>(
    runner: &mut MutationRunner<S>,
    stage_id: StageId,
    order: u32,
) -> Result<Settled<Vec<WorkflowStage>>, MutationError> {
    let stage = runner
        .store()
        .stage(stage_id)
        .cloned()
        .ok_or_else(|| MutationError::Rejected(ServiceError::NotFound(format!("stage {stage_id}"))))?;
    validation::validate_order(order).map_err(MutationError::Rejected)?;

    let group = runner.store().stages_for_phase(stage.template_id, stage.phase);
    let from = group.iter().position(|s| s.id == stage_id).ok_or_else(|| {
        MutationError::Rejected(ServiceError::NotFound(format!(
            "stage {stage_id} in {} group",
            stage.phase
        )))
    })?;

    reorder(
        runner,
        StageMove {
            template_id: stage.template_id,
            phase: stage.phase,
            from,
            to: order as usize - 1,
        },
    )
}
