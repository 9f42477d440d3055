//! Density helpers for stage ordering
//!
//! Every (template, phase) group must carry the orders `1..=n` with no gaps
//! and no duplicates. The functions here are the only places that assign
//! `order`; the catalog, the store and the optimistic intents all go through
//! them so the client's speculation and the service's result agree.
//!
//! All functions operate on the full stage list of a single template.

use std::collections::{BTreeMap, BTreeSet};

use chrono::Utc;

use crate::models::{Phase, StageId, StagePatch, TemplateId, WorkflowStage};

/// `{stage id -> new order}` covering an entire phase group.
pub type OrderMapping = BTreeMap<StageId, u32>;

/// Sort stages by total rank `(phase rank, order)`.
///
/// Ties (only possible in inconsistent data) fall back to the id so the
/// result is deterministic.
pub fn sort_by_rank(stages: &mut [WorkflowStage]) {
    stages.sort_by(|a, b| a.rank_key().cmp(&b.rank_key()).then(a.id.cmp(&b.id)));
}

/// Stages of one phase group, sorted by order.
pub fn group(stages: &[WorkflowStage], phase: Phase) -> Vec<&WorkflowStage> {
    let mut members: Vec<&WorkflowStage> = stages.iter().filter(|s| s.phase == phase).collect();
    members.sort_by(|a, b| a.order.cmp(&b.order).then(a.id.cmp(&b.id)));
    members
}

/// Ids of one phase group in display order.
pub fn group_ids(stages: &[WorkflowStage], phase: Phase) -> Vec<StageId> {
    group(stages, phase).into_iter().map(|s| s.id).collect()
}

pub fn group_len(stages: &[WorkflowStage], phase: Phase) -> usize {
    stages.iter().filter(|s| s.phase == phase).count()
}

/// True when every phase group in `stages` has orders exactly `1..=n`.
pub fn is_dense(stages: &[WorkflowStage]) -> bool {
    let mut by_group: BTreeMap<(TemplateId, u8), Vec<u32>> = BTreeMap::new();
    for stage in stages {
        by_group
            .entry((stage.template_id, stage.phase.rank()))
            .or_default()
            .push(stage.order);
    }

    by_group.values_mut().all(|orders| {
        orders.sort_unstable();
        orders
            .iter()
            .enumerate()
            .all(|(index, order)| *order as usize == index + 1)
    })
}

/// Remove one element and reinsert it elsewhere (not a swap).
///
/// Out-of-range indices are clamped to the list bounds.
pub fn splice<T>(items: &mut Vec<T>, from: usize, to: usize) {
    if items.is_empty() {
        return;
    }
    let from = from.min(items.len() - 1);
    let item = items.remove(from);
    let to = to.min(items.len());
    items.insert(to, item);
}

/// Mapping that assigns `index + 1` to every id, in sequence.
pub fn mapping_for(ids: &[StageId]) -> OrderMapping {
    ids.iter()
        .enumerate()
        .map(|(index, id)| (*id, index as u32 + 1))
        .collect()
}

/// True when a mapping's values are exactly `1..=len`.
pub fn is_permutation(mapping: &OrderMapping) -> bool {
    let orders: BTreeSet<u32> = mapping.values().copied().collect();
    orders.len() == mapping.len() && orders.iter().copied().eq(1..=mapping.len() as u32)
}

/// Write the orders from `mapping` into matching stages.
///
/// Returns the ids whose order actually changed.
pub fn apply_mapping(stages: &mut [WorkflowStage], mapping: &OrderMapping) -> Vec<StageId> {
    let now = Utc::now();
    let mut changed = Vec::new();
    for stage in stages.iter_mut() {
        if let Some(order) = mapping.get(&stage.id) {
            if stage.order != *order {
                stage.order = *order;
                stage.updated_at = now;
                changed.push(stage.id);
            }
        }
    }
    changed
}

/// Renumber a phase group to `1..=n`, keeping its relative order.
pub fn renumber_group(stages: &mut [WorkflowStage], phase: Phase) -> Vec<StageId> {
    let ids = group_ids(stages, phase);
    apply_mapping(stages, &mapping_for(&ids))
}

/// Insert a stage into its phase group.
///
/// `order` of `None` appends; an explicit order is clamped to `1..=n+1` and
/// pushes later stages down. The inserted stage's `order` is overwritten.
/// Returns the ids of pre-existing stages that were renumbered.
pub fn insert_stage(
    stages: &mut Vec<WorkflowStage>,
    mut stage: WorkflowStage,
    order: Option<u32>,
) -> Vec<StageId> {
    let phase = stage.phase;
    let mut ids = group_ids(stages, phase);
    let position = match order {
        Some(order) => (order.max(1) as usize - 1).min(ids.len()),
        None => ids.len(),
    };
    let new_id = stage.id;
    ids.insert(position, new_id);

    stage.order = position as u32 + 1;
    stages.push(stage);

    let mut changed = apply_mapping(stages, &mapping_for(&ids));
    changed.retain(|id| *id != new_id);
    changed
}

/// Remove a stage and close the gap it leaves in its group.
///
/// Returns the removed stage and the ids that were renumbered.
pub fn remove_stage(
    stages: &mut Vec<WorkflowStage>,
    stage_id: StageId,
) -> Option<(WorkflowStage, Vec<StageId>)> {
    let index = stages.iter().position(|s| s.id == stage_id)?;
    let removed = stages.remove(index);
    let changed = renumber_group(stages, removed.phase);
    Some((removed, changed))
}

/// Move a stage to a new order inside its group (splice semantics).
///
/// Returns the ids renumbered as a side effect, the moved stage excluded.
pub fn move_within_group(
    stages: &mut [WorkflowStage],
    stage_id: StageId,
    new_order: u32,
) -> Vec<StageId> {
    let Some(phase) = stages.iter().find(|s| s.id == stage_id).map(|s| s.phase) else {
        return Vec::new();
    };
    let mut ids = group_ids(stages, phase);
    let Some(from) = ids.iter().position(|id| *id == stage_id) else {
        return Vec::new();
    };
    let to = new_order.max(1) as usize - 1;
    splice(&mut ids, from, to);

    let mut changed = apply_mapping(stages, &mapping_for(&ids));
    changed.retain(|id| *id != stage_id);
    changed
}

/// Move a stage into another phase.
///
/// The stage takes `order` in the destination group (append when `None`)
/// and the source group is renumbered to close the gap. Returns the ids of
/// other stages renumbered in either group.
pub fn move_to_phase(
    stages: &mut Vec<WorkflowStage>,
    stage_id: StageId,
    phase: Phase,
    order: Option<u32>,
) -> Vec<StageId> {
    let Some((mut stage, mut changed)) = remove_stage(stages, stage_id) else {
        return Vec::new();
    };
    stage.phase = phase;
    stage.updated_at = Utc::now();
    changed.extend(insert_stage(stages, stage, order));
    changed
}

/// Apply a stage patch to a template's stage list.
///
/// A phase change appends to the destination group (or inserts at the
/// patch's order) and closes the gap in the source group. An order change
/// inside the group moves the stage with splice semantics. Returns the ids
/// of other stages renumbered along the way.
pub fn apply_stage_patch(
    stages: &mut Vec<WorkflowStage>,
    stage_id: StageId,
    patch: &StagePatch,
) -> Vec<StageId> {
    let Some(current) = stages.iter().find(|s| s.id == stage_id) else {
        return Vec::new();
    };
    let (phase, order) = (current.phase, current.order);

    let renumbered = match (patch.phase, patch.order) {
        (Some(new_phase), new_order) if new_phase != phase => {
            move_to_phase(stages, stage_id, new_phase, new_order)
        }
        (_, Some(new_order)) if new_order != order => {
            move_within_group(stages, stage_id, new_order)
        }
        _ => Vec::new(),
    };

    if let Some(stage) = stages.iter_mut().find(|s| s.id == stage_id) {
        stage.apply_fields(patch);
    }
    renumbered
}
