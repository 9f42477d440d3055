//! Progress Engine
//!
//! Pure read-side derivation of how far an event has travelled through its
//! workflow. Nothing here is cached or stored: every call recomputes from
//! the ordered stage list and the event's current-stage reference.

use serde::{Deserialize, Serialize};

use crate::models::{EventWorkflow, Phase, StageId, WorkflowStage};
use crate::store::StageStore;

/// Where a stage sits relative to the event's current stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StageStatus {
    Completed,
    Current,
    Upcoming,
}

impl std::fmt::Display for StageStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StageStatus::Completed => write!(f, "COMPLETED"),
            StageStatus::Current => write!(f, "CURRENT"),
            StageStatus::Upcoming => write!(f, "UPCOMING"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Progress {
    /// `None` when the event has not started or its stage is unknown
    pub current_stage: Option<WorkflowStage>,
    /// In `(0, 100]` once started, `0` otherwise. Never rounded here.
    pub percentage: f64,
}

impl Progress {
    pub fn not_started() -> Self {
        Self {
            current_stage: None,
            percentage: 0.0,
        }
    }
}

/// Completion of an event given the template's fully ordered stages.
///
/// `stages` must be in total rank order (as returned by
/// [`StageStore::full_ordered_stages`]). The percentage is
/// `(rank + 1) / total * 100` where `rank` is the zero-based position of the
/// current stage.
pub fn compute_progress(stages: &[WorkflowStage], current_stage_id: Option<StageId>) -> Progress {
    let Some(current_id) = current_stage_id else {
        return Progress::not_started();
    };

    match stages.iter().position(|s| s.id == current_id) {
        Some(rank) => Progress {
            current_stage: Some(stages[rank].clone()),
            percentage: (rank + 1) as f64 / stages.len() as f64 * 100.0,
        },
        None => Progress::not_started(),
    }
}

/// Status of one stage relative to the current stage.
///
/// A stage is completed when it ranks strictly before the current stage by
/// `(phase rank, order)`.
pub fn stage_status(stage: &WorkflowStage, current: &WorkflowStage) -> StageStatus {
    if stage.id == current.id {
        StageStatus::Current
    } else if stage.rank_key() < current.rank_key() {
        StageStatus::Completed
    } else {
        StageStatus::Upcoming
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Step {
    pub stage: WorkflowStage,
    pub status: StageStatus,
}

/// One phase's sub-stepper.
#[derive(Debug, Clone, PartialEq)]
pub struct PhaseStepper {
    pub phase: Phase,
    pub steps: Vec<Step>,
}

/// Per-phase steppers with a status computed for every stage.
///
/// An empty stage list yields no steppers at all. Without a current stage
/// everything is upcoming.
pub fn phase_steppers(
    stages: &[WorkflowStage],
    current: Option<&WorkflowStage>,
) -> Vec<PhaseStepper> {
    if stages.is_empty() {
        return Vec::new();
    }

    Phase::ALL
        .iter()
        .map(|phase| PhaseStepper {
            phase: *phase,
            steps: stages
                .iter()
                .filter(|s| s.phase == *phase)
                .map(|s| Step {
                    stage: s.clone(),
                    status: current.map_or(StageStatus::Upcoming, |c| stage_status(s, c)),
                })
                .collect(),
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq)]
pub struct EventProgress {
    pub progress: Progress,
    pub steppers: Vec<PhaseStepper>,
}

/// Progress for an event, read from the store.
///
/// An event without a template reads as not started with nothing to show.
pub fn event_progress(store: &StageStore, event: &EventWorkflow) -> EventProgress {
    let Some(template_id) = event.workflow_template else {
        return EventProgress {
            progress: Progress::not_started(),
            steppers: Vec::new(),
        };
    };

    let stages = store.full_ordered_stages(template_id);
    let progress = compute_progress(&stages, event.current_stage);
    let steppers = phase_steppers(&stages, progress.current_stage.as_ref());
    EventProgress { progress, steppers }
}

/// Presentation rounding of a percentage.
pub fn format_percentage(percentage: f64, decimals: usize) -> String {
    format!("{percentage:.decimals$}%")
}

#[cfg(test)]
mod tests;
