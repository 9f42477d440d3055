use uuid::Uuid;

use super::*;
use crate::models::StageDraft;

const TEMPLATE: Uuid = Uuid::from_u128(100);

fn stage(name: &str, n: u128, phase: Phase, order: u32) -> WorkflowStage {
    let mut s = WorkflowStage::from_draft(TEMPLATE, &StageDraft::new(name, phase), order);
    s.id = Uuid::from_u128(n);
    s
}

/// LEAD:[A,B], PRODUCTION:[C], POST_PRODUCTION:[D]
fn four_stage_template() -> Vec<WorkflowStage> {
    vec![
        stage("A", 1, Phase::Lead, 1),
        stage("B", 2, Phase::Lead, 2),
        stage("C", 3, Phase::Production, 1),
        stage("D", 4, Phase::PostProduction, 1),
    ]
}

#[test]
fn test_progress_at_production_stage() {
    let stages = four_stage_template();
    let progress = compute_progress(&stages, Some(Uuid::from_u128(3)));

    assert_eq!(progress.percentage, 75.0);
    assert_eq!(progress.current_stage.as_ref().unwrap().name, "C");

    let current = progress.current_stage.unwrap();
    let statuses: Vec<_> = stages
        .iter()
        .map(|s| (s.name.as_str(), stage_status(s, &current)))
        .collect();
    assert_eq!(
        statuses,
        vec![
            ("A", StageStatus::Completed),
            ("B", StageStatus::Completed),
            ("C", StageStatus::Current),
            ("D", StageStatus::Upcoming),
        ]
    );
}

#[test]
fn test_progress_without_current_stage() {
    let progress = compute_progress(&four_stage_template(), None);
    assert_eq!(progress, Progress::not_started());
}

#[test]
fn test_progress_with_unknown_stage() {
    let progress = compute_progress(&four_stage_template(), Some(Uuid::from_u128(99)));
    assert_eq!(progress.percentage, 0.0);
    assert!(progress.current_stage.is_none());
}

#[test]
fn test_empty_template_is_not_an_error() {
    let progress = compute_progress(&[], None);
    assert_eq!(progress.percentage, 0.0);
    assert!(phase_steppers(&[], None).is_empty());
}

#[test]
fn test_last_stage_is_one_hundred_percent() {
    let stages = four_stage_template();
    let progress = compute_progress(&stages, Some(Uuid::from_u128(4)));
    assert_eq!(progress.percentage, 100.0);
}

#[test]
fn test_percentage_is_not_rounded() {
    let stages = vec![
        stage("A", 1, Phase::Lead, 1),
        stage("B", 2, Phase::Lead, 2),
        stage("C", 3, Phase::Lead, 3),
    ];
    let progress = compute_progress(&stages, Some(Uuid::from_u128(1)));
    assert!((progress.percentage - 100.0 / 3.0).abs() < 1e-9);
    assert_eq!(format_percentage(progress.percentage, 0), "33%");
    assert_eq!(format_percentage(progress.percentage, 1), "33.3%");
}

#[test]
fn test_progress_is_monotonic_in_rank() {
    let stages = four_stage_template();
    for a in &stages {
        for b in &stages {
            if a.rank_key() < b.rank_key() {
                let pa = compute_progress(&stages, Some(a.id)).percentage;
                let pb = compute_progress(&stages, Some(b.id)).percentage;
                assert!(pa <= pb, "{} ({pa}) should not exceed {} ({pb})", a.name, b.name);
            }
        }
    }
}

#[test]
fn test_earlier_phase_with_higher_order_is_completed() {
    let late_lead = stage("L9", 1, Phase::Lead, 9);
    let first_production = stage("P1", 2, Phase::Production, 1);
    assert_eq!(
        stage_status(&late_lead, &first_production),
        StageStatus::Completed
    );
    assert_eq!(
        stage_status(&first_production, &late_lead),
        StageStatus::Upcoming
    );
}

#[test]
fn test_phase_steppers_cover_every_phase() {
    let stages = four_stage_template();
    let current = stages[1].clone();
    let steppers = phase_steppers(&stages, Some(&current));

    assert_eq!(steppers.len(), 3);
    assert_eq!(steppers[0].phase, Phase::Lead);
    let lead: Vec<_> = steppers[0].steps.iter().map(|s| s.status).collect();
    assert_eq!(lead, vec![StageStatus::Completed, StageStatus::Current]);
    assert_eq!(steppers[1].steps[0].status, StageStatus::Upcoming);
    assert_eq!(steppers[2].steps[0].status, StageStatus::Upcoming);
}

#[test]
fn test_phase_steppers_without_current_are_upcoming() {
    let steppers = phase_steppers(&four_stage_template(), None);
    assert!(steppers
        .iter()
        .flat_map(|p| p.steps.iter())
        .all(|step| step.status == StageStatus::Upcoming));
}

#[test]
fn test_event_progress_reads_store() {
    let mut store = StageStore::new();
    store.replace(TEMPLATE, four_stage_template());

    let event = EventWorkflow::new(TEMPLATE, Some(Uuid::from_u128(3)));
    let report = event_progress(&store, &event);
    assert_eq!(report.progress.percentage, 75.0);
    assert_eq!(report.steppers.len(), 3);

    let no_template = event_progress(&store, &EventWorkflow::default());
    assert_eq!(no_template.progress.percentage, 0.0);
    assert!(no_template.steppers.is_empty());
}
