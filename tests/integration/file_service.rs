//! Mutations against the file-backed catalog, including two actors sharing it

use stagehand::models::{EventWorkflow, Phase, StageDraft, TemplateDraft};
use stagehand::mutation::{CreateStage, CreateTemplate, DeleteStage, MutationRunner, Settled};
use stagehand::progress::event_progress;
use stagehand::reorder::{self, StageMove};
use stagehand::service::{FileService, StageService};

use super::helpers::{group, init_workspace, pairs, reload, shape};

#[test]
fn test_mutations_persist_to_catalog_file() {
    let temp_dir = init_workspace();
    let catalog_path = temp_dir.path().join(".stagehand").join("catalog.json");
    let mut runner = MutationRunner::new(FileService::new(&catalog_path));

    let template = match runner
        .run(CreateTemplate::new(TemplateDraft::new("Wedding")))
        .unwrap()
    {
        Settled::Confirmed(template) => template,
        other => panic!("expected confirmation, got {other:?}"),
    };
    for (name, phase) in [
        ("Inquiry", Phase::Lead),
        ("Proposal", Phase::Lead),
        ("Contract", Phase::Lead),
        ("Shoot", Phase::Production),
    ] {
        runner
            .run(CreateStage::new(template.id, StageDraft::new(name, phase)))
            .unwrap();
    }

    let proposal = runner.store().stages_for_phase(template.id, Phase::Lead)[1].id;
    runner.run(DeleteStage::new(proposal)).unwrap();

    // A fresh service over the same file sees the same records
    let other = FileService::new(&catalog_path);
    let stored = other.fetch_stages(template.id).unwrap();
    assert_eq!(
        shape(&stored),
        shape(&runner.store().full_ordered_stages(template.id))
    );
    assert_eq!(
        group(&runner, template.id, Phase::Lead),
        pairs(&[("Inquiry", 1), ("Contract", 2)])
    );

    let shoot = runner.store().stages_for_phase(template.id, Phase::Production)[0].id;
    let report = event_progress(runner.store(), &EventWorkflow::new(template.id, Some(shoot)));
    assert_eq!(report.progress.percentage, 100.0);
}

#[test]
fn test_second_actor_change_is_recovered_by_refetch() {
    let temp_dir = init_workspace();
    let catalog_path = temp_dir.path().join(".stagehand").join("catalog.json");

    let setup = FileService::new(&catalog_path);
    let template = setup.create_template(&TemplateDraft::new("Corporate")).unwrap();
    for name in ["Brief", "Venue", "Catering"] {
        setup
            .create_stage(template.id, &StageDraft::new(name, Phase::Lead))
            .unwrap();
    }

    let mut first = MutationRunner::new(FileService::new(&catalog_path));
    reload(&mut first, template.id);

    let mut second = MutationRunner::new(FileService::new(&catalog_path));
    reload(&mut second, template.id);
    second
        .run(CreateStage::new(
            template.id,
            StageDraft::new("Budget", Phase::Lead),
        ))
        .unwrap();

    // The first actor still thinks the group has three stages
    let settled = reorder::reorder(
        &mut first,
        StageMove {
            template_id: template.id,
            phase: Phase::Lead,
            from: 2,
            to: 0,
        },
    )
    .unwrap();

    assert!(settled.notice().is_some());
    assert_eq!(
        group(&first, template.id, Phase::Lead),
        pairs(&[("Brief", 1), ("Venue", 2), ("Catering", 3), ("Budget", 4)])
    );
}

#[test]
fn test_missing_catalog_reads_as_transport_failure() {
    let temp_dir = tempfile::TempDir::new().unwrap();
    let service = FileService::new(temp_dir.path().join("catalog.json"));
    let mut runner = MutationRunner::new(service);

    let err = runner
        .run(CreateTemplate::new(TemplateDraft::new("Wedding")))
        .unwrap_err();
    assert!(err.to_string().contains("stagehand init"));
    assert!(runner.store().templates().is_empty());
}
