//! Failed mutations leave the store exactly as it was before they began

use stagehand::models::{
    AutomationKind, Phase, StageDraft, StagePatch, TemplateDraft, TemplatePatch, TriggerTiming,
};
use stagehand::mutation::{
    CreateStage, CreateTemplate, DeleteStage, DeleteTemplate, MutationError, Settled, UpdateStage,
    UpdateTemplate,
};
use stagehand::reorder::{self, StageMove};
use stagehand::service::{ServiceError, StageService};
use stagehand::store::QueryScope;

use super::helpers::{group, pairs, runner_with_stages, shape};

fn transport() -> ServiceError {
    ServiceError::Transport("502 Bad Gateway".into())
}

#[test]
fn test_every_stage_mutation_rolls_back_on_transport_failure() {
    let (mut runner, template_id, ids) = runner_with_stages(&[
        ("A", Phase::Lead),
        ("B", Phase::Lead),
        ("C", Phase::Lead),
        ("P", Phase::Production),
    ]);
    let before = runner.store().full_ordered_stages(template_id);

    let mut front = StageDraft::new("Z", Phase::Lead);
    front.order = Some(1);
    runner.service().fail_next(transport());
    assert!(runner.run(CreateStage::new(template_id, front)).is_err());
    assert_eq!(runner.store().full_ordered_stages(template_id), before);

    runner.service().fail_next(transport());
    assert!(runner.run(DeleteStage::new(ids[0])).is_err());
    assert_eq!(runner.store().full_ordered_stages(template_id), before);

    let patch = StagePatch {
        phase: Some(Phase::PostProduction),
        ..Default::default()
    };
    runner.service().fail_next(transport());
    assert!(runner.run(UpdateStage::new(ids[1], patch)).is_err());
    assert_eq!(runner.store().full_ordered_stages(template_id), before);

    let mv = StageMove {
        template_id,
        phase: Phase::Lead,
        from: 2,
        to: 0,
    };
    runner.service().fail_next(transport());
    let err = reorder::reorder(&mut runner, mv).unwrap_err();
    assert!(matches!(
        err,
        MutationError::Reverted {
            source: ServiceError::Transport(_),
            ..
        }
    ));
    assert_eq!(runner.store().full_ordered_stages(template_id), before);
}

#[test]
fn test_failed_automation_edit_restores_every_field() {
    let (mut runner, template_id, ids) = runner_with_stages(&[
        ("Inquiry", Phase::Lead),
        ("Proposal", Phase::Lead),
        ("Shoot", Phase::Production),
    ]);
    let email = StagePatch {
        is_automated: Some(true),
        automation_kind: Some(Some(AutomationKind::Email)),
        trigger_timing: Some(TriggerTiming::AfterDays(3)),
        email_template: Some(Some("welcome".into())),
        task_description: Some("Send the welcome pack".into()),
        ..Default::default()
    };
    runner.run(UpdateStage::new(ids[1], email)).unwrap();
    let before = runner.store().full_ordered_stages(template_id);

    let to_task = StagePatch {
        name: Some("Follow-up".into()),
        automation_kind: Some(Some(AutomationKind::Task)),
        trigger_timing: Some(TriggerTiming::BeforeDays(7)),
        email_template: Some(None),
        task_description: Some("Call the couple".into()),
        ..Default::default()
    };
    runner.service().fail_next(transport());
    assert!(runner.run(UpdateStage::new(ids[1], to_task)).is_err());
    assert_eq!(runner.store().full_ordered_stages(template_id), before);

    let manual = StagePatch {
        phase: Some(Phase::PostProduction),
        is_automated: Some(false),
        trigger_timing: Some(TriggerTiming::Custom("ON_DELIVERY".into())),
        ..Default::default()
    };
    runner.service().fail_next(transport());
    assert!(runner.run(UpdateStage::new(ids[1], manual)).is_err());
    assert_eq!(runner.store().full_ordered_stages(template_id), before);

    let stage = runner.store().stage(ids[1]).unwrap();
    assert!(stage.is_automated);
    assert_eq!(stage.automation_kind, Some(AutomationKind::Email));
    assert_eq!(stage.trigger_timing, TriggerTiming::AfterDays(3));
    assert_eq!(stage.email_template.as_deref(), Some("welcome"));
    assert_eq!(stage.task_description, "Send the welcome pack");
}

#[test]
fn test_template_mutations_roll_back() {
    let (mut runner, template_id, _) = runner_with_stages(&[("A", Phase::Lead)]);

    runner.service().fail_next(transport());
    assert!(runner
        .run(CreateTemplate::new(TemplateDraft::new("Corporate")))
        .is_err());
    assert_eq!(runner.store().templates().len(), 1);

    runner.service().fail_next(transport());
    assert!(runner
        .run(UpdateTemplate::set_active(template_id, false))
        .is_err());
    assert!(runner.store().template(template_id).unwrap().is_active);

    let patch = TemplatePatch {
        name: Some("Elopement".into()),
        ..Default::default()
    };
    runner.service().fail_next(transport());
    assert!(runner.run(UpdateTemplate::new(template_id, patch)).is_err());
    assert_eq!(runner.store().template(template_id).unwrap().name, "Wedding");

    runner.service().fail_next(transport());
    assert!(runner.run(DeleteTemplate::new(template_id)).is_err());
    assert!(runner.store().template(template_id).is_some());
    assert_eq!(runner.store().full_ordered_stages(template_id).len(), 1);
}

#[test]
fn test_conflict_converges_to_server_state() {
    let (mut runner, template_id, _) =
        runner_with_stages(&[("A", Phase::Lead), ("B", Phase::Lead)]);

    // Another actor appends to the group behind our back
    runner
        .service()
        .catalog_mut()
        .create_stage(template_id, &StageDraft::new("C", Phase::Lead))
        .unwrap();

    let mv = StageMove {
        template_id,
        phase: Phase::Lead,
        from: 1,
        to: 0,
    };
    let settled = reorder::reorder(&mut runner, mv).unwrap();

    assert!(matches!(settled, Settled::Corrected { value: None, .. }));
    assert_eq!(
        group(&runner, template_id, Phase::Lead),
        pairs(&[("A", 1), ("B", 2), ("C", 3)])
    );
}

#[test]
fn test_conflict_with_failed_refetch_rolls_back() {
    let (mut runner, template_id, ids) =
        runner_with_stages(&[("A", Phase::Lead), ("B", Phase::Lead)]);

    let pending = runner
        .begin(UpdateStage::new(
            ids[1],
            StagePatch {
                order: Some(1),
                ..Default::default()
            },
        ))
        .unwrap();
    assert_eq!(
        group(&runner, template_id, Phase::Lead),
        pairs(&[("B", 1), ("A", 2)])
    );

    // The refetch that follows the conflict fails too
    runner.service().fail_next(transport());
    let err = runner
        .settle(pending, Err(ServiceError::Conflict("order taken".into())))
        .unwrap_err();

    assert!(matches!(err, MutationError::Reverted { .. }));
    assert_eq!(
        group(&runner, template_id, Phase::Lead),
        pairs(&[("A", 1), ("B", 2)])
    );
    assert!(runner.store().is_stale(&QueryScope::Stages(template_id)));
}

#[test]
fn test_late_failure_does_not_undo_later_confirmation() {
    let (mut runner, template_id, ids) = runner_with_stages(&[
        ("A", Phase::Lead),
        ("B", Phase::Lead),
        ("C", Phase::Lead),
    ]);

    // Reorder sent first, rename sent second
    let reorder_request = reorder::plan_move(
        &runner.store().stages_for_phase(template_id, Phase::Lead),
        StageMove {
            template_id,
            phase: Phase::Lead,
            from: 0,
            to: 2,
        },
    )
    .unwrap()
    .unwrap()
    .request;
    let first = runner
        .begin(reorder::ReorderStages::new(reorder_request))
        .unwrap();
    let second = runner
        .begin(UpdateStage::new(
            ids[2],
            StagePatch {
                name: Some("Contract".into()),
                ..Default::default()
            },
        ))
        .unwrap();

    // The rename lands first and is confirmed
    let response = runner.submit(&second);
    runner.settle(second, response).unwrap();

    // The reorder times out afterwards
    runner
        .settle(first, Err(ServiceError::Transport("timeout".into())))
        .unwrap_err();

    // The reorder is gone at once and the rename is kept
    assert_eq!(
        group(&runner, template_id, Phase::Lead),
        pairs(&[("A", 1), ("B", 2), ("Contract", 3)])
    );
    let server = runner.service().fetch_stages(template_id).unwrap();
    assert_eq!(shape(&runner.store().full_ordered_stages(template_id)), shape(&server));
}

#[test]
fn test_late_failed_create_leaves_no_provisional_stage() {
    let (mut runner, template_id, ids) =
        runner_with_stages(&[("A", Phase::Lead), ("B", Phase::Lead)]);

    let create = runner
        .begin(CreateStage::new(template_id, StageDraft::new("Ghost", Phase::Lead)))
        .unwrap();
    let provisional = create.mutation().provisional_id();
    let rename = runner
        .begin(UpdateStage::new(
            ids[1],
            StagePatch {
                name: Some("B2".into()),
                ..Default::default()
            },
        ))
        .unwrap();

    let response = runner.submit(&rename);
    runner.settle(rename, response).unwrap();
    let err = runner
        .settle(create, Err(ServiceError::Transport("timeout".into())))
        .unwrap_err();

    assert!(matches!(err, MutationError::Reverted { .. }));
    assert!(runner.store().stage(provisional).is_none());
    assert_eq!(
        group(&runner, template_id, Phase::Lead),
        pairs(&[("A", 1), ("B2", 2)])
    );
    let server = runner.service().fetch_stages(template_id).unwrap();
    assert_eq!(shape(&runner.store().full_ordered_stages(template_id)), shape(&server));
}
