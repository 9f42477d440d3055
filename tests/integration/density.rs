//! Every phase group stays numbered 1..n across arbitrary mutation sequences

use stagehand::models::{Phase, StageDraft, StagePatch, TemplateId};
use stagehand::mutation::{CreateStage, DeleteStage, MutationRunner, UpdateStage};
use stagehand::ordering;
use stagehand::reorder::{self, StageMove};
use stagehand::service::{MemoryService, StageService};

use super::helpers::{group, pairs, runner_with_stages, shape, Lcg};

fn assert_dense(runner: &MutationRunner<MemoryService>, template_id: TemplateId, step: usize) {
    let local = runner.store().full_ordered_stages(template_id);
    assert!(
        ordering::is_dense(&local),
        "local view not dense after step {step}: {:?}",
        shape(&local)
    );

    let server = runner.service().fetch_stages(template_id).unwrap();
    assert!(ordering::is_dense(&server), "server not dense after step {step}");
}

fn random_step(
    runner: &mut MutationRunner<MemoryService>,
    template_id: TemplateId,
    rng: &mut Lcg,
    step: usize,
) {
    let stages = runner.store().full_ordered_stages(template_id);
    let pick = |rng: &mut Lcg| stages[rng.below(stages.len())].id;

    match rng.below(5) {
        0 | 1 => {
            let mut draft = StageDraft::new(format!("S{step}"), rng.phase());
            if rng.below(2) == 0 {
                draft.order = Some(rng.below(6) as u32 + 1);
            }
            runner.run(CreateStage::new(template_id, draft)).unwrap();
        }
        2 if !stages.is_empty() => {
            runner.run(DeleteStage::new(pick(rng))).unwrap();
        }
        3 if !stages.is_empty() => {
            let patch = StagePatch {
                phase: Some(rng.phase()),
                order: Some(rng.below(6) as u32 + 1),
                ..Default::default()
            };
            runner.run(UpdateStage::new(pick(rng), patch)).unwrap();
        }
        _ => {
            let phase = rng.phase();
            let len = runner.store().stages_for_phase(template_id, phase).len();
            let mv = StageMove {
                template_id,
                phase,
                from: rng.below(len.max(1)),
                to: rng.below(len + 1),
            };
            reorder::reorder(runner, mv).unwrap();
        }
    }
}

#[test]
fn test_random_sequences_keep_groups_dense() {
    for seed in [1, 7, 42, 1234, 99_999] {
        let (mut runner, template_id, _) = runner_with_stages(&[]);
        let mut rng = Lcg::new(seed);

        for step in 0..60 {
            random_step(&mut runner, template_id, &mut rng, step);
            assert_dense(&runner, template_id, step);
        }

        runner.refresh().unwrap();
        let local = runner.store().full_ordered_stages(template_id);
        let server = runner.service().fetch_stages(template_id).unwrap();
        assert_eq!(shape(&local), shape(&server), "seed {seed} diverged");
    }
}

#[test]
fn test_delete_middle_stage_closes_gap() {
    let (mut runner, template_id, ids) =
        runner_with_stages(&[("A", Phase::Lead), ("B", Phase::Lead), ("C", Phase::Lead)]);

    runner.run(DeleteStage::new(ids[1])).unwrap();

    assert_eq!(
        group(&runner, template_id, Phase::Lead),
        pairs(&[("A", 1), ("C", 2)])
    );
}

#[test]
fn test_phase_change_appends_and_renumbers_source() {
    let (mut runner, template_id, ids) = runner_with_stages(&[
        ("A", Phase::Lead),
        ("B", Phase::Lead),
        ("C", Phase::Lead),
        ("P", Phase::Production),
    ]);

    let patch = StagePatch {
        phase: Some(Phase::Production),
        ..Default::default()
    };
    runner.run(UpdateStage::new(ids[1], patch)).unwrap();

    assert_eq!(
        group(&runner, template_id, Phase::Lead),
        pairs(&[("A", 1), ("C", 2)])
    );
    assert_eq!(
        group(&runner, template_id, Phase::Production),
        pairs(&[("P", 1), ("B", 2)])
    );
}
