//! Shared test helpers for integration tests

use std::path::Path;
use std::process::{Command, Output};
use tempfile::TempDir;

use stagehand::fs::DataDir;
use stagehand::models::{Phase, StageDraft, StageId, TemplateDraft, TemplateId, WorkflowStage};
use stagehand::mutation::MutationRunner;
use stagehand::service::{MemoryService, StageService};

/// Runner over a fresh in-memory service holding one template with the
/// given stages, loaded into the store.
pub fn runner_with_stages(
    stages: &[(&str, Phase)],
) -> (MutationRunner<MemoryService>, TemplateId, Vec<StageId>) {
    let service = MemoryService::new();
    let template = service
        .create_template(&TemplateDraft::new("Wedding"))
        .expect("Failed to create template");
    let ids = stages
        .iter()
        .map(|(name, phase)| {
            service
                .create_stage(template.id, &StageDraft::new(*name, *phase))
                .expect("Failed to create stage")
                .stage
                .id
        })
        .collect();

    let mut runner = MutationRunner::new(service);
    reload(&mut runner, template.id);
    (runner, template.id, ids)
}

/// Replace the store's view of a template with the service's.
pub fn reload<S: StageService>(runner: &mut MutationRunner<S>, template_id: TemplateId) {
    let templates = runner.service().list_templates().expect("Failed to list templates");
    let stages = runner
        .service()
        .fetch_stages(template_id)
        .expect("Failed to fetch stages");
    runner.store_mut().confirm_templates(templates);
    runner.store_mut().confirm_stages(template_id, stages);
}

/// `(name, order)` of one phase group as the store shows it.
pub fn group<S: StageService>(
    runner: &MutationRunner<S>,
    template_id: TemplateId,
    phase: Phase,
) -> Vec<(String, u32)> {
    runner
        .store()
        .stages_for_phase(template_id, phase)
        .into_iter()
        .map(|s| (s.name, s.order))
        .collect()
}

pub fn pairs(expected: &[(&str, u32)]) -> Vec<(String, u32)> {
    expected.iter().map(|(n, o)| (n.to_string(), *o)).collect()
}

/// Strip timestamps so lists from different sources compare by content.
pub fn shape(stages: &[WorkflowStage]) -> Vec<(StageId, Phase, u32, String)> {
    stages
        .iter()
        .map(|s| (s.id, s.phase, s.order, s.name.clone()))
        .collect()
}

/// Small deterministic generator for operation sequences.
pub struct Lcg(u64);

impl Lcg {
    pub fn new(seed: u64) -> Self {
        Self(seed)
    }

    pub fn below(&mut self, bound: usize) -> usize {
        self.0 = self
            .0
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        ((self.0 >> 33) as usize) % bound.max(1)
    }

    pub fn phase(&mut self) -> Phase {
        Phase::ALL[self.below(Phase::ALL.len())]
    }
}

/// Temp directory with an initialized `.stagehand/`.
pub fn init_workspace() -> TempDir {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    DataDir::new(temp_dir.path())
        .initialize()
        .expect("Failed to initialize data dir");
    temp_dir
}

/// Run the `stagehand` binary in `dir`, isolated from the user's config.
pub fn stagehand(dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_stagehand"))
        .args(args)
        .current_dir(dir)
        .env("XDG_CONFIG_HOME", dir.join("xdg"))
        .env("HOME", dir)
        .env("NO_COLOR", "1")
        .env("STAGEHAND_LOG", "off")
        .output()
        .expect("Failed to run stagehand")
}

pub fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).to_string()
}
