//! Stage Store
//!
//! The single mutable resource of the subsystem: cached templates plus one
//! stage list per template, keyed by template id. Reads are pure
//! projections. Writes come from the mutation runner (speculative patches,
//! rollbacks) and from confirmation handlers (server results).
//!
//! Each stage list keeps the last snapshot that satisfied the density
//! invariant. If a write leaves the list inconsistent, readers keep seeing
//! the last good snapshot instead of a partial one.

mod refresh;
mod scope;
mod snapshot;

use std::collections::{BTreeMap, BTreeSet};
use std::sync::mpsc::{self, Receiver, Sender};

use tracing::{debug, warn};

use crate::models::{Phase, StageId, TemplateId, WorkflowStage, WorkflowTemplate};
use crate::ordering;

pub use refresh::{refetch, refresh_stale};
pub use scope::QueryScope;
pub use snapshot::{RestoreReport, Snapshot};

#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct StageList {
    current: Vec<WorkflowStage>,
    last_good: Vec<WorkflowStage>,
    /// Confirmation clock value of the last server-confirmed write
    confirmed_at: u64,
}

impl StageList {
    fn view(&self) -> &[WorkflowStage] {
        if ordering::is_dense(&self.current) {
            &self.current
        } else {
            &self.last_good
        }
    }
}

#[derive(Debug, Default)]
pub struct StageStore {
    templates: BTreeMap<TemplateId, WorkflowTemplate>,
    templates_confirmed_at: u64,
    stages: BTreeMap<TemplateId, StageList>,
    clock: u64,
    stale: BTreeSet<QueryScope>,
    subscribers: Vec<Sender<QueryScope>>,
}

impl StageStore {
    pub fn new() -> Self {
        Self::default()
    }

    // ------------------------------------------------------------------
    // Stage reads
    // ------------------------------------------------------------------

    /// Stages of one (template, phase) group, sorted by order.
    pub fn stages_for_phase(&self, template_id: TemplateId, phase: Phase) -> Vec<WorkflowStage> {
        ordering::group(self.view(template_id), phase)
            .into_iter()
            .cloned()
            .collect()
    }

    /// Every stage of a template in total rank order.
    ///
    /// Concatenation of [`stages_for_phase`](Self::stages_for_phase) over
    /// the phases in rank order.
    pub fn full_ordered_stages(&self, template_id: TemplateId) -> Vec<WorkflowStage> {
        Phase::ALL
            .iter()
            .flat_map(|phase| self.stages_for_phase(template_id, *phase))
            .collect()
    }

    /// Detail view of one stage.
    pub fn stage(&self, stage_id: StageId) -> Option<&WorkflowStage> {
        self.stages
            .values()
            .flat_map(|list| list.view().iter())
            .find(|s| s.id == stage_id)
    }

    /// Template that owns a cached stage.
    pub fn template_of(&self, stage_id: StageId) -> Option<TemplateId> {
        self.stage(stage_id).map(|s| s.template_id)
    }

    pub fn has_stages(&self, template_id: TemplateId) -> bool {
        self.stages.contains_key(&template_id)
    }

    fn view(&self, template_id: TemplateId) -> &[WorkflowStage] {
        self.stages
            .get(&template_id)
            .map(StageList::view)
            .unwrap_or(&[])
    }

    // ------------------------------------------------------------------
    // Stage writes
    // ------------------------------------------------------------------

    /// Atomically swap the stage list of a template.
    ///
    /// Used for speculative patches; server results go through
    /// [`confirm_stages`](Self::confirm_stages).
    pub fn replace(&mut self, template_id: TemplateId, mut stages: Vec<WorkflowStage>) {
        ordering::sort_by_rank(&mut stages);
        let list = self.stages.entry(template_id).or_default();
        if ordering::is_dense(&stages) {
            list.last_good = stages.clone();
        } else {
            warn!(
                template_id = %template_id,
                "Stage list violates density, readers keep last good snapshot"
            );
        }
        list.current = stages;
    }

    /// Apply a speculative edit to the current stage list of a template.
    pub fn patch_stages(
        &mut self,
        template_id: TemplateId,
        edit: impl FnOnce(&mut Vec<WorkflowStage>),
    ) {
        let mut stages = self
            .stages
            .get(&template_id)
            .map(|list| list.current.clone())
            .unwrap_or_default();
        edit(&mut stages);
        self.replace(template_id, stages);
    }

    /// Accept a server-confirmed stage list as authoritative.
    pub fn confirm_stages(&mut self, template_id: TemplateId, stages: Vec<WorkflowStage>) {
        self.replace(template_id, stages);
        let tick = self.tick();
        if let Some(list) = self.stages.get_mut(&template_id) {
            list.confirmed_at = tick;
        }
        debug!(template_id = %template_id, clock = tick, "Stage list confirmed");
    }

    /// Accept a server-confirmed group, leaving the other phases as they are.
    pub fn confirm_group(
        &mut self,
        template_id: TemplateId,
        phase: Phase,
        group: Vec<WorkflowStage>,
    ) {
        let mut stages: Vec<WorkflowStage> = self
            .stages
            .get(&template_id)
            .map(|list| list.current.clone())
            .unwrap_or_default();
        stages.retain(|s| s.phase != phase);
        stages.extend(group);
        self.confirm_stages(template_id, stages);
    }

    /// Accept a single server-confirmed stage, replacing any cached copy.
    pub fn confirm_stage(&mut self, stage: WorkflowStage) {
        let template_id = stage.template_id;
        let mut stages: Vec<WorkflowStage> = self
            .stages
            .get(&template_id)
            .map(|list| list.current.clone())
            .unwrap_or_default();
        match stages.iter_mut().find(|s| s.id == stage.id) {
            Some(existing) => *existing = stage,
            None => stages.push(stage),
        }
        self.confirm_stages(template_id, stages);
    }

    /// Confirm a created stage, dropping the provisional copy shown while
    /// the request was in flight.
    pub fn confirm_stage_as(&mut self, provisional_id: StageId, stage: WorkflowStage) {
        let template_id = stage.template_id;
        let mut stages: Vec<WorkflowStage> = self
            .stages
            .get(&template_id)
            .map(|list| list.current.clone())
            .unwrap_or_default();
        stages.retain(|s| s.id != provisional_id && s.id != stage.id);
        stages.push(stage);
        self.confirm_stages(template_id, stages);
    }

    pub fn remove_stages(&mut self, template_id: TemplateId) {
        self.stages.remove(&template_id);
    }

    // ------------------------------------------------------------------
    // Templates
    // ------------------------------------------------------------------

    /// Cached templates sorted by name.
    pub fn templates(&self) -> Vec<&WorkflowTemplate> {
        let mut templates: Vec<&WorkflowTemplate> = self.templates.values().collect();
        templates.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        templates
    }

    pub fn template(&self, template_id: TemplateId) -> Option<&WorkflowTemplate> {
        self.templates.get(&template_id)
    }

    /// Speculatively insert or replace a template.
    pub fn put_template(&mut self, template: WorkflowTemplate) {
        self.templates.insert(template.id, template);
    }

    /// Speculatively drop a template and its stage list.
    pub fn remove_template(&mut self, template_id: TemplateId) {
        self.templates.remove(&template_id);
        self.stages.remove(&template_id);
    }

    pub fn confirm_templates(&mut self, templates: Vec<WorkflowTemplate>) {
        self.templates = templates.into_iter().map(|t| (t.id, t)).collect();
        self.templates_confirmed_at = self.tick();
    }

    pub fn confirm_template(&mut self, template: WorkflowTemplate) {
        self.templates.insert(template.id, template);
        self.templates_confirmed_at = self.tick();
    }

    /// Confirm that a template no longer exists on the server.
    pub fn confirm_template_removed(&mut self, template_id: TemplateId) {
        self.templates.remove(&template_id);
        self.stages.remove(&template_id);
        self.templates_confirmed_at = self.tick();
    }

    // ------------------------------------------------------------------
    // Snapshots
    // ------------------------------------------------------------------

    /// Copy every slot behind `scopes`.
    ///
    /// Template scopes share one slot (the template map); stage scopes map
    /// to the stage list of their template.
    pub fn snapshot(&self, scopes: &[QueryScope]) -> Snapshot {
        let mut templates = None;
        let mut stage_templates = BTreeSet::new();

        for scope in scopes {
            match scope {
                QueryScope::Templates | QueryScope::Template(_) => {
                    templates = Some((self.templates.clone(), self.templates_confirmed_at));
                }
                QueryScope::Stages(template_id) => {
                    stage_templates.insert(*template_id);
                }
                QueryScope::Stage(stage_id) => {
                    if let Some(template_id) = self.template_of(*stage_id) {
                        stage_templates.insert(template_id);
                    }
                }
            }
        }

        let stage_lists = stage_templates
            .into_iter()
            .map(|template_id| (template_id, self.stages.get(&template_id).cloned()))
            .collect();

        Snapshot {
            taken_at: self.clock,
            templates,
            stage_lists,
        }
    }

    /// Put back every slot of a snapshot, verbatim.
    ///
    /// Slots confirmed after the snapshot was taken are left alone: the most
    /// recent confirmed state wins over a stale rollback. Those slots may
    /// still carry the failed patch, since later confirmations start from
    /// the current list; they come back in [`RestoreReport::skipped`] for the
    /// caller to refetch.
    pub fn restore(&mut self, snapshot: Snapshot) -> RestoreReport {
        let mut report = RestoreReport::default();
        let taken_at = snapshot.taken_at;

        if let Some(saved) = snapshot.templates {
            if self.templates_confirmed_at > taken_at {
                report.skip_templates(taken_at, saved);
            } else {
                self.put_back_templates(saved);
                report.restored += 1;
            }
        }

        for (template_id, saved) in snapshot.stage_lists {
            let confirmed_at = self
                .stages
                .get(&template_id)
                .map(|list| list.confirmed_at)
                .unwrap_or(0);
            if confirmed_at > taken_at {
                debug!(
                    template_id = %template_id,
                    "Skipping rollback of stage list confirmed after snapshot"
                );
                report.skip_stages(taken_at, template_id, saved);
                continue;
            }
            self.put_back_stages(template_id, saved);
            report.restored += 1;
        }

        report
    }

    /// Put back every slot of a snapshot, confirmed later or not.
    ///
    /// Last resort when a superseded slot cannot be refetched.
    pub fn force_restore(&mut self, snapshot: Snapshot) {
        if let Some(saved) = snapshot.templates {
            self.put_back_templates(saved);
        }
        for (template_id, saved) in snapshot.stage_lists {
            self.put_back_stages(template_id, saved);
        }
    }

    fn put_back_templates(&mut self, saved: (BTreeMap<TemplateId, WorkflowTemplate>, u64)) {
        let (templates, confirmed_at) = saved;
        self.templates = templates;
        self.templates_confirmed_at = confirmed_at;
    }

    fn put_back_stages(&mut self, template_id: TemplateId, saved: Option<StageList>) {
        match saved {
            Some(list) => {
                self.stages.insert(template_id, list);
            }
            None => {
                self.stages.remove(&template_id);
            }
        }
    }

    fn tick(&mut self) -> u64 {
        self.clock += 1;
        self.clock
    }

    // ------------------------------------------------------------------
    // Invalidation
    // ------------------------------------------------------------------

    /// Mark a scope as due for a background refresh and notify subscribers.
    pub fn invalidate(&mut self, scope: QueryScope) {
        self.stale.insert(scope);
        self.subscribers.retain(|tx| tx.send(scope).is_ok());
        debug!(scope = %scope, "Scope invalidated");
    }

    /// Receive every future invalidation.
    pub fn subscribe(&mut self) -> Receiver<QueryScope> {
        let (tx, rx) = mpsc::channel();
        self.subscribers.push(tx);
        rx
    }

    pub fn stale_scopes(&self) -> impl Iterator<Item = &QueryScope> {
        self.stale.iter()
    }

    pub fn is_stale(&self, scope: &QueryScope) -> bool {
        self.stale.contains(scope)
    }

    pub fn take_stale(&mut self) -> Vec<QueryScope> {
        std::mem::take(&mut self.stale).into_iter().collect()
    }
}
