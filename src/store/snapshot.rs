use std::collections::BTreeMap;

use crate::models::{TemplateId, WorkflowTemplate};

use super::{QueryScope, StageList};

/// Verbatim copy of the cached views a mutation may touch.
///
/// `taken_at` is the store's confirmation clock when the copy was made.
/// A slot confirmed after that point holds newer authoritative data and is
/// not overwritten on restore.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub(super) taken_at: u64,
    pub(super) templates: Option<(BTreeMap<TemplateId, WorkflowTemplate>, u64)>,
    pub(super) stage_lists: Vec<(TemplateId, Option<StageList>)>,
}

impl Snapshot {
    pub fn taken_at(&self) -> u64 {
        self.taken_at
    }

    pub fn covers_templates(&self) -> bool {
        self.templates.is_some()
    }

    pub fn stage_templates(&self) -> impl Iterator<Item = TemplateId> + '_ {
        self.stage_lists.iter().map(|(id, _)| *id)
    }

    /// Scopes whose slots this snapshot holds.
    pub fn scopes(&self) -> Vec<QueryScope> {
        let mut scopes = Vec::new();
        if self.templates.is_some() {
            scopes.push(QueryScope::Templates);
        }
        scopes.extend(self.stage_templates().map(QueryScope::Stages));
        scopes
    }
}

/// What a restore actually did.
#[derive(Debug, Clone, Default)]
pub struct RestoreReport {
    pub restored: usize,
    /// Slots left alone because a later confirmation superseded them
    pub superseded: usize,
    /// The superseded slots as they were at snapshot time
    pub skipped: Option<Snapshot>,
}

impl RestoreReport {
    pub(super) fn skip_templates(
        &mut self,
        taken_at: u64,
        saved: (BTreeMap<TemplateId, WorkflowTemplate>, u64),
    ) {
        self.superseded += 1;
        self.skipped_mut(taken_at).templates = Some(saved);
    }

    pub(super) fn skip_stages(
        &mut self,
        taken_at: u64,
        template_id: TemplateId,
        saved: Option<StageList>,
    ) {
        self.superseded += 1;
        self.skipped_mut(taken_at).stage_lists.push((template_id, saved));
    }

    fn skipped_mut(&mut self, taken_at: u64) -> &mut Snapshot {
        self.skipped.get_or_insert_with(|| Snapshot {
            taken_at,
            templates: None,
            stage_lists: Vec::new(),
        })
    }

    pub fn take_skipped(&mut self) -> Option<Snapshot> {
        self.skipped.take()
    }
}
