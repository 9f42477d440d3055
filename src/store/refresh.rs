use std::collections::BTreeSet;

use tracing::{debug, warn};

use super::{QueryScope, StageStore};
use crate::models::TemplateId;
use crate::service::{ServiceError, StageService};

/// Refetch every stale scope and confirm the results.
///
/// Returns the number of fetches issued. On error the scopes stay marked
/// stale.
pub fn refresh_stale<S: StageService + ?Sized>(
    store: &mut StageStore,
    service: &S,
) -> Result<usize, ServiceError> {
    let scopes = store.take_stale();
    if scopes.is_empty() {
        return Ok(0);
    }

    match refetch(store, service, &scopes) {
        Ok(fetches) => Ok(fetches),
        Err(err) => {
            warn!(error = %err, "Background refresh failed");
            store.stale.extend(scopes);
            Err(err)
        }
    }
}

/// Fetch the authoritative state behind `scopes` and confirm it.
///
/// Template scopes collapse into one template-list fetch; stage scopes
/// collapse into one fetch per template. A template that has disappeared
/// from the server is dropped from the cache.
pub fn refetch<S: StageService + ?Sized>(
    store: &mut StageStore,
    service: &S,
    scopes: &[QueryScope],
) -> Result<usize, ServiceError> {
    let mut refresh_templates = false;
    let mut templates: BTreeSet<TemplateId> = BTreeSet::new();
    for scope in scopes {
        match scope {
            QueryScope::Templates | QueryScope::Template(_) => refresh_templates = true,
            QueryScope::Stages(template_id) => {
                templates.insert(*template_id);
            }
            QueryScope::Stage(stage_id) => {
                if let Some(template_id) = store.template_of(*stage_id) {
                    templates.insert(template_id);
                }
            }
        }
    }

    let mut fetches = 0;
    if refresh_templates {
        let list = service.list_templates()?;
        fetches += 1;
        store.confirm_templates(list);
    }

    for template_id in templates {
        fetches += 1;
        match service.fetch_stages(template_id) {
            Ok(stages) => store.confirm_stages(template_id, stages),
            Err(ServiceError::NotFound(_)) => {
                debug!(template_id = %template_id, "Template gone, dropping cached stages");
                store.remove_stages(template_id);
            }
            Err(err) => return Err(err),
        }
    }

    Ok(fetches)
}
