use tracing::{debug, info, warn};

use super::{Mutation, MutationError, Notice, Reconciled, Settled};
use crate::service::{ServiceError, StageService};
use crate::store::{self, QueryScope, Snapshot, StageStore};

/// A mutation whose speculative effect is in the store and whose response
/// has not been settled yet.
#[derive(Debug)]
pub struct Pending<M> {
    mutation: M,
    snapshot: Snapshot,
    scopes: Vec<QueryScope>,
}

impl<M> Pending<M> {
    pub fn mutation(&self) -> &M {
        &self.mutation
    }

    pub fn scopes(&self) -> &[QueryScope] {
        &self.scopes
    }
}

/// Owns the store and the service; the only writer of the store.
///
/// Several mutations may be in flight at once through [`begin`] and
/// [`settle`]. Results are applied in the order they are settled, which is
/// the order responses arrive, not the order requests were sent.
///
/// [`begin`]: MutationRunner::begin
/// [`settle`]: MutationRunner::settle
#[derive(Debug)]
pub struct MutationRunner<S> {
    service: S,
    store: StageStore,
}

impl<S: StageService> MutationRunner<S> {
    pub fn new(service: S) -> Self {
        Self::with_store(service, StageStore::new())
    }

    pub fn with_store(service: S, store: StageStore) -> Self {
        Self { service, store }
    }

    pub fn store(&self) -> &StageStore {
        &self.store
    }

    pub fn service(&self) -> &S {
        &self.service
    }

    /// Mutable store access for loading and background refresh.
    pub fn store_mut(&mut self) -> &mut StageStore {
        &mut self.store
    }

    pub fn into_parts(self) -> (S, StageStore) {
        (self.service, self.store)
    }

    /// Begin, submit and settle in one go.
    pub fn run<M: Mutation>(&mut self, mutation: M) -> Result<Settled<M::Output>, MutationError> {
        let pending = self.begin(mutation)?;
        let response = self.submit(&pending);
        self.settle(pending, response)
    }

    /// Validate, snapshot and apply the speculative effect.
    pub fn begin<M: Mutation>(&mut self, mutation: M) -> Result<Pending<M>, MutationError> {
        mutation
            .validate(&self.store)
            .map_err(MutationError::Rejected)?;

        let scopes = mutation.scopes(&self.store);
        let snapshot = self.store.snapshot(&scopes);
        mutation.apply(&mut self.store);
        debug!(
            operation = %mutation.describe(),
            scopes = scopes.len(),
            "Applied optimistic patch"
        );

        Ok(Pending {
            mutation,
            snapshot,
            scopes,
        })
    }

    pub fn submit<M: Mutation>(&self, pending: &Pending<M>) -> Result<M::Response, ServiceError> {
        pending.mutation.submit(&self.service)
    }

    /// Land a response in the store.
    ///
    /// Conflicts are recovered by refetching the affected views. Any other
    /// failure restores the snapshot; views confirmed by a later mutation in
    /// the meantime are refetched instead. Every affected view is
    /// invalidated whatever the outcome.
    pub fn settle<M: Mutation>(
        &mut self,
        pending: Pending<M>,
        response: Result<M::Response, ServiceError>,
    ) -> Result<Settled<M::Output>, MutationError> {
        let Pending {
            mutation,
            snapshot,
            scopes,
        } = pending;
        let operation = mutation.describe();

        let outcome = match response {
            Ok(payload) => match mutation.reconcile(&mut self.store, payload) {
                Reconciled::Confirmed(value) => {
                    debug!(operation = %operation, "Mutation confirmed");
                    Ok(Settled::Confirmed(value))
                }
                Reconciled::Corrected { value, reason } => {
                    // The corrected payload is already confirmed; the views are
                    // marked stale below and picked up by the next refresh.
                    info!(operation = %operation, reason = %reason, "Server corrected mutation");
                    Ok(Settled::Corrected {
                        value: Some(value),
                        notice: Notice::new(format!("{reason}; refreshing view")),
                    })
                }
            },
            Err(err) if err.is_conflict() => {
                info!(operation = %operation, error = %err, "Conflict, refetching authoritative state");
                match store::refetch(&mut self.store, &self.service, &scopes) {
                    Ok(_) => Ok(Settled::Corrected {
                        value: None,
                        notice: Notice::new(format!(
                            "{operation} conflicted with another change; view refreshed"
                        )),
                    }),
                    Err(refetch_err) => {
                        self.rollback(&operation, snapshot);
                        Err(MutationError::Reverted {
                            operation: operation.clone(),
                            source: refetch_err,
                        })
                    }
                }
            }
            Err(err) => {
                self.rollback(&operation, snapshot);
                Err(MutationError::Reverted {
                    operation: operation.clone(),
                    source: err,
                })
            }
        };

        for scope in &scopes {
            self.store.invalidate(*scope);
        }

        outcome
    }

    /// Pull every stale view from the service.
    pub fn refresh(&mut self) -> Result<usize, ServiceError> {
        store::refresh_stale(&mut self.store, &self.service)
    }

    /// Restore the snapshot, then bring superseded views back to server
    /// state. A later confirmation started from the patched list, so those
    /// views still show the failed patch.
    fn rollback(&mut self, operation: &str, snapshot: Snapshot) {
        let mut report = self.store.restore(snapshot);
        warn!(
            operation = %operation,
            restored = report.restored,
            superseded = report.superseded,
            "Rolled back optimistic patch"
        );

        let Some(skipped) = report.take_skipped() else {
            return;
        };
        let scopes = skipped.scopes();
        if let Err(err) = store::refetch(&mut self.store, &self.service, &scopes) {
            warn!(
                operation = %operation,
                error = %err,
                "Refetch of superseded views failed, restoring snapshot"
            );
            self.store.force_restore(skipped);
        }
    }
}
