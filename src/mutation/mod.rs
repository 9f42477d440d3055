//! Optimistic Mutation Controller
//!
//! Every mutating operation on templates and stages is a [`Mutation`]
//! intent executed by the one [`MutationRunner`]:
//!
//! 1. validate (failures never reach the service)
//! 2. snapshot every cached view the intent declares
//! 3. apply the intent's speculative effect to the store
//! 4. submit
//! 5. on success, reconcile with the canonical payload
//! 6. on conflict, notify and refetch; on any other failure, restore the
//!    snapshot verbatim
//! 7. mark every declared view as due for a background refresh
//!
//! Intents only describe their own effect; rollback, conflict handling and
//! invalidation live in the runner.

mod runner;
mod stage_ops;
mod template_ops;

use thiserror::Error;

use crate::service::{ServiceError, StageService};
use crate::store::{QueryScope, StageStore};

pub use runner::{MutationRunner, Pending};
pub use stage_ops::{CreateStage, DeleteStage, UpdateStage};
pub use template_ops::{CreateTemplate, DeleteTemplate, UpdateTemplate};

/// A typed optimistic intent.
pub trait Mutation {
    /// Canonical payload returned by the service
    type Response;
    /// Value handed back to the caller on success
    type Output;

    /// Short label for logs and error messages.
    fn describe(&self) -> String;

    /// Pre-submission checks against the current cache.
    fn validate(&self, _store: &StageStore) -> Result<(), ServiceError> {
        Ok(())
    }

    /// Every cached view this intent may touch.
    fn scopes(&self, store: &StageStore) -> Vec<QueryScope>;

    /// Speculative local effect.
    fn apply(&self, store: &mut StageStore);

    fn submit<S: StageService + ?Sized>(&self, service: &S) -> Result<Self::Response, ServiceError>;

    /// Replace speculation with the canonical result.
    fn reconcile(&self, store: &mut StageStore, response: Self::Response)
        -> Reconciled<Self::Output>;
}

/// How a successful response landed in the store.
#[derive(Debug, Clone, PartialEq)]
pub enum Reconciled<T> {
    /// The service accepted the change as sent
    Confirmed(T),
    /// The service renumbered or otherwise corrected the change
    Corrected { value: T, reason: String },
}

/// Transient message for the user; never an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub message: String,
}

impl Notice {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl std::fmt::Display for Notice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

/// What the user sees after a mutation that did not fail.
#[derive(Debug, Clone, PartialEq)]
pub enum Settled<T> {
    /// Succeeded silently
    Confirmed(T),
    /// Succeeded with a corrective refresh. `value` is `None` when the
    /// service rejected the change as a conflict and the view was refetched.
    Corrected { value: Option<T>, notice: Notice },
    /// Nothing to do; no request was sent
    Unchanged,
}

impl<T> Settled<T> {
    pub fn value(&self) -> Option<&T> {
        match self {
            Settled::Confirmed(value) => Some(value),
            Settled::Corrected { value, .. } => value.as_ref(),
            Settled::Unchanged => None,
        }
    }

    pub fn notice(&self) -> Option<&Notice> {
        match self {
            Settled::Corrected { notice, .. } => Some(notice),
            _ => None,
        }
    }
}

#[derive(Debug, Error)]
pub enum MutationError {
    /// Rejected before submission; local state untouched
    #[error("Rejected: {0}")]
    Rejected(#[source] ServiceError),

    /// Submitted, failed, and rolled back
    #[error("{operation} failed and was reverted: {source}")]
    Reverted {
        operation: String,
        #[source]
        source: ServiceError,
    },
}

impl MutationError {
    pub fn service_error(&self) -> &ServiceError {
        match self {
            MutationError::Rejected(source) => source,
            MutationError::Reverted { source, .. } => source,
        }
    }
}
