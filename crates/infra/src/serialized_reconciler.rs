//! Serialized SSO reconciliation (application-level entry point).
//!
//! Identity providers may deliver several callbacks for the same user at
//! nearly the same time (double clicks, retried POSTs, multiple tabs). The
//! reconciler's "find by uid, else find by email, else create" sequence is
//! not atomic as a whole, so two such callbacks could both decide to create.
//!
//! ```text
//! SsoAssertion
//!   ↓
//! 1. Acquire the lock for assertion.external_uid
//!   ↓
//! 2. IdentityReconciler::reconcile (lookup / link / create, then session)
//!   ↓
//! 3. Release the lock (idle entries are dropped)
//! ```
//!
//! Different uids proceed in parallel. Store-level unique indexes still
//! reject duplicates if a caller bypasses this type.

use thiserror::Error;

use ssobridge_auth::{
    IdentityReconciler, ReconcileError, Reconciliation, SessionManager, SsoAssertion, UserStore,
};

use crate::{LockError, UidLocks};

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error(transparent)]
    Reconcile(#[from] ReconcileError),

    #[error("could not serialize reconciliation: {0}")]
    Lock(#[from] LockError),
}

/// [`IdentityReconciler`] guarded by a per-external-uid lock.
pub struct SerializedReconciler<S, M> {
    reconciler: IdentityReconciler<S, M>,
    locks: UidLocks,
}

impl<S, M> SerializedReconciler<S, M>
where
    S: UserStore,
    M: SessionManager,
{
    pub fn new(store: S, sessions: M) -> Self {
        Self::from_reconciler(IdentityReconciler::new(store, sessions))
    }

    pub fn from_reconciler(reconciler: IdentityReconciler<S, M>) -> Self {
        Self {
            reconciler,
            locks: UidLocks::new(),
        }
    }

    pub fn reconciler(&self) -> &IdentityReconciler<S, M> {
        &self.reconciler
    }

    pub fn reconcile(&self, assertion: &SsoAssertion) -> Result<Reconciliation, DispatchError> {
        let outcome = self
            .locks
            .with_lock(assertion.external_uid(), || self.reconciler.reconcile(assertion))??;
        Ok(outcome)
    }
}
