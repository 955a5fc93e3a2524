//! Assertion → local account reconciliation.
//!
//! Three-way branch, evaluated in order:
//! 1. external uid already linked → returning user, refresh display fields
//! 2. email already known → link the external uid, refresh display fields
//! 3. otherwise → provision a new account with a derived role
//!
//! A session is then started for whichever account was resolved.
//!
//! Concurrent callbacks for the same external uid must be serialized by the
//! caller, otherwise two of them can both reach branch 3.

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::{
    AccountUpdate, LocalAccount, NewAccount, SessionError, SessionManager, SessionToken,
    SsoAssertion, StoreError, UserStore,
};

/// Which branch resolved the account.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcileOutcome {
    /// Matched by external uid.
    Returning,
    /// Matched by email; external uid now linked.
    Linked,
    /// No match; account provisioned.
    Created,
}

impl core::fmt::Display for ReconcileOutcome {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            ReconcileOutcome::Returning => write!(f, "returning"),
            ReconcileOutcome::Linked => write!(f, "linked"),
            ReconcileOutcome::Created => write!(f, "created"),
        }
    }
}

/// Result of a successful reconciliation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reconciliation {
    pub account: LocalAccount,
    pub outcome: ReconcileOutcome,
    pub session: SessionToken,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReconcileError {
    #[error("user store lookup failed: {0}")]
    LookupFailure(StoreError),

    #[error("email '{email}' is already bound to a different external identity")]
    DuplicateEmail { email: String },

    /// Only reachable when callers skip per-uid serialization.
    #[error("external uid '{external_uid}' is already linked to another account")]
    DuplicateExternalUid { external_uid: String },

    #[error("session could not be started: {0}")]
    Session(#[from] SessionError),
}

impl From<StoreError> for ReconcileError {
    fn from(value: StoreError) -> Self {
        match value {
            StoreError::DuplicateEmail(email) => ReconcileError::DuplicateEmail { email },
            StoreError::DuplicateExternalUid(external_uid) => {
                ReconcileError::DuplicateExternalUid { external_uid }
            }
            other => ReconcileError::LookupFailure(other),
        }
    }
}

pub struct IdentityReconciler<S, M> {
    store: S,
    sessions: M,
}

impl<S, M> IdentityReconciler<S, M>
where
    S: UserStore,
    M: SessionManager,
{
    pub fn new(store: S, sessions: M) -> Self {
        Self { store, sessions }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn sessions(&self) -> &M {
        &self.sessions
    }

    /// Resolve the local account for `assertion` and start a session for it.
    ///
    /// A session failure is returned as-is; an account created or linked
    /// before the failure stays in the store.
    #[tracing::instrument(
        name = "reconcile",
        skip_all,
        fields(external_uid = %assertion.external_uid(), group_role = %assertion.group_role())
    )]
    pub fn reconcile(&self, assertion: &SsoAssertion) -> Result<Reconciliation, ReconcileError> {
        let (account, outcome) = self.resolve(assertion)?;

        let session = match self.sessions.start(account.local_id) {
            Ok(token) => token,
            Err(err) => {
                warn!(local_id = %account.local_id, %outcome, error = %err, "session refused");
                return Err(err.into());
            }
        };

        info!(local_id = %account.local_id, %outcome, role = %account.role, "sso user reconciled");

        Ok(Reconciliation {
            account,
            outcome,
            session,
        })
    }

    fn resolve(
        &self,
        assertion: &SsoAssertion,
    ) -> Result<(LocalAccount, ReconcileOutcome), ReconcileError> {
        if let Some(existing) = self.store.find_by_external_uid(assertion.external_uid())? {
            debug!(local_id = %existing.local_id, "matched by external uid");
            let account = self.apply(existing, AccountUpdate::refresh(assertion))?;
            return Ok((account, ReconcileOutcome::Returning));
        }

        if let Some(existing) = self.store.find_by_email(assertion.email())? {
            debug!(local_id = %existing.local_id, "matched by email");
            if let Some(linked) = existing.external_uid.as_deref() {
                if linked != assertion.external_uid() {
                    warn!(
                        local_id = %existing.local_id,
                        linked_uid = %linked,
                        "email belongs to an account linked to another identity"
                    );
                    return Err(ReconcileError::DuplicateEmail {
                        email: assertion.email().to_string(),
                    });
                }
            }
            let account = self.apply(existing, AccountUpdate::link(assertion))?;
            return Ok((account, ReconcileOutcome::Linked));
        }

        let account = self.store.create(NewAccount::from_assertion(assertion))?;
        debug!(local_id = %account.local_id, role = %account.role, "provisioned new account");
        Ok((account, ReconcileOutcome::Created))
    }

    /// Write `update` and read the stored record back.
    fn apply(
        &self,
        account: LocalAccount,
        update: AccountUpdate,
    ) -> Result<LocalAccount, ReconcileError> {
        let local_id = account.local_id;

        if !self.store.update(local_id, update)? {
            return Err(ReconcileError::LookupFailure(StoreError::NotFound(local_id)));
        }

        self.store
            .get(local_id)?
            .ok_or(ReconcileError::LookupFailure(StoreError::NotFound(local_id)))
    }
}
