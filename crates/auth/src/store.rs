use std::sync::Arc;

use thiserror::Error;

use ssobridge_core::LocalId;

use crate::{AccountUpdate, LocalAccount, NewAccount};

/// Persistence boundary for local accounts.
///
/// Implementations must make each call atomic and must reject writes that
/// would give two accounts the same external uid or the same normalized email.
pub trait UserStore: Send + Sync {
    fn get(&self, local_id: LocalId) -> Result<Option<LocalAccount>, StoreError>;

    fn find_by_external_uid(&self, external_uid: &str) -> Result<Option<LocalAccount>, StoreError>;

    /// Email comparison uses [`normalize_email`].
    fn find_by_email(&self, email: &str) -> Result<Option<LocalAccount>, StoreError>;

    fn create(&self, fields: NewAccount) -> Result<LocalAccount, StoreError>;

    /// Returns `false` when no account has `local_id`.
    fn update(&self, local_id: LocalId, fields: AccountUpdate) -> Result<bool, StoreError>;
}

impl<S> UserStore for Arc<S>
where
    S: UserStore + ?Sized,
{
    fn get(&self, local_id: LocalId) -> Result<Option<LocalAccount>, StoreError> {
        (**self).get(local_id)
    }

    fn find_by_external_uid(&self, external_uid: &str) -> Result<Option<LocalAccount>, StoreError> {
        (**self).find_by_external_uid(external_uid)
    }

    fn find_by_email(&self, email: &str) -> Result<Option<LocalAccount>, StoreError> {
        (**self).find_by_email(email)
    }

    fn create(&self, fields: NewAccount) -> Result<LocalAccount, StoreError> {
        (**self).create(fields)
    }

    fn update(&self, local_id: LocalId, fields: AccountUpdate) -> Result<bool, StoreError> {
        (**self).update(local_id, fields)
    }
}

/// User store error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("user store unavailable: {0}")]
    Unavailable(String),

    #[error("account not found: {0}")]
    NotFound(LocalId),

    #[error("email already in use: {0}")]
    DuplicateEmail(String),

    #[error("external uid already linked: {0}")]
    DuplicateExternalUid(String),
}

/// Key used for email uniqueness and lookup.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_ascii_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_email_trims_and_lowercases() {
        assert_eq!(normalize_email("  John.Doe@Example.COM "), "john.doe@example.com");
    }
}
