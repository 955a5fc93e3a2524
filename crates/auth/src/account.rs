//! Local account record and the field sets used to create or change it.

use chrono::{DateTime, Utc};
use rand::{Rng, distr::Alphanumeric};
use serde::{Deserialize, Serialize};

use ssobridge_core::{Entity, LocalId};

use crate::{LocalRole, SsoAssertion, derive_role, unique_display_name};

const PLACEHOLDER_PASSWORD_LEN: usize = 20;

// ─────────────────────────────────────────────────────────────────────────────
// Account Status
// ─────────────────────────────────────────────────────────────────────────────

/// Whether the account may sign in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum AccountStatus {
    #[default]
    Active,
    /// Blocked accounts are still matched by reconciliation but cannot hold a session.
    Blocked,
}

impl core::fmt::Display for AccountStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            AccountStatus::Active => write!(f, "Active"),
            AccountStatus::Blocked => write!(f, "Blocked"),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Local Account
// ─────────────────────────────────────────────────────────────────────────────

/// The application's own user record.
///
/// # Invariants (enforced by the store)
/// - At most one account per non-null `external_uid`.
/// - At most one account per normalized `email`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalAccount {
    pub local_id: LocalId,
    pub external_uid: Option<String>,
    pub display_name: String,
    pub email: String,
    pub role: LocalRole,
    pub status: AccountStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Entity for LocalAccount {
    type Id = LocalId;

    fn id(&self) -> &Self::Id {
        &self.local_id
    }
}

impl LocalAccount {
    pub fn is_active(&self) -> bool {
        self.status == AccountStatus::Active
    }

    pub fn is_linked_to(&self, external_uid: &str) -> bool {
        self.external_uid.as_deref() == Some(external_uid)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Field Sets
// ─────────────────────────────────────────────────────────────────────────────

/// Fields for provisioning a brand new account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAccount {
    /// `None` for accounts provisioned outside SSO; they can be linked later by email.
    pub external_uid: Option<String>,
    pub display_name: String,
    pub email: String,
    pub role: LocalRole,
    /// Random credential so a provisioned account never has an empty password.
    /// Users authenticate through SSO and never see it.
    pub placeholder_password: String,
}

impl NewAccount {
    pub fn from_assertion(assertion: &SsoAssertion) -> Self {
        Self {
            external_uid: Some(assertion.external_uid().to_string()),
            display_name: unique_display_name(assertion),
            email: assertion.email().to_string(),
            role: derive_role(assertion.group_role()),
            placeholder_password: placeholder_password(),
        }
    }

    /// An account that exists before its owner ever signs in through SSO.
    pub fn local(display_name: impl Into<String>, email: impl Into<String>, role: LocalRole) -> Self {
        Self {
            external_uid: None,
            display_name: display_name.into(),
            email: email.into(),
            role,
            placeholder_password: placeholder_password(),
        }
    }
}

/// Partial update; `None` leaves the stored value untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccountUpdate {
    pub display_name: Option<String>,
    pub email: Option<String>,
    pub external_uid: Option<String>,
}

impl AccountUpdate {
    /// Display name and email as asserted by the identity provider.
    pub fn refresh(assertion: &SsoAssertion) -> Self {
        Self {
            display_name: Some(unique_display_name(assertion)),
            email: Some(assertion.email().to_string()),
            external_uid: None,
        }
    }

    /// [`AccountUpdate::refresh`] plus linking the external uid.
    pub fn link(assertion: &SsoAssertion) -> Self {
        Self {
            external_uid: Some(assertion.external_uid().to_string()),
            ..Self::refresh(assertion)
        }
    }

    pub fn is_empty(&self) -> bool {
        self.display_name.is_none() && self.email.is_none() && self.external_uid.is_none()
    }
}

fn placeholder_password() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(PLACEHOLDER_PASSWORD_LEN)
        .map(char::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assertion(role: &str) -> SsoAssertion {
        SsoAssertion::new("usr-1", "john@example.com", "John", "Doe", role).unwrap()
    }

    #[test]
    fn new_account_derives_everything_from_assertion() {
        let new = NewAccount::from_assertion(&assertion("Super Admin"));

        assert_eq!(new.external_uid.as_deref(), Some("usr-1"));
        assert_eq!(new.display_name, "John_Doe_usr-1");
        assert_eq!(new.email, "john@example.com");
        assert_eq!(new.role, LocalRole::Admin);
    }

    #[test]
    fn placeholder_password_is_random_alphanumeric() {
        let a = NewAccount::from_assertion(&assertion("Member"));
        let b = NewAccount::from_assertion(&assertion("Member"));

        assert_eq!(a.placeholder_password.len(), 20);
        assert!(a.placeholder_password.chars().all(|c| c.is_ascii_alphanumeric()));
        assert_ne!(a.placeholder_password, b.placeholder_password);
    }

    #[test]
    fn local_account_has_no_external_uid() {
        let new = NewAccount::local("jdoe", "john@example.com", LocalRole::Admin);

        assert!(new.external_uid.is_none());
        assert_eq!(new.display_name, "jdoe");
        assert_eq!(new.placeholder_password.len(), 20);
    }

    #[test]
    fn entity_id_is_local_id() {
        let now = chrono::Utc::now();
        let account = LocalAccount {
            local_id: LocalId::new(),
            external_uid: Some("usr-1".to_string()),
            display_name: "John_Doe_usr-1".to_string(),
            email: "john@example.com".to_string(),
            role: LocalRole::User,
            status: AccountStatus::default(),
            created_at: now,
            updated_at: now,
        };

        assert_eq!(account.id(), &account.local_id);
        assert!(account.is_active());
        assert!(account.is_linked_to("usr-1"));
        assert!(!account.is_linked_to("usr-2"));
    }

    #[test]
    fn refresh_does_not_link() {
        let update = AccountUpdate::refresh(&assertion("Member"));
        assert_eq!(update.display_name.as_deref(), Some("John_Doe_usr-1"));
        assert!(update.external_uid.is_none());
    }

    #[test]
    fn link_sets_external_uid() {
        let update = AccountUpdate::link(&assertion("Member"));
        assert_eq!(update.external_uid.as_deref(), Some("usr-1"));
        assert_eq!(update.email.as_deref(), Some("john@example.com"));
        assert!(!update.is_empty());
        assert!(AccountUpdate::default().is_empty());
    }
}
