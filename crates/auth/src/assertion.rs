use core::fmt;

use ssobridge_core::{DomainError, DomainResult, ValueObject};

/// Group membership tier reported by the identity provider.
///
/// Labels arrive as free text ("Power User", "Super Admin", ...). Anything
/// unrecognized is kept verbatim in `Unknown` so it can still be logged.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum GroupRole {
    Member,
    PowerUser,
    Admin,
    SuperAdmin,
    Unknown(String),
}

impl GroupRole {
    /// Parse an identity provider label.
    ///
    /// Matching ignores ASCII case, ASCII whitespace, `_` and `-`.
    pub fn from_label(label: &str) -> Self {
        let key: String = label
            .chars()
            .filter(|c| !c.is_ascii_whitespace() && *c != '_' && *c != '-')
            .map(|c| c.to_ascii_lowercase())
            .collect();

        match key.as_str() {
            "member" => GroupRole::Member,
            "poweruser" => GroupRole::PowerUser,
            "admin" => GroupRole::Admin,
            "superadmin" => GroupRole::SuperAdmin,
            _ => GroupRole::Unknown(label.to_string()),
        }
    }

    pub fn as_label(&self) -> &str {
        match self {
            GroupRole::Member => "Member",
            GroupRole::PowerUser => "Power User",
            GroupRole::Admin => "Admin",
            GroupRole::SuperAdmin => "Super Admin",
            GroupRole::Unknown(raw) => raw,
        }
    }
}

impl From<&str> for GroupRole {
    fn from(value: &str) -> Self {
        Self::from_label(value)
    }
}

impl fmt::Display for GroupRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_label())
    }
}

/// A parsed identity claim handed over by the SAML layer.
///
/// Immutable once built; construction validates the two keys reconciliation
/// relies on (external uid and email).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SsoAssertion {
    external_uid: String,
    email: String,
    first_name: String,
    last_name: String,
    group_role: GroupRole,
}

impl ValueObject for SsoAssertion {}

impl SsoAssertion {
    pub fn new(
        external_uid: impl Into<String>,
        email: impl Into<String>,
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        group_role: impl Into<GroupRole>,
    ) -> DomainResult<Self> {
        let external_uid = external_uid.into().trim().to_string();
        let email = email.into().trim().to_string();

        if external_uid.is_empty() {
            return Err(DomainError::validation("external uid cannot be empty"));
        }
        if email.is_empty() || !email.contains('@') {
            return Err(DomainError::validation("invalid email format"));
        }

        Ok(Self {
            external_uid,
            email,
            first_name: first_name.into(),
            last_name: last_name.into(),
            group_role: group_role.into(),
        })
    }

    pub fn external_uid(&self) -> &str {
        &self.external_uid
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn first_name(&self) -> &str {
        &self.first_name
    }

    pub fn last_name(&self) -> &str {
        &self.last_name
    }

    pub fn group_role(&self) -> &GroupRole {
        &self.group_role
    }
}
