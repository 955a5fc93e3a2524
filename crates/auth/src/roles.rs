use serde::{Deserialize, Serialize};

use crate::GroupRole;

/// Local permission tier.
///
/// Closed on purpose: the application only distinguishes regular users from
/// administrators.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LocalRole {
    User,
    Admin,
}

impl LocalRole {
    /// Role granted when the group tier is not in [`ROLE_TABLE`].
    pub const FALLBACK: LocalRole = LocalRole::User;

    pub fn as_str(&self) -> &'static str {
        match self {
            LocalRole::User => "user",
            LocalRole::Admin => "admin",
        }
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, LocalRole::Admin)
    }
}

impl core::fmt::Display for LocalRole {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Group tier → local role.
pub const ROLE_TABLE: [(GroupRole, LocalRole); 4] = [
    (GroupRole::Member, LocalRole::User),
    (GroupRole::PowerUser, LocalRole::User),
    (GroupRole::Admin, LocalRole::Admin),
    (GroupRole::SuperAdmin, LocalRole::Admin),
];

/// Map an identity provider group tier to the local role.
///
/// Unrecognized tiers get [`LocalRole::FALLBACK`].
pub fn derive_role(group_role: &GroupRole) -> LocalRole {
    ROLE_TABLE
        .iter()
        .find(|(group, _)| group == group_role)
        .map(|(_, role)| *role)
        .unwrap_or(LocalRole::FALLBACK)
}
