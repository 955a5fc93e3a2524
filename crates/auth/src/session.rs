use std::sync::Arc;

use rand::{Rng, distr::Alphanumeric};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use ssobridge_core::LocalId;

use crate::StoreError;

const TOKEN_LEN: usize = 43;

/// Opaque session reference handed back to the caller (e.g. put in a cookie).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionToken(String);

impl SessionToken {
    /// Fresh random token (~256 bits of entropy).
    pub fn generate() -> Self {
        let token = rand::rng()
            .sample_iter(&Alphanumeric)
            .take(TOKEN_LEN)
            .map(char::from)
            .collect();
        Self(token)
    }

    pub fn from_string(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for SessionToken {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("no local account {0}")]
    UnknownAccount(LocalId),

    #[error("account {0} is not active")]
    Inactive(LocalId),

    #[error("account lookup failed: {0}")]
    Store(#[from] StoreError),

    #[error("session registry unavailable: {0}")]
    Unavailable(String),
}

/// Issues local sessions for resolved accounts.
pub trait SessionManager: Send + Sync {
    fn start(&self, local_id: LocalId) -> Result<SessionToken, SessionError>;
}

impl<M> SessionManager for Arc<M>
where
    M: SessionManager + ?Sized,
{
    fn start(&self, local_id: LocalId) -> Result<SessionToken, SessionError> {
        (**self).start(local_id)
    }
}
