use std::collections::HashMap;
use std::sync::RwLock;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use ssobridge_auth::{SessionError, SessionManager, SessionToken, UserStore};
use ssobridge_core::LocalId;

use crate::SsoConfig;

/// A local session bound to one account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub token: SessionToken,
    pub local_id: LocalId,
    /// External uid the account was linked to when the session started.
    pub external_uid: Option<String>,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    /// After this instant the identity provider session should be re-validated.
    pub recheck_at: DateTime<Utc>,
}

impl Session {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    pub fn needs_recheck(&self, now: DateTime<Utc>) -> bool {
        now >= self.recheck_at
    }
}

/// Session registry backed by a map, checking accounts through a [`UserStore`].
///
/// Only active accounts can start a session.
#[derive(Debug)]
pub struct InMemorySessionManager<S> {
    store: S,
    ttl: Duration,
    recheck_interval: Duration,
    sessions: RwLock<HashMap<SessionToken, Session>>,
}

impl<S> InMemorySessionManager<S>
where
    S: UserStore,
{
    pub fn new(store: S, config: &SsoConfig) -> Self {
        Self {
            store,
            ttl: config.session_ttl(),
            recheck_interval: config.session_recheck(),
            sessions: RwLock::new(HashMap::new()),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Live session for `token`, if any.
    pub fn get(&self, token: &SessionToken) -> Option<Session> {
        self.get_at(token, Utc::now())
    }

    pub fn get_at(&self, token: &SessionToken, now: DateTime<Utc>) -> Option<Session> {
        let sessions = self.sessions.read().ok()?;
        sessions
            .get(token)
            .filter(|s| !s.is_expired(now))
            .cloned()
    }

    /// `None` when the session is unknown or expired.
    pub fn needs_recheck(&self, token: &SessionToken, now: DateTime<Utc>) -> Option<bool> {
        self.get_at(token, now).map(|s| s.needs_recheck(now))
    }

    /// Push the recheck deadline forward after the identity provider confirmed the session.
    pub fn mark_rechecked(&self, token: &SessionToken, now: DateTime<Utc>) -> bool {
        let Ok(mut sessions) = self.sessions.write() else {
            return false;
        };
        match sessions.get_mut(token) {
            Some(session) if !session.is_expired(now) => {
                session.recheck_at = now + self.recheck_interval;
                true
            }
            _ => false,
        }
    }

    pub fn end(&self, token: &SessionToken) -> bool {
        self.sessions
            .write()
            .map(|mut s| s.remove(token).is_some())
            .unwrap_or(false)
    }

    /// Drop expired sessions; returns how many were removed.
    pub fn purge_expired(&self, now: DateTime<Utc>) -> usize {
        let Ok(mut sessions) = self.sessions.write() else {
            return 0;
        };
        let before = sessions.len();
        sessions.retain(|_, s| !s.is_expired(now));
        let removed = before - sessions.len();
        if removed > 0 {
            debug!(removed, "purged expired sessions");
        }
        removed
    }

    pub fn len(&self) -> usize {
        self.sessions.read().map(|s| s.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<S> SessionManager for InMemorySessionManager<S>
where
    S: UserStore,
{
    fn start(&self, local_id: LocalId) -> Result<SessionToken, SessionError> {
        let account = self
            .store
            .get(local_id)?
            .ok_or(SessionError::UnknownAccount(local_id))?;

        if !account.is_active() {
            return Err(SessionError::Inactive(local_id));
        }

        let now = Utc::now();
        let token = SessionToken::generate();
        let session = Session {
            token: token.clone(),
            local_id,
            external_uid: account.external_uid,
            created_at: now,
            expires_at: now + self.ttl,
            recheck_at: now + self.recheck_interval,
        };

        self.sessions
            .write()
            .map_err(|_| SessionError::Unavailable("lock poisoned".to_string()))?
            .insert(token.clone(), session);

        info!(%local_id, expires_in_secs = self.ttl.num_seconds(), "session started");
        Ok(token)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::InMemoryUserStore;
    use ssobridge_auth::{AccountStatus, NewAccount, SsoAssertion};

    fn setup() -> (Arc<InMemoryUserStore>, InMemorySessionManager<Arc<InMemoryUserStore>>, LocalId) {
        let store = Arc::new(InMemoryUserStore::new());
        let assertion = SsoAssertion::new("usr-1", "ann@example.com", "Ann", "Lee", "Member").unwrap();
        let account = store.create(NewAccount::from_assertion(&assertion)).unwrap();
        let config = SsoConfig {
            session_ttl_secs: 600,
            session_recheck_secs: 60,
            ..SsoConfig::default()
        };
        let sessions = InMemorySessionManager::new(store.clone(), &config);
        (store, sessions, account.local_id)
    }

    #[test]
    fn start_registers_session_for_active_account() {
        let (_store, sessions, local_id) = setup();

        let token = sessions.start(local_id).unwrap();

        let session = sessions.get(&token).unwrap();
        assert_eq!(session.local_id, local_id);
        assert_eq!(session.external_uid.as_deref(), Some("usr-1"));
        assert_eq!(session.expires_at - session.created_at, Duration::seconds(600));
        assert_eq!(sessions.len(), 1);
    }

    #[test]
    fn start_refuses_unknown_account() {
        let (_store, sessions, _) = setup();
        let missing = LocalId::new();

        let err = sessions.start(missing).unwrap_err();

        assert_eq!(err, SessionError::UnknownAccount(missing));
        assert!(sessions.is_empty());
    }

    #[test]
    fn start_refuses_blocked_account() {
        let (store, sessions, local_id) = setup();
        store.set_status(local_id, AccountStatus::Blocked).unwrap();

        let err = sessions.start(local_id).unwrap_err();

        assert_eq!(err, SessionError::Inactive(local_id));
    }

    #[test]
    fn expired_sessions_are_invisible_and_purged() {
        let (_store, sessions, local_id) = setup();
        let token = sessions.start(local_id).unwrap();
        let later = Utc::now() + Duration::seconds(601);

        assert!(sessions.get_at(&token, later).is_none());
        assert_eq!(sessions.needs_recheck(&token, later), None);
        assert_eq!(sessions.purge_expired(later), 1);
        assert!(sessions.is_empty());
    }

    #[test]
    fn recheck_deadline_moves_forward() {
        let (_store, sessions, local_id) = setup();
        let token = sessions.start(local_id).unwrap();
        let after_recheck = Utc::now() + Duration::seconds(61);

        assert_eq!(sessions.needs_recheck(&token, Utc::now()), Some(false));
        assert_eq!(sessions.needs_recheck(&token, after_recheck), Some(true));

        assert!(sessions.mark_rechecked(&token, after_recheck));
        assert_eq!(sessions.needs_recheck(&token, after_recheck), Some(false));
    }

    #[test]
    fn unknown_token_has_no_session() {
        let (_store, sessions, local_id) = setup();
        sessions.start(local_id).unwrap();

        let forged = SessionToken::from_string("not-a-real-token");

        assert!(sessions.get(&forged).is_none());
        assert_eq!(sessions.needs_recheck(&forged, Utc::now()), None);
    }

    #[test]
    fn end_removes_session() {
        let (_store, sessions, local_id) = setup();
        let token = sessions.start(local_id).unwrap();

        assert!(sessions.end(&token));
        assert!(!sessions.end(&token));
        assert!(sessions.get(&token).is_none());
    }
}
