use std::collections::HashMap;
use std::fmt;
use std::sync::RwLock;

use chrono::Utc;

use ssobridge_auth::{
    AccountStatus, AccountUpdate, LocalAccount, NewAccount, StoreError, UserStore,
    normalize_email,
};
use ssobridge_core::LocalId;

struct StoredAccount {
    account: LocalAccount,
    password: String,
}

impl fmt::Debug for StoredAccount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoredAccount")
            .field("account", &self.account)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Default)]
struct Tables {
    accounts: HashMap<LocalId, StoredAccount>,
    by_external_uid: HashMap<String, LocalId>,
    by_email: HashMap<String, LocalId>,
}

impl Tables {
    fn lookup(&self, local_id: Option<&LocalId>) -> Option<LocalAccount> {
        local_id
            .and_then(|id| self.accounts.get(id))
            .map(|stored| stored.account.clone())
    }

    fn email_taken_by_other(&self, email: &str, local_id: Option<LocalId>) -> bool {
        matches!(self.by_email.get(&normalize_email(email)), Some(owner) if Some(*owner) != local_id)
    }

    fn uid_taken_by_other(&self, external_uid: &str, local_id: Option<LocalId>) -> bool {
        matches!(self.by_external_uid.get(external_uid), Some(owner) if Some(*owner) != local_id)
    }
}

/// In-memory account store for tests/dev.
///
/// Keeps unique indexes on external uid and normalized email; every write
/// checks both under a single write lock.
#[derive(Debug, Default)]
pub struct InMemoryUserStore {
    inner: RwLock<Tables>,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.inner.read().map(|t| t.accounts.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// All accounts, oldest first.
    pub fn list(&self) -> Vec<LocalAccount> {
        let tables = match self.inner.read() {
            Ok(t) => t,
            Err(_) => return vec![],
        };

        let mut accounts: Vec<LocalAccount> =
            tables.accounts.values().map(|s| s.account.clone()).collect();
        accounts.sort_by_key(|a| a.local_id);
        accounts
    }

    /// Block or reactivate an account. Returns `false` if it does not exist.
    pub fn set_status(&self, local_id: LocalId, status: AccountStatus) -> Result<bool, StoreError> {
        let mut tables = self.write()?;
        match tables.accounts.get_mut(&local_id) {
            Some(stored) => {
                stored.account.status = status;
                stored.account.updated_at = Utc::now();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    pub fn verify_password(&self, local_id: LocalId, candidate: &str) -> bool {
        self.inner
            .read()
            .ok()
            .and_then(|t| t.accounts.get(&local_id).map(|s| s.password == candidate))
            .unwrap_or(false)
    }

    fn read(&self) -> Result<std::sync::RwLockReadGuard<'_, Tables>, StoreError> {
        self.inner
            .read()
            .map_err(|_| StoreError::Unavailable("lock poisoned".to_string()))
    }

    fn write(&self) -> Result<std::sync::RwLockWriteGuard<'_, Tables>, StoreError> {
        self.inner
            .write()
            .map_err(|_| StoreError::Unavailable("lock poisoned".to_string()))
    }
}

impl UserStore for InMemoryUserStore {
    fn get(&self, local_id: LocalId) -> Result<Option<LocalAccount>, StoreError> {
        let tables = self.read()?;
        Ok(tables.lookup(Some(&local_id)))
    }

    fn find_by_external_uid(&self, external_uid: &str) -> Result<Option<LocalAccount>, StoreError> {
        let tables = self.read()?;
        Ok(tables.lookup(tables.by_external_uid.get(external_uid)))
    }

    fn find_by_email(&self, email: &str) -> Result<Option<LocalAccount>, StoreError> {
        let tables = self.read()?;
        Ok(tables.lookup(tables.by_email.get(&normalize_email(email))))
    }

    fn create(&self, fields: NewAccount) -> Result<LocalAccount, StoreError> {
        let mut tables = self.write()?;

        if let Some(uid) = &fields.external_uid {
            if tables.uid_taken_by_other(uid, None) {
                return Err(StoreError::DuplicateExternalUid(uid.clone()));
            }
        }
        if tables.email_taken_by_other(&fields.email, None) {
            return Err(StoreError::DuplicateEmail(fields.email));
        }

        let now = Utc::now();
        let account = LocalAccount {
            local_id: LocalId::new(),
            external_uid: fields.external_uid.clone(),
            display_name: fields.display_name,
            email: fields.email,
            role: fields.role,
            status: AccountStatus::Active,
            created_at: now,
            updated_at: now,
        };

        let local_id = account.local_id;
        if let Some(uid) = fields.external_uid {
            tables.by_external_uid.insert(uid, local_id);
        }
        tables.by_email.insert(normalize_email(&account.email), local_id);
        tables.accounts.insert(
            local_id,
            StoredAccount {
                account: account.clone(),
                password: fields.placeholder_password,
            },
        );

        Ok(account)
    }

    fn update(&self, local_id: LocalId, fields: AccountUpdate) -> Result<bool, StoreError> {
        let mut tables = self.write()?;

        if !tables.accounts.contains_key(&local_id) {
            return Ok(false);
        }
        if let Some(email) = &fields.email {
            if tables.email_taken_by_other(email, Some(local_id)) {
                return Err(StoreError::DuplicateEmail(email.clone()));
            }
        }
        if let Some(uid) = &fields.external_uid {
            if tables.uid_taken_by_other(uid, Some(local_id)) {
                return Err(StoreError::DuplicateExternalUid(uid.clone()));
            }
        }

        let Tables {
            accounts,
            by_external_uid,
            by_email,
        } = &mut *tables;
        let Some(stored) = accounts.get_mut(&local_id) else {
            return Ok(false);
        };
        let account = &mut stored.account;

        if let Some(name) = fields.display_name {
            account.display_name = name;
        }
        if let Some(email) = fields.email {
            by_email.remove(&normalize_email(&account.email));
            by_email.insert(normalize_email(&email), local_id);
            account.email = email;
        }
        if let Some(uid) = fields.external_uid {
            if let Some(previous) = account.external_uid.take() {
                by_external_uid.remove(&previous);
            }
            by_external_uid.insert(uid.clone(), local_id);
            account.external_uid = Some(uid);
        }
        account.updated_at = Utc::now();

        Ok(true)
    }
}
