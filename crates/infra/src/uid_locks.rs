use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LockError {
    #[error("uid lock table poisoned")]
    Poisoned,
}

/// One mutex per external uid, created on demand and dropped when idle.
///
/// Callbacks for different uids never block each other.
#[derive(Debug, Default)]
pub struct UidLocks {
    slots: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl UidLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `f` while holding the lock for `uid`.
    pub fn with_lock<T, F>(&self, uid: &str, f: F) -> Result<T, LockError>
    where
        F: FnOnce() -> T,
    {
        let slot = {
            let mut slots = self.slots.lock().map_err(|_| LockError::Poisoned)?;
            slots.entry(uid.to_string()).or_default().clone()
        };

        // Declared before the mutex guard so it drops after it, including on unwind.
        let release = Release {
            locks: self,
            uid,
            slot,
        };
        // The slot guards no data, so a panic in an earlier holder leaves nothing to repair.
        let _guard = release.slot.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(f())
    }

    /// Number of uids currently holding or waiting on a lock.
    pub fn active(&self) -> usize {
        self.slots.lock().map(|s| s.len()).unwrap_or(0)
    }

}

/// Drops the uid's slot from the table once no other caller holds a clone.
struct Release<'a> {
    locks: &'a UidLocks,
    uid: &'a str,
    slot: Arc<Mutex<()>>,
}

impl Drop for Release<'_> {
    fn drop(&mut self) {
        let mut slots = self
            .locks
            .slots
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        // Clones are only taken under `slots`, so a count of 2 (map + ours) means no waiters.
        if Arc::strong_count(&self.slot) == 2 {
            slots.remove(self.uid);
        }
    }
}
