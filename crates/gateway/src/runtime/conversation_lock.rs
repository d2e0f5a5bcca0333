//! Per-conversation write serialization.
//!
//! Two chat turns (or a turn and a delete) on the same conversation run
//! one after the other; different conversations never wait on each other.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};

use st_domain::error::{Error, Result};

/// Each conversation id maps to a `Semaphore(1)`.  Holding the permit
/// grants exclusive write access; it releases on drop.
pub struct ConversationLockMap {
    locks: Mutex<HashMap<String, Arc<Semaphore>>>,
}

impl Default for ConversationLockMap {
    fn default() -> Self {
        Self::new()
    }
}

impl ConversationLockMap {
    pub fn new() -> Self {
        Self {
            locks: Mutex::new(HashMap::new()),
        }
    }

    /// Wait for exclusive access to `conversation_id`.
    pub async fn acquire(&self, conversation_id: &str) -> Result<OwnedSemaphorePermit> {
        let sem = {
            let mut locks = self.locks.lock();
            locks
                .entry(conversation_id.to_owned())
                .or_insert_with(|| Arc::new(Semaphore::new(1)))
                .clone()
        };

        sem.acquire_owned()
            .await
            .map_err(|_| Error::Other(format!("lock for conversation {conversation_id} closed")))
    }

    pub fn len(&self) -> usize {
        self.locks.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop entries nobody holds or waits on.  Permits and waiters each
    /// keep a clone of the semaphore alive.
    pub fn prune_idle(&self) {
        let mut locks = self.locks.lock();
        locks.retain(|_, sem| Arc::strong_count(sem) > 1);
    }
}
