//! Session context store
//!
//! Holds one `SessionContext` per user id for the life of the process.
//! Currently in-memory; the trait is the seam for a persistent backend.

use crate::models::SessionContext;
use crate::Result;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};

/// Trait for session persistence
#[async_trait::async_trait]
pub trait ContextStore: Send + Sync {
    async fn get(&self, user_id: &str) -> Result<Option<SessionContext>>;
    async fn put(&self, context: SessionContext) -> Result<()>;
    async fn delete(&self, user_id: &str) -> Result<bool>;
}

/// In-memory context store. No expiry, no eviction.
pub struct InMemoryContextStore {
    contexts: Arc<RwLock<HashMap<String, SessionContext>>>,
}

impl InMemoryContextStore {
    pub fn new() -> Self {
        Self {
            contexts: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    pub async fn len(&self) -> usize {
        self.contexts.read().await.len()
    }
}

impl Default for InMemoryContextStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl ContextStore for InMemoryContextStore {
    async fn get(&self, user_id: &str) -> Result<Option<SessionContext>> {
        let contexts = self.contexts.read().await;
        Ok(contexts.get(user_id).cloned())
    }

    async fn put(&self, context: SessionContext) -> Result<()> {
        let mut contexts = self.contexts.write().await;
        contexts.insert(context.user_id.clone(), context);
        Ok(())
    }

    async fn delete(&self, user_id: &str) -> Result<bool> {
        let mut contexts = self.contexts.write().await;
        Ok(contexts.remove(user_id).is_some())
    }
}

/// Per-user locks that serialize turns of the same session.
/// Different users never contend.
#[derive(Default)]
pub struct SessionLocks {
    locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl SessionLocks {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn lock_for(&self, user_id: &str) -> Arc<Mutex<()>> {
        let mut locks = self.locks.lock().await;
        locks
            .entry(user_id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    /// Drop the entry for `user_id` if no turn holds or awaits it.
    /// Clones are only handed out under the map lock, so a count of one is final.
    pub async fn release_idle(&self, user_id: &str) -> bool {
        let mut locks = self.locks.lock().await;
        match locks.get(user_id) {
            Some(lock) if Arc::strong_count(lock) == 1 => {
                locks.remove(user_id);
                true
            }
            _ => false,
        }
    }

    pub async fn len(&self) -> usize {
        self.locks.lock().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_put_get_delete() {
        let store = InMemoryContextStore::new();
        assert!(store.get("alice").await.unwrap().is_none());

        let mut ctx = SessionContext::new("alice");
        ctx.record_message("hello");
        store.put(ctx).await.unwrap();

        let loaded = store.get("alice").await.unwrap().unwrap();
        assert_eq!(loaded.message_history, vec!["hello".to_string()]);
        assert_eq!(store.len().await, 1);

        assert!(store.delete("alice").await.unwrap());
        assert!(!store.delete("alice").await.unwrap());
        assert!(store.get("alice").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_instances_are_isolated() {
        let first = InMemoryContextStore::new();
        let second = InMemoryContextStore::new();

        first.put(SessionContext::new("bob")).await.unwrap();
        assert!(second.get("bob").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_same_user_shares_lock() {
        let locks = SessionLocks::new();
        let a = locks.lock_for("carol").await;
        let b = locks.lock_for("carol").await;
        let c = locks.lock_for("dave").await;

        assert!(Arc::ptr_eq(&a, &b));
        assert!(!Arc::ptr_eq(&a, &c));
    }

    #[tokio::test]
    async fn test_release_idle_keeps_held_locks() {
        let locks = SessionLocks::new();
        let held = locks.lock_for("erin").await;
        drop(locks.lock_for("frank").await);

        assert!(!locks.release_idle("erin").await);
        assert!(locks.release_idle("frank").await);
        assert!(!locks.release_idle("nobody").await);
        assert_eq!(locks.len().await, 1);

        drop(held);
        assert!(locks.release_idle("erin").await);
        assert_eq!(locks.len().await, 0);
    }
}
