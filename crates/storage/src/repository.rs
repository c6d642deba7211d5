use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use thiserror::Error;
use verbs_core::model::{SessionId, SessionState};

/// Errors surfaced by session store adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("not found")]
    NotFound,

    #[error("connection error: {0}")]
    Connection(String),
}

/// Store contract for per-session quiz state.
///
/// Quiz logic only talks to this trait, so persistence or expiry policy can
/// change without touching it.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Fetch the state for `id`, creating a fresh one stamped with `now` if missing.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be reached.
    async fn get_or_create(
        &self,
        id: SessionId,
        now: DateTime<Utc>,
    ) -> Result<SessionState, StorageError>;

    /// Fetch the state for `id` without creating it.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be reached.
    async fn get(&self, id: SessionId) -> Result<Option<SessionState>, StorageError>;

    /// Persist or replace the state for `id`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the state cannot be stored.
    async fn put(&self, id: SessionId, state: SessionState) -> Result<(), StorageError>;

    /// Drop the state for `id`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if there was nothing to drop.
    async fn clear(&self, id: SessionId) -> Result<(), StorageError>;

    /// Drop sessions last seen before `cutoff` that have no big quiz running.
    ///
    /// Returns how many sessions were dropped.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be reached.
    async fn evict_idle(&self, cutoff: DateTime<Utc>) -> Result<usize, StorageError>;

    /// Number of stored sessions.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be reached.
    async fn len(&self) -> Result<usize, StorageError>;
}

/// Process-local session store. Everything is lost on restart.
#[derive(Clone, Default)]
pub struct InMemorySessionStore {
    sessions: Arc<Mutex<HashMap<SessionId, SessionState>>>,
}

impl InMemorySessionStore {
    #[must_use]
    pub fn new() -> Self {
        Self {
            sessions: Arc::new(Mutex::new(HashMap::new())),
        }
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn get_or_create(
        &self,
        id: SessionId,
        now: DateTime<Utc>,
    ) -> Result<SessionState, StorageError> {
        let mut guard = self
            .sessions
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard
            .entry(id)
            .or_insert_with(|| SessionState::new(now))
            .clone())
    }

    async fn get(&self, id: SessionId) -> Result<Option<SessionState>, StorageError> {
        let guard = self
            .sessions
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.get(&id).cloned())
    }

    async fn put(&self, id: SessionId, state: SessionState) -> Result<(), StorageError> {
        let mut guard = self
            .sessions
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.insert(id, state);
        Ok(())
    }

    async fn clear(&self, id: SessionId) -> Result<(), StorageError> {
        let mut guard = self
            .sessions
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.remove(&id).map(|_| ()).ok_or(StorageError::NotFound)
    }

    async fn evict_idle(&self, cutoff: DateTime<Utc>) -> Result<usize, StorageError> {
        let mut guard = self
            .sessions
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        let before = guard.len();
        guard.retain(|_, state| state.is_big_quiz_active() || state.last_seen_at() >= cutoff);
        Ok(before - guard.len())
    }

    async fn len(&self) -> Result<usize, StorageError> {
        let guard = self
            .sessions
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use verbs_core::model::VerbEntry;
    use verbs_core::time::fixed_now;

    #[tokio::test]
    async fn get_or_create_is_lazy_and_stable() {
        let store = InMemorySessionStore::new();
        let id = SessionId::new(42);
        assert!(store.get(id).await.unwrap().is_none());

        let created = store.get_or_create(id, fixed_now()).await.unwrap();
        assert_eq!(created, SessionState::new(fixed_now()));
        assert_eq!(store.len().await.unwrap(), 1);

        let later = fixed_now() + chrono::Duration::hours(1);
        let again = store.get_or_create(id, later).await.unwrap();
        assert_eq!(again.last_seen_at(), fixed_now());
    }

    #[tokio::test]
    async fn put_replaces_state() {
        let store = InMemorySessionStore::new();
        let id = SessionId::new(1);
        let mut state = store.get_or_create(id, fixed_now()).await.unwrap();
        state.start_quiz(VerbEntry::new("go", "went", "gone").unwrap());
        store.put(id, state.clone()).await.unwrap();

        let fetched = store.get(id).await.unwrap().unwrap();
        assert_eq!(fetched.question().map(VerbEntry::base_form), Some("go"));
    }

    #[tokio::test]
    async fn clear_missing_session_is_not_found() {
        let store = InMemorySessionStore::new();
        let id = SessionId::new(5);
        assert!(matches!(store.clear(id).await, Err(StorageError::NotFound)));

        store.get_or_create(id, fixed_now()).await.unwrap();
        store.clear(id).await.unwrap();
        assert_eq!(store.len().await.unwrap(), 0);
    }
}
