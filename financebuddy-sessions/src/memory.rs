//! In-memory session store: a hash map plus an expiry check, guarded by
//! a per-session lock so `update` can implement compare-and-swap
//! semantics without blocking concurrent callers on unrelated sessions
//! (spec §4.10).

use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use financebuddy_core::{Session, SessionId};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::info;

use crate::error::{Result, SessionError};
use crate::traits::{Mutator, SessionStore};

/// In-memory [`SessionStore`] backed by a `DashMap` of per-session
/// `tokio::sync::Mutex`es (spec §4.10: "in-memory (hash map + expiry
/// index)").
pub struct InMemorySessionStore {
    sessions: DashMap<SessionId, Arc<Mutex<Session>>>,
    ttl_minutes: i64,
}

impl InMemorySessionStore {
    /// Construct an empty store with the given default session TTL.
    #[must_use]
    pub fn new(ttl_minutes: i64) -> Self {
        Self {
            sessions: DashMap::new(),
            ttl_minutes,
        }
    }

    fn entry(&self, id: &SessionId) -> Option<Arc<Mutex<Session>>> {
        self.sessions.get(id).map(|e| Arc::clone(e.value()))
    }
}

impl Default for InMemorySessionStore {
    fn default() -> Self {
        Self::new(60)
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn create(&self, topic: &str, question_count: usize, user_id: Option<String>) -> Result<Session> {
        let session = Session::new(topic, question_count, user_id, self.ttl_minutes);
        self.sessions.insert(session.id, Arc::new(Mutex::new(session.clone())));
        Ok(session)
    }

    async fn get(&self, id: &SessionId) -> Result<Session> {
        let lock = self.entry(id).ok_or(SessionError::NotFound(*id))?;
        let session = lock.lock().await;
        if session.is_expired(Utc::now()) {
            drop(session);
            self.sessions.remove(id);
            return Err(SessionError::NotFound(*id));
        }
        Ok(session.clone())
    }

    async fn update(&self, id: &SessionId, mutator: Mutator) -> Result<Session> {
        let lock = self.entry(id).ok_or(SessionError::NotFound(*id))?;
        let mut guard = lock.try_lock().map_err(|_| SessionError::Conflict(*id))?;

        if guard.is_expired(Utc::now()) {
            drop(guard);
            self.sessions.remove(id);
            return Err(SessionError::NotFound(*id));
        }

        mutator(&mut guard)?;
        Ok(guard.clone())
    }

    async fn delete(&self, id: &SessionId) -> Result<()> {
        self.sessions.remove(id);
        Ok(())
    }

    async fn extend(&self, id: &SessionId, minutes: i64) -> Result<Session> {
        self.update(
            id,
            Box::new(move |s| {
                s.expires_at += chrono::Duration::minutes(minutes);
                Ok(())
            }),
        )
        .await
    }

    async fn cleanup_expired(&self) -> Result<usize> {
        let now = Utc::now();
        let mut expired = Vec::new();
        for entry in &self.sessions {
            if entry.value().lock().await.is_expired(now) {
                expired.push(*entry.key());
            }
        }
        for id in &expired {
            self.sessions.remove(id);
        }
        if !expired.is_empty() {
            info!(count = expired.len(), "swept expired sessions");
        }
        Ok(expired.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn create_then_get_round_trips() {
        let store = InMemorySessionStore::new(60);
        let created = store.create("Options Trading", 3, None).await.unwrap();
        let fetched = store.get(&created.id).await.unwrap();
        assert_eq!(fetched.id, created.id);
        assert_eq!(fetched.topic, "Options Trading");
    }

    #[tokio::test]
    async fn get_on_unknown_id_is_not_found() {
        let store = InMemorySessionStore::new(60);
        let err = store.get(&SessionId::new()).await.unwrap_err();
        assert!(matches!(err, SessionError::NotFound(_)));
    }

    #[tokio::test]
    async fn expired_session_reads_as_not_found() {
        let store = InMemorySessionStore::new(-1);
        let created = store.create("Options Trading", 3, None).await.unwrap();
        let err = store.get(&created.id).await.unwrap_err();
        assert!(matches!(err, SessionError::NotFound(_)));
    }

    #[tokio::test]
    async fn update_mutates_and_returns_new_state() {
        let store = InMemorySessionStore::new(60);
        let created = store.create("Options Trading", 3, None).await.unwrap();
        let updated = store
            .update(
                &created.id,
                Box::new(|s| {
                    s.current_step = financebuddy_core::SessionStep::Questions;
                    Ok(())
                }),
            )
            .await
            .unwrap();
        assert_eq!(updated.current_step, financebuddy_core::SessionStep::Questions);
    }

    #[tokio::test]
    async fn concurrent_update_on_locked_session_conflicts() {
        let store = Arc::new(InMemorySessionStore::new(60));
        let created = store.create("Options Trading", 3, None).await.unwrap();
        let lock = store.entry(&created.id).unwrap();
        let _held = lock.lock().await;

        let err = store
            .update(&created.id, Box::new(|_| Ok(())))
            .await
            .unwrap_err();
        assert!(matches!(err, SessionError::Conflict(_)));
    }

    #[tokio::test]
    async fn extend_pushes_back_expiry() {
        let store = InMemorySessionStore::new(60);
        let created = store.create("Options Trading", 3, None).await.unwrap();
        let extended = store.extend(&created.id, 30).await.unwrap();
        assert!(extended.expires_at > created.expires_at);
    }

    #[tokio::test]
    async fn cleanup_expired_is_idempotent() {
        let store = InMemorySessionStore::new(-1);
        store.create("Options Trading", 3, None).await.unwrap();
        assert_eq!(store.cleanup_expired().await.unwrap(), 1);
        assert_eq!(store.cleanup_expired().await.unwrap(), 0);
    }
}
