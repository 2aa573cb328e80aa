//! In-memory session storage.

use std::collections::BTreeMap;
use std::sync::RwLock;

use async_trait::async_trait;

use super::SessionStore;
use crate::error::TrackerError;
use crate::session::{NewSession, Session, SessionId};
use crate::Result;

struct Inner {
    sessions: BTreeMap<SessionId, Session>,
    next_id: i64,
}

/// Thread-safe in-memory store.
///
/// IDs keep increasing across `clear()`, matching SQLite's AUTOINCREMENT.
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

impl MemoryStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Inner {
                sessions: BTreeMap::new(),
                next_id: 1,
            }),
        }
    }

    /// Get the number of sessions in the store.
    pub fn count(&self) -> usize {
        self.inner.read().map(|s| s.sessions.len()).unwrap_or(0)
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SessionStore for MemoryStore {
    async fn insert(&self, session: NewSession) -> Result<SessionId> {
        let mut inner = self
            .inner
            .write()
            .map_err(|_| TrackerError::LockPoisoned)?;

        let id = SessionId::from_raw(inner.next_id);
        inner.next_id += 1;
        inner.sessions.insert(id, Session::from_new(id, session));
        Ok(id)
    }

    async fn update(&self, session: &Session) -> Result<()> {
        let mut inner = self
            .inner
            .write()
            .map_err(|_| TrackerError::LockPoisoned)?;

        let slot = inner
            .sessions
            .get_mut(&session.id)
            .ok_or(TrackerError::SessionNotFound(session.id))?;

        *slot = *session;
        Ok(())
    }

    async fn get(&self, id: SessionId) -> Result<Option<Session>> {
        let inner = self.inner.read().map_err(|_| TrackerError::LockPoisoned)?;
        Ok(inner.sessions.get(&id).copied())
    }

    async fn most_recent(&self) -> Result<Option<Session>> {
        let inner = self.inner.read().map_err(|_| TrackerError::LockPoisoned)?;
        Ok(inner.sessions.values().next_back().copied())
    }

    async fn all(&self) -> Result<Vec<Session>> {
        let inner = self.inner.read().map_err(|_| TrackerError::LockPoisoned)?;
        Ok(inner.sessions.values().rev().copied().collect())
    }

    async fn clear(&self) -> Result<()> {
        let mut inner = self
            .inner
            .write()
            .map_err(|_| TrackerError::LockPoisoned)?;
        inner.sessions.clear();
        Ok(())
    }
}
