//! Session persistence.
//!
//! The tracker talks to storage only through the [`SessionStore`] trait.
//! Two backends are provided:
//! - [`MemoryStore`]: in-process map, used by tests and ephemeral runs
//! - [`SqliteStore`]: durable single-table SQLite database
//!
//! # Example
//!
//! ```
//! use sleep_tracker::store::{MemoryStore, SessionStore};
//! use sleep_tracker::session::NewSession;
//!
//! # tokio_test::block_on(async {
//! let store = MemoryStore::new();
//! let id = store.insert(NewSession::open_at(1_000)).await?;
//! let latest = store.most_recent().await?.unwrap();
//! assert_eq!(latest.id, id);
//! # Ok::<(), sleep_tracker::TrackerError>(())
//! # }).unwrap();
//! ```

use async_trait::async_trait;

use crate::session::{NewSession, Session, SessionId};
use crate::Result;

mod memory;
mod sqlite;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

/// Durable, authoritative storage for sleep sessions.
///
/// Every method is atomic at single-record granularity. Failures are
/// reported as store errors and never retried by callers.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Persist a new session, returning its assigned ID.
    async fn insert(&self, session: NewSession) -> Result<SessionId>;

    /// Overwrite an existing session.
    ///
    /// Fails with `SessionNotFound` if the ID is unknown.
    async fn update(&self, session: &Session) -> Result<()>;

    /// Look up one session.
    async fn get(&self, id: SessionId) -> Result<Option<Session>>;

    /// The session with the highest ID.
    async fn most_recent(&self) -> Result<Option<Session>>;

    /// Every session, most recent first.
    async fn all(&self) -> Result<Vec<Session>>;

    /// Delete every session.
    async fn clear(&self) -> Result<()>;
}
