//! SQLite-backed session storage.

use std::path::Path;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension, Row};
use tracing::{debug, trace};

use super::SessionStore;
use crate::error::TrackerError;
use crate::session::{NewSession, Session, SessionId, SleepQuality};
use crate::Result;

const SCHEMA: &str = "CREATE TABLE IF NOT EXISTS sleep_sessions (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    start_time_ms INTEGER NOT NULL,
    end_time_ms INTEGER NOT NULL,
    quality INTEGER NOT NULL DEFAULT -1
)";

const SELECT_COLUMNS: &str = "SELECT id, start_time_ms, end_time_ms, quality FROM sleep_sessions";

/// Raw row as stored; quality is validated after the query completes.
type RawSession = (i64, i64, i64, i64);

fn read_row(row: &Row<'_>) -> rusqlite::Result<RawSession> {
    Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?))
}

fn into_session((id, start, end, quality): RawSession) -> Result<Session> {
    Ok(Session {
        id: SessionId::from_raw(id),
        start_time_ms: start,
        end_time_ms: end,
        quality: SleepQuality::try_from(quality)?,
    })
}

/// Durable store over a single SQLite connection.
///
/// Queries run on tokio's blocking pool so the caller's executor is never
/// stalled on disk I/O.
#[derive(Clone)]
pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    /// Open (or create) the database file at `path`.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        debug!(path = %path.display(), "Opening session database");
        Self::with_connection(Connection::open(path)?)
    }

    /// Open a private in-memory database.
    pub fn open_in_memory() -> Result<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self> {
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    async fn run<T, F>(&self, op: &'static str, f: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&Connection) -> Result<T> + Send + 'static,
    {
        trace!(op, "store request");
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let conn = conn.lock().map_err(|_| TrackerError::LockPoisoned)?;
            f(&conn)
        })
        .await?
    }
}

#[async_trait]
impl SessionStore for SqliteStore {
    async fn insert(&self, session: NewSession) -> Result<SessionId> {
        self.run("insert", move |conn| {
            conn.execute(
                "INSERT INTO sleep_sessions (start_time_ms, end_time_ms, quality) \
                 VALUES (?1, ?2, ?3)",
                params![
                    session.start_time_ms,
                    session.end_time_ms,
                    session.quality.as_i64()
                ],
            )?;
            Ok(SessionId::from_raw(conn.last_insert_rowid()))
        })
        .await
    }

    async fn update(&self, session: &Session) -> Result<()> {
        let session = *session;
        self.run("update", move |conn| {
            let changed = conn.execute(
                "UPDATE sleep_sessions SET start_time_ms = ?1, end_time_ms = ?2, quality = ?3 \
                 WHERE id = ?4",
                params![
                    session.start_time_ms,
                    session.end_time_ms,
                    session.quality.as_i64(),
                    session.id.as_i64()
                ],
            )?;
            if changed == 0 {
                return Err(TrackerError::SessionNotFound(session.id));
            }
            Ok(())
        })
        .await
    }

    async fn get(&self, id: SessionId) -> Result<Option<Session>> {
        self.run("get", move |conn| {
            conn.query_row(
                &format!("{SELECT_COLUMNS} WHERE id = ?1"),
                params![id.as_i64()],
                read_row,
            )
            .optional()?
            .map(into_session)
            .transpose()
        })
        .await
    }

    async fn most_recent(&self) -> Result<Option<Session>> {
        self.run("most_recent", |conn| {
            conn.query_row(
                &format!("{SELECT_COLUMNS} ORDER BY id DESC LIMIT 1"),
                [],
                read_row,
            )
            .optional()?
            .map(into_session)
            .transpose()
        })
        .await
    }

    async fn all(&self) -> Result<Vec<Session>> {
        self.run("all", |conn| {
            let mut stmt = conn.prepare(&format!("{SELECT_COLUMNS} ORDER BY id DESC"))?;
            let rows = stmt.query_map([], read_row)?;

            let mut sessions = Vec::new();
            for row in rows {
                sessions.push(into_session(row?)?);
            }
            Ok(sessions)
        })
        .await
    }

    async fn clear(&self) -> Result<()> {
        self.run("clear", |conn| {
            conn.execute("DELETE FROM sleep_sessions", [])?;
            Ok(())
        })
        .await
    }
}
