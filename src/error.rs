//! Error types for sleep-tracker.

use thiserror::Error;

use crate::session::SessionId;

/// Main error type for sleep-tracker operations.
#[derive(Error, Debug)]
pub enum TrackerError {
    /// SQLite reported a failure.
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Session with the given ID was not found in the store.
    #[error("session not found: {0}")]
    SessionNotFound(SessionId),

    /// Internal lock was poisoned.
    #[error("internal lock poisoned")]
    LockPoisoned,

    /// A blocking store task panicked or was cancelled.
    #[error("store task failed: {0}")]
    TaskJoin(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Quality value outside the rating scale.
    #[error("invalid sleep quality: {0} (expected 0-5)")]
    InvalidQuality(i64),

    /// Quality can only be recorded once tracking has stopped.
    #[error("session {0} is still being tracked")]
    SessionStillOpen(SessionId),

    /// Session identifier could not be parsed.
    #[error("invalid session id: {0}")]
    InvalidSessionId(String),
}

impl TrackerError {
    /// Whether this error originated at the store boundary.
    pub fn is_store_error(&self) -> bool {
        matches!(
            self,
            Self::Database(_)
                | Self::SessionNotFound(_)
                | Self::LockPoisoned
                | Self::TaskJoin(_)
                | Self::Io(_)
        )
    }
}

impl From<tokio::task::JoinError> for TrackerError {
    fn from(err: tokio::task::JoinError) -> Self {
        Self::TaskJoin(err.to_string())
    }
}

/// Convenience Result type for sleep-tracker operations.
pub type Result<T> = std::result::Result<T, TrackerError>;
