//! Sleep session records.

use std::time::Duration;

use super::{SessionId, SleepQuality};

/// A session that has not been persisted yet.
///
/// The store assigns the ID on insert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NewSession {
    /// Tracking start, milliseconds since the Unix epoch.
    pub start_time_ms: i64,
    /// Tracking end, milliseconds since the Unix epoch.
    pub end_time_ms: i64,
    /// Quality rating.
    pub quality: SleepQuality,
}

impl NewSession {
    /// A freshly started night: start and end are both `now_ms`.
    pub fn open_at(now_ms: i64) -> Self {
        Self {
            start_time_ms: now_ms,
            end_time_ms: now_ms,
            quality: SleepQuality::Unrated,
        }
    }
}

/// One tracked sleep interval.
///
/// A session is *open* while `start_time_ms == end_time_ms` and *closed*
/// once the end has been stamped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Session {
    /// Store-assigned identifier.
    pub id: SessionId,
    /// Tracking start, milliseconds since the Unix epoch.
    pub start_time_ms: i64,
    /// Tracking end, milliseconds since the Unix epoch.
    pub end_time_ms: i64,
    /// Quality rating, only meaningful once closed.
    pub quality: SleepQuality,
}

impl Session {
    /// Attach a store-assigned ID to a new session.
    pub fn from_new(id: SessionId, new: NewSession) -> Self {
        Self {
            id,
            start_time_ms: new.start_time_ms,
            end_time_ms: new.end_time_ms,
            quality: new.quality,
        }
    }

    /// Whether tracking is still in progress.
    pub fn is_open(&self) -> bool {
        self.start_time_ms == self.end_time_ms
    }

    /// Stamp the end time, closing the session.
    pub fn close_at(&mut self, now_ms: i64) {
        self.end_time_ms = now_ms;
    }

    /// Time slept, or `None` while the session is still open.
    ///
    /// A clock that went backwards yields a zero duration.
    pub fn duration(&self) -> Option<Duration> {
        if self.is_open() {
            return None;
        }
        let millis = self.end_time_ms.saturating_sub(self.start_time_ms).max(0);
        Some(Duration::from_millis(millis as u64))
    }
}
