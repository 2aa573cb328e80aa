//! Session identifier type.

use std::fmt;
use std::str::FromStr;

/// Unique identifier for a tracked night.
///
/// IDs are assigned by the store when a session is inserted and increase
/// monotonically, so the highest ID is always the most recent session.
/// The ID is displayed as `night-N`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SessionId(i64);

impl SessionId {
    /// Get the raw value as stored in the database.
    pub fn as_i64(&self) -> i64 {
        self.0
    }

    /// Create a SessionId from a raw store value.
    pub fn from_raw(value: i64) -> Self {
        Self(value)
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "night-{}", self.0)
    }
}

impl FromStr for SessionId {
    type Err = crate::error::TrackerError;

    /// Accepts both the display form (`night-12`) and a bare number (`12`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s.strip_prefix("night-").unwrap_or(s);
        digits
            .parse::<i64>()
            .ok()
            .filter(|n| *n > 0)
            .map(SessionId)
            .ok_or_else(|| crate::error::TrackerError::InvalidSessionId(s.into()))
    }
}
