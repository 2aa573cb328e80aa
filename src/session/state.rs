//! Tracking state machine.

use super::Session;

/// Lifecycle state of the tracker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TrackingState {
    /// No open session.
    #[default]
    Idle,
    /// One open session is being tracked.
    Tracking,
}

impl TrackingState {
    /// Derive the state from the current open session, if any.
    pub fn of(tonight: Option<&Session>) -> Self {
        match tonight {
            Some(_) => Self::Tracking,
            None => Self::Idle,
        }
    }

    /// Whether a night is in progress.
    ///
    /// Starting while already tracking is still accepted by the tracker,
    /// but abandons the continuity of the current night.
    pub fn is_tracking(&self) -> bool {
        matches!(self, Self::Tracking)
    }
}
