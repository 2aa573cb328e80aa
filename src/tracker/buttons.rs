//! Derived button visibility.

use crate::session::Session;

/// Which tracker actions the front end should offer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ButtonVisibility {
    /// Visible while no night is being tracked.
    pub start: bool,
    /// Visible while a night is being tracked.
    pub stop: bool,
    /// Visible while there is any history to clear.
    pub clear: bool,
}

impl ButtonVisibility {
    pub fn derive(tonight: Option<&Session>, history: &[Session]) -> Self {
        Self {
            start: tonight.is_none(),
            stop: tonight.is_some(),
            clear: !history.is_empty(),
        }
    }
}

impl Default for ButtonVisibility {
    fn default() -> Self {
        Self::derive(None, &[])
    }
}
