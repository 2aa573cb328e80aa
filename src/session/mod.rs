//! Sleep session model.
//!
//! This module provides the session record, its identifier, the quality
//! rating scale, and the Idle/Tracking state machine.

mod id;
mod quality;
mod record;
mod state;

pub use id::SessionId;
pub use quality::SleepQuality;
pub use record::{NewSession, Session};
pub use state::TrackingState;
