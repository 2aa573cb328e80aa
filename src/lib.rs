//! # sleep-tracker
//!
//! Observable sleep session tracking over a local SQLite store.
//!
//! The crate keeps at most one open night ("tonight") in sync with a
//! persistent table of sessions and republishes derived state for a
//! front end after every store round-trip.
//!
//! ## Features
//!
//! - **Session state machine**: Idle/Tracking with start, stop and clear
//! - **Pluggable storage**: in-memory or SQLite behind one async trait
//! - **Observable state**: `tokio::sync::watch` channels for every field
//! - **One-shot signals**: navigation after stop, notification after clear
//!
//! ## Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use sleep_tracker::{SleepTracker, SqliteStore};
//!
//! #[tokio::main]
//! async fn main() -> sleep_tracker::Result<()> {
//!     sleep_tracker::logging::try_init().ok();
//!
//!     let store = Arc::new(SqliteStore::open("sleep-tracker.db")?);
//!     let tracker = SleepTracker::new(store).await?;
//!
//!     if tracker.start_button_visible() {
//!         tracker.start_tracking().await?;
//!     } else if let Some(night) = tracker.stop_tracking().await? {
//!         println!("Slept {:?}", night.duration());
//!     }
//!
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod clock;
pub mod config;
pub mod error;
pub mod logging;
pub mod session;
pub mod store;
pub mod summary;
pub mod tracker;

// Re-export commonly used types
pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{Result, TrackerError};
pub use session::{NewSession, Session, SessionId, SleepQuality, TrackingState};
pub use store::{MemoryStore, SessionStore, SqliteStore};
pub use tracker::{ButtonVisibility, SleepTracker};
