//! Observable sleep tracking.
//!
//! [`SleepTracker`] owns tonight's open session and republishes derived
//! state after each store round-trip:
//! - `tonight` and `history` as watch channels
//! - start/stop/clear button visibility
//! - one-shot navigation (after stopping) and notification (after clearing)
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use sleep_tracker::{ManualClock, MemoryStore, SleepTracker};
//!
//! # tokio_test::block_on(async {
//! let clock = Arc::new(ManualClock::new(1_000));
//! let tracker = SleepTracker::with_clock(Arc::new(MemoryStore::new()), clock.clone()).await?;
//!
//! tracker.start_tracking().await?;
//! clock.advance(8 * 3_600_000);
//! tracker.stop_tracking().await?;
//!
//! let night = tracker.consume_navigation().expect("stopped night");
//! assert_eq!(night.end_time_ms - night.start_time_ms, 8 * 3_600_000);
//! assert!(tracker.consume_navigation().is_none());
//! # Ok::<(), sleep_tracker::TrackerError>(())
//! # }).unwrap();
//! ```

mod buttons;
mod controller;
mod observable;

pub use buttons::ButtonVisibility;
pub use controller::SleepTracker;
pub use observable::{Observable, OneShot};
