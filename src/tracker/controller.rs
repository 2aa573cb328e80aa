//! The sleep session controller.

use std::sync::Arc;

use chrono::FixedOffset;
use tokio::sync::{watch, Mutex};
use tracing::{debug, info, warn};

use super::observable::{Observable, OneShot};
use super::ButtonVisibility;
use crate::clock::{Clock, SystemClock};
use crate::error::TrackerError;
use crate::session::{NewSession, Session, SessionId, SleepQuality, TrackingState};
use crate::store::SessionStore;
use crate::summary;
use crate::Result;

/// Mediates between a [`SessionStore`] and an observing front end.
///
/// Holds at most one open session ("tonight"), a snapshot of the stored
/// history, and two one-shot signals. Every mutating operation finishes
/// all of its store requests before publishing any visible change, and
/// in-memory state is only touched after the store write succeeded.
///
/// Mutating operations are serialized internally, so concurrent callers
/// queue up in the order they were issued.
pub struct SleepTracker<S> {
    store: Arc<S>,
    clock: Arc<dyn Clock>,
    tonight: Observable<Option<Session>>,
    history: Observable<Vec<Session>>,
    buttons: Observable<ButtonVisibility>,
    navigation: OneShot<Session>,
    notification: OneShot<()>,
    ops: Mutex<()>,
}

impl<S: SessionStore> SleepTracker<S> {
    /// Create a tracker on the system clock and load state from the store.
    pub async fn new(store: Arc<S>) -> Result<Self> {
        Self::with_clock(store, Arc::new(SystemClock)).await
    }

    /// Create a tracker with a custom clock and load state from the store.
    pub async fn with_clock(store: Arc<S>, clock: Arc<dyn Clock>) -> Result<Self> {
        let tracker = Self {
            store,
            clock,
            tonight: Observable::new(None),
            history: Observable::new(Vec::new()),
            buttons: Observable::new(ButtonVisibility::default()),
            navigation: OneShot::new(),
            notification: OneShot::new(),
            ops: Mutex::new(()),
        };
        tracker.initialize().await?;
        Ok(tracker)
    }

    /// Re-derive tonight and history from the store.
    ///
    /// The most recent session is adopted as tonight only if it is still
    /// open. Safe to call again to recover after an interrupted operation.
    pub async fn initialize(&self) -> Result<()> {
        let _op = self.ops.lock().await;

        let tonight = self.tonight_from_store().await?;
        let history = self.store.all().await?;

        debug!(
            tracking = tonight.is_some(),
            nights = history.len(),
            "Tracker state loaded"
        );
        self.publish(tonight, history);
        Ok(())
    }

    /// Begin tracking a new night at the current time.
    ///
    /// Returns the ID of the inserted session. Starting while already
    /// tracking inserts a new night anyway and abandons the old one.
    pub async fn start_tracking(&self) -> Result<SessionId> {
        let _op = self.ops.lock().await;

        if self.state().is_tracking() {
            warn!("Starting a new night while still tracking");
        }

        let now = self.clock.now_millis();
        let id = self.store.insert(NewSession::open_at(now)).await?;

        let tonight = self.tonight_from_store().await?;
        let history = self.store.all().await?;

        info!(session = %id, start_ms = now, "Sleep tracking started");
        self.publish(tonight, history);
        Ok(id)
    }

    /// Stop tracking tonight's session.
    ///
    /// Returns the closed session, or `None` without touching the store if
    /// nothing was being tracked. On success the navigation signal carries
    /// the closed session.
    pub async fn stop_tracking(&self) -> Result<Option<Session>> {
        let _op = self.ops.lock().await;

        let Some(mut night) = self.tonight.get() else {
            debug!("Stop requested while idle; ignoring");
            return Ok(None);
        };

        // A closed night must end strictly after it started.
        let now = self
            .clock
            .now_millis()
            .max(night.start_time_ms.saturating_add(1));
        night.close_at(now);
        self.store.update(&night).await?;

        info!(
            session = %night.id,
            end_ms = night.end_time_ms,
            "Sleep tracking stopped"
        );
        let refreshed = self.refresh_history(|history| replace_session(history, night)).await;
        self.tonight.set(None);
        self.refresh_buttons();
        self.navigation.fire(night);
        refreshed.map(|()| Some(night))
    }

    /// Delete every stored session.
    ///
    /// Tonight is cleared regardless of prior state and the notification
    /// flag is raised.
    pub async fn clear_history(&self) -> Result<()> {
        let _op = self.ops.lock().await;

        self.store.clear().await?;

        info!("Sleep history cleared");
        let refreshed = self.refresh_history(Vec::clear).await;
        self.tonight.set(None);
        self.refresh_buttons();
        self.notification.fire(());
        refreshed
    }

    /// Rate a finished night.
    pub async fn set_quality(&self, id: SessionId, quality: SleepQuality) -> Result<Session> {
        let _op = self.ops.lock().await;

        let mut night = self
            .store
            .get(id)
            .await?
            .ok_or(TrackerError::SessionNotFound(id))?;
        if night.is_open() {
            return Err(TrackerError::SessionStillOpen(id));
        }

        night.quality = quality;
        self.store.update(&night).await?;

        info!(session = %id, %quality, "Sleep quality recorded");
        let refreshed = self.refresh_history(|history| replace_session(history, night)).await;
        self.refresh_buttons();
        refreshed.map(|()| night)
    }

    /// Take the pending navigation target, if any.
    pub fn consume_navigation(&self) -> Option<Session> {
        self.navigation.consume()
    }

    /// Take the pending notification flag.
    pub fn consume_notification(&self) -> bool {
        self.notification.consume().is_some()
    }

    pub fn pending_navigation(&self) -> Option<Session> {
        self.navigation.peek()
    }

    pub fn notification_pending(&self) -> bool {
        self.notification.is_pending()
    }

    /// The open session being tracked, if any.
    pub fn tonight(&self) -> Option<Session> {
        self.tonight.get()
    }

    /// All stored sessions, most recent first.
    pub fn history(&self) -> Vec<Session> {
        self.history.get()
    }

    pub fn state(&self) -> TrackingState {
        TrackingState::of(self.tonight.get().as_ref())
    }

    pub fn buttons(&self) -> ButtonVisibility {
        self.buttons.get()
    }

    pub fn start_button_visible(&self) -> bool {
        self.buttons.get().start
    }

    pub fn stop_button_visible(&self) -> bool {
        self.buttons.get().stop
    }

    pub fn clear_button_visible(&self) -> bool {
        self.buttons.get().clear
    }

    /// Render the current history for display.
    pub fn history_summary(&self, offset: &FixedOffset) -> String {
        summary::render_history(&self.history.get(), offset)
    }

    pub fn subscribe_tonight(&self) -> watch::Receiver<Option<Session>> {
        self.tonight.subscribe()
    }

    pub fn subscribe_history(&self) -> watch::Receiver<Vec<Session>> {
        self.history.subscribe()
    }

    pub fn subscribe_buttons(&self) -> watch::Receiver<ButtonVisibility> {
        self.buttons.subscribe()
    }

    pub fn subscribe_navigation(&self) -> watch::Receiver<Option<Session>> {
        self.navigation.subscribe()
    }

    pub fn subscribe_notification(&self) -> watch::Receiver<Option<()>> {
        self.notification.subscribe()
    }

    async fn tonight_from_store(&self) -> Result<Option<Session>> {
        Ok(self.store.most_recent().await?.filter(Session::is_open))
    }

    /// Re-read history after a successful write.
    ///
    /// If the read fails, `patch` applies the write to the cached history
    /// instead and the read error is returned once state is consistent.
    async fn refresh_history<F>(&self, patch: F) -> Result<()>
    where
        F: FnOnce(&mut Vec<Session>),
    {
        match self.store.all().await {
            Ok(history) => {
                self.history.set(history);
                Ok(())
            }
            Err(err) => {
                warn!(error = %err, "History refresh failed after write; patching cached copy");
                let mut history = self.history.get();
                patch(&mut history);
                self.history.set(history);
                Err(err)
            }
        }
    }

    fn publish(&self, tonight: Option<Session>, history: Vec<Session>) {
        self.tonight.set(tonight);
        self.history.set(history);
        self.refresh_buttons();
    }

    fn refresh_buttons(&self) {
        let buttons = ButtonVisibility::derive(self.tonight.get().as_ref(), &self.history.get());
        self.buttons.set(buttons);
    }
}

fn replace_session(history: &mut [Session], updated: Session) {
    if let Some(slot) = history.iter_mut().find(|s| s.id == updated.id) {
        *slot = updated;
    }
}
