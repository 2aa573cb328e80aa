//! Observable value holders built on `tokio::sync::watch`.

use tokio::sync::watch;

/// A value that notifies subscribers on every assignment.
#[derive(Debug)]
pub struct Observable<T> {
    tx: watch::Sender<T>,
}

impl<T: Clone> Observable<T> {
    pub fn new(initial: T) -> Self {
        let (tx, _rx) = watch::channel(initial);
        Self { tx }
    }

    /// Snapshot of the current value.
    pub fn get(&self) -> T {
        self.tx.borrow().clone()
    }

    /// Replace the value and wake every subscriber.
    pub fn set(&self, value: T) {
        self.tx.send_replace(value);
    }

    /// Receiver that observes every subsequent assignment.
    pub fn subscribe(&self) -> watch::Receiver<T> {
        self.tx.subscribe()
    }
}

/// A depth-1 slot whose value is delivered once and then cleared.
///
/// Setting a new value before the old one is consumed replaces it.
#[derive(Debug)]
pub struct OneShot<T> {
    tx: watch::Sender<Option<T>>,
}

impl<T: Clone> OneShot<T> {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(None);
        Self { tx }
    }

    /// Arm the slot.
    pub fn fire(&self, value: T) {
        self.tx.send_replace(Some(value));
    }

    /// Take the pending value, leaving the slot empty.
    pub fn consume(&self) -> Option<T> {
        // Skip the wake-up when there is nothing to clear.
        let mut taken = None;
        self.tx.send_if_modified(|slot| {
            taken = slot.take();
            taken.is_some()
        });
        taken
    }

    /// Pending value without consuming it.
    pub fn peek(&self) -> Option<T> {
        self.tx.borrow().clone()
    }

    pub fn is_pending(&self) -> bool {
        self.tx.borrow().is_some()
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<T>> {
        self.tx.subscribe()
    }
}

impl<T: Clone> Default for OneShot<T> {
    fn default() -> Self {
        Self::new()
    }
}
