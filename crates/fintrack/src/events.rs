//! Session-expiry notifications.
//!
//! [`SessionEvents`] is owned by an [`ApiClient`](crate::ApiClient) and shared
//! with whatever layer needs to react when the session cannot be recovered
//! (clear local state, show the sign-in flow).

use std::collections::BTreeMap;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::{debug, warn};

type Listener = Arc<dyn Fn() + Send + Sync>;

/// Emitter for session-expired notifications.
///
/// Cheap to clone; clones share the same listener set.
#[derive(Clone, Default)]
pub struct SessionEvents {
    inner: Arc<EventsInner>,
}

#[derive(Default)]
struct EventsInner {
    listeners: Mutex<BTreeMap<u64, Listener>>,
    next_id: AtomicU64,
}

impl SessionEvents {
    /// Create an emitter with no listeners.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener called each time the session expires.
    ///
    /// The listener stays registered until [`Subscription::unsubscribe`] is
    /// called; dropping the subscription does not remove it.
    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn() + Send + Sync + 'static,
    {
        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
        self.inner.lock().insert(id, Arc::new(listener));
        debug!(listener_id = id, "Session-expired listener registered");

        Subscription {
            id,
            events: Arc::downgrade(&self.inner),
        }
    }

    /// Number of registered listeners.
    pub fn listener_count(&self) -> usize {
        self.inner.lock().len()
    }

    /// Invoke every registered listener once.
    ///
    /// Listeners run outside the lock, in registration order. A listener that
    /// panics is logged and skipped; the rest still run.
    pub fn emit_session_expired(&self) {
        let listeners: Vec<(u64, Listener)> = self
            .inner
            .lock()
            .iter()
            .map(|(id, listener)| (*id, Arc::clone(listener)))
            .collect();

        debug!(count = listeners.len(), "Broadcasting session expiry");

        for (id, listener) in listeners {
            if panic::catch_unwind(AssertUnwindSafe(|| (*listener)())).is_err() {
                warn!(listener_id = id, "Session-expired listener panicked");
            }
        }
    }
}

impl EventsInner {
    fn lock(&self) -> MutexGuard<'_, BTreeMap<u64, Listener>> {
        self.listeners.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl std::fmt::Debug for SessionEvents {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionEvents")
            .field("listeners", &self.listener_count())
            .finish()
    }
}

/// Handle returned by [`SessionEvents::subscribe`].
#[derive(Debug)]
#[must_use = "keep the subscription to be able to unsubscribe later"]
pub struct Subscription {
    id: u64,
    events: std::sync::Weak<EventsInner>,
}

impl Subscription {
    /// Remove the listener this subscription registered.
    pub fn unsubscribe(self) {
        if let Some(inner) = self.events.upgrade() {
            inner.lock().remove(&self.id);
            debug!(listener_id = self.id, "Session-expired listener removed");
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::AtomicUsize;

    use super::*;

    #[test]
    fn subscribe_then_unsubscribe_restores_listener_set() {
        let events = SessionEvents::new();
        let _kept = events.subscribe(|| {});
        assert_eq!(events.listener_count(), 1);

        let sub = events.subscribe(|| {});
        assert_eq!(events.listener_count(), 2);

        sub.unsubscribe();
        assert_eq!(events.listener_count(), 1);
    }

    #[test]
    fn every_listener_fires_once_per_emit() {
        let events = SessionEvents::new();
        let hits = Arc::new(AtomicUsize::new(0));

        for _ in 0..3 {
            let hits = Arc::clone(&hits);
            let _ = events.subscribe(move || {
                hits.fetch_add(1, Ordering::SeqCst);
            });
        }

        events.emit_session_expired();
        assert_eq!(hits.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn panicking_listener_does_not_stop_the_others() {
        let events = SessionEvents::new();
        let hits = Arc::new(AtomicUsize::new(0));

        let first = Arc::clone(&hits);
        let _a = events.subscribe(move || {
            first.fetch_add(1, Ordering::SeqCst);
        });
        let _b = events.subscribe(|| panic!("listener failure"));
        let last = Arc::clone(&hits);
        let _c = events.subscribe(move || {
            last.fetch_add(1, Ordering::SeqCst);
        });

        events.emit_session_expired();
        assert_eq!(hits.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn clones_share_listeners() {
        let events = SessionEvents::new();
        let clone = events.clone();
        let sub = clone.subscribe(|| {});
        assert_eq!(events.listener_count(), 1);
        sub.unsubscribe();
        assert_eq!(events.listener_count(), 0);
    }

    #[test]
    fn unsubscribe_after_emitter_dropped_is_noop() {
        let events = SessionEvents::new();
        let sub = events.subscribe(|| {});
        drop(events);
        sub.unsubscribe();
    }
}
