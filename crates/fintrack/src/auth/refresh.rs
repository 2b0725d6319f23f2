//! Single-flight gate for access-token refresh.
//!
//! The gate owns one optional in-flight refresh. The first caller installs a
//! shared future; every caller arriving while it is pending awaits that same
//! future instead of issuing its own refresh call. Whoever observes the
//! outcome first clears the slot, so the next 401 starts a fresh refresh.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use futures_util::future::{BoxFuture, FutureExt, Shared};
use tracing::{debug, trace};

use super::tokens::AccessToken;

/// Result of one refresh round-trip, handed to every waiter.
#[derive(Debug, Clone)]
pub(crate) enum RefreshOutcome {
    /// New tokens were persisted; retry with this access token.
    Refreshed(AccessToken),
    /// The session is unrecoverable; tokens were cleared and listeners fired.
    Expired,
    /// The refresh endpoint failed transiently; tokens were kept.
    Unavailable(String),
}

/// Observable state of the refresh protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshState {
    /// No refresh is in flight.
    Idle,
    /// A refresh call is outstanding; new callers will join it.
    Refreshing,
}

type PendingRefresh = Shared<BoxFuture<'static, RefreshOutcome>>;

#[derive(Default)]
pub(crate) struct RefreshGate {
    pending: Mutex<Option<(u64, PendingRefresh)>>,
    next_id: AtomicU64,
}

impl RefreshGate {
    /// Join the in-flight refresh, or start one with `start` if none is pending.
    ///
    /// `start` is only called when this caller wins the slot. Dropping the
    /// returned future does not cancel the refresh for other waiters.
    pub(crate) async fn run<F>(&self, start: F) -> RefreshOutcome
    where
        F: FnOnce() -> BoxFuture<'static, RefreshOutcome>,
    {
        let (id, pending) = {
            let mut slot = self.lock();
            match slot.as_ref() {
                Some((id, pending)) => {
                    debug!(refresh_id = id, "Joining in-flight refresh");
                    (*id, pending.clone())
                }
                None => {
                    let id = self.next_id.fetch_add(1, Ordering::Relaxed);
                    debug!(refresh_id = id, "Starting refresh");
                    let pending = start().shared();
                    *slot = Some((id, pending.clone()));
                    (id, pending)
                }
            }
        };

        let outcome = pending.await;

        let mut slot = self.lock();
        if slot.as_ref().is_some_and(|(current, _)| *current == id) {
            trace!(refresh_id = id, "Clearing settled refresh");
            *slot = None;
        }

        outcome
    }

    pub(crate) fn state(&self) -> RefreshState {
        match self.lock().as_ref() {
            Some((_, pending)) if pending.peek().is_none() => RefreshState::Refreshing,
            _ => RefreshState::Idle,
        }
    }

    fn lock(&self) -> MutexGuard<'_, Option<(u64, PendingRefresh)>> {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl std::fmt::Debug for RefreshGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RefreshGate")
            .field("state", &self.state())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::AtomicUsize;

    use tokio::sync::oneshot;

    use super::*;

    #[tokio::test]
    async fn concurrent_callers_share_one_refresh() {
        let gate = RefreshGate::default();
        let calls = Arc::new(AtomicUsize::new(0));

        let start = || {
            let calls = Arc::clone(&calls);
            async move {
                calls.fetch_add(1, Ordering::SeqCst);
                tokio::task::yield_now().await;
                RefreshOutcome::Refreshed(AccessToken::new("fresh"))
            }
            .boxed()
        };

        let (a, b, c) = tokio::join!(gate.run(start), gate.run(start), gate.run(start));

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        for outcome in [a, b, c] {
            match outcome {
                RefreshOutcome::Refreshed(token) => assert_eq!(token.as_str(), "fresh"),
                other => panic!("unexpected outcome: {other:?}"),
            }
        }
        assert_eq!(gate.state(), RefreshState::Idle);
    }

    #[tokio::test]
    async fn settled_refresh_allows_a_new_one() {
        let gate = RefreshGate::default();
        let calls = Arc::new(AtomicUsize::new(0));

        for _ in 0..2 {
            let calls = Arc::clone(&calls);
            let outcome = gate
                .run(move || {
                    async move {
                        calls.fetch_add(1, Ordering::SeqCst);
                        RefreshOutcome::Expired
                    }
                    .boxed()
                })
                .await;
            assert!(matches!(outcome, RefreshOutcome::Expired));
        }

        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn state_reports_refreshing_while_pending() {
        let gate = Arc::new(RefreshGate::default());
        let (tx, rx) = oneshot::channel::<()>();

        let task = tokio::spawn({
            let gate = Arc::clone(&gate);
            async move {
                gate.run(move || {
                    async move {
                        let _ = rx.await;
                        RefreshOutcome::Unavailable("HTTP 503".to_string())
                    }
                    .boxed()
                })
                .await
            }
        });

        while gate.state() == RefreshState::Idle {
            tokio::task::yield_now().await;
        }
        assert_eq!(gate.state(), RefreshState::Refreshing);

        tx.send(()).unwrap();
        let outcome = task.await.unwrap();

        assert!(matches!(outcome, RefreshOutcome::Unavailable(_)));
        assert_eq!(gate.state(), RefreshState::Idle);
    }
}
