//! In-flight operation tracking
//!
//! Transport calls register themselves while running. Anything that must wait
//! for the current burst of remote work to finish awaits [`ListenTracker::settled`].

use std::future::Future;
use std::sync::Arc;

use futures_util::future::{BoxFuture, FutureExt};
use tokio::sync::watch;

/// Counts in-flight operations
#[derive(Clone)]
pub struct ListenTracker {
    count: Arc<watch::Sender<usize>>,
}

impl ListenTracker {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(0usize);
        Self { count: Arc::new(tx) }
    }

    /// Register an operation; it stays in flight until the guard drops
    pub fn begin(&self) -> InFlight {
        self.count.send_modify(|count| *count += 1);
        InFlight {
            count: Arc::clone(&self.count),
        }
    }

    /// Track `future` from this call until it completes or is dropped
    pub fn track<F>(&self, future: F) -> impl Future<Output = F::Output>
    where
        F: Future,
    {
        let guard = self.begin();
        async move {
            let output = future.await;
            drop(guard);
            output
        }
    }

    /// Run `callback`, then wait for everything it (or anyone else) started
    pub fn listen<F>(&self, callback: F) -> BoxFuture<'static, ()>
    where
        F: FnOnce(),
    {
        callback();
        self.settled().boxed()
    }

    /// Resolves once no operation is in flight
    pub fn settled(&self) -> impl Future<Output = ()> + Send + 'static {
        let mut rx = self.count.subscribe();
        async move {
            loop {
                if *rx.borrow_and_update() == 0 {
                    return;
                }
                // Err means the tracker is gone, so nothing can still be in flight
                if rx.changed().await.is_err() {
                    return;
                }
            }
        }
    }

    /// Number of operations currently in flight
    pub fn in_flight(&self) -> usize {
        *self.count.borrow()
    }
}

impl Default for ListenTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ListenTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ListenTracker")
            .field("in_flight", &self.in_flight())
            .finish()
    }
}

/// Guard for one in-flight operation
pub struct InFlight {
    count: Arc<watch::Sender<usize>>,
}

impl Drop for InFlight {
    fn drop(&mut self) {
        self.count.send_modify(|count| *count = count.saturating_sub(1));
    }
}
