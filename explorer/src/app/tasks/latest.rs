//! # Latest-Only Tasks
//!
//! "Last request wins": every [`LatestOnly::spawn`] supersedes the previous
//! request. The superseded task is aborted, and if it already produced a value
//! that value is dropped instead of applied.
//!
//! Used for debouncing (a request that only sleeps) and for any fetch keyed off
//! rapidly changing input.

use parking_lot::Mutex;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::task::{AbortHandle, JoinHandle};

/// Identifies one request; stays current until a newer request starts.
#[derive(Debug, Clone)]
pub struct Ticket {
    generation: u64,
    latest: Arc<AtomicU64>,
}

impl Ticket {
    pub fn is_current(&self) -> bool {
        self.latest.load(Ordering::SeqCst) == self.generation
    }
}

#[derive(Default)]
pub struct LatestOnly {
    latest: Arc<AtomicU64>,
    running: Mutex<Option<AbortHandle>>,
}

impl LatestOnly {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new request, invalidating every earlier ticket.
    pub fn ticket(&self) -> Ticket {
        let generation = self.latest.fetch_add(1, Ordering::SeqCst) + 1;
        Ticket {
            generation,
            latest: self.latest.clone(),
        }
    }

    /// Run `request` and hand its output to `apply`, unless a newer request was
    /// started first.
    ///
    /// # Arguments
    ///
    /// * `request` - Work whose result may become stale
    /// * `apply` - Applies the result; never called for a superseded request
    pub fn spawn<T, Fut, A>(&self, request: Fut, apply: A) -> JoinHandle<()>
    where
        T: Send + 'static,
        Fut: Future<Output = T> + Send + 'static,
        A: FnOnce(T) + Send + 'static,
    {
        let ticket = self.ticket();
        let handle = tokio::spawn(async move {
            let value = request.await;
            if ticket.is_current() {
                apply(value);
            }
        });

        if let Some(previous) = self.running.lock().replace(handle.abort_handle()) {
            previous.abort();
        }
        handle
    }

    /// Abort the running request, if any, and invalidate its ticket.
    pub fn cancel(&self) {
        self.ticket();
        if let Some(previous) = self.running.lock().take() {
            previous.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex as SyncMutex;
    use std::time::Duration;

    #[tokio::test(start_paused = true)]
    async fn test_only_latest_result_is_applied() {
        let latest = LatestOnly::new();
        let applied = Arc::new(SyncMutex::new(Vec::new()));

        for (i, delay) in [(1, 300), (2, 200), (3, 100)] {
            let applied = applied.clone();
            latest.spawn(
                async move {
                    tokio::time::sleep(Duration::from_millis(delay)).await;
                    i
                },
                move |value| applied.lock().push(value),
            );
        }

        tokio::time::sleep(Duration::from_millis(500)).await;
        assert_eq!(*applied.lock(), vec![3]);
    }

    #[tokio::test]
    async fn test_stale_ticket() {
        let latest = LatestOnly::new();
        let first = latest.ticket();
        assert!(first.is_current());
        let second = latest.ticket();
        assert!(!first.is_current());
        assert!(second.is_current());
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_drops_pending_request() {
        let latest = LatestOnly::new();
        let applied = Arc::new(SyncMutex::new(false));
        let flag = applied.clone();
        latest.spawn(tokio::time::sleep(Duration::from_millis(50)), move |_| *flag.lock() = true);

        latest.cancel();
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(!*applied.lock());
    }
}
