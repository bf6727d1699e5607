//! # Retry Once
//!
//! Bounded retry: an operation runs, and if its error satisfies a predicate it
//! runs exactly one more time with [`Attempt::Retry`]. The retry's error is
//! returned as-is, whatever it is. There is no delay and no timeout between
//! attempts.

use std::future::Future;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Attempt {
    Initial,
    Retry,
}

/// Error of the final attempt, tagged with the attempt that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttemptError<E> {
    pub attempt: Attempt,
    pub error: E,
}

pub struct RetryOnce<P> {
    should_retry: P,
}

impl<P> RetryOnce<P> {
    /// # Arguments
    ///
    /// * `should_retry` - Decides whether a first-attempt error warrants the single retry
    pub fn new(should_retry: P) -> Self {
        Self { should_retry }
    }

    /// Run `operation`, retrying at most once.
    pub async fn run<T, E, F, Fut>(&self, mut operation: F) -> Result<T, AttemptError<E>>
    where
        P: Fn(&E) -> bool,
        F: FnMut(Attempt) -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        match operation(Attempt::Initial).await {
            Ok(value) => Ok(value),
            Err(error) if (self.should_retry)(&error) => {
                operation(Attempt::Retry).await.map_err(|error| AttemptError {
                    attempt: Attempt::Retry,
                    error,
                })
            }
            Err(error) => Err(AttemptError {
                attempt: Attempt::Initial,
                error,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[tokio::test]
    async fn test_success_runs_once() {
        let counter = AtomicU32::new(0);
        let calls = &counter;
        let result: Result<u32, AttemptError<&str>> = RetryOnce::new(|_: &&str| true)
            .run(move |_| async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok(7)
            })
            .await;
        assert_eq!(result, Ok(7));
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_retries_exactly_once() {
        let counter = AtomicU32::new(0);
        let calls = &counter;
        let result: Result<u32, AttemptError<&str>> = RetryOnce::new(|e: &&str| *e == "again")
            .run(move |_| async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Err("again")
            })
            .await;
        assert_eq!(
            result,
            Err(AttemptError {
                attempt: Attempt::Retry,
                error: "again"
            })
        );
        assert_eq!(counter.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_non_retryable_error_is_returned_immediately() {
        let counter = AtomicU32::new(0);
        let calls = &counter;
        let result: Result<u32, AttemptError<&str>> = RetryOnce::new(|e: &&str| *e == "again")
            .run(move |_| async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Err("fatal")
            })
            .await;
        assert_eq!(result.unwrap_err().attempt, Attempt::Initial);
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_retry_attempt_is_visible_to_operation() {
        let result: Result<Attempt, AttemptError<()>> = RetryOnce::new(|_: &()| true)
            .run(|attempt| async move {
                match attempt {
                    Attempt::Initial => Err(()),
                    Attempt::Retry => Ok(attempt),
                }
            })
            .await;
        assert_eq!(result, Ok(Attempt::Retry));
    }
}
