//! Bounded-retry poll coordinator
//!
//! Every asynchronous wait in the suite goes through [`repeat_until_timeout`]:
//! waiting for a remote service to stop, for UI text to appear after a page
//! refresh, for a scheduled action to complete. The attempt closure decides
//! between two very different outcomes on each invocation:
//!
//! - `Ok(Poll::Pending)` — the condition is not true *yet*; retry after the
//!   configured interval.
//! - `Err(e)` — something unrecoverable happened; abort the wait immediately
//!   and propagate, no further attempts.
//!
//! Attempts are free to perform side effects (refreshing a page, re-running a
//! command); the coordinator never deduplicates them. Attempts must therefore
//! be idempotent under repetition.

use std::future::Future;
use std::time::{Duration, Instant};

use tracing::debug;

use crate::error::{Error, Result};

/// Outcome of a single poll attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Poll<T> {
    /// The condition holds; the wait succeeds with this value.
    Ready(T),
    /// Not true yet; retry after the interval.
    Pending,
}

/// Configuration for a bounded wait.
#[derive(Debug, Clone)]
pub struct RetryOpts {
    /// Total wall-clock budget for the wait.
    pub timeout: Duration,
    /// Pause between unsuccessful attempts.
    pub interval: Duration,
    /// Human-readable description of what is being waited for, used in the
    /// timeout error.
    pub message: String,
}

impl Default for RetryOpts {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(250),
            interval: Duration::from_secs(1),
            message: "condition to become true".to_string(),
        }
    }
}

impl RetryOpts {
    pub fn new(timeout: Duration) -> Self {
        Self {
            timeout,
            ..Self::default()
        }
    }

    pub fn timeout_secs(secs: u64) -> Self {
        Self::new(Duration::from_secs(secs))
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }
}

/// Repeatedly invoke `attempt` until it reports [`Poll::Ready`] or the
/// timeout budget is exhausted.
///
/// A zero timeout grants exactly one attempt and never sleeps. Errors from
/// the attempt abort the wait on first occurrence. The returned
/// [`Error::TimeoutExceeded`] carries the configured budget and the actual
/// elapsed time.
pub async fn repeat_until_timeout<T, F, Fut>(opts: RetryOpts, mut attempt: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<Poll<T>>>,
{
    let start = Instant::now();
    let mut attempts: u32 = 0;

    loop {
        attempts += 1;
        if let Poll::Ready(value) = attempt().await? {
            debug!(
                attempts,
                elapsed_ms = start.elapsed().as_millis() as u64,
                "wait satisfied: {}",
                opts.message
            );
            return Ok(value);
        }

        let elapsed = start.elapsed();
        if elapsed >= opts.timeout {
            return Err(Error::TimeoutExceeded {
                message: opts.message.clone(),
                timeout: opts.timeout,
                elapsed,
            });
        }
        tokio::time::sleep(opts.interval).await;
    }
}

/// Boolean-predicate convenience over [`repeat_until_timeout`].
///
/// `Ok(true)` succeeds, `Ok(false)` retries, `Err` aborts.
pub async fn repeat_until_true<F, Fut>(opts: RetryOpts, mut predicate: F) -> Result<()>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<bool>>,
{
    repeat_until_timeout(opts, || {
        let fut = predicate();
        async move {
            Ok(match fut.await? {
                true => Poll::Ready(()),
                false => Poll::Pending,
            })
        }
    })
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    fn fast_opts(timeout_ms: u64) -> RetryOpts {
        RetryOpts::new(Duration::from_millis(timeout_ms))
            .with_interval(Duration::from_millis(5))
            .with_message("test condition")
    }

    #[tokio::test]
    async fn succeeds_on_nth_attempt_with_exactly_n_invocations() {
        let calls = Rc::new(Cell::new(0u32));
        let c = calls.clone();

        let value = repeat_until_timeout(fast_opts(1_000), move || {
            let c = c.clone();
            async move {
                c.set(c.get() + 1);
                Ok(if c.get() == 3 {
                    Poll::Ready(c.get())
                } else {
                    Poll::Pending
                })
            }
        })
        .await
        .unwrap();

        assert_eq!(value, 3);
        assert_eq!(calls.get(), 3);
    }

    #[tokio::test]
    async fn zero_timeout_makes_a_single_attempt_without_sleeping() {
        let calls = Rc::new(Cell::new(0u32));
        let c = calls.clone();

        let start = Instant::now();
        let err = repeat_until_timeout::<(), _, _>(
            RetryOpts::new(Duration::ZERO).with_interval(Duration::from_secs(60)),
            move || {
                let c = c.clone();
                async move {
                    c.set(c.get() + 1);
                    Ok(Poll::Pending)
                }
            },
        )
        .await
        .unwrap_err();

        assert!(err.is_timeout());
        assert_eq!(calls.get(), 1);
        // With a 60s interval, returning quickly proves no sleep happened.
        assert!(start.elapsed() < Duration::from_secs(5));
    }

    #[tokio::test]
    async fn attempt_error_aborts_on_first_occurrence() {
        let calls = Rc::new(Cell::new(0u32));
        let c = calls.clone();

        let err = repeat_until_timeout::<(), _, _>(fast_opts(1_000), move || {
            let c = c.clone();
            async move {
                c.set(c.get() + 1);
                Err(Error::UnknownTarget("bogus".into()))
            }
        })
        .await
        .unwrap_err();

        assert!(matches!(err, Error::UnknownTarget(_)));
        assert_eq!(calls.get(), 1);
    }

    #[tokio::test]
    async fn timeout_error_carries_message_and_elapsed() {
        let err = repeat_until_timeout::<(), _, _>(fast_opts(20), || async {
            Ok(Poll::Pending)
        })
        .await
        .unwrap_err();

        match err {
            Error::TimeoutExceeded {
                message,
                timeout,
                elapsed,
            } => {
                assert_eq!(message, "test condition");
                assert_eq!(timeout, Duration::from_millis(20));
                assert!(elapsed >= timeout);
            }
            other => panic!("expected TimeoutExceeded, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn boolean_convenience_maps_true_to_success() {
        let calls = Rc::new(Cell::new(0u32));
        let c = calls.clone();

        repeat_until_true(fast_opts(1_000), move || {
            let c = c.clone();
            async move {
                c.set(c.get() + 1);
                Ok(c.get() >= 2)
            }
        })
        .await
        .unwrap();

        assert_eq!(calls.get(), 2);
    }
}
