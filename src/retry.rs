//! Retry combinators.
//!
//! A failed [`ExecutionResult`] can be resubmitted to the executor that
//! produced it. The callable, executor, and message stored in the result are
//! reused as-is, so a retry goes through the same capture boundary as the
//! first attempt.
//!
//! Semantics:
//! - A successful result is returned unchanged and the predicate is never
//!   consulted.
//! - The predicate is asked on every iteration about the most recent failing
//!   result: the input first, then the latest failed retry. A `false` answer
//!   skips that iteration's resubmission and the loop moves on, so the
//!   predicate is asked exactly `max_attempts` times unless an attempt
//!   succeeds first.
//! - The first successful attempt is returned immediately.
//! - After `max_attempts` failed attempts the most recent failure is returned.
//!   `max_attempts == 0` returns the input without calling the predicate.
//! - Attempts are strictly sequential. Predicate panics are not captured.
//!
//! Example
//! ```rust
//! use faultless::Executor;
//! use std::sync::atomic::{AtomicUsize, Ordering};
//! use std::sync::Arc;
//!
//! let executor: Executor<String> = Executor::builder().without_logger().build().unwrap();
//! let calls = Arc::new(AtomicUsize::new(0));
//! let counter = calls.clone();
//!
//! let result = executor
//!     .try_execute(move || match counter.fetch_add(1, Ordering::SeqCst) {
//!         0 | 1 => Err("not yet".to_string()),
//!         n => Ok(n),
//!     })
//!     .retry(5);
//!
//! assert_eq!(result.return_value(), Some(&2));
//! assert_eq!(calls.load(Ordering::SeqCst), 3);
//! ```

use crate::error::CaptureError;
use crate::result::ExecutionResult;
use crate::shape::{AsyncAction, AsyncFunc, AsyncShape, SyncAction, SyncFunc, SyncShape};

/// General blocking retry loop behind every synchronous combinator.
pub(crate) fn retry_blocking<S, P>(
    result: ExecutionResult<S>,
    mut predicate: P,
    max_attempts: usize,
) -> ExecutionResult<S>
where
    S: SyncShape,
    P: FnMut(&ExecutionResult<S>) -> bool,
{
    if result.was_successful() {
        return result;
    }

    let mut current = result;
    for attempt in 1..=max_attempts {
        if !predicate(&current) {
            tracing::debug!(shape = %S::KIND, attempt, "retry declined");
            continue;
        }
        let next =
            S::resubmit(current.executed_by(), current.executed_code(), current.diagnostic_handle());
        if next.was_successful() {
            tracing::debug!(shape = %S::KIND, attempt, "retry succeeded");
            return next;
        }
        current = next;
    }

    if max_attempts > 0 {
        tracing::debug!(shape = %S::KIND, max_attempts, "retries exhausted");
    }
    current
}

/// Awaiting counterpart of [`retry_blocking`].
pub(crate) async fn retry_pending<S, P>(
    result: ExecutionResult<S>,
    mut predicate: P,
    max_attempts: usize,
) -> ExecutionResult<S>
where
    S: AsyncShape,
    P: FnMut(&ExecutionResult<S>) -> bool,
{
    if result.was_successful() {
        return result;
    }

    let mut current = result;
    for attempt in 1..=max_attempts {
        if !predicate(&current) {
            tracing::debug!(shape = %S::KIND, attempt, "retry declined");
            continue;
        }
        let resubmitted =
            S::resubmit(current.executed_by(), current.executed_code(), current.diagnostic_handle());
        let next = resubmitted.await;
        if next.was_successful() {
            tracing::debug!(shape = %S::KIND, attempt, "retry succeeded");
            return next;
        }
        current = next;
    }

    if max_attempts > 0 {
        tracing::debug!(shape = %S::KIND, max_attempts, "retries exhausted");
    }
    current
}

macro_rules! blocking_retry {
    ([$($generics:tt)*] $shape:ty) => {
        impl<$($generics)*> ExecutionResult<$shape> {
            /// Resubmit the work once if it failed.
            pub fn retry_once(self) -> Self {
                retry_blocking(self, |_| true, 1)
            }

            /// Resubmit the work up to `max_attempts` times until it succeeds.
            pub fn retry(self, max_attempts: usize) -> Self {
                retry_blocking(self, |_| true, max_attempts)
            }

            /// Resubmit the work once if it failed and `predicate` agrees.
            pub fn retry_once_if<P>(self, predicate: P) -> Self
            where
                P: FnMut(&Self) -> bool,
            {
                retry_blocking(self, predicate, 1)
            }

            /// Resubmit the work while `predicate` agrees, at most `max_attempts` times.
            pub fn retry_if<P>(self, predicate: P, max_attempts: usize) -> Self
            where
                P: FnMut(&Self) -> bool,
            {
                retry_blocking(self, predicate, max_attempts)
            }
        }
    };
}

macro_rules! awaiting_retry {
    ([$($generics:tt)*] $shape:ty) => {
        impl<$($generics)*> ExecutionResult<$shape> {
            /// Resubmit the work once if it failed.
            pub async fn retry_once(self) -> Self {
                retry_pending(self, |_| true, 1).await
            }

            /// Resubmit the work up to `max_attempts` times until it succeeds.
            pub async fn retry(self, max_attempts: usize) -> Self {
                retry_pending(self, |_| true, max_attempts).await
            }

            /// Resubmit the work once if it failed and `predicate` agrees.
            pub async fn retry_once_if<P>(self, predicate: P) -> Self
            where
                P: FnMut(&Self) -> bool + Send,
            {
                retry_pending(self, predicate, 1).await
            }

            /// Resubmit the work while `predicate` agrees, at most `max_attempts` times.
            pub async fn retry_if<P>(self, predicate: P, max_attempts: usize) -> Self
            where
                P: FnMut(&Self) -> bool + Send,
            {
                retry_pending(self, predicate, max_attempts).await
            }
        }
    };
}

blocking_retry!([E: CaptureError] SyncAction<E>);
blocking_retry!([T: Send + 'static, E: CaptureError] SyncFunc<T, E>);
awaiting_retry!([E: CaptureError] AsyncAction<E>);
awaiting_retry!([T: Send + 'static, E: CaptureError] AsyncFunc<T, E>);
