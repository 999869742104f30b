//! Combinators on results that have not resolved yet.
//!
//! The asynchronous entry points hand back a future of an
//! [`ExecutionResult`]. [`PendingResult`] lets a whole chain be written
//! before the first `.await`:
//!
//! ```rust
//! use faultless::prelude::*;
//!
//! # tokio::runtime::Runtime::new().unwrap().block_on(async {
//! let executor: Executor<String> = Executor::builder().without_logger().build().unwrap();
//! let result = executor
//!     .try_execute_async(|| async { Err::<u32, _>("down".to_string()) })
//!     .retry_once()
//!     .on_exception(|r| println!("still failing: {:?}", r.error()))
//!     .on_success(|_| unreachable!())
//!     .await;
//! assert!(!result.was_successful());
//! # });
//! ```
//!
//! Each step awaits the previous one before running, so handlers and retries
//! fire in the order they were written.

use crate::result::ExecutionResult;
use crate::retry::retry_pending;
use crate::shape::{AsyncShape, Shape};
use futures::future::BoxFuture;
use futures::FutureExt;
use std::future::Future;

/// Extension methods for any future that resolves to an [`ExecutionResult`].
pub trait PendingResult<S: Shape>:
    Future<Output = ExecutionResult<S>> + Send + Sized + 'static
{
    /// Run `handler` once the result resolves, if it succeeded.
    fn on_success<H>(self, handler: H) -> BoxFuture<'static, ExecutionResult<S>>
    where
        H: FnOnce(&ExecutionResult<S>) + Send + 'static,
    {
        async move { self.await.on_success(handler) }.boxed()
    }

    /// Run `handler` once the result resolves, if it failed.
    fn on_exception<H>(self, handler: H) -> BoxFuture<'static, ExecutionResult<S>>
    where
        H: FnOnce(&ExecutionResult<S>) + Send + 'static,
    {
        async move { self.await.on_exception(handler) }.boxed()
    }

    fn retry_once(self) -> BoxFuture<'static, ExecutionResult<S>>
    where
        S: AsyncShape,
    {
        async move { retry_pending(self.await, |_| true, 1).await }.boxed()
    }

    fn retry(self, max_attempts: usize) -> BoxFuture<'static, ExecutionResult<S>>
    where
        S: AsyncShape,
    {
        async move { retry_pending(self.await, |_| true, max_attempts).await }.boxed()
    }

    fn retry_once_if<P>(self, predicate: P) -> BoxFuture<'static, ExecutionResult<S>>
    where
        S: AsyncShape,
        P: FnMut(&ExecutionResult<S>) -> bool + Send + 'static,
    {
        async move { retry_pending(self.await, predicate, 1).await }.boxed()
    }

    fn retry_if<P>(self, predicate: P, max_attempts: usize) -> BoxFuture<'static, ExecutionResult<S>>
    where
        S: AsyncShape,
        P: FnMut(&ExecutionResult<S>) -> bool + Send + 'static,
    {
        async move { retry_pending(self.await, predicate, max_attempts).await }.boxed()
    }
}

impl<S, F> PendingResult<S> for F
where
    S: Shape,
    F: Future<Output = ExecutionResult<S>> + Send + 'static,
{
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::executor::Executor;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    fn executor() -> Executor<String> {
        Executor::builder().without_logger().build().unwrap()
    }

    #[tokio::test]
    async fn handlers_fire_in_written_order() {
        let order = Arc::new(Mutex::new(Vec::new()));
        let first = order.clone();
        let second = order.clone();

        let result = executor()
            .try_execute_action_async(|| async { Ok(()) })
            .on_success(move |_| first.lock().unwrap().push("first"))
            .on_exception(|_| panic!("must not run"))
            .on_success(move |_| second.lock().unwrap().push("second"))
            .await;

        assert!(result.was_successful());
        assert_eq!(*order.lock().unwrap(), vec!["first", "second"]);
    }

    #[tokio::test]
    async fn retry_then_branch_sees_the_final_outcome() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let succeeded = Arc::new(AtomicUsize::new(0));
        let failed = Arc::new(AtomicUsize::new(0));
        let (s, f) = (succeeded.clone(), failed.clone());

        let result = executor()
            .try_execute_async(move || {
                let n = counter.fetch_add(1, Ordering::SeqCst);
                async move {
                    if n == 0 {
                        Err("first try".to_string())
                    } else {
                        Ok(n)
                    }
                }
            })
            .retry_once()
            .on_exception(move |_| {
                f.fetch_add(1, Ordering::SeqCst);
            })
            .on_success(move |_| {
                s.fetch_add(1, Ordering::SeqCst);
            })
            .await;

        assert_eq!(result.return_value(), Some(&1));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(succeeded.load(Ordering::SeqCst), 1);
        assert_eq!(failed.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn sync_as_async_results_chain_like_async_ones() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();

        let result = executor()
            .try_execute_action_sync_as_async(move || {
                counter.fetch_add(1, Ordering::SeqCst);
                Err("blocking failure".to_string())
            })
            .retry_if(|_| true, 2)
            .await;

        assert!(!result.was_successful());
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }
}
