#![allow(dead_code)]

use faultless::{Executor, MemoryLogger};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TestError {
    #[error("transient failure {0}")]
    Transient(usize),
    #[error("fatal failure")]
    Fatal,
}

/// Executor with logging captured in memory.
pub fn recording_executor() -> (Executor<TestError>, MemoryLogger) {
    let logger = MemoryLogger::new();
    let executor = Executor::builder().logger(logger.clone()).build().expect("executor");
    (executor, logger)
}

/// Executor that neither logs nor has hooks.
pub fn quiet_executor() -> Executor<TestError> {
    Executor::builder().without_logger().build().expect("executor")
}

/// Shared invocation counter.
#[derive(Debug, Clone, Default)]
pub struct Counter(Arc<AtomicUsize>);

impl Counter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Increment and return the new count.
    pub fn bump(&self) -> usize {
        self.0.fetch_add(1, Ordering::SeqCst) + 1
    }

    pub fn get(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }
}

/// Synchronous work that fails `failures` times, then returns its call number.
pub fn flaky(failures: usize, calls: Counter) -> impl Fn() -> Result<usize, TestError> + Send + Sync + 'static {
    move || {
        let n = calls.bump();
        if n > failures {
            Ok(n)
        } else {
            Err(TestError::Transient(n))
        }
    }
}

/// Synchronous work that never succeeds.
pub fn always_failing(calls: Counter) -> impl Fn() -> Result<(), TestError> + Send + Sync + 'static {
    move || {
        calls.bump();
        Err(TestError::Fatal)
    }
}

/// Asynchronous work that fails `failures` times, then returns its call number.
pub fn flaky_async(
    failures: usize,
    calls: Counter,
) -> impl Fn() -> futures::future::BoxFuture<'static, Result<usize, TestError>> + Send + Sync + 'static {
    use futures::FutureExt;
    move || {
        let n = calls.bump();
        async move {
            tokio::task::yield_now().await;
            if n > failures {
                Ok(n)
            } else {
                Err(TestError::Transient(n))
            }
        }
        .boxed()
    }
}
