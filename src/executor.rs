//! The capture engine.
//!
//! An [`Executor`] invokes caller code and guarantees that nothing the code
//! does, returning an error or panicking, escapes the call. Every invocation
//! produces an [`ExecutionResult`] instead.
//!
//! Semantics:
//! - Six entry points cover the four shapes: `try_execute_action`,
//!   `try_execute`, `try_execute_action_async`, `try_execute_async`, plus the
//!   two `*_sync_as_async` variants that move blocking work onto tokio's
//!   blocking pool and then follow the async path.
//! - On failure the executor logs (when `log_errors` is set and a logger is
//!   configured), then runs the `on_exception` hook, then builds the failure
//!   result. The `on_result` hook runs for every result.
//! - Only the callable is guarded. Hooks and loggers run outside the capture
//!   boundary, so a panicking hook unwinds into the caller.
//! - An optional deadline bounds each awaited attempt. Synchronous code is
//!   never interrupted, including blocking work run through the
//!   `*_sync_as_async` entry points, so a retry never overlaps an attempt that
//!   is still running.
//!
//! Example
//! ```rust
//! use faultless::Executor;
//!
//! let executor: Executor<String> = Executor::new();
//! let result = executor
//!     .with_message("parsing {}")
//!     .arg("42")
//!     .try_execute(|| "42".parse::<u32>().map_err(|e| e.to_string()));
//! assert!(result.was_successful());
//! assert_eq!(result.return_value(), Some(&42));
//! ```

use crate::config::ExecutorConfig;
use crate::diagnostic::{Diagnostic, DEFAULT_TEMPLATE};
use crate::error::{BuildError, CaptureError, ExecutionError};
use crate::logger::{ErrorLogger, TracingLogger};
use crate::result::{
    ActionExecutionResult, AsyncActionExecutionResult, AsyncFuncExecutionResult, ExecutionResult,
    FuncExecutionResult, Outcome,
};
use crate::shape::{AsyncCode, Shape, SyncCode};
use futures::future::BoxFuture;
use futures::FutureExt;
use std::borrow::Cow;
use std::fmt;
use std::future::Future;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Hook run for every captured error.
pub type ExceptionHook<E> = Arc<dyn Fn(&ExecutionError<E>) + Send + Sync>;

/// Hook run for every produced result.
pub type ResultHook<E> = Arc<dyn Fn(&dyn Outcome<E>) + Send + Sync>;

struct Inner<E> {
    log_errors: AtomicBool,
    catch_panics: bool,
    timeout: Option<Duration>,
    logger: Option<Arc<dyn ErrorLogger<E>>>,
    on_exception: Option<ExceptionHook<E>>,
    on_result: Option<ResultHook<E>>,
}

/// Runs caller code and turns every failure into an [`ExecutionResult`].
///
/// Cloning is cheap and clones share configuration; results hold a clone so
/// retries go back through the executor that produced them.
pub struct Executor<E> {
    inner: Arc<Inner<E>>,
}

impl<E> Clone for Executor<E> {
    fn clone(&self) -> Self {
        Self { inner: Arc::clone(&self.inner) }
    }
}

impl<E> fmt::Debug for Executor<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Executor")
            .field("log_errors", &self.inner.log_errors.load(Ordering::Relaxed))
            .field("catch_panics", &self.inner.catch_panics)
            .field("timeout", &self.inner.timeout)
            .field("logger", &self.inner.logger.as_ref().map(|_| "<logger>"))
            .field("on_exception", &self.inner.on_exception.as_ref().map(|_| "<hook>"))
            .field("on_result", &self.inner.on_result.as_ref().map(|_| "<hook>"))
            .finish()
    }
}

impl<E: CaptureError> Default for Executor<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: CaptureError> Executor<E> {
    /// Executor with default settings, logging through [`TracingLogger`].
    pub fn new() -> Self {
        ExecutorBuilder::new().assemble()
    }

    /// Construct a new builder with defaults.
    pub fn builder() -> ExecutorBuilder<E> {
        ExecutorBuilder::new()
    }

    /// Whether captured errors are sent to the logger.
    pub fn log_errors(&self) -> bool {
        self.inner.log_errors.load(Ordering::Acquire)
    }

    /// Toggle logging for this executor and every clone of it.
    pub fn set_log_errors(&self, enabled: bool) {
        self.inner.log_errors.store(enabled, Ordering::Release);
    }

    /// Whether panics in caller code are captured as failures.
    pub fn catch_panics(&self) -> bool {
        self.inner.catch_panics
    }

    /// Deadline applied to each awaited attempt. Blocking work is unbounded.
    pub fn timeout(&self) -> Option<Duration> {
        self.inner.timeout
    }

    /// Whether a logger is configured.
    pub fn has_logger(&self) -> bool {
        self.inner.logger.is_some()
    }

    /// True if both handles refer to the same executor.
    pub fn same_as(&self, other: &Executor<E>) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// Attach a log message template to the next invocation.
    pub fn with_message(&self, template: impl Into<Cow<'static, str>>) -> Described<'_, E> {
        self.with_diagnostic(Diagnostic::new(template))
    }

    /// Attach a prepared [`Diagnostic`] to the next invocation.
    pub fn with_diagnostic(&self, diagnostic: Diagnostic) -> Described<'_, E> {
        Described { executor: self, diagnostic: Some(diagnostic) }
    }

    fn plain(&self) -> Described<'_, E> {
        Described { executor: self, diagnostic: None }
    }

    /// Run synchronous work that returns nothing.
    pub fn try_execute_action<F>(&self, code: F) -> ActionExecutionResult<E>
    where
        F: Fn() -> Result<(), E> + Send + Sync + 'static,
    {
        self.plain().try_execute_action(code)
    }

    /// Run synchronous work that returns a value.
    pub fn try_execute<T, F>(&self, code: F) -> FuncExecutionResult<T, E>
    where
        T: Send + 'static,
        F: Fn() -> Result<T, E> + Send + Sync + 'static,
    {
        self.plain().try_execute(code)
    }

    /// Await asynchronous work that returns nothing.
    pub fn try_execute_action_async<F, Fut>(
        &self,
        code: F,
    ) -> BoxFuture<'static, AsyncActionExecutionResult<E>>
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), E>> + Send + 'static,
    {
        self.plain().try_execute_action_async(code)
    }

    /// Await asynchronous work that returns a value.
    pub fn try_execute_async<T, F, Fut>(
        &self,
        code: F,
    ) -> BoxFuture<'static, AsyncFuncExecutionResult<T, E>>
    where
        T: Send + 'static,
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, E>> + Send + 'static,
    {
        self.plain().try_execute_async(code)
    }

    /// Run blocking work that returns nothing on the blocking pool and await it.
    pub fn try_execute_action_sync_as_async<F>(
        &self,
        code: F,
    ) -> BoxFuture<'static, AsyncActionExecutionResult<E>>
    where
        F: Fn() -> Result<(), E> + Send + Sync + 'static,
    {
        self.plain().try_execute_action_sync_as_async(code)
    }

    /// Run blocking work that returns a value on the blocking pool and await it.
    pub fn try_execute_sync_as_async<T, F>(
        &self,
        code: F,
    ) -> BoxFuture<'static, AsyncFuncExecutionResult<T, E>>
    where
        T: Send + 'static,
        F: Fn() -> Result<T, E> + Send + Sync + 'static,
    {
        self.plain().try_execute_sync_as_async(code)
    }

    pub(crate) fn run_sync<T, S>(
        &self,
        code: SyncCode<T, E>,
        diagnostic: Option<Arc<Diagnostic>>,
    ) -> ExecutionResult<S>
    where
        S: Shape<Output = T, Error = E, Code = SyncCode<T, E>>,
    {
        let outcome = self.capture_sync(&code);
        self.finish(code, outcome, diagnostic)
    }

    pub(crate) fn run_async<T, S>(
        &self,
        code: AsyncCode<T, E>,
        diagnostic: Option<Arc<Diagnostic>>,
    ) -> BoxFuture<'static, ExecutionResult<S>>
    where
        T: Send + 'static,
        S: Shape<Output = T, Error = E, Code = AsyncCode<T, E>>,
    {
        let executor = self.clone();
        let attempt = self.capture_async(Arc::clone(&code));
        async move {
            let outcome = attempt.await;
            executor.finish(code, outcome, diagnostic)
        }
        .boxed()
    }

    fn capture_sync<T>(&self, code: &SyncCode<T, E>) -> Result<T, ExecutionError<E>> {
        let returned = if self.inner.catch_panics {
            match panic::catch_unwind(AssertUnwindSafe(|| code())) {
                Ok(returned) => returned,
                Err(payload) => return Err(ExecutionError::from_panic(payload)),
            }
        } else {
            code()
        };
        returned.map_err(ExecutionError::Failed)
    }

    fn capture_async<T>(
        &self,
        code: AsyncCode<T, E>,
    ) -> BoxFuture<'static, Result<T, ExecutionError<E>>>
    where
        T: Send + 'static,
    {
        // invoke lazily so a panic while building the future is caught too
        let attempt = async move { code().await };
        if self.inner.catch_panics {
            AssertUnwindSafe(attempt)
                .catch_unwind()
                .map(|caught| {
                    caught.unwrap_or_else(|payload| Err(ExecutionError::from_panic(payload)))
                })
                .boxed()
        } else {
            attempt.boxed()
        }
    }

    fn finish<S>(
        &self,
        code: S::Code,
        outcome: Result<S::Output, ExecutionError<E>>,
        diagnostic: Option<Arc<Diagnostic>>,
    ) -> ExecutionResult<S>
    where
        S: Shape<Error = E>,
    {
        let result = match outcome {
            Ok(value) => ExecutionResult::success(self.clone(), code, value),
            Err(error) => {
                self.handle_error(&error, diagnostic.as_deref());
                ExecutionResult::failure(self.clone(), code, error)
            }
        }
        .with_diagnostic(diagnostic);

        if let Some(hook) = &self.inner.on_result {
            hook(&result);
        }
        result
    }

    fn handle_error(&self, error: &ExecutionError<E>, diagnostic: Option<&Diagnostic>) {
        if self.log_errors() {
            if let Some(logger) = &self.inner.logger {
                match diagnostic.and_then(|d| d.template().map(|t| (t, d.arguments()))) {
                    Some((template, args)) => logger.log_error(error, template, args),
                    None => logger.log_error(error, DEFAULT_TEMPLATE, &[error.to_string()]),
                }
            }
        }
        if let Some(hook) = &self.inner.on_exception {
            hook(error);
        }
    }
}

/// An executor paired with the message to log if the next invocation fails.
///
/// Obtained from [`Executor::with_message`]; offers the same entry points.
/// Retries of the resulting result reuse the message.
#[must_use = "a described executor does nothing until one of its try_execute methods is called"]
pub struct Described<'a, E> {
    executor: &'a Executor<E>,
    diagnostic: Option<Diagnostic>,
}

impl<'a, E: CaptureError> Described<'a, E> {
    /// Append one positional template argument.
    pub fn arg(mut self, value: impl fmt::Display) -> Self {
        self.diagnostic = self.diagnostic.map(|d| d.arg(value));
        self
    }

    /// Append several positional template arguments.
    pub fn args<I, V>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: fmt::Display,
    {
        self.diagnostic = self.diagnostic.map(|d| d.args(values));
        self
    }

    fn split(self) -> (&'a Executor<E>, Option<Arc<Diagnostic>>) {
        (self.executor, self.diagnostic.map(Arc::new))
    }

    /// Run synchronous work that returns nothing, logging the message on failure.
    pub fn try_execute_action<F>(self, code: F) -> ActionExecutionResult<E>
    where
        F: Fn() -> Result<(), E> + Send + Sync + 'static,
    {
        let (executor, diagnostic) = self.split();
        let code: SyncCode<(), E> = Arc::new(code);
        executor.run_sync(code, diagnostic)
    }

    /// Run synchronous work that returns a value, logging the message on failure.
    pub fn try_execute<T, F>(self, code: F) -> FuncExecutionResult<T, E>
    where
        T: Send + 'static,
        F: Fn() -> Result<T, E> + Send + Sync + 'static,
    {
        let (executor, diagnostic) = self.split();
        let code: SyncCode<T, E> = Arc::new(code);
        executor.run_sync(code, diagnostic)
    }

    /// Await asynchronous work that returns nothing, under the executor's deadline.
    pub fn try_execute_action_async<F, Fut>(
        self,
        code: F,
    ) -> BoxFuture<'static, AsyncActionExecutionResult<E>>
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), E>> + Send + 'static,
    {
        let (executor, diagnostic) = self.split();
        executor.run_async(awaited(code, executor.timeout()), diagnostic)
    }

    /// Await asynchronous work that returns a value, under the executor's deadline.
    pub fn try_execute_async<T, F, Fut>(
        self,
        code: F,
    ) -> BoxFuture<'static, AsyncFuncExecutionResult<T, E>>
    where
        T: Send + 'static,
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, E>> + Send + 'static,
    {
        let (executor, diagnostic) = self.split();
        executor.run_async(awaited(code, executor.timeout()), diagnostic)
    }

    /// Run blocking work that returns nothing on the blocking pool.
    ///
    /// The deadline does not apply, so a retry never starts while the blocking
    /// closure is still running.
    pub fn try_execute_action_sync_as_async<F>(
        self,
        code: F,
    ) -> BoxFuture<'static, AsyncActionExecutionResult<E>>
    where
        F: Fn() -> Result<(), E> + Send + Sync + 'static,
    {
        let (executor, diagnostic) = self.split();
        executor.run_async(offloaded(code, executor.catch_panics()), diagnostic)
    }

    /// Run blocking work that returns a value on the blocking pool. Not bounded
    /// by the deadline.
    pub fn try_execute_sync_as_async<T, F>(
        self,
        code: F,
    ) -> BoxFuture<'static, AsyncFuncExecutionResult<T, E>>
    where
        T: Send + 'static,
        F: Fn() -> Result<T, E> + Send + Sync + 'static,
    {
        let (executor, diagnostic) = self.split();
        executor.run_async(offloaded(code, executor.catch_panics()), diagnostic)
    }
}

fn awaited<T, E, F, Fut>(code: F, deadline: Option<Duration>) -> AsyncCode<T, E>
where
    T: Send + 'static,
    E: CaptureError,
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<T, E>> + Send + 'static,
{
    Arc::new(move || {
        let attempt = code().map(|returned| returned.map_err(ExecutionError::Failed));
        match deadline {
            Some(limit) => tokio::time::timeout(limit, attempt)
                .map(move |bounded| {
                    bounded.unwrap_or_else(|_| Err(ExecutionError::TimedOut { timeout: limit }))
                })
                .boxed(),
            None => attempt.boxed(),
        }
    })
}

fn offloaded<T, E, F>(code: F, catch_panics: bool) -> AsyncCode<T, E>
where
    T: Send + 'static,
    E: CaptureError,
    F: Fn() -> Result<T, E> + Send + Sync + 'static,
{
    let code = Arc::new(code);
    Arc::new(move || {
        let code = Arc::clone(&code);
        async move {
            match tokio::task::spawn_blocking(move || code()).await {
                Ok(returned) => returned.map_err(ExecutionError::Failed),
                Err(join) if join.is_panic() => {
                    let payload = join.into_panic();
                    if !catch_panics {
                        panic::resume_unwind(payload);
                    }
                    Err(ExecutionError::from_panic(payload))
                }
                Err(_) => Err(ExecutionError::Cancelled),
            }
        }
        .boxed()
    })
}

/// Builder for [`Executor`].
pub struct ExecutorBuilder<E> {
    log_errors: bool,
    catch_panics: bool,
    timeout: Option<Duration>,
    logger: Option<Arc<dyn ErrorLogger<E>>>,
    on_exception: Option<ExceptionHook<E>>,
    on_result: Option<ResultHook<E>>,
}

impl<E: CaptureError> ExecutorBuilder<E> {
    /// Logging on through [`TracingLogger`], panics captured, no deadline, no hooks.
    pub fn new() -> Self {
        let defaults = ExecutorConfig::default();
        Self {
            log_errors: defaults.log_errors,
            catch_panics: defaults.catch_panics,
            timeout: defaults.timeout(),
            logger: Some(Arc::new(TracingLogger)),
            on_exception: None,
            on_result: None,
        }
    }

    /// Apply plain-data settings; hooks and logger are left as they are.
    pub fn config(mut self, config: ExecutorConfig) -> Self {
        self.log_errors = config.log_errors;
        self.catch_panics = config.catch_panics;
        self.timeout = config.timeout();
        self
    }

    /// Send captured errors to the logger (default `true`).
    pub fn log_errors(mut self, enabled: bool) -> Self {
        self.log_errors = enabled;
        self
    }

    /// Capture panics as failures (default). When off, panics unwind through
    /// the executor untouched.
    pub fn catch_panics(mut self, enabled: bool) -> Self {
        self.catch_panics = enabled;
        self
    }

    /// Bound each awaited attempt. Must be > 0. Blocking work run through the
    /// `*_sync_as_async` entry points is never cut off.
    pub fn timeout(mut self, limit: Duration) -> Self {
        self.timeout = Some(limit);
        self
    }

    /// Replace the default [`TracingLogger`].
    pub fn logger<L>(mut self, logger: L) -> Self
    where
        L: ErrorLogger<E> + 'static,
    {
        self.logger = Some(Arc::new(logger));
        self
    }

    /// Share one logger between several executors.
    pub fn shared_logger(mut self, logger: Arc<dyn ErrorLogger<E>>) -> Self {
        self.logger = Some(logger);
        self
    }

    /// Drop the logger entirely; hooks still run.
    pub fn without_logger(mut self) -> Self {
        self.logger = None;
        self
    }

    /// Hook run for every captured error, after logging.
    pub fn on_exception<F>(mut self, hook: F) -> Self
    where
        F: Fn(&ExecutionError<E>) + Send + Sync + 'static,
    {
        self.on_exception = Some(Arc::new(hook));
        self
    }

    /// Hook run for every produced result.
    pub fn on_result<F>(mut self, hook: F) -> Self
    where
        F: Fn(&dyn Outcome<E>) + Send + Sync + 'static,
    {
        self.on_result = Some(Arc::new(hook));
        self
    }

    /// Build the executor, validating inputs.
    pub fn build(self) -> Result<Executor<E>, BuildError> {
        if let Some(limit) = self.timeout {
            if limit.is_zero() {
                return Err(BuildError::InvalidTimeout(limit));
            }
        }
        Ok(self.assemble())
    }

    fn assemble(self) -> Executor<E> {
        Executor {
            inner: Arc::new(Inner {
                log_errors: AtomicBool::new(self.log_errors),
                catch_panics: self.catch_panics,
                timeout: self.timeout,
                logger: self.logger,
                on_exception: self.on_exception,
                on_result: self.on_result,
            }),
        }
    }
}

impl<E: CaptureError> Default for ExecutorBuilder<E> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logger::MemoryLogger;
    use crate::shape::ShapeKind;
    use std::sync::atomic::AtomicUsize;
    use std::sync::Mutex;

    #[derive(Debug, Clone, PartialEq, Eq)]
    struct TestError(String);

    impl fmt::Display for TestError {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "{}", self.0)
        }
    }

    fn recording() -> (Executor<TestError>, MemoryLogger) {
        let logger = MemoryLogger::new();
        let executor = Executor::builder().logger(logger.clone()).build().expect("builder");
        (executor, logger)
    }

    #[test]
    fn success_runs_code_once_and_skips_logger() {
        let (executor, logger) = recording();
        let runs = Arc::new(AtomicUsize::new(0));
        let runs_clone = runs.clone();

        let result = executor.try_execute_action(move || {
            runs_clone.fetch_add(1, Ordering::SeqCst);
            Ok(())
        });

        assert!(result.was_successful());
        assert!(result.error().is_none());
        assert_eq!(runs.load(Ordering::SeqCst), 1);
        assert!(result.executed_by().same_as(&executor));
        assert!(logger.is_empty());
    }

    #[test]
    fn failure_is_logged_with_default_template() {
        let (executor, logger) = recording();

        let result = executor.try_execute(|| Err::<u8, _>(TestError("i failed".into())));

        assert!(!result.was_successful());
        assert_eq!(result.error().and_then(|e| e.as_inner()), Some(&TestError("i failed".into())));
        assert!(result.return_value().is_none());

        let entries = logger.entries();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].template, DEFAULT_TEMPLATE);
        assert_eq!(entries[0].message, "Error caught by faultless: i failed");
    }

    #[test]
    fn message_template_and_args_reach_the_logger() {
        let (executor, logger) = recording();

        let result = executor
            .with_message("loading {} for {}")
            .arg("orders")
            .arg(42)
            .try_execute_action(|| Err(TestError("db down".into())));

        assert!(!result.was_successful());
        assert_eq!(result.diagnostic().and_then(|d| d.template()), Some("loading {} for {}"));
        assert_eq!(logger.entries()[0].message, "loading orders for 42");
    }

    #[test]
    fn log_errors_false_silences_logger_but_not_hooks() {
        let hook_calls = Arc::new(AtomicUsize::new(0));
        let hook_clone = hook_calls.clone();
        let logger = MemoryLogger::new();
        let executor = Executor::builder()
            .logger(logger.clone())
            .on_exception(move |_| {
                hook_clone.fetch_add(1, Ordering::SeqCst);
            })
            .build()
            .expect("builder");
        executor.set_log_errors(false);

        let _ = executor.try_execute_action(|| Err(TestError("quiet".into())));

        assert!(logger.is_empty());
        assert_eq!(hook_calls.load(Ordering::SeqCst), 1);
        assert!(!executor.log_errors());
    }

    #[test]
    fn hooks_fire_in_order_with_the_captured_error() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let on_exception_seen = seen.clone();
        let on_result_seen = seen.clone();
        let executor: Executor<TestError> = Executor::builder()
            .without_logger()
            .on_exception(move |e| on_exception_seen.lock().unwrap().push(format!("exception:{}", e)))
            .on_result(move |r| {
                on_result_seen
                    .lock()
                    .unwrap()
                    .push(format!("result:{}:{}", r.shape(), r.was_successful()))
            })
            .build()
            .expect("builder");

        let _ = executor.try_execute_action(|| Err(TestError("x".into())));
        let _ = executor.try_execute(|| Ok::<_, TestError>(1));

        assert_eq!(
            *seen.lock().unwrap(),
            vec![
                "exception:x".to_string(),
                "result:sync-action:false".to_string(),
                "result:sync-func:true".to_string(),
            ]
        );
    }

    #[test]
    fn panics_are_captured_as_failures() {
        let executor: Executor<TestError> = Executor::builder().without_logger().build().unwrap();

        let result = executor.try_execute::<u8, _>(|| panic!("kaboom"));

        assert!(!result.was_successful());
        assert_eq!(result.error().and_then(|e| e.panic_message()), Some("kaboom"));
    }

    #[test]
    fn panics_unwind_when_capture_is_disabled() {
        let executor: Executor<TestError> =
            Executor::builder().without_logger().catch_panics(false).build().unwrap();

        let unwound = panic::catch_unwind(AssertUnwindSafe(|| {
            executor.try_execute_action(|| panic!("through"));
        }));

        assert!(unwound.is_err());
    }

    #[test]
    fn hook_panics_propagate_to_the_caller() {
        let executor: Executor<TestError> = Executor::builder()
            .without_logger()
            .on_exception(|_| panic!("hook blew up"))
            .build()
            .unwrap();

        let unwound = panic::catch_unwind(AssertUnwindSafe(|| {
            executor.try_execute_action(|| Err(TestError("x".into())));
        }));

        assert!(unwound.is_err());
    }

    #[test]
    fn builder_rejects_zero_timeout() {
        let err = Executor::<TestError>::builder().timeout(Duration::ZERO).build();
        assert!(matches!(err, Err(BuildError::InvalidTimeout(_))));
    }

    #[test]
    fn config_is_applied() {
        let executor: Executor<TestError> = Executor::builder()
            .config(ExecutorConfig { log_errors: false, catch_panics: false, timeout_ms: Some(20) })
            .build()
            .unwrap();
        assert!(!executor.log_errors());
        assert!(!executor.catch_panics());
        assert_eq!(executor.timeout(), Some(Duration::from_millis(20)));
    }

    #[tokio::test]
    async fn async_failure_is_captured() {
        let (executor, logger) = recording();

        let result = executor
            .try_execute_async(|| async {
                tokio::task::yield_now().await;
                Err::<u32, _>(TestError("async failed".into()))
            })
            .await;

        assert!(!result.was_successful());
        assert_eq!(result.shape(), ShapeKind::AsyncFunc);
        assert_eq!(logger.len(), 1);
    }

    #[tokio::test]
    async fn async_panic_is_captured() {
        let executor: Executor<TestError> = Executor::builder().without_logger().build().unwrap();

        let result = executor
            .try_execute_action_async(|| async {
                tokio::task::yield_now().await;
                if true {
                    panic!("async kaboom");
                }
                Ok::<(), TestError>(())
            })
            .await;

        assert_eq!(result.error().and_then(|e| e.panic_message()), Some("async kaboom"));
    }

    #[tokio::test(start_paused = true)]
    async fn deadline_turns_slow_work_into_timeout() {
        let executor: Executor<TestError> = Executor::builder()
            .without_logger()
            .timeout(Duration::from_millis(50))
            .build()
            .unwrap();

        let result = executor
            .try_execute_async(|| async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                Ok::<_, TestError>(1)
            })
            .await;

        assert!(result.error().map(|e| e.is_timeout()).unwrap_or(false));
    }

    #[tokio::test]
    async fn sync_as_async_runs_on_blocking_pool() {
        let executor: Executor<TestError> = Executor::builder().without_logger().build().unwrap();
        let runs = Arc::new(AtomicUsize::new(0));
        let runs_clone = runs.clone();

        let result = executor
            .try_execute_sync_as_async(move || {
                runs_clone.fetch_add(1, Ordering::SeqCst);
                Ok::<_, TestError>("done")
            })
            .await;

        assert_eq!(result.return_value(), Some(&"done"));
        assert_eq!(result.shape(), ShapeKind::AsyncFunc);
        assert_eq!(runs.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn deadline_leaves_blocking_work_alone() {
        let executor: Executor<TestError> = Executor::builder()
            .without_logger()
            .timeout(Duration::from_millis(20))
            .build()
            .unwrap();
        let active = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));
        let runs = Arc::new(AtomicUsize::new(0));
        let (active_in, peak_in, runs_in) = (active.clone(), peak.clone(), runs.clone());

        let result = executor
            .try_execute_sync_as_async(move || {
                let now = active_in.fetch_add(1, Ordering::SeqCst) + 1;
                peak_in.fetch_max(now, Ordering::SeqCst);
                runs_in.fetch_add(1, Ordering::SeqCst);
                std::thread::sleep(Duration::from_millis(100));
                active_in.fetch_sub(1, Ordering::SeqCst);
                Err::<u8, _>(TestError("slow".into()))
            })
            .await
            .retry(2)
            .await;

        assert_eq!(result.error().and_then(|e| e.as_inner()), Some(&TestError("slow".into())));
        assert_eq!(runs.load(Ordering::SeqCst), 3);
        assert_eq!(peak.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn sync_as_async_captures_blocking_panics() {
        let executor: Executor<TestError> = Executor::builder().without_logger().build().unwrap();

        let result =
            executor.try_execute_action_sync_as_async(|| panic!("blocking kaboom")).await;

        assert_eq!(result.error().and_then(|e| e.panic_message()), Some("blocking kaboom"));
    }
}
