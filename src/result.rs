//! Execution results and the branch combinators.
//!
//! An [`ExecutionResult`] is created once, by an [`Executor`], when an invocation
//! completes. It remembers which executor ran which callable so the retry
//! combinators can resubmit the same unit of work later, without the caller
//! threading the executor through every call site.
//!
//! Results are never mutated. Combinators either hand back the result they were
//! given or a brand-new one produced by the executor.

use crate::diagnostic::Diagnostic;
use crate::error::{CaptureError, ExecutionError};
use crate::executor::Executor;
use crate::shape::{AsyncAction, AsyncFunc, Shape, ShapeKind, SyncAction, SyncFunc};
use std::fmt;
use std::sync::Arc;

/// Result of synchronous work without a return value.
pub type ActionExecutionResult<E> = ExecutionResult<SyncAction<E>>;
/// Result of synchronous work returning `T`.
pub type FuncExecutionResult<T, E> = ExecutionResult<SyncFunc<T, E>>;
/// Result of asynchronous work without a return value.
pub type AsyncActionExecutionResult<E> = ExecutionResult<AsyncAction<E>>;
/// Result of asynchronous work returning `T`.
pub type AsyncFuncExecutionResult<T, E> = ExecutionResult<AsyncFunc<T, E>>;

/// Read-only view of any result, independent of its shape.
///
/// Hooks and the response adapter only need the success flag and the captured
/// error, so they take `&dyn Outcome<E>`.
pub trait Outcome<E> {
    fn was_successful(&self) -> bool;
    fn error(&self) -> Option<&ExecutionError<E>>;
    fn shape(&self) -> ShapeKind;
}

enum State<T, E> {
    Succeeded(T),
    Failed { error: ExecutionError<E>, fallback: Option<T> },
}

/// Immutable record of one invocation's identity and outcome.
pub struct ExecutionResult<S: Shape> {
    executed_by: Executor<S::Error>,
    executed_code: S::Code,
    diagnostic: Option<Arc<Diagnostic>>,
    state: State<S::Output, S::Error>,
}

impl<S: Shape> ExecutionResult<S> {
    /// Successful invocation carrying `value`.
    pub fn success(executed_by: Executor<S::Error>, executed_code: S::Code, value: S::Output) -> Self {
        Self { executed_by, executed_code, diagnostic: None, state: State::Succeeded(value) }
    }

    /// Failed invocation carrying the captured `error`.
    pub fn failure(
        executed_by: Executor<S::Error>,
        executed_code: S::Code,
        error: ExecutionError<S::Error>,
    ) -> Self {
        Self {
            executed_by,
            executed_code,
            diagnostic: None,
            state: State::Failed { error, fallback: None },
        }
    }

    pub(crate) fn with_diagnostic(mut self, diagnostic: Option<Arc<Diagnostic>>) -> Self {
        self.diagnostic = diagnostic;
        self
    }

    /// True iff the invocation completed without error or panic.
    pub fn was_successful(&self) -> bool {
        matches!(self.state, State::Succeeded(_))
    }

    /// Captured error; `None` exactly when the invocation succeeded.
    pub fn error(&self) -> Option<&ExecutionError<S::Error>> {
        match &self.state {
            State::Failed { error, .. } => Some(error),
            State::Succeeded(_) => None,
        }
    }

    /// Executor that ran the callable.
    pub fn executed_by(&self) -> &Executor<S::Error> {
        &self.executed_by
    }

    /// The callable that was run, shared with every retry of it.
    pub fn executed_code(&self) -> &S::Code {
        &self.executed_code
    }

    /// Message the invocation was made with, if any.
    pub fn diagnostic(&self) -> Option<&Diagnostic> {
        self.diagnostic.as_deref()
    }

    pub(crate) fn diagnostic_handle(&self) -> Option<&Arc<Diagnostic>> {
        self.diagnostic.as_ref()
    }

    /// Which of the four shapes produced this result.
    pub fn shape(&self) -> ShapeKind {
        S::KIND
    }

    /// Convert into a plain `Result`, dropping the invocation identity.
    pub fn into_outcome(self) -> Result<S::Output, ExecutionError<S::Error>> {
        match self.state {
            State::Succeeded(value) => Ok(value),
            State::Failed { error, .. } => Err(error),
        }
    }

    /// Run `handler` if the invocation succeeded. The result is returned unchanged.
    pub fn on_success<H>(self, handler: H) -> Self
    where
        H: FnOnce(&Self),
    {
        if self.was_successful() {
            handler(&self);
        }
        self
    }

    /// Run `handler` if the invocation failed. The result is returned unchanged.
    pub fn on_exception<H>(self, handler: H) -> Self
    where
        H: FnOnce(&Self),
    {
        if !self.was_successful() {
            handler(&self);
        }
        self
    }
}

impl<S: Shape> Outcome<S::Error> for ExecutionResult<S> {
    fn was_successful(&self) -> bool {
        ExecutionResult::was_successful(self)
    }

    fn error(&self) -> Option<&ExecutionError<S::Error>> {
        ExecutionResult::error(self)
    }

    fn shape(&self) -> ShapeKind {
        S::KIND
    }
}

impl<S: Shape> fmt::Debug for ExecutionResult<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExecutionResult")
            .field("shape", &S::KIND)
            .field("was_successful", &self.was_successful())
            .field("error", &self.error())
            .field("diagnostic", &self.diagnostic)
            .field("executed_code", &"<callable>")
            .finish()
    }
}

macro_rules! value_accessors {
    ($shape:ident) => {
        impl<T: Send + 'static, E: CaptureError> ExecutionResult<$shape<T, E>> {
            /// Failed invocation that still reports `value` as its return value.
            pub fn failure_with_value(
                executed_by: Executor<E>,
                executed_code: <$shape<T, E> as Shape>::Code,
                error: ExecutionError<E>,
                value: T,
            ) -> Self {
                Self {
                    executed_by,
                    executed_code,
                    diagnostic: None,
                    state: State::Failed { error, fallback: Some(value) },
                }
            }

            /// Value returned by the callable; `None` on failure unless a
            /// fallback value was supplied.
            pub fn return_value(&self) -> Option<&T> {
                match &self.state {
                    State::Succeeded(value) => Some(value),
                    State::Failed { fallback, .. } => fallback.as_ref(),
                }
            }

            /// Owned counterpart of [`return_value`](Self::return_value).
            pub fn into_return_value(self) -> Option<T> {
                match self.state {
                    State::Succeeded(value) => Some(value),
                    State::Failed { fallback, .. } => fallback,
                }
            }

            /// Return value, or `T::default()` when there is none.
            pub fn return_value_or_default(self) -> T
            where
                T: Default,
            {
                self.into_return_value().unwrap_or_default()
            }
        }
    };
}

value_accessors!(SyncFunc);
value_accessors!(AsyncFunc);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shape::SyncCode;
    use std::cell::Cell;

    fn executor() -> Executor<String> {
        Executor::builder().without_logger().build().expect("executor")
    }

    fn code() -> SyncCode<i32, String> {
        Arc::new(|| Ok(7))
    }

    #[test]
    fn success_has_no_error() {
        let result = FuncExecutionResult::success(executor(), code(), 7);
        assert!(result.was_successful());
        assert!(result.error().is_none());
        assert_eq!(result.return_value(), Some(&7));
        assert_eq!(result.shape(), ShapeKind::SyncFunc);
    }

    #[test]
    fn failure_has_error_and_no_value() {
        let result = FuncExecutionResult::failure(
            executor(),
            code(),
            ExecutionError::Failed("nope".to_string()),
        );
        assert!(!result.was_successful());
        assert_eq!(result.error().and_then(|e| e.as_inner()).map(String::as_str), Some("nope"));
        assert!(result.return_value().is_none());
        assert_eq!(result.return_value_or_default(), 0);
    }

    #[test]
    fn failure_with_value_keeps_override() {
        let result = FuncExecutionResult::failure_with_value(
            executor(),
            code(),
            ExecutionError::Failed("nope".to_string()),
            -1,
        );
        assert!(!result.was_successful());
        assert_eq!(result.into_return_value(), Some(-1));
    }

    #[test]
    fn on_success_fires_only_for_success() {
        let fired = Cell::new(0);
        let ok = FuncExecutionResult::success(executor(), code(), 1)
            .on_success(|r| {
                assert_eq!(r.return_value(), Some(&1));
                fired.set(fired.get() + 1);
            })
            .on_exception(|_| panic!("must not run"));
        assert_eq!(fired.get(), 1);
        assert!(ok.was_successful());
        assert_eq!(ok.return_value(), Some(&1));
    }

    #[test]
    fn on_exception_fires_only_for_failure_and_leaves_result_alone() {
        let seen = Cell::new(None);
        let failed = ActionExecutionResult::failure(
            executor(),
            Arc::new(|| Ok(())),
            ExecutionError::Failed("bad".to_string()),
        )
        .on_success(|_| panic!("must not run"))
        .on_exception(|r| seen.set(r.error().map(|e| e.to_string())));
        assert_eq!(seen.take().as_deref(), Some("bad"));
        assert!(!failed.was_successful());
        assert_eq!(failed.error().map(|e| e.to_string()).as_deref(), Some("bad"));
    }

    #[test]
    fn outcome_view_matches_result() {
        let result = FuncExecutionResult::success(executor(), code(), 3);
        let view: &dyn Outcome<String> = &result;
        assert!(view.was_successful());
        assert!(view.error().is_none());
        assert_eq!(view.shape(), ShapeKind::SyncFunc);
    }

    #[test]
    fn into_outcome_round_trips_the_state() {
        let ok = FuncExecutionResult::success(executor(), code(), 9).into_outcome();
        assert_eq!(ok, Ok(9));
        let err = FuncExecutionResult::failure(
            executor(),
            code(),
            ExecutionError::Panicked { message: "p".into() },
        )
        .into_outcome();
        assert!(err.unwrap_err().is_panic());
    }
}
