//! Error types for captured executions
use std::any::Any;
use std::fmt;
use std::time::Duration;

/// Bound satisfied by every error type an executor can capture.
///
/// Blanket-implemented, so `std::io::Error`, `anyhow::Error`, `String` and any
/// `thiserror` enum qualify without extra work.
pub trait CaptureError: fmt::Display + fmt::Debug + Send + Sync + 'static {}

impl<T> CaptureError for T where T: fmt::Display + fmt::Debug + Send + Sync + 'static {}

/// Failure captured at the boundary of one invocation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExecutionError<E> {
    /// The callable returned an error
    #[error("{0}")]
    Failed(E),
    /// The callable panicked
    #[error("panicked: {message}")]
    Panicked { message: String },
    /// The attempt ran past the executor's deadline
    #[error("execution timed out after {timeout:?}")]
    TimedOut { timeout: Duration },
    /// The background task carrying the callable was cancelled before it finished
    #[error("execution cancelled")]
    Cancelled,
}

impl<E> ExecutionError<E> {
    /// Build a `Panicked` variant from a payload caught by `catch_unwind`.
    pub fn from_panic(payload: Box<dyn Any + Send>) -> Self {
        let message = if let Some(s) = payload.downcast_ref::<&'static str>() {
            (*s).to_string()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "<non-string panic payload>".to_string()
        };
        ExecutionError::Panicked { message }
    }

    /// Check if the callable returned an error
    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }
    /// Check if the callable panicked
    pub fn is_panic(&self) -> bool {
        matches!(self, Self::Panicked { .. })
    }
    /// Check if the attempt timed out
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::TimedOut { .. })
    }
    /// Check if the attempt was cancelled
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
    /// Borrow the caller's error if present.
    pub fn as_inner(&self) -> Option<&E> {
        match self {
            Self::Failed(e) => Some(e),
            _ => None,
        }
    }
    /// Get the caller's error if this is a `Failed` variant
    pub fn into_inner(self) -> Option<E> {
        match self {
            Self::Failed(e) => Some(e),
            _ => None,
        }
    }
    /// Panic message, if the callable panicked.
    pub fn panic_message(&self) -> Option<&str> {
        match self {
            Self::Panicked { message } => Some(message),
            _ => None,
        }
    }
}

/// Errors produced while building an executor.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BuildError {
    /// A deadline must be non-zero.
    #[error("timeout must be > 0 (got {0:?})")]
    InvalidTimeout(Duration),
}
