//! The four execution shapes.
//!
//! Work is either synchronous or asynchronous and either returns a value or
//! not. Each combination is a marker type implementing [`Shape`], so an
//! [`ExecutionResult`](crate::ExecutionResult) knows at compile time whether
//! it carries a return value and how its callable is resubmitted.

use crate::diagnostic::Diagnostic;
use crate::error::{CaptureError, ExecutionError};
use crate::executor::Executor;
use crate::result::ExecutionResult;
use futures::future::BoxFuture;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

/// Stored synchronous callable.
pub type SyncCode<T, E> = Arc<dyn Fn() -> Result<T, E> + Send + Sync>;

/// Stored asynchronous callable. The error side is already an
/// [`ExecutionError`] so background-task failures can be reported too.
pub type AsyncCode<T, E> =
    Arc<dyn Fn() -> BoxFuture<'static, Result<T, ExecutionError<E>>> + Send + Sync>;

/// Runtime tag for a shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum ShapeKind {
    SyncAction,
    SyncFunc,
    AsyncAction,
    AsyncFunc,
}

impl ShapeKind {
    pub fn is_async(self) -> bool {
        matches!(self, ShapeKind::AsyncAction | ShapeKind::AsyncFunc)
    }

    pub fn returns_value(self) -> bool {
        matches!(self, ShapeKind::SyncFunc | ShapeKind::AsyncFunc)
    }
}

impl fmt::Display for ShapeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ShapeKind::SyncAction => "sync-action",
            ShapeKind::SyncFunc => "sync-func",
            ShapeKind::AsyncAction => "async-action",
            ShapeKind::AsyncFunc => "async-func",
        };
        f.write_str(name)
    }
}

/// Compile-time description of one execution shape.
pub trait Shape: Sized + Send + Sync + 'static {
    /// Value produced on success (`()` for actions).
    type Output: Send + 'static;
    /// Error type returned by the caller's code.
    type Error: CaptureError;
    /// How the callable is stored inside a result.
    type Code: Clone + Send + Sync + 'static;

    const KIND: ShapeKind;
}

/// Shapes whose callable is resubmitted on the caller's thread.
pub trait SyncShape: Shape {
    fn resubmit(
        executor: &Executor<Self::Error>,
        code: &Self::Code,
        diagnostic: Option<&Arc<Diagnostic>>,
    ) -> ExecutionResult<Self>;
}

/// Shapes whose callable is resubmitted and awaited.
pub trait AsyncShape: Shape {
    fn resubmit(
        executor: &Executor<Self::Error>,
        code: &Self::Code,
        diagnostic: Option<&Arc<Diagnostic>>,
    ) -> BoxFuture<'static, ExecutionResult<Self>>;
}

/// Synchronous work without a return value.
pub struct SyncAction<E>(PhantomData<fn() -> E>);

/// Synchronous work returning `T`.
pub struct SyncFunc<T, E>(PhantomData<fn() -> (T, E)>);

/// Asynchronous work without a return value.
pub struct AsyncAction<E>(PhantomData<fn() -> E>);

/// Asynchronous work returning `T`.
pub struct AsyncFunc<T, E>(PhantomData<fn() -> (T, E)>);

impl<E: CaptureError> Shape for SyncAction<E> {
    type Output = ();
    type Error = E;
    type Code = SyncCode<(), E>;
    const KIND: ShapeKind = ShapeKind::SyncAction;
}

impl<T: Send + 'static, E: CaptureError> Shape for SyncFunc<T, E> {
    type Output = T;
    type Error = E;
    type Code = SyncCode<T, E>;
    const KIND: ShapeKind = ShapeKind::SyncFunc;
}

impl<E: CaptureError> Shape for AsyncAction<E> {
    type Output = ();
    type Error = E;
    type Code = AsyncCode<(), E>;
    const KIND: ShapeKind = ShapeKind::AsyncAction;
}

impl<T: Send + 'static, E: CaptureError> Shape for AsyncFunc<T, E> {
    type Output = T;
    type Error = E;
    type Code = AsyncCode<T, E>;
    const KIND: ShapeKind = ShapeKind::AsyncFunc;
}

impl<E: CaptureError> SyncShape for SyncAction<E> {
    fn resubmit(
        executor: &Executor<E>,
        code: &Self::Code,
        diagnostic: Option<&Arc<Diagnostic>>,
    ) -> ExecutionResult<Self> {
        executor.run_sync(code.clone(), diagnostic.cloned())
    }
}

impl<T: Send + 'static, E: CaptureError> SyncShape for SyncFunc<T, E> {
    fn resubmit(
        executor: &Executor<E>,
        code: &Self::Code,
        diagnostic: Option<&Arc<Diagnostic>>,
    ) -> ExecutionResult<Self> {
        executor.run_sync(code.clone(), diagnostic.cloned())
    }
}

impl<E: CaptureError> AsyncShape for AsyncAction<E> {
    fn resubmit(
        executor: &Executor<E>,
        code: &Self::Code,
        diagnostic: Option<&Arc<Diagnostic>>,
    ) -> BoxFuture<'static, ExecutionResult<Self>> {
        executor.run_async(code.clone(), diagnostic.cloned())
    }
}

impl<T: Send + 'static, E: CaptureError> AsyncShape for AsyncFunc<T, E> {
    fn resubmit(
        executor: &Executor<E>,
        code: &Self::Code,
        diagnostic: Option<&Arc<Diagnostic>>,
    ) -> BoxFuture<'static, ExecutionResult<Self>> {
        executor.run_async(code.clone(), diagnostic.cloned())
    }
}
