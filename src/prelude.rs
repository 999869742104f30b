//! Convenient re-exports for common faultless types.
pub use crate::{
    error::{CaptureError, ExecutionError},
    executor::{Executor, ExecutorBuilder},
    logger::{ErrorLogger, MemoryLogger, TracingLogger},
    pending::PendingResult,
    respond::{RespondLayer, Responder, Response},
    result::{
        ActionExecutionResult, AsyncActionExecutionResult, AsyncFuncExecutionResult,
        ExecutionResult, FuncExecutionResult, Outcome,
    },
    shape::ShapeKind,
};
