#![forbid(unsafe_code)]
#![deny(warnings)]
#![cfg_attr(not(test), deny(clippy::all))]

//! # faultless
//!
//! Run synchronous or asynchronous work so that nothing it does escapes: every
//! error and every panic is captured into an [`ExecutionResult`] that can then
//! be retried or branched on.
//!
//! ## Features
//!
//! - **Four execution shapes**: sync or async, with or without a return value
//! - **Retry combinators** that resubmit the exact same work to the same executor
//! - **Branch combinators** (`on_success` / `on_exception`) that chain with retry in any order
//! - **Pending-result chaining**: combinators apply to unresolved async results too
//! - **Logging and hooks** on every captured failure, with a per-call message template
//! - **Deadlines** for awaited work, reported as a distinct failure kind
//! - **Tower integration**: map any service's outcome to a [`Response`]
//!
//! ## Quick Start
//!
//! ```rust
//! use faultless::prelude::*;
//!
//! #[tokio::main]
//! async fn main() {
//!     let executor: Executor<std::io::Error> = Executor::new();
//!
//!     let result = executor
//!         .with_message("reading {}")
//!         .arg("config.toml")
//!         .try_execute_async(|| async { tokio::fs::read_to_string("config.toml").await })
//!         .retry_once()
//!         .on_exception(|r| eprintln!("giving up: {:?}", r.error()))
//!         .await;
//!
//!     let contents = result.return_value_or_default();
//!     println!("{} bytes", contents.len());
//! }
//! ```

pub mod config;
pub mod diagnostic;
pub mod dynamic;
pub mod error;
pub mod executor;
pub mod logger;
pub mod pending;
pub mod prelude;
pub mod respond;
pub mod result;
pub mod retry;
pub mod shape;

// Re-exports
pub use config::ExecutorConfig;
pub use diagnostic::{render_template, Diagnostic, DEFAULT_TEMPLATE};
pub use dynamic::DynamicConfig;
pub use error::{BuildError, CaptureError, ExecutionError};
pub use executor::{Described, ExceptionHook, Executor, ExecutorBuilder, ResultHook};
pub use logger::{ErrorLogger, LogEntry, MemoryLogger, TracingLogger};
pub use pending::PendingResult;
pub use respond::{
    FailureBody, RespondLayer, RespondService, Responder, ResponderConfig, Response,
};
pub use result::{
    ActionExecutionResult, AsyncActionExecutionResult, AsyncFuncExecutionResult,
    ExecutionResult, FuncExecutionResult, Outcome,
};
pub use shape::{
    AsyncAction, AsyncCode, AsyncFunc, AsyncShape, Shape, ShapeKind, SyncAction, SyncCode,
    SyncFunc, SyncShape,
};
