//! Error loggers used by the executor's logging side effect.
//!
//! The executor hands every captured error to an [`ErrorLogger`] together with a
//! message template and its positional arguments. [`TracingLogger`] is the
//! production default; [`MemoryLogger`] records entries for assertions in tests.

use crate::diagnostic::render_template;
use crate::error::ExecutionError;
use std::collections::VecDeque;
use std::fmt;
use std::sync::{Arc, Mutex};

/// Collaborator that records captured errors.
///
/// Implementations must not assume the template was rendered; `args` fill its
/// holes in order (see [`render_template`]).
pub trait ErrorLogger<E>: Send + Sync {
    fn log_error(&self, error: &ExecutionError<E>, template: &str, args: &[String]);
}

/// Logger that emits one `tracing` error event per captured failure.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingLogger;

impl<E: fmt::Display> ErrorLogger<E> for TracingLogger {
    fn log_error(&self, error: &ExecutionError<E>, template: &str, args: &[String]) {
        let message = render_template(template, args);
        tracing::error!(error = %error, template = template, "{}", message);
    }
}

/// One entry recorded by [`MemoryLogger`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    /// Display text of the captured error
    pub error: String,
    /// Template as given to the logger
    pub template: String,
    /// Template with its holes filled
    pub message: String,
}

/// Logger that keeps entries in memory.
///
/// Bounded: oldest entries are evicted once
/// `capacity` is reached.
#[derive(Debug, Clone)]
pub struct MemoryLogger {
    entries: Arc<Mutex<VecDeque<LogEntry>>>,
    capacity: usize,
}

impl MemoryLogger {
    /// Creates a bounded logger (default cap: 1,000).
    pub fn new() -> Self {
        Self::with_capacity(1_000)
    }

    /// Keep at most `capacity` entries, evicting the oldest.
    pub fn with_capacity(capacity: usize) -> Self {
        Self { entries: Arc::new(Mutex::new(VecDeque::new())), capacity: capacity.max(1) }
    }

    /// Snapshot of all entries recorded so far.
    pub fn entries(&self) -> Vec<LogEntry> {
        self.lock().iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, VecDeque<LogEntry>> {
        // a poisoned lock still holds valid entries
        self.entries.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Default for MemoryLogger {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: fmt::Display> ErrorLogger<E> for MemoryLogger {
    fn log_error(&self, error: &ExecutionError<E>, template: &str, args: &[String]) {
        let entry = LogEntry {
            error: error.to_string(),
            template: template.to_string(),
            message: render_template(template, args),
        };
        let mut guard = self.lock();
        if guard.len() >= self.capacity {
            guard.pop_front();
        }
        guard.push_back(entry);
    }
}
