//! Plain-data executor configuration.
//!
//! Hosts that load settings from a file (behind the `serde` feature) or build
//! them by hand feed an [`ExecutorConfig`] into
//! [`ExecutorBuilder::config`](crate::ExecutorBuilder::config). Hooks and
//! loggers are code, not data, so they stay on the builder.

use crate::error::BuildError;
use std::time::Duration;

/// Executor settings.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ExecutorConfig {
    /// Send captured errors to the configured logger.
    pub log_errors: bool,
    /// Capture panics as failures instead of letting them unwind.
    pub catch_panics: bool,
    /// Deadline for each asynchronous attempt, in milliseconds.
    pub timeout_ms: Option<u64>,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self { log_errors: true, catch_panics: true, timeout_ms: None }
    }
}

impl ExecutorConfig {
    /// Deadline as a [`Duration`].
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_ms.map(Duration::from_millis)
    }

    /// Reject a zero deadline.
    pub fn validate(&self) -> Result<(), BuildError> {
        match self.timeout() {
            Some(limit) if limit.is_zero() => Err(BuildError::InvalidTimeout(limit)),
            _ => Ok(()),
        }
    }
}
