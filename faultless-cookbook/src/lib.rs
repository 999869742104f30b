//! Ready-to-use executor recipes ("cookbook") for faultless.
//! Each function returns an [`Executor`] configured for one common situation.
//!
//! **Ladder:**
//! - Simple: [`quiet`], [`recording`]
//! - Intermediate: [`alerting`]
//! - Async work: [`with_deadline`]

use std::time::Duration;

use faultless::{BuildError, CaptureError, ExecutionError, Executor, MemoryLogger};

/// No logging, no hooks. Useful when every call site inspects its result itself.
pub fn quiet<E: CaptureError>() -> Executor<E> {
    let executor = Executor::new();
    executor.set_log_errors(false);
    executor
}

/// Logs into memory so the captured messages can be shown or asserted on later.
pub fn recording<E: CaptureError>() -> Result<(Executor<E>, MemoryLogger), BuildError> {
    let logger = MemoryLogger::new();
    let executor = Executor::builder().logger(logger.clone()).build()?;
    Ok((executor, logger))
}

/// Generic failure handler: every captured error is logged and then passed to
/// `alert`, so call sites do not need their own `on_exception` branches.
pub fn alerting<E, F>(alert: F) -> Result<Executor<E>, BuildError>
where
    E: CaptureError,
    F: Fn(&ExecutionError<E>) + Send + Sync + 'static,
{
    Executor::builder().on_exception(alert).build()
}

/// Bounds each asynchronous attempt; overruns come back as
/// [`ExecutionError::TimedOut`] and can be retried.
pub fn with_deadline<E: CaptureError>(limit: Duration) -> Result<Executor<E>, BuildError> {
    Executor::builder().timeout(limit).build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[test]
    fn quiet_does_not_log() {
        let executor: Executor<String> = quiet();
        assert!(!executor.log_errors());
    }

    #[test]
    fn recording_keeps_messages() {
        let (executor, logger) = recording::<String>().unwrap();
        let _ = executor.with_message("loading {}").arg("people").try_execute_action(|| {
            Err("sql error".to_string())
        });
        assert_eq!(logger.entries()[0].message, "loading people");
    }

    #[test]
    fn alerting_forwards_every_error() {
        let alerts = Arc::new(Mutex::new(Vec::new()));
        let sink = alerts.clone();
        let executor =
            alerting::<String, _>(move |e| sink.lock().unwrap().push(e.to_string())).unwrap();

        let _ = executor.try_execute_action(|| Err("web api error".to_string()));
        let _ = executor.try_execute(|| Ok::<_, String>(1));

        assert_eq!(*alerts.lock().unwrap(), vec!["web api error".to_string()]);
    }

    #[test]
    fn with_deadline_rejects_zero() {
        assert!(with_deadline::<String>(Duration::ZERO).is_err());
        let executor = with_deadline::<String>(Duration::from_millis(300)).unwrap();
        assert_eq!(executor.timeout(), Some(Duration::from_millis(300)));
    }
}
