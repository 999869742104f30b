//! Turning results into request/response outcomes.
//!
//! A [`Responder`] maps every [`ExecutionResult`] to a [`Response`]:
//! value-returning work that succeeded becomes `Ok(value)`, work without a
//! value becomes `NoContent`, and any failure becomes `BadRequest(body)` where
//! the body comes from a swappable builder (the error's display text by
//! default).
//!
//! The responder takes over error logging from the executor it wraps: it turns
//! the executor's own logging off and records each failure itself at `info`
//! level, since a failure here is an expected client-facing outcome.
//!
//! [`RespondLayer`] applies the same mapping to any tower service.
//!
//! ```rust
//! use faultless::{Executor, Responder, Response};
//!
//! let responder = Responder::new(Executor::<String>::new());
//! let ok = responder.respond(responder.executor().try_execute(|| Ok(5)));
//! assert_eq!(ok, Response::Ok(5));
//!
//! let failed = responder.respond(
//!     responder.executor().try_execute_action(|| Err("missing id".to_string())),
//! );
//! assert_eq!(failed, Response::BadRequest("missing id".to_string()));
//! ```

use crate::dynamic::DynamicConfig;
use crate::error::CaptureError;
use crate::executor::Executor;
use crate::result::{ExecutionResult, Outcome};
use crate::shape::Shape;
use futures::future::BoxFuture;
use std::convert::Infallible;
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::task::{Context, Poll};
use tower::ServiceExt;
use tower_layer::Layer;
use tower_service::Service;

/// Outcome of a request handled through a [`Responder`].
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "status", content = "body", rename_all = "snake_case"))]
pub enum Response<T, B = String> {
    /// 200 with the returned value
    Ok(T),
    /// 204
    NoContent,
    /// 404
    NotFound,
    /// 400 with the failure body
    BadRequest(B),
}

impl<T, B> Response<T, B> {
    /// HTTP status code conventionally associated with the variant.
    pub fn status_code(&self) -> u16 {
        match self {
            Response::Ok(_) => 200,
            Response::NoContent => 204,
            Response::NotFound => 404,
            Response::BadRequest(_) => 400,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Response::Ok(_) | Response::NoContent)
    }

    /// Transform the success value, leaving other variants alone.
    pub fn map<U, F>(self, f: F) -> Response<U, B>
    where
        F: FnOnce(T) -> U,
    {
        match self {
            Response::Ok(value) => Response::Ok(f(value)),
            Response::NoContent => Response::NoContent,
            Response::NotFound => Response::NotFound,
            Response::BadRequest(body) => Response::BadRequest(body),
        }
    }
}

impl<T, B> Response<Option<T>, B> {
    /// Turn `Ok(None)` into `NotFound`.
    pub fn not_found_if_none(self) -> Response<T, B> {
        match self {
            Response::Ok(Some(value)) => Response::Ok(value),
            Response::Ok(None) | Response::NotFound => Response::NotFound,
            Response::NoContent => Response::NoContent,
            Response::BadRequest(body) => Response::BadRequest(body),
        }
    }
}

/// Builds the body of a `BadRequest` from a failed result.
pub type FailureBody<E, B> = Arc<dyn Fn(&dyn Outcome<E>) -> B + Send + Sync>;

/// Responder settings that can be swapped at runtime.
pub struct ResponderConfig<E, B = String> {
    pub failure_body: FailureBody<E, B>,
}

impl<E, B> ResponderConfig<E, B> {
    pub fn new<F>(failure_body: F) -> Self
    where
        F: Fn(&dyn Outcome<E>) -> B + Send + Sync + 'static,
    {
        Self { failure_body: Arc::new(failure_body) }
    }
}

impl<E: CaptureError> Default for ResponderConfig<E, String> {
    fn default() -> Self {
        Self::new(|outcome| outcome.error().map(|e| e.to_string()).unwrap_or_default())
    }
}

impl<E, B> Clone for ResponderConfig<E, B> {
    fn clone(&self) -> Self {
        Self { failure_body: Arc::clone(&self.failure_body) }
    }
}

impl<E, B> fmt::Debug for ResponderConfig<E, B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResponderConfig").field("failure_body", &"<builder>").finish()
    }
}

/// Executor front end that answers with [`Response`] values.
pub struct Responder<E, B = String> {
    executor: Executor<E>,
    config: DynamicConfig<ResponderConfig<E, B>>,
}

impl<E, B> Clone for Responder<E, B> {
    fn clone(&self) -> Self {
        Self { executor: self.executor.clone(), config: self.config.clone() }
    }
}

impl<E, B> fmt::Debug for Responder<E, B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Responder")
            .field("executor", &self.executor)
            .field("config", &self.config.get())
            .finish()
    }
}

impl<E: CaptureError> Responder<E, String> {
    /// Responder whose failure body is the error's display text.
    pub fn new(executor: Executor<E>) -> Self {
        Self::with_config(executor, ResponderConfig::default())
    }
}

impl<E, B> Responder<E, B>
where
    E: CaptureError,
    B: Send + 'static,
{
    /// Wrap `executor`. Its built-in error logging is switched off for every
    /// handle sharing it.
    pub fn with_config(executor: Executor<E>, config: ResponderConfig<E, B>) -> Self {
        executor.set_log_errors(false);
        Self { executor, config: DynamicConfig::new(config) }
    }

    /// Executor the responder runs work through.
    pub fn executor(&self) -> &Executor<E> {
        &self.executor
    }

    /// Live handle to the settings; updates apply to the next response.
    pub fn config(&self) -> &DynamicConfig<ResponderConfig<E, B>> {
        &self.config
    }

    /// Map a finished result to a response.
    pub fn respond<S>(&self, result: ExecutionResult<S>) -> Response<S::Output, B>
    where
        S: Shape<Error = E>,
    {
        if result.was_successful() {
            return match result.into_outcome() {
                Ok(value) if S::KIND.returns_value() => Response::Ok(value),
                _ => Response::NoContent,
            };
        }

        if let Some(error) = result.error() {
            tracing::info!(shape = %S::KIND, error = %error, "failure captured; answering with bad request");
        }
        let config = self.config.get();
        let outcome: &dyn Outcome<E> = &result;
        Response::BadRequest((config.failure_body)(outcome))
    }

    /// Run synchronous work and answer `NoContent` or `BadRequest`.
    pub fn try_execute_action<F>(&self, code: F) -> Response<(), B>
    where
        F: Fn() -> Result<(), E> + Send + Sync + 'static,
    {
        self.respond(self.executor.try_execute_action(code))
    }

    /// Run synchronous work and answer `Ok(value)` or `BadRequest`.
    pub fn try_execute<T, F>(&self, code: F) -> Response<T, B>
    where
        T: Send + 'static,
        F: Fn() -> Result<T, E> + Send + Sync + 'static,
    {
        self.respond(self.executor.try_execute(code))
    }

    /// Async counterpart of [`try_execute_action`](Self::try_execute_action).
    pub async fn try_execute_action_async<F, Fut>(&self, code: F) -> Response<(), B>
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), E>> + Send + 'static,
    {
        let result = self.executor.try_execute_action_async(code).await;
        self.respond(result)
    }

    /// Async counterpart of [`try_execute`](Self::try_execute).
    pub async fn try_execute_async<T, F, Fut>(&self, code: F) -> Response<T, B>
    where
        T: Send + 'static,
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, E>> + Send + 'static,
    {
        let result = self.executor.try_execute_async(code).await;
        self.respond(result)
    }

    /// Offload blocking work that returns nothing and map the outcome.
    pub async fn try_execute_action_sync_as_async<F>(&self, code: F) -> Response<(), B>
    where
        F: Fn() -> Result<(), E> + Send + Sync + 'static,
    {
        let result = self.executor.try_execute_action_sync_as_async(code).await;
        self.respond(result)
    }

    /// Offload blocking work that returns a value and map the outcome.
    pub async fn try_execute_sync_as_async<T, F>(&self, code: F) -> Response<T, B>
    where
        T: Send + 'static,
        F: Fn() -> Result<T, E> + Send + Sync + 'static,
    {
        let result = self.executor.try_execute_sync_as_async(code).await;
        self.respond(result)
    }
}

/// Layer that runs every call of the wrapped service through a [`Responder`].
pub struct RespondLayer<E, B = String> {
    responder: Responder<E, B>,
}

impl<E, B> RespondLayer<E, B> {
    /// Wrap services with `responder`.
    pub fn new(responder: Responder<E, B>) -> Self {
        Self { responder }
    }
}

impl<E, B> Clone for RespondLayer<E, B> {
    fn clone(&self) -> Self {
        Self { responder: self.responder.clone() }
    }
}

impl<E, B> fmt::Debug for RespondLayer<E, B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RespondLayer").field("responder", &self.responder).finish()
    }
}

impl<Svc, E, B> Layer<Svc> for RespondLayer<E, B> {
    type Service = RespondService<Svc, E, B>;

    fn layer(&self, service: Svc) -> Self::Service {
        RespondService { inner: service, responder: self.responder.clone() }
    }
}

/// Service created by [`RespondLayer`].
///
/// Inner errors, panics, and deadline overruns all come back as
/// `Response::BadRequest`; the service itself never fails. Each call drives a
/// fresh clone of the inner service to readiness, so `poll_ready` is always
/// ready.
pub struct RespondService<Svc, E, B = String> {
    inner: Svc,
    responder: Responder<E, B>,
}

impl<Svc: Clone, E, B> Clone for RespondService<Svc, E, B> {
    fn clone(&self) -> Self {
        Self { inner: self.inner.clone(), responder: self.responder.clone() }
    }
}

impl<Svc: fmt::Debug, E, B> fmt::Debug for RespondService<Svc, E, B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RespondService")
            .field("inner", &self.inner)
            .field("responder", &self.responder)
            .finish()
    }
}

impl<Svc, E, B, Req> Service<Req> for RespondService<Svc, E, B>
where
    Svc: Service<Req> + Clone + Send + Sync + 'static,
    Svc::Future: Send + 'static,
    Svc::Response: Send + 'static,
    Svc::Error: Into<E> + Send + 'static,
    Req: Clone + Send + Sync + 'static,
    E: CaptureError,
    B: Send + 'static,
{
    type Response = Response<Svc::Response, B>;
    type Error = Infallible;
    type Future = BoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: Req) -> Self::Future {
        let inner = self.inner.clone();
        let responder = self.responder.clone();
        Box::pin(async move {
            let result = responder
                .executor()
                .try_execute_async(move || {
                    let service = inner.clone();
                    let req = req.clone();
                    async move { service.oneshot(req).await.map_err(Into::into) }
                })
                .await;
            Ok(responder.respond(result))
        })
    }
}
