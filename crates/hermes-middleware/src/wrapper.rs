//! Handler wrapping.
//!
//! [`wrap`] decorates a handler so that every invocation ends in a valid
//! [`Envelope`], whatever happens inside:
//!
//! ```text
//! event ─► Request::from_event ─► [PayloadParser] ─► Handler ─► CandidateResponse
//!   │              │                    │               │              │
//!   │              └──────── failure / panic ───────────┘              │
//!   │                             │                                    │
//!   └──────────── echoed ──► 500 candidate ────────────────────────────┤
//!                                                                      ▼
//!                                                        Normalizer ─► Envelope
//! ```
//!
//! Everything between reading the event and producing a candidate runs inside
//! one containment boundary per invocation. Errors returned by the request
//! reader, the parser, the parse error handler or the handler, and panics from
//! any of them, are all turned into the same `500` candidate:
//!
//! ```json
//! {
//!   "statusCode": 500,
//!   "body": {
//!     "errors": [{ "message": "<failure message>" }],
//!     "lambda_handler": { "event": <the event as received> }
//!   }
//! }
//! ```

use crate::handler::{FnHandler, Handler};
use crate::normalize::Normalizer;
use crate::parser::{ParseOutcome, PayloadParser};
use hermes_core::{
    CandidateResponse, Envelope, ErrorBody, IntoCandidate, InvocationError, InvocationResult,
    Request,
};
use serde_json::Value;
use std::any::Any;
use std::marker::PhantomData;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

/// Status code of contained invocation failures.
pub const DEFAULT_INTERNAL_ERROR_STATUS: u16 = 500;

/// Configuration for wrapped handlers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrapperConfig {
    /// Include the received event under `lambda_handler.event` in 500 bodies.
    pub echo_event: bool,
    /// Status code of contained invocation failures.
    pub internal_error_status: u16,
}

impl Default for WrapperConfig {
    fn default() -> Self {
        Self {
            echo_event: true,
            internal_error_status: DEFAULT_INTERNAL_ERROR_STATUS,
        }
    }
}

/// A reusable wrapping configuration.
///
/// This is the factory form of [`wrap`]: configure it once, then wrap any
/// number of handlers with the same parser and settings.
///
/// # Example
///
/// ```
/// use hermes_middleware::{middleware, PayloadParser};
/// use hermes_core::Request;
/// use serde_json::{json, Value};
///
/// let json_body = middleware(Some(PayloadParser::new(|body, _, _| {
///     Ok(serde_json::from_str::<Value>(body.unwrap_or("null"))?)
/// })));
///
/// let echo = json_body.wrap(|request: Request, _: &()| {
///     Ok(json!({ "statusCode": 200, "body": request.middleware_body().cloned() }))
/// });
///
/// let envelope = echo.call(&json!({ "body": "{\"attr1\":1}" }), &());
/// assert_eq!(envelope.status_code(), 200);
/// assert_eq!(envelope.body(), Some("{\"attr1\":1}"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct Middleware {
    parser: Option<Arc<PayloadParser>>,
    normalizer: Normalizer,
    config: WrapperConfig,
}

/// Creates a [`Middleware`] with an optional payload parser.
#[must_use]
pub fn middleware(parser: Option<PayloadParser>) -> Middleware {
    Middleware {
        parser: parser.map(Arc::new),
        ..Middleware::default()
    }
}

/// Wraps a closure handler with an optional payload parser.
///
/// # Example
///
/// ```
/// use hermes_middleware::wrap;
/// use hermes_core::Request;
///
/// let wrapped = wrap(
///     |_: Request, _: &()| -> anyhow::Result<serde_json::Value> { anyhow::bail!("boom") },
///     None,
/// );
///
/// let envelope = wrapped.call(&serde_json::json!({}), &());
/// assert_eq!(envelope.status_code(), 500);
/// ```
#[must_use]
pub fn wrap<C, F, R>(handler: F, parser: Option<PayloadParser>) -> Wrapped<FnHandler<F>, C>
where
    F: Fn(Request, &C) -> anyhow::Result<R> + Send + Sync,
    R: IntoCandidate,
{
    middleware(parser).wrap(handler)
}

impl Middleware {
    /// Creates a middleware without a parser.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the payload parser.
    #[must_use]
    pub fn parser(mut self, parser: PayloadParser) -> Self {
        self.parser = Some(Arc::new(parser));
        self
    }

    /// Sets the normalizer used for the final envelope.
    #[must_use]
    pub fn normalizer(mut self, normalizer: Normalizer) -> Self {
        self.normalizer = normalizer;
        self
    }

    /// Sets the wrapper configuration.
    #[must_use]
    pub fn config(mut self, config: WrapperConfig) -> Self {
        self.config = config;
        self
    }

    /// Wraps a closure handler.
    #[must_use]
    pub fn wrap<C, F, R>(&self, handler: F) -> Wrapped<FnHandler<F>, C>
    where
        F: Fn(Request, &C) -> anyhow::Result<R> + Send + Sync,
        R: IntoCandidate,
    {
        self.wrap_handler(FnHandler::new(handler))
    }

    /// Wraps any [`Handler`] implementation.
    #[must_use]
    pub fn wrap_handler<C, H>(&self, handler: H) -> Wrapped<H, C>
    where
        H: Handler<C>,
    {
        Wrapped {
            handler,
            parser: self.parser.clone(),
            normalizer: self.normalizer.clone(),
            config: self.config.clone(),
            _context: PhantomData,
        }
    }
}

/// A wrapped handler. Calling it never fails and never panics.
pub struct Wrapped<H, C> {
    handler: H,
    parser: Option<Arc<PayloadParser>>,
    normalizer: Normalizer,
    config: WrapperConfig,
    _context: PhantomData<fn(&C)>,
}

impl<H, C> std::fmt::Debug for Wrapped<H, C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Wrapped")
            .field("parser", &self.parser)
            .field("normalizer", &self.normalizer)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl<H, C> Wrapped<H, C>
where
    H: Handler<C>,
{
    /// Handles a raw gateway event and returns the envelope for the gateway.
    ///
    /// Panics are contained, but the process panic hook still runs first. The
    /// default hook prints to stderr; silencing it with
    /// [`std::panic::set_hook`] is up to the host binary.
    ///
    /// ```
    /// use hermes_middleware::wrap;
    /// use hermes_core::Request;
    /// use serde_json::{json, Value};
    ///
    /// std::panic::set_hook(Box::new(|_| {}));
    ///
    /// let wrapped = wrap(
    ///     |_: Request, _: &()| -> anyhow::Result<Value> { panic!("quiet") },
    ///     None,
    /// );
    /// let envelope = wrapped.call(&json!({}), &());
    /// assert_eq!(envelope.status_code(), 500);
    ///
    /// let _ = std::panic::take_hook();
    /// ```
    pub fn call(&self, event: &Value, context: &C) -> Envelope {
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| self.invoke(event, context)));

        let candidate = match outcome {
            Ok(Ok(candidate)) => candidate,
            Ok(Err(error)) => self.contain(&error, event),
            Err(payload) => self.contain(&InvocationError::Panic(panic_message(&*payload)), event),
        };

        self.normalizer.normalize(&candidate)
    }

    /// Handles an already typed request.
    pub fn call_request(&self, request: &Request, context: &C) -> Envelope {
        self.call(&request.to_value(), context)
    }

    fn invoke(&self, event: &Value, context: &C) -> InvocationResult<CandidateResponse> {
        let request = Request::from_event(event)?;

        let Some(parser) = &self.parser else {
            return self.handler.invoke(request, context);
        };

        match parser.run(&request)? {
            ParseOutcome::Parsed(payload) => {
                tracing::debug!("payload parsed; invoking handler");
                self.handler.invoke(request.with_payload(payload), context)
            }
            ParseOutcome::Recovered(candidate) => Ok(candidate),
        }
    }

    fn contain(&self, error: &InvocationError, event: &Value) -> CandidateResponse {
        tracing::warn!(
            stage = error.stage(),
            error = %error,
            status_code = self.config.internal_error_status,
            "invocation failed; returning internal error"
        );

        let echoed = if self.config.echo_event {
            event.clone()
        } else {
            Value::Null
        };

        CandidateResponse::new(self.config.internal_error_status)
            .json(&ErrorBody::invocation(error, echoed))
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "handler panicked".to_string()
    }
}
