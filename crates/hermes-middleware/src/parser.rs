//! Payload parsing.
//!
//! A [`PayloadParser`] turns the raw request body into a structured value
//! before the handler runs. The result of parsing is an explicit
//! [`ParseOutcome`]: either the parsed payload, or the candidate response that
//! replaces the handler's because parsing failed and an error handler took
//! over.
//!
//! # Example
//!
//! ```
//! use hermes_middleware::PayloadParser;
//! use hermes_core::CandidateResponse;
//! use serde_json::Value;
//!
//! let parser = PayloadParser::new(|body, _headers, _authorizer| {
//!     Ok(serde_json::from_str::<Value>(body.unwrap_or("null"))?)
//! })
//! .on_error(|error| {
//!     Ok(CandidateResponse::new(400).json(&serde_json::json!({
//!         "errors": [{ "message": error.to_string() }]
//!     })))
//! });
//!
//! assert!(parser.has_error_handler());
//! ```

use hermes_core::{CandidateResponse, IntoCandidate, InvocationError, Request};
use serde_json::{Map, Value};
use std::fmt;

type ParseFn =
    dyn Fn(Option<&str>, Option<&Map<String, Value>>, Option<&Value>) -> anyhow::Result<Value>
        + Send
        + Sync;

type ErrorHandlerFn =
    dyn Fn(&anyhow::Error) -> Result<CandidateResponse, InvocationError> + Send + Sync;

/// A body parser with an optional error handler.
///
/// The parse function receives the raw body, the request headers and the
/// authorizer output from `requestContext.authorizer`, each `None` when absent.
pub struct PayloadParser {
    parse: Box<ParseFn>,
    on_error: Option<Box<ErrorHandlerFn>>,
}

/// Result of running a [`PayloadParser`] against a request.
#[derive(Debug)]
pub enum ParseOutcome {
    /// Parsing succeeded.
    Parsed(Value),
    /// Parsing failed and the error handler produced this response.
    Recovered(CandidateResponse),
}

impl PayloadParser {
    /// Creates a parser without an error handler.
    ///
    /// Parse failures then propagate to the wrapper's containment boundary.
    #[must_use]
    pub fn new<P>(parse: P) -> Self
    where
        P: Fn(Option<&str>, Option<&Map<String, Value>>, Option<&Value>) -> anyhow::Result<Value>
            + Send
            + Sync
            + 'static,
    {
        Self {
            parse: Box::new(parse),
            on_error: None,
        }
    }

    /// Sets the handler invoked when parsing fails.
    ///
    /// Its return value becomes the candidate response. Errors it returns are
    /// not handled here; they reach the wrapper's containment boundary.
    #[must_use]
    pub fn on_error<H, R>(mut self, handler: H) -> Self
    where
        H: Fn(&anyhow::Error) -> anyhow::Result<R> + Send + Sync + 'static,
        R: IntoCandidate,
    {
        self.on_error = Some(Box::new(
            move |error: &anyhow::Error| -> Result<CandidateResponse, InvocationError> {
                let output = handler(error).map_err(InvocationError::ErrorHandler)?;
                Ok(output.into_candidate()?)
            },
        ));
        self
    }

    /// Returns `true` if an error handler is configured.
    #[must_use]
    pub fn has_error_handler(&self) -> bool {
        self.on_error.is_some()
    }

    /// Runs the parser against a request.
    ///
    /// # Errors
    ///
    /// - [`InvocationError::Parser`] if parsing fails and there is no error handler
    /// - [`InvocationError::ErrorHandler`] if the error handler itself fails
    /// - [`InvocationError::Structural`] if the error handler returns a non-mapping
    pub fn run(&self, request: &Request) -> Result<ParseOutcome, InvocationError> {
        match (self.parse)(request.body(), request.headers(), request.authorizer()) {
            Ok(payload) => Ok(ParseOutcome::Parsed(payload)),
            Err(error) => match &self.on_error {
                Some(on_error) => {
                    tracing::debug!(
                        error = %error,
                        "payload parsing failed; invoking error handler"
                    );
                    on_error(&error).map(ParseOutcome::Recovered)
                }
                None => Err(InvocationError::Parser(error)),
            },
        }
    }
}

impl fmt::Debug for PayloadParser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PayloadParser")
            .field("has_error_handler", &self.has_error_handler())
            .finish_non_exhaustive()
    }
}

/// Applies a body parser to a request without any containment.
///
/// The parsed value is stored under `middleware.body` of the returned request;
/// the context is passed through untouched.
///
/// # Errors
///
/// Returns whatever `parse` returns on failure.
///
/// # Example
///
/// ```
/// use hermes_middleware::augment;
/// use hermes_core::Request;
/// use serde_json::{json, Value};
///
/// let request = Request::new().with_body(r#"{"a":1}"#);
/// let (request, ctx) = augment(request, "ctx", |body| {
///     Ok(serde_json::from_str::<Value>(body.unwrap_or("null"))?)
/// })
/// .unwrap();
///
/// assert_eq!(request.middleware_body(), Some(&json!({ "a": 1 })));
/// assert_eq!(ctx, "ctx");
/// ```
pub fn augment<C, P>(request: Request, context: C, parse: P) -> anyhow::Result<(Request, C)>
where
    P: FnOnce(Option<&str>) -> anyhow::Result<Value>,
{
    let payload = parse(request.body())?;
    Ok((request.with_payload(payload), context))
}
