//! Handler trait for wrapped request processing.
//!
//! The [`Handler`] trait is the seam between the wrapper and user code. Plain
//! closures are adapted with [`FnHandler`]; handlers that carry state can
//! implement the trait directly.

use hermes_core::{CandidateResponse, IntoCandidate, InvocationError, Request};

/// A request handler that produces a candidate response.
///
/// `C` is the invocation context supplied by the runtime. Hermes never looks
/// inside it; it is handed to the handler as-is.
///
/// # Example
///
/// ```
/// use hermes_middleware::Handler;
/// use hermes_core::{CandidateResponse, Request};
///
/// struct Greeter {
///     greeting: String,
/// }
///
/// impl Handler<()> for Greeter {
///     type Output = CandidateResponse;
///
///     fn handle(&self, _request: Request, _context: &()) -> anyhow::Result<CandidateResponse> {
///         Ok(CandidateResponse::new(200).text(self.greeting.clone()))
///     }
/// }
/// ```
pub trait Handler<C>: Send + Sync {
    /// What the handler returns on success.
    type Output: IntoCandidate;

    /// Handles a request.
    ///
    /// # Errors
    ///
    /// Any error is contained by the wrapper and reported as an internal error.
    fn handle(&self, request: Request, context: &C) -> anyhow::Result<Self::Output>;

    /// Handles a request and converts the output into a candidate.
    ///
    /// Handler failures become [`InvocationError::Handler`]; an output that is
    /// not a mapping becomes [`InvocationError::Structural`].
    fn invoke(&self, request: Request, context: &C) -> Result<CandidateResponse, InvocationError> {
        let output = self.handle(request, context).map_err(InvocationError::Handler)?;
        Ok(output.into_candidate()?)
    }
}

/// A closure-based handler.
///
/// # Example
///
/// ```
/// use hermes_middleware::{FnHandler, Handler};
/// use hermes_core::Request;
/// use serde_json::json;
///
/// let handler = FnHandler::new(|_request: Request, _context: &()| {
///     Ok(json!({ "statusCode": 204 }))
/// });
///
/// let candidate = handler.invoke(Request::new(), &()).unwrap();
/// assert_eq!(candidate.status_code(), Some(&json!(204)));
/// ```
#[derive(Debug, Clone)]
pub struct FnHandler<F> {
    func: F,
}

impl<F> FnHandler<F> {
    /// Creates a new function-based handler.
    #[must_use]
    pub fn new<C, R>(func: F) -> Self
    where
        F: Fn(Request, &C) -> anyhow::Result<R> + Send + Sync,
        R: IntoCandidate,
    {
        Self { func }
    }
}

impl<C, F, R> Handler<C> for FnHandler<F>
where
    F: Fn(Request, &C) -> anyhow::Result<R> + Send + Sync,
    R: IntoCandidate,
{
    type Output = R;

    fn handle(&self, request: Request, context: &C) -> anyhow::Result<R> {
        (self.func)(request, context)
    }
}
