//! Error types for Hermes.
//!
//! Two families of failure exist and they never mix:
//!
//! - [`StructuralError`] - a candidate response does not have the shape the
//!   gateway expects. These are always turned into data (a `502` envelope),
//!   never raised.
//! - [`InvocationError`] - something failed while producing the candidate
//!   (bad event, parser, error handler, handler, panic). These are contained by
//!   the wrapper and turned into a `500` candidate.
//!
//! Both render into the same wire shape, an [`ErrorBody`]:
//!
//! ```json
//! {
//!   "errors": [{ "message": "invalid statusCode" }],
//!   "lambda_handler": { "event": { "body": "..." } }
//! }
//! ```
//!
//! `lambda_handler` is only present on contained invocation failures.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Result type alias using [`InvocationError`].
pub type InvocationResult<T> = Result<T, InvocationError>;

/// The closed set of shape violations a candidate response can have.
///
/// The `Display` rendering is the exact message placed in `errors[].message`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
pub enum StructuralError {
    /// The candidate was empty (no fields at all).
    #[error("Malformed lambda response")]
    MalformedResponse,

    /// The handler returned something that is not a mapping.
    #[error("invalid return type; handler must return a mapping")]
    InvalidReturnType,

    /// `statusCode` was missing or not an integer.
    #[error("invalid statusCode")]
    InvalidStatusCode,

    /// `headers` was present but not a mapping of scalar values.
    #[error("invalid headers")]
    InvalidHeaders,

    /// `body` was present but could not be turned into a string.
    #[error("invalid body")]
    InvalidBody,
}

impl StructuralError {
    /// Returns a machine-readable code for logs.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::MalformedResponse => "MALFORMED_RESPONSE",
            Self::InvalidReturnType => "INVALID_RETURN_TYPE",
            Self::InvalidStatusCode => "INVALID_STATUS_CODE",
            Self::InvalidHeaders => "INVALID_HEADERS",
            Self::InvalidBody => "INVALID_BODY",
        }
    }

    /// Renders this error as a wire entry.
    #[must_use]
    pub fn to_entry(&self) -> ErrorEntry {
        ErrorEntry::new(self.to_string())
    }
}

/// A failure raised while producing a candidate response.
///
/// The `Display` output is the bare message of the underlying failure, with no
/// prefix, so a handler error `"db down"` shows up as `"db down"` on the wire.
#[derive(Error, Debug)]
pub enum InvocationError {
    /// The incoming event could not be read as a request.
    #[error("{0}")]
    InvalidEvent(String),

    /// The payload parser failed and no error handler was configured.
    #[error(transparent)]
    Parser(anyhow::Error),

    /// The parse error handler itself failed.
    #[error(transparent)]
    ErrorHandler(anyhow::Error),

    /// The wrapped handler failed.
    #[error(transparent)]
    Handler(anyhow::Error),

    /// Something panicked inside the containment boundary.
    #[error("{0}")]
    Panic(String),

    /// The produced value has the wrong shape to even be a candidate.
    #[error("{0}")]
    Structural(StructuralError),
}

impl InvocationError {
    /// Creates an invalid event error.
    #[must_use]
    pub fn invalid_event(message: impl Into<String>) -> Self {
        Self::InvalidEvent(message.into())
    }

    /// Returns a short label for the failing stage, used in logs.
    #[must_use]
    pub const fn stage(&self) -> &'static str {
        match self {
            Self::InvalidEvent(_) => "event",
            Self::Parser(_) => "parser",
            Self::ErrorHandler(_) => "error_handler",
            Self::Handler(_) => "handler",
            Self::Panic(_) => "panic",
            Self::Structural(_) => "return_type",
        }
    }

    /// Returns the message placed in `errors[].message`.
    #[must_use]
    pub fn message(&self) -> String {
        self.to_string()
    }
}

impl From<StructuralError> for InvocationError {
    fn from(error: StructuralError) -> Self {
        Self::Structural(error)
    }
}

/// A single error entry on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorEntry {
    /// Human-readable error message.
    pub message: String,
}

impl ErrorEntry {
    /// Creates an entry from a message.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Diagnostic context attached to contained invocation failures.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HandlerDiagnostics {
    /// The event as it was received, or `null` when echoing is disabled.
    pub event: Value,
}

/// The body shape of every error produced by Hermes itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorBody {
    /// The accumulated errors, never empty.
    pub errors: Vec<ErrorEntry>,
    /// Present only for contained invocation failures.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lambda_handler: Option<HandlerDiagnostics>,
}

impl ErrorBody {
    /// Creates a body from structural errors.
    #[must_use]
    pub fn structural(errors: &[StructuralError]) -> Self {
        Self {
            errors: errors.iter().map(StructuralError::to_entry).collect(),
            lambda_handler: None,
        }
    }

    /// Creates a body for a contained invocation failure.
    #[must_use]
    pub fn invocation(error: &InvocationError, event: Value) -> Self {
        Self {
            errors: vec![ErrorEntry::new(error.message())],
            lambda_handler: Some(HandlerDiagnostics { event }),
        }
    }

    /// Converts this body into a JSON value.
    #[must_use]
    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_structural_messages() {
        assert_eq!(
            StructuralError::MalformedResponse.to_string(),
            "Malformed lambda response"
        );
        assert_eq!(
            StructuralError::InvalidReturnType.to_string(),
            "invalid return type; handler must return a mapping"
        );
        assert_eq!(StructuralError::InvalidStatusCode.to_string(), "invalid statusCode");
        assert_eq!(StructuralError::InvalidHeaders.to_string(), "invalid headers");
        assert_eq!(StructuralError::InvalidBody.to_string(), "invalid body");
    }

    #[test]
    fn test_structural_codes_are_distinct() {
        let codes = [
            StructuralError::MalformedResponse.code(),
            StructuralError::InvalidReturnType.code(),
            StructuralError::InvalidStatusCode.code(),
            StructuralError::InvalidHeaders.code(),
            StructuralError::InvalidBody.code(),
        ];
        let unique: std::collections::HashSet<_> = codes.iter().collect();
        assert_eq!(unique.len(), codes.len());
    }

    #[test]
    fn test_invocation_message_has_no_prefix() {
        let error = InvocationError::Handler(anyhow::anyhow!("Unhandled exception"));
        assert_eq!(error.message(), "Unhandled exception");
        assert_eq!(error.stage(), "handler");

        let error = InvocationError::from(StructuralError::InvalidReturnType);
        assert_eq!(
            error.message(),
            "invalid return type; handler must return a mapping"
        );
    }

    #[test]
    fn test_structural_body_serialization() {
        let body = ErrorBody::structural(&[StructuralError::InvalidBody]);
        let json = serde_json::to_string(&body).expect("serialization should work");
        assert_eq!(json, r#"{"errors":[{"message":"invalid body"}]}"#);
    }

    #[test]
    fn test_invocation_body_echoes_event() {
        let error = InvocationError::invalid_event("`event` must be a mapping");
        let body = ErrorBody::invocation(&error, json!([1, 2]));
        assert_eq!(
            body.to_value(),
            json!({
                "errors": [{"message": "`event` must be a mapping"}],
                "lambda_handler": {"event": [1, 2]}
            })
        );
    }
}
