//! Candidate responses.
//!
//! A [`CandidateResponse`] is what a handler (or a parse error handler) hands
//! back before any validation has happened. Its slots hold raw values because
//! their shape is exactly what the normalizer has to check: a `statusCode`
//! that is a string, `headers` that are a list, and so on are all legal here.
//!
//! Candidates are built either from a raw JSON value, for handlers that work
//! with untyped mappings, or with the builder methods:
//!
//! ```
//! use hermes_core::CandidateResponse;
//! use serde_json::json;
//!
//! let candidate = CandidateResponse::new(201)
//!     .header("Location", "/items/7")
//!     .json(&json!({ "id": 7 }));
//!
//! assert_eq!(candidate.status_code(), Some(&json!(201)));
//! ```

use crate::{Envelope, StructuralError};
use serde::Serialize;
use serde_json::{Map, Value};

const STATUS_CODE: &str = "statusCode";
const HEADERS: &str = "headers";
const BODY: &str = "body";

/// The body slot of a candidate response.
#[derive(Debug, Clone, PartialEq)]
pub enum CandidateBody {
    /// A raw value; only strings and mappings are acceptable.
    Value(Value),
    /// A typed body that failed to serialize, with the serializer's reason.
    Unserializable(String),
}

/// An unvalidated response as produced by a handler.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CandidateResponse {
    status_code: Option<Value>,
    headers: Option<Value>,
    body: Option<CandidateBody>,
    extra: Map<String, Value>,
}

impl CandidateResponse {
    /// Creates a candidate with the given status code.
    #[must_use]
    pub fn new(status_code: u16) -> Self {
        Self {
            status_code: Some(Value::from(status_code)),
            ..Self::default()
        }
    }

    /// Reads a candidate from a raw value.
    ///
    /// `null` slots count as absent. Keys other than `statusCode`, `headers`
    /// and `body` are kept but otherwise ignored.
    ///
    /// # Errors
    ///
    /// Returns [`StructuralError::InvalidReturnType`] if `value` is not a mapping.
    pub fn from_value(value: Value) -> Result<Self, StructuralError> {
        let Value::Object(mut map) = value else {
            return Err(StructuralError::InvalidReturnType);
        };

        let status_code = map.remove(STATUS_CODE).filter(|v| !v.is_null());
        let headers = map.remove(HEADERS).filter(|v| !v.is_null());
        let body = map
            .remove(BODY)
            .filter(|v| !v.is_null())
            .map(CandidateBody::Value);

        Ok(Self {
            status_code,
            headers,
            body,
            extra: map,
        })
    }

    /// Sets the raw status code slot.
    #[must_use]
    pub fn with_status_code(mut self, status_code: Value) -> Self {
        self.status_code = Some(status_code);
        self
    }

    /// Sets the raw headers slot, replacing any previous headers.
    #[must_use]
    pub fn with_headers(mut self, headers: Value) -> Self {
        self.headers = Some(headers);
        self
    }

    /// Adds a single header.
    ///
    /// If the headers slot holds something other than a mapping it is replaced.
    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let name = name.into();
        let value = Value::String(value.into());
        match &mut self.headers {
            Some(Value::Object(map)) => {
                map.insert(name, value);
            }
            slot => {
                let mut map = Map::new();
                map.insert(name, value);
                *slot = Some(Value::Object(map));
            }
        }
        self
    }

    /// Sets a plain text body.
    #[must_use]
    pub fn text(mut self, body: impl Into<String>) -> Self {
        self.body = Some(CandidateBody::Value(Value::String(body.into())));
        self
    }

    /// Sets a structured body from any serializable value.
    ///
    /// Serialization happens here; a failure is remembered and reported by the
    /// normalizer as an invalid body.
    #[must_use]
    pub fn json<T: Serialize + ?Sized>(mut self, body: &T) -> Self {
        self.body = Some(match serde_json::to_value(body) {
            Ok(value) => CandidateBody::Value(value),
            Err(e) => CandidateBody::Unserializable(e.to_string()),
        });
        self
    }

    /// Sets the raw body slot.
    #[must_use]
    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(CandidateBody::Value(body));
        self
    }

    /// Returns the raw status code slot.
    #[must_use]
    pub fn status_code(&self) -> Option<&Value> {
        self.status_code.as_ref()
    }

    /// Returns the raw headers slot.
    #[must_use]
    pub fn headers(&self) -> Option<&Value> {
        self.headers.as_ref()
    }

    /// Returns the body slot.
    #[must_use]
    pub fn body(&self) -> Option<&CandidateBody> {
        self.body.as_ref()
    }

    /// Returns keys that are not part of the envelope.
    #[must_use]
    pub fn extra(&self) -> &Map<String, Value> {
        &self.extra
    }

    /// Returns `true` if the candidate carries no fields at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.status_code.is_none()
            && self.headers.is_none()
            && self.body.is_none()
            && self.extra.is_empty()
    }
}

impl TryFrom<Value> for CandidateResponse {
    type Error = StructuralError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        Self::from_value(value)
    }
}

impl From<Envelope> for CandidateResponse {
    fn from(envelope: Envelope) -> Self {
        let (status_code, headers, body) = envelope.into_parts();
        let headers = headers
            .into_iter()
            .map(|(name, value)| (name, Value::String(value)))
            .collect();

        Self {
            status_code: Some(Value::from(status_code)),
            headers: Some(Value::Object(headers)),
            body: body.map(|b| CandidateBody::Value(Value::String(b))),
            extra: Map::new(),
        }
    }
}

/// Conversion of handler return values into candidates.
///
/// Implemented for [`CandidateResponse`] itself, for raw [`Value`]s and for
/// an already built [`Envelope`].
pub trait IntoCandidate {
    /// Converts `self` into a candidate.
    ///
    /// # Errors
    ///
    /// Returns [`StructuralError::InvalidReturnType`] when the value cannot
    /// represent a response at all.
    fn into_candidate(self) -> Result<CandidateResponse, StructuralError>;
}

impl IntoCandidate for CandidateResponse {
    fn into_candidate(self) -> Result<CandidateResponse, StructuralError> {
        Ok(self)
    }
}

impl IntoCandidate for Value {
    fn into_candidate(self) -> Result<CandidateResponse, StructuralError> {
        CandidateResponse::from_value(self)
    }
}

impl IntoCandidate for Envelope {
    fn into_candidate(self) -> Result<CandidateResponse, StructuralError> {
        Ok(self.into())
    }
}
