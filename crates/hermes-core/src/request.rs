//! Gateway request types.
//!
//! A [`Request`] is a typed view over a gateway proxy event. The event mapping
//! is stored as received, so handlers see every field the gateway sent and
//! mistyped fields never reject an invocation on their own.
//!
//! Requests are never mutated by the wrapper. Parsing a payload produces an
//! augmented copy via [`Request::with_payload`].

use crate::{InvocationError, InvocationResult};
use serde_json::{Map, Value};

const BODY: &str = "body";
const HEADERS: &str = "headers";
const REQUEST_CONTEXT: &str = "requestContext";
const AUTHORIZER: &str = "authorizer";
const MIDDLEWARE: &str = "middleware";

/// A gateway proxy event.
///
/// The event mapping is kept exactly as received. Typed accessors such as
/// [`Request::body`] return `None` when a field is absent or holds an
/// unexpected type; the raw value stays reachable through [`Request::get`].
///
/// # Example
///
/// ```
/// use hermes_core::Request;
/// use serde_json::json;
///
/// let request = Request::from_event(&json!({
///     "body": "{\"attr1\":1}",
///     "httpMethod": "POST",
///     "requestContext": { "authorizer": { "principalId": "user-1" } }
/// }))
/// .unwrap();
///
/// assert_eq!(request.body(), Some("{\"attr1\":1}"));
/// assert_eq!(request.authorizer(), Some(&json!({ "principalId": "user-1" })));
/// assert_eq!(request.get("httpMethod"), Some(&json!("POST")));
/// assert!(request.middleware_body().is_none());
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Request {
    fields: Map<String, Value>,
    payload: Option<Value>,
}

/// Borrowed view of the `requestContext` mapping of an event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RequestContext<'a> {
    fields: &'a Map<String, Value>,
}

impl<'a> RequestContext<'a> {
    /// Returns the authorizer output, if any. Opaque to Hermes.
    #[must_use]
    pub fn authorizer(&self) -> Option<&'a Value> {
        self.fields.get(AUTHORIZER).filter(|v| !v.is_null())
    }

    /// Returns a context field.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&'a Value> {
        self.fields.get(key)
    }
}

impl Request {
    /// Creates an empty request.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads a request from a raw gateway event.
    ///
    /// Any mapping is accepted; no field is required or type checked.
    ///
    /// # Errors
    ///
    /// Returns [`InvocationError::InvalidEvent`] if the event is not a mapping.
    pub fn from_event(event: &Value) -> InvocationResult<Self> {
        match event {
            Value::Object(fields) => Ok(Self {
                fields: fields.clone(),
                payload: None,
            }),
            _ => Err(InvocationError::invalid_event("`event` must be a mapping")),
        }
    }

    /// Returns the raw body when it is a string.
    #[must_use]
    pub fn body(&self) -> Option<&str> {
        self.fields.get(BODY)?.as_str()
    }

    /// Returns the request headers when they are a mapping.
    #[must_use]
    pub fn headers(&self) -> Option<&Map<String, Value>> {
        self.fields.get(HEADERS)?.as_object()
    }

    /// Returns a single header value as a string.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers()?.get(name)?.as_str()
    }

    /// Returns the gateway request context when it is a mapping.
    #[must_use]
    pub fn request_context(&self) -> Option<RequestContext<'_>> {
        self.fields
            .get(REQUEST_CONTEXT)?
            .as_object()
            .map(|fields| RequestContext { fields })
    }

    /// Returns the authorizer output from `requestContext.authorizer`.
    ///
    /// Absent context and absent authorizer both yield `None`.
    #[must_use]
    pub fn authorizer(&self) -> Option<&Value> {
        self.request_context()?.authorizer()
    }

    /// Returns the value produced by the payload parser.
    ///
    /// Only [`Request::with_payload`] sets it; a `middleware` key sent by the
    /// caller is an ordinary event field.
    #[must_use]
    pub fn middleware_body(&self) -> Option<&Value> {
        self.payload.as_ref()
    }

    /// Returns a top-level event field as received.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// Returns every top-level event field as received.
    #[must_use]
    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    /// Returns a copy of this request carrying `payload` as the parsed body.
    #[must_use]
    pub fn with_payload(&self, payload: Value) -> Self {
        Self {
            fields: self.fields.clone(),
            payload: Some(payload),
        }
    }

    /// Sets the raw body.
    #[must_use]
    pub fn with_body(self, body: impl Into<String>) -> Self {
        self.with_field(BODY, Value::String(body.into()))
    }

    /// Adds a header. A non-mapping `headers` field is replaced.
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let mut headers = take_object(&mut self.fields, HEADERS);
        headers.insert(name.into(), Value::String(value.into()));
        self.with_field(HEADERS, Value::Object(headers))
    }

    /// Sets `requestContext.authorizer`. A non-mapping context is replaced.
    #[must_use]
    pub fn with_authorizer(mut self, authorizer: Value) -> Self {
        let mut context = take_object(&mut self.fields, REQUEST_CONTEXT);
        context.insert(AUTHORIZER.to_string(), authorizer);
        self.with_field(REQUEST_CONTEXT, Value::Object(context))
    }

    /// Sets a top-level event field.
    #[must_use]
    pub fn with_field(mut self, key: impl Into<String>, value: Value) -> Self {
        self.fields.insert(key.into(), value);
        self
    }

    /// Converts this request back into a raw event.
    ///
    /// A parsed payload is written as `middleware.body`, replacing any
    /// `middleware` field the event carried.
    #[must_use]
    pub fn to_value(&self) -> Value {
        let mut fields = self.fields.clone();
        if let Some(payload) = &self.payload {
            let mut middleware = Map::new();
            middleware.insert(BODY.to_string(), payload.clone());
            fields.insert(MIDDLEWARE.to_string(), Value::Object(middleware));
        }
        Value::Object(fields)
    }
}

fn take_object(fields: &mut Map<String, Value>, key: &str) -> Map<String, Value> {
    match fields.remove(key) {
        Some(Value::Object(map)) => map,
        _ => Map::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_event_rejects_non_mapping() {
        for event in [Value::Null, json!("body"), json!([1, 2]), json!(42)] {
            let err = Request::from_event(&event).unwrap_err();
            assert_eq!(err.message(), "`event` must be a mapping");
        }
    }

    #[test]
    fn test_from_event_keeps_mistyped_fields() {
        let event = json!({
            "body": 12,
            "headers": ["a"],
            "requestContext": "ctx",
            "middleware": "x"
        });
        let request = Request::from_event(&event).unwrap();

        assert!(request.body().is_none());
        assert!(request.headers().is_none());
        assert!(request.request_context().is_none());
        assert!(request.authorizer().is_none());
        assert!(request.middleware_body().is_none());
        assert_eq!(request.get("body"), Some(&json!(12)));
        assert_eq!(request.to_value(), event);
    }

    #[test]
    fn test_caller_middleware_is_an_ordinary_field() {
        let event = json!({ "middleware": { "foo": 1 } });
        let request = Request::from_event(&event).unwrap();

        assert!(request.middleware_body().is_none());
        assert_eq!(request.get("middleware"), Some(&json!({ "foo": 1 })));
        assert_eq!(request.to_value(), event);

        let augmented = request.with_payload(json!("parsed"));
        assert_eq!(augmented.middleware_body(), Some(&json!("parsed")));
        assert_eq!(augmented.get("middleware"), Some(&json!({ "foo": 1 })));
        assert_eq!(augmented.to_value(), json!({ "middleware": { "body": "parsed" } }));
    }

    #[test]
    fn test_builders_replace_mistyped_sections() {
        let request = Request::new()
            .with_field("headers", json!("raw"))
            .with_header("Accept", "text/plain")
            .with_authorizer(json!({ "sub": "u" }));

        assert_eq!(request.header("Accept"), Some("text/plain"));
        assert_eq!(request.authorizer(), Some(&json!({ "sub": "u" })));
    }

    #[test]
    fn test_empty_event() {
        let request = Request::from_event(&json!({})).unwrap();
        assert_eq!(request, Request::new());
        assert!(request.body().is_none());
        assert!(request.authorizer().is_none());
        assert!(request.middleware_body().is_none());
    }

    #[test]
    fn test_null_fields_are_absent() {
        let request = Request::from_event(&json!({
            "body": null,
            "headers": null,
            "requestContext": { "authorizer": null }
        }))
        .unwrap();

        assert!(request.body().is_none());
        assert!(request.headers().is_none());
        assert!(request.authorizer().is_none());
    }

    #[test]
    fn test_authorizer_extraction() {
        let request = Request::from_event(&json!({
            "requestContext": {
                "authorizer": { "attr1": "value1" },
                "stage": "prod"
            }
        }))
        .unwrap();

        assert_eq!(request.authorizer(), Some(&json!({ "attr1": "value1" })));
        let ctx = request.request_context().unwrap();
        assert_eq!(ctx.get("stage"), Some(&json!("prod")));
    }

    #[test]
    fn test_with_payload_leaves_original_untouched() {
        let original = Request::new()
            .with_body("{}")
            .with_header("Content-Type", "application/json");
        let augmented = original.with_payload(json!({ "attr1": 1 }));

        assert!(original.middleware_body().is_none());
        assert_eq!(augmented.middleware_body(), Some(&json!({ "attr1": 1 })));
        assert_eq!(augmented.body(), original.body());
        assert_eq!(augmented.header("Content-Type"), Some("application/json"));
    }

    #[test]
    fn test_round_trip_preserves_unknown_fields() {
        let event = json!({
            "body": "hello",
            "httpMethod": "GET",
            "path": "/items",
            "requestContext": { "authorizer": { "sub": "u" }, "requestId": "r-1" }
        });

        let request = Request::from_event(&event).unwrap();
        assert_eq!(request.to_value(), event);
    }

    #[test]
    fn test_augmented_request_serializes_middleware_body() {
        let request = Request::new().with_payload(json!({ "a": true }));
        assert_eq!(request.to_value(), json!({ "middleware": { "body": { "a": true } } }));
    }
}
