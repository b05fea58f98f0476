//! The gateway response envelope.

use crate::headers::HeaderMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The final, well-formed response returned to the gateway.
///
/// An envelope only ever has three keys on the wire: `statusCode`, `headers`
/// and `body`. The body is always a string and is omitted entirely when empty.
///
/// # Example
///
/// ```
/// use hermes_core::Envelope;
///
/// let envelope = Envelope::new(204, Default::default(), Some(String::new()));
/// assert!(envelope.body().is_none());
///
/// let json = serde_json::to_string(&envelope).unwrap();
/// assert_eq!(json, r#"{"statusCode":204,"headers":{}}"#);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Envelope {
    status_code: i64,
    headers: HeaderMap,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    body: Option<String>,
}

impl Envelope {
    /// Creates an envelope. An empty body is dropped.
    #[must_use]
    pub fn new(status_code: i64, headers: HeaderMap, body: Option<String>) -> Self {
        Self {
            status_code,
            headers,
            body: body.filter(|b| !b.is_empty()),
        }
    }

    /// Returns the status code.
    #[must_use]
    pub const fn status_code(&self) -> i64 {
        self.status_code
    }

    /// Returns the response headers.
    #[must_use]
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Returns a single header value.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).map(String::as_str)
    }

    /// Returns the serialized body, if any.
    #[must_use]
    pub fn body(&self) -> Option<&str> {
        self.body.as_deref()
    }

    /// Parses the body as JSON.
    ///
    /// Returns `None` when there is no body or it is not JSON.
    #[must_use]
    pub fn json_body(&self) -> Option<Value> {
        serde_json::from_str(self.body.as_deref()?).ok()
    }

    /// Splits the envelope into status code, headers and body.
    #[must_use]
    pub fn into_parts(self) -> (i64, HeaderMap, Option<String>) {
        (self.status_code, self.headers, self.body)
    }

    /// Converts the envelope into the JSON value handed to the gateway.
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
    fn test_wire_keys() {
        let mut headers = HeaderMap::new();
        headers.insert("Access-Control-Allow-Origin".to_string(), "*".to_string());
        let envelope = Envelope::new(200, headers, Some("{\"a\":1}".to_string()));

        assert_eq!(
            envelope.to_value(),
            json!({
                "statusCode": 200,
                "headers": { "Access-Control-Allow-Origin": "*" },
                "body": "{\"a\":1}"
            })
        );
    }

    #[test]
    fn test_absent_body_is_omitted() {
        let envelope = Envelope::new(200, HeaderMap::new(), None);
        let value = envelope.to_value();
        let keys: Vec<_> = value.as_object().unwrap().keys().cloned().collect();
        assert_eq!(keys.len(), 2);
        assert!(value.get("body").is_none());
    }

    #[test]
    fn test_json_body() {
        let envelope = Envelope::new(200, HeaderMap::new(), Some("[1,2]".to_string()));
        assert_eq!(envelope.json_body(), Some(json!([1, 2])));

        let envelope = Envelope::new(200, HeaderMap::new(), Some("plain".to_string()));
        assert!(envelope.json_body().is_none());
    }

    #[test]
    fn test_deserialize_rejects_extra_keys() {
        let result: Result<Envelope, _> = serde_json::from_value(json!({
            "statusCode": 200,
            "headers": {},
            "extra": 1
        }));
        assert!(result.is_err());
    }
}
