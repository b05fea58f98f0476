//! Response header layering.
//!
//! Envelope headers are built from two layers:
//!
//! 1. **Defaults** - the CORS headers every response carries.
//! 2. **Overrides** - whatever the candidate response supplied.
//!
//! Layers are applied in that order and the last write wins, so a handler can
//! replace `Access-Control-Allow-Origin` but can never remove it. Keys are
//! compared exactly; no case folding is applied.

use crate::StructuralError;
use indexmap::IndexMap;
use serde_json::Value;

/// `Access-Control-Allow-Origin` header.
pub const ALLOW_ORIGIN: &str = "Access-Control-Allow-Origin";

/// `Access-Control-Allow-Credentials` header.
pub const ALLOW_CREDENTIALS: &str = "Access-Control-Allow-Credentials";

/// An ordered header map as carried by an envelope.
pub type HeaderMap = IndexMap<String, String>;

/// Two-layer header merge: defaults first, then overrides.
///
/// # Example
///
/// ```
/// use hermes_core::headers::{HeaderLayers, ALLOW_ORIGIN};
///
/// let mut layers = HeaderLayers::cors("*", true);
/// layers.push_override(ALLOW_ORIGIN, "https://app.example.com");
/// layers.push_override("X-Trace", "abc");
///
/// let merged = layers.merge();
/// assert_eq!(merged[ALLOW_ORIGIN], "https://app.example.com");
/// assert_eq!(merged["Access-Control-Allow-Credentials"], "true");
/// assert_eq!(merged["X-Trace"], "abc");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderLayers {
    defaults: HeaderMap,
    overrides: HeaderMap,
}

impl HeaderLayers {
    /// Creates layers with the given defaults and no overrides.
    #[must_use]
    pub fn new(defaults: HeaderMap) -> Self {
        Self {
            defaults,
            overrides: HeaderMap::new(),
        }
    }

    /// Creates layers seeded with the two CORS defaults.
    #[must_use]
    pub fn cors(allow_origin: &str, allow_credentials: bool) -> Self {
        let mut defaults = HeaderMap::new();
        defaults.insert(ALLOW_ORIGIN.to_string(), allow_origin.to_string());
        defaults.insert(ALLOW_CREDENTIALS.to_string(), allow_credentials.to_string());
        Self::new(defaults)
    }

    /// Returns the default layer.
    #[must_use]
    pub fn defaults(&self) -> &HeaderMap {
        &self.defaults
    }

    /// Adds a header to the override layer.
    pub fn push_override(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.overrides.insert(name.into(), value.into());
    }

    /// Adds every header of `headers` to the override layer.
    pub fn extend_overrides(&mut self, headers: HeaderMap) {
        self.overrides.extend(headers);
    }

    /// Merges both layers. Override values win on key collision.
    #[must_use]
    pub fn merge(&self) -> HeaderMap {
        let mut merged = self.defaults.clone();
        for (name, value) in &self.overrides {
            merged.insert(name.clone(), value.clone());
        }
        merged
    }
}

/// Reads a candidate `headers` value into a header map.
///
/// String values are taken as-is and scalar values (booleans and numbers) are
/// rendered with their JSON text, so `true` becomes `"true"`. A `null` value
/// drops that header.
///
/// # Errors
///
/// Returns [`StructuralError::InvalidHeaders`] if `value` is not a mapping or
/// if any header value is an array or a mapping.
pub fn read_headers(value: &Value) -> Result<HeaderMap, StructuralError> {
    let Value::Object(map) = value else {
        return Err(StructuralError::InvalidHeaders);
    };

    let mut headers = HeaderMap::with_capacity(map.len());
    for (name, value) in map {
        let rendered = match value {
            Value::String(s) => s.clone(),
            Value::Bool(b) => b.to_string(),
            Value::Number(n) => n.to_string(),
            Value::Null => continue,
            Value::Array(_) | Value::Object(_) => return Err(StructuralError::InvalidHeaders),
        };
        headers.insert(name.clone(), rendered);
    }
    Ok(headers)
}
