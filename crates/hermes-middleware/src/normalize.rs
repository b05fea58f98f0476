//! Envelope normalization.
//!
//! The [`Normalizer`] turns any [`CandidateResponse`] into a valid
//! [`Envelope`]. It never fails: shape problems are collected as
//! [`StructuralError`]s and reported in the envelope itself.
//!
//! # Algorithm
//!
//! ```text
//! candidate ──► empty? ──yes──► [Malformed lambda response]
//!                 │no
//!                 ├─► statusCode integer?        else [invalid statusCode]
//!                 ├─► headers mapping? merge     else [invalid headers]
//!                 └─► body string | mapping?     else [invalid body]
//!
//! errors empty  ──► { statusCode, headers, body? }
//! errors found  ──► { 502, headers, {"errors": [...]} }
//! ```
//!
//! Headers accumulated before an error are kept, so CORS headers survive error
//! responses. Only the type of the status code is checked, never its range.

use hermes_core::{
    headers::{self, HeaderLayers},
    CandidateBody, CandidateResponse, Envelope, ErrorBody, HeaderMap, StructuralError,
};
use serde_json::Value;

/// Status code used when structural errors were found.
pub const DEFAULT_FALLBACK_STATUS: u16 = 502;

/// Configuration for the [`Normalizer`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizerConfig {
    /// Headers every envelope starts with.
    pub default_headers: HeaderMap,
    /// Status code of envelopes built from structural errors.
    pub fallback_status: u16,
}

impl Default for NormalizerConfig {
    fn default() -> Self {
        Self {
            default_headers: HeaderLayers::cors("*", true).defaults().clone(),
            fallback_status: DEFAULT_FALLBACK_STATUS,
        }
    }
}

/// Converts candidate responses into envelopes.
///
/// # Example
///
/// ```
/// use hermes_middleware::Normalizer;
/// use hermes_core::CandidateResponse;
/// use serde_json::json;
///
/// let normalizer = Normalizer::new();
///
/// let envelope = normalizer.normalize(&CandidateResponse::new(200).json(&json!({ "ok": true })));
/// assert_eq!(envelope.status_code(), 200);
/// assert_eq!(envelope.body(), Some(r#"{"ok":true}"#));
/// assert_eq!(envelope.header("Access-Control-Allow-Origin"), Some("*"));
///
/// let envelope = normalizer.normalize(&CandidateResponse::default());
/// assert_eq!(envelope.status_code(), 502);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Normalizer {
    config: NormalizerConfig,
}

impl Normalizer {
    /// Creates a normalizer with the default CORS headers and a `502` fallback.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a normalizer from a configuration.
    #[must_use]
    pub fn with_config(config: NormalizerConfig) -> Self {
        Self { config }
    }

    /// Replaces the default headers.
    #[must_use]
    pub fn default_headers(mut self, headers: HeaderMap) -> Self {
        self.config.default_headers = headers;
        self
    }

    /// Sets the status code used for structurally invalid candidates.
    #[must_use]
    pub fn fallback_status(mut self, status: u16) -> Self {
        self.config.fallback_status = status;
        self
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &NormalizerConfig {
        &self.config
    }

    /// Validates a candidate and builds its envelope.
    #[must_use]
    pub fn normalize(&self, candidate: &CandidateResponse) -> Envelope {
        let mut errors = Vec::new();
        let mut layers = HeaderLayers::new(self.config.default_headers.clone());
        let mut status_code = None;
        let mut body = None;

        if candidate.is_empty() {
            errors.push(StructuralError::MalformedResponse);
        } else {
            match candidate.status_code().and_then(Value::as_i64) {
                Some(code) => status_code = Some(code),
                None => errors.push(StructuralError::InvalidStatusCode),
            }

            if let Some(value) = candidate.headers() {
                match headers::read_headers(value) {
                    Ok(overrides) => layers.extend_overrides(overrides),
                    Err(e) => errors.push(e),
                }
            }

            if let Some(candidate_body) = candidate.body() {
                match render_body(candidate_body) {
                    Ok(rendered) => body = rendered,
                    Err(e) => errors.push(e),
                }
            }
        }

        match status_code {
            Some(code) if errors.is_empty() => Envelope::new(code, layers.merge(), body),
            _ => self.error_envelope(&errors, layers),
        }
    }

    fn error_envelope(&self, errors: &[StructuralError], layers: HeaderLayers) -> Envelope {
        let codes: Vec<_> = errors.iter().map(StructuralError::code).collect();
        tracing::warn!(
            status_code = self.config.fallback_status,
            errors = ?codes,
            "candidate response failed structural validation"
        );

        let body = serde_json::to_string(&ErrorBody::structural(errors)).ok();
        Envelope::new(i64::from(self.config.fallback_status), layers.merge(), body)
    }
}

/// Normalizes a candidate with the default [`Normalizer`].
#[must_use]
pub fn normalize(candidate: &CandidateResponse) -> Envelope {
    Normalizer::new().normalize(candidate)
}

/// Renders a body slot. `Ok(None)` means "no body".
fn render_body(body: &CandidateBody) -> Result<Option<String>, StructuralError> {
    match body {
        CandidateBody::Value(Value::String(text)) => Ok(Some(text.clone())),
        CandidateBody::Value(Value::Object(map)) if map.is_empty() => Ok(None),
        CandidateBody::Value(value @ Value::Object(_)) => serde_json::to_string(value)
            .map(Some)
            .map_err(|_| StructuralError::InvalidBody),
        CandidateBody::Value(_) | CandidateBody::Unserializable(_) => {
            Err(StructuralError::InvalidBody)
        }
    }
}
