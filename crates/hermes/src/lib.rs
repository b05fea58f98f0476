//! # Hermes
//!
//! Contained, normalized handlers for serverless HTTP gateways.
//!
//! Wrapping a handler guarantees that every invocation yields a gateway
//! envelope `{statusCode, headers, body?}`:
//!
//! - handler, parser and error handler failures become a `500` carrying the
//!   error message and the received event
//! - malformed handler responses become a `502` listing what was wrong
//! - every envelope starts from the CORS default headers
//!
//! ## Example
//!
//! ```
//! use hermes::prelude::*;
//! use serde_json::{json, Value};
//!
//! let config = ConfigLoader::new().load().unwrap();
//!
//! let parser = PayloadParser::new(|body, _, _| {
//!     Ok(serde_json::from_str::<Value>(body.unwrap_or("null"))?)
//! });
//!
//! let create_order = config.middleware(Some(parser)).wrap(|request: Request, _: &()| {
//!     let order = request.middleware_body().cloned().unwrap_or(Value::Null);
//!     Ok(CandidateResponse::new(201).json(&json!({ "order": order })))
//! });
//!
//! let envelope = create_order.call(&json!({ "body": "{\"sku\":\"A-1\"}" }), &());
//! assert_eq!(envelope.status_code(), 201);
//! assert_eq!(envelope.json_body(), Some(json!({ "order": { "sku": "A-1" } })));
//!
//! let envelope = create_order.call(&json!({ "body": "not json" }), &());
//! assert_eq!(envelope.status_code(), 500);
//! ```

#![doc(html_root_url = "https://docs.rs/hermes/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

// Re-export core types
pub use hermes_core as core;

// Re-export wrapping and normalization
pub use hermes_middleware as middleware;

// Re-export configuration
pub use hermes_config as config;

// Re-export logging setup
pub use hermes_telemetry as telemetry;

/// Prelude module for convenient imports.
///
/// # Example
///
/// ```
/// use hermes::prelude::*;
///
/// let envelope = normalize(&CandidateResponse::new(204));
/// assert_eq!(envelope.status_code(), 204);
/// ```
pub mod prelude {
    pub use hermes_core::{
        CandidateResponse, Envelope, ErrorBody, IntoCandidate, InvocationError, Request,
        RequestContext, StructuralError,
    };

    pub use hermes_middleware::{
        augment, middleware, normalize, wrap, Handler, Middleware, Normalizer, PayloadParser,
        Wrapped,
    };

    pub use hermes_config::{ConfigLoader, HermesConfig};

    pub use hermes_telemetry::{init_logging, LogConfig};
}
