//! # Hermes Middleware
//!
//! The wrapping protocol for gateway request handlers.
//!
//! A wrapped handler goes through two stages, always in this order:
//!
//! ```text
//! event → Wrapper (parse → handle → contain) → Normalizer → Envelope
//! ```
//!
//! | Stage      | Type           | Failure mode                               |
//! |------------|----------------|--------------------------------------------|
//! | Wrapper    | [`Wrapped`]    | invocation failures become a `500`         |
//! | Normalizer | [`Normalizer`] | structural errors become a `502`           |
//!
//! Business status codes chosen by a handler (`404`, `409`, even `500`) pass
//! through untouched as long as the response is well-formed, so a caller can
//! tell infrastructure failures apart only by `500` vs `502` plus the body.
//!
//! ## Example
//!
//! ```
//! use hermes_middleware::{wrap, PayloadParser};
//! use hermes_core::Request;
//! use serde_json::{json, Value};
//!
//! let parser = PayloadParser::new(|body, _headers, _authorizer| {
//!     Ok(serde_json::from_str::<Value>(body.unwrap_or("null"))?)
//! });
//!
//! let handler = wrap(
//!     |request: Request, _context: &()| {
//!         Ok(json!({ "statusCode": 200, "body": request.middleware_body().cloned() }))
//!     },
//!     Some(parser),
//! );
//!
//! let envelope = handler.call(&json!({ "body": "{\"attr1\":1}" }), &());
//! assert_eq!(envelope.status_code(), 200);
//! assert_eq!(envelope.body(), Some("{\"attr1\":1}"));
//! ```

#![doc(html_root_url = "https://docs.rs/hermes-middleware/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod handler;
pub mod normalize;
pub mod parser;
pub mod wrapper;

pub use handler::{FnHandler, Handler};
pub use normalize::{normalize, Normalizer, NormalizerConfig};
pub use parser::{augment, ParseOutcome, PayloadParser};
pub use wrapper::{middleware, wrap, Middleware, Wrapped, WrapperConfig};
