//! # Hermes Core
//!
//! Core types for the Hermes gateway response wrapper.
//!
//! This crate provides the data model shared by the wrapper and the
//! normalizer:
//!
//! - [`Request`] - Typed view of a gateway proxy event
//! - [`CandidateResponse`] - Unvalidated handler output
//! - [`Envelope`] - The well-formed response handed back to the gateway
//! - [`HeaderLayers`] - Default/override header merge
//! - [`StructuralError`] / [`InvocationError`] - The two error families

#![doc(html_root_url = "https://docs.rs/hermes-core/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod envelope;
mod error;
pub mod headers;
mod request;
mod response;

pub use envelope::Envelope;
pub use error::{
    ErrorBody, ErrorEntry, HandlerDiagnostics, InvocationError, InvocationResult, StructuralError,
};
pub use headers::{HeaderLayers, HeaderMap};
pub use request::{Request, RequestContext};
pub use response::{CandidateBody, CandidateResponse, IntoCandidate};
