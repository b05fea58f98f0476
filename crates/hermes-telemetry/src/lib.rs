//! Logging setup for Hermes.
//!
//! The wrapper and normalizer emit `tracing` events but never install a
//! subscriber. Applications that want those events on stdout call
//! [`init_logging`] once at cold start.

#![doc(html_root_url = "https://docs.rs/hermes-telemetry/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod error;
pub mod logging;

pub use error::TelemetryError;
pub use logging::{create_env_filter, hermes_directive, init_logging, LogConfig};

/// Result type for telemetry operations.
pub type TelemetryResult<T> = Result<T, TelemetryError>;
