//! Typed configuration for Hermes.
//!
//! Configuration is layered: built-in defaults, then an optional TOML or JSON
//! file, then `HERMES_*` environment variables. The result is validated before
//! it is handed out.
//!
//! | Field                   | Env var                         | Default |
//! |-------------------------|---------------------------------|---------|
//! | `allow_origin`          | `HERMES_ALLOW_ORIGIN`           | `*`     |
//! | `allow_credentials`     | `HERMES_ALLOW_CREDENTIALS`      | `true`  |
//! | `fallback_status`       | `HERMES_FALLBACK_STATUS`        | `502`   |
//! | `internal_error_status` | `HERMES_INTERNAL_ERROR_STATUS`  | `500`   |
//! | `echo_event`            | `HERMES_ECHO_EVENT`             | `true`  |
//! | `logging.level`         | `HERMES_LOG_LEVEL`              | `info`  |
//! | `logging.json`          | `HERMES_LOG_JSON`               | `true`  |
//!
//! `extra_headers` can only be set from a file.
//!
//! # Example
//!
//! ```
//! use hermes_config::ConfigLoader;
//!
//! let config = ConfigLoader::new()
//!     .with_string(r#"
//!         allow_origin = "https://app.example.com"
//!
//!         [extra_headers]
//!         Cache-Control = "no-store"
//!     "#, "toml")
//!     .unwrap()
//!     .load()
//!     .unwrap();
//!
//! let headers = config.default_headers();
//! assert_eq!(headers["Access-Control-Allow-Origin"], "https://app.example.com");
//! assert_eq!(headers["Cache-Control"], "no-store");
//! ```

#![doc(html_root_url = "https://docs.rs/hermes-config/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod config;
mod error;
mod loader;

pub use config::{HermesConfig, LoggingSection};
pub use error::ConfigError;
pub use loader::{ConfigLoader, DEFAULT_ENV_PREFIX};
