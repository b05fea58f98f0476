//! Structured logging for wrapped handlers.
//!
//! Hermes itself only emits `tracing` events. This module installs the
//! subscriber that turns them into log lines: JSON for deployed functions,
//! pretty output for local runs.
//!
//! # Example
//!
//! ```rust,no_run
//! use hermes_telemetry::{init_logging, LogConfig};
//!
//! let config = LogConfig::production().with_service_name("orders-api");
//! init_logging(&config)?;
//!
//! tracing::info!(status_code = 200, "request handled");
//! # Ok::<(), hermes_telemetry::TelemetryError>(())
//! ```

use crate::error::TelemetryError;
use crate::TelemetryResult;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, Registry};

/// Crates whose events [`hermes_directive`] raises to the requested level.
pub const HERMES_TARGETS: [&str; 4] = [
    "hermes_core",
    "hermes_middleware",
    "hermes_config",
    "hermes_telemetry",
];

/// Level applied to every other target by [`hermes_directive`].
pub const DEPENDENCY_LEVEL: &str = "warn";

/// Builds a filter directive that logs Hermes crates at `level` and
/// everything else at [`DEPENDENCY_LEVEL`].
///
/// ```
/// use hermes_telemetry::logging::hermes_directive;
///
/// assert_eq!(
///     hermes_directive("debug"),
///     "warn,hermes_core=debug,hermes_middleware=debug,hermes_config=debug,hermes_telemetry=debug"
/// );
/// ```
#[must_use]
pub fn hermes_directive(level: &str) -> String {
    HERMES_TARGETS
        .iter()
        .fold(DEPENDENCY_LEVEL.to_string(), |mut directive, target| {
            directive.push_str(&format!(",{target}={level}"));
            directive
        })
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    /// Whether logging is enabled.
    pub enabled: bool,

    /// Filter directive (e.g. "info", "hermes_middleware=debug").
    pub level: String,

    /// Whether to output JSON format.
    pub json_format: bool,

    /// Whether to include file/line info.
    pub file_line_info: bool,

    /// Whether to include target (module path).
    pub include_target: bool,

    /// Service name attached to the startup event.
    pub service_name: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self::production()
    }
}

impl LogConfig {
    /// Creates a development configuration with human-readable output.
    #[must_use]
    pub fn development() -> Self {
        Self {
            enabled: true,
            level: hermes_directive("debug"),
            json_format: false,
            file_line_info: true,
            include_target: true,
            service_name: "hermes".to_string(),
        }
    }

    /// Creates a production configuration with JSON output.
    #[must_use]
    pub fn production() -> Self {
        Self {
            enabled: true,
            level: hermes_directive("info"),
            json_format: true,
            file_line_info: false,
            include_target: true,
            service_name: "hermes".to_string(),
        }
    }

    /// Sets the service name.
    #[must_use]
    pub fn with_service_name(mut self, name: impl Into<String>) -> Self {
        self.service_name = name.into();
        self
    }

    /// Sets the filter directive.
    #[must_use]
    pub fn with_level(mut self, level: impl Into<String>) -> Self {
        self.level = level.into();
        self
    }
}

/// Initializes the global logging subscriber.
///
/// Does nothing when `config.enabled` is false.
///
/// # Errors
///
/// - [`TelemetryError::InvalidLevel`] if the filter directive is invalid
/// - [`TelemetryError::LoggingInit`] if a global subscriber is already set
pub fn init_logging(config: &LogConfig) -> TelemetryResult<()> {
    if !config.enabled {
        return Ok(());
    }

    let filter = create_env_filter(&config.level)?;

    let fmt_layer: Box<dyn Layer<Registry> + Send + Sync> = if config.json_format {
        tracing_subscriber::fmt::layer()
            .json()
            .with_file(config.file_line_info)
            .with_line_number(config.file_line_info)
            .with_target(config.include_target)
            .boxed()
    } else {
        tracing_subscriber::fmt::layer()
            .pretty()
            .with_file(config.file_line_info)
            .with_line_number(config.file_line_info)
            .with_target(config.include_target)
            .boxed()
    };

    tracing_subscriber::registry()
        .with(fmt_layer.with_filter(filter))
        .try_init()
        .map_err(|e| TelemetryError::LoggingInit(e.to_string()))?;

    tracing::debug!(
        service = %config.service_name,
        level = %config.level,
        "logging initialized"
    );
    Ok(())
}

/// Creates an env filter from a directive string.
///
/// # Errors
///
/// Returns [`TelemetryError::InvalidLevel`] if the directive is invalid.
pub fn create_env_filter(filter: &str) -> TelemetryResult<EnvFilter> {
    EnvFilter::try_new(filter).map_err(|e| TelemetryError::InvalidLevel(e.to_string()))
}
