//! Main configuration types.
//!
//! [`HermesConfig`] describes every tunable of a wrapped handler: the CORS
//! defaults, the status codes used for the two failure classes, whether the
//! received event is echoed back in diagnostics, and logging.

use hermes_core::{headers::HeaderLayers, HeaderMap};
use hermes_middleware::{Middleware, Normalizer, NormalizerConfig, PayloadParser, WrapperConfig};
use hermes_telemetry::{hermes_directive, LogConfig};
use http::{HeaderName, HeaderValue, StatusCode};
use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// Complete Hermes configuration.
///
/// Use [`ConfigLoader`](crate::ConfigLoader) to load it from files and
/// environment variables.
///
/// # Example
///
/// ```
/// use hermes_config::HermesConfig;
///
/// let config = HermesConfig::default();
/// assert_eq!(config.allow_origin, "*");
/// assert_eq!(config.fallback_status, 502);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields, default)]
pub struct HermesConfig {
    /// Default `Access-Control-Allow-Origin` value.
    pub allow_origin: String,

    /// Default `Access-Control-Allow-Credentials` value.
    pub allow_credentials: bool,

    /// Additional default headers, applied over the CORS pair.
    pub extra_headers: HeaderMap,

    /// Status code for malformed handler responses.
    pub fallback_status: u16,

    /// Status code for contained invocation failures.
    pub internal_error_status: u16,

    /// Echo the received event in invocation failure bodies.
    pub echo_event: bool,

    /// Logging configuration.
    pub logging: LoggingSection,
}

impl Default for HermesConfig {
    fn default() -> Self {
        Self {
            allow_origin: "*".to_string(),
            allow_credentials: true,
            extra_headers: HeaderMap::new(),
            fallback_status: 502,
            internal_error_status: 500,
            echo_event: true,
            logging: LoggingSection::default(),
        }
    }
}

/// Logging section of [`HermesConfig`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields, default)]
pub struct LoggingSection {
    /// Filter directive, e.g. `"info"` or `"hermes_middleware=debug"`.
    pub level: String,

    /// Emit JSON lines instead of pretty output.
    pub json: bool,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: true,
        }
    }
}

impl HermesConfig {
    /// Development preset: debug level, pretty logs.
    #[must_use]
    pub fn development() -> Self {
        Self {
            logging: LoggingSection {
                level: "debug".to_string(),
                json: false,
            },
            ..Self::default()
        }
    }

    /// Production preset: info level JSON logs, no event echo.
    #[must_use]
    pub fn production() -> Self {
        Self {
            echo_event: false,
            ..Self::default()
        }
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] naming the first offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_status("fallback_status", self.fallback_status)?;
        validate_status("internal_error_status", self.internal_error_status)?;

        if self.allow_origin.trim().is_empty() {
            return Err(ConfigError::invalid_value(
                "allow_origin",
                "must not be empty",
            ));
        }
        if HeaderValue::from_str(&self.allow_origin).is_err() {
            return Err(ConfigError::invalid_value(
                "allow_origin",
                "not a valid header value",
            ));
        }

        for (name, value) in &self.extra_headers {
            if HeaderName::from_bytes(name.as_bytes()).is_err() {
                return Err(ConfigError::invalid_value(
                    format!("extra_headers.{name}"),
                    "not a valid header name",
                ));
            }
            if HeaderValue::from_str(value).is_err() {
                return Err(ConfigError::invalid_value(
                    format!("extra_headers.{name}"),
                    "not a valid header value",
                ));
            }
        }

        hermes_telemetry::create_env_filter(&self.logging.level)
            .map_err(|e| ConfigError::invalid_value("logging.level", e.to_string()))?;

        Ok(())
    }

    /// Returns the default header layer every envelope starts with.
    #[must_use]
    pub fn default_headers(&self) -> HeaderMap {
        let mut layers = HeaderLayers::cors(&self.allow_origin, self.allow_credentials);
        layers.extend_overrides(self.extra_headers.clone());
        layers.merge()
    }

    /// Builds the normalizer configuration.
    #[must_use]
    pub fn normalizer_config(&self) -> NormalizerConfig {
        NormalizerConfig {
            default_headers: self.default_headers(),
            fallback_status: self.fallback_status,
        }
    }

    /// Builds the wrapper configuration.
    #[must_use]
    pub fn wrapper_config(&self) -> WrapperConfig {
        WrapperConfig {
            echo_event: self.echo_event,
            internal_error_status: self.internal_error_status,
        }
    }

    /// Builds the logging configuration.
    #[must_use]
    pub fn log_config(&self) -> LogConfig {
        let level = &self.logging.level;
        let bare_level = !level.contains(['=', ',']);
        LogConfig {
            level: if bare_level {
                hermes_directive(level)
            } else {
                level.clone()
            },
            json_format: self.logging.json,
            ..LogConfig::production()
        }
    }

    /// Builds a reusable [`Middleware`] from this configuration.
    ///
    /// # Example
    ///
    /// ```
    /// use hermes_config::HermesConfig;
    /// use hermes_core::Request;
    /// use serde_json::json;
    ///
    /// let config = HermesConfig {
    ///     allow_origin: "https://app.example.com".to_string(),
    ///     ..HermesConfig::default()
    /// };
    ///
    /// let handler = config
    ///     .middleware(None)
    ///     .wrap(|_: Request, _: &()| Ok(json!({ "statusCode": 204 })));
    ///
    /// let envelope = handler.call(&json!({}), &());
    /// assert_eq!(envelope.header("Access-Control-Allow-Origin"), Some("https://app.example.com"));
    /// ```
    #[must_use]
    pub fn middleware(&self, parser: Option<PayloadParser>) -> Middleware {
        let middleware = Middleware::new()
            .normalizer(Normalizer::with_config(self.normalizer_config()))
            .config(self.wrapper_config());

        match parser {
            Some(parser) => middleware.parser(parser),
            None => middleware,
        }
    }
}

fn validate_status(field: &str, status: u16) -> Result<(), ConfigError> {
    match StatusCode::from_u16(status) {
        Ok(code) if code.as_u16() <= 599 => Ok(()),
        _ => Err(ConfigError::invalid_value(
            field,
            format!("{status} is not an HTTP status code between 100 and 599"),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_default_config() {
        let config = HermesConfig::default();
        assert_eq!(config.allow_origin, "*");
        assert!(config.allow_credentials);
        assert!(config.extra_headers.is_empty());
        assert_eq!(config.fallback_status, 502);
        assert_eq!(config.internal_error_status, 500);
        assert!(config.echo_event);
        assert_eq!(config.logging.level, "info");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_presets() {
        let dev = HermesConfig::development();
        assert_eq!(dev.logging.level, "debug");
        assert!(!dev.logging.json);

        let prod = HermesConfig::production();
        assert!(!prod.echo_event);
        assert!(prod.logging.json);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: HermesConfig = toml::from_str(
            r#"
            allow_origin = "https://app.example.com"

            [logging]
            level = "warn"
        "#,
        )
        .unwrap();

        assert_eq!(config.allow_origin, "https://app.example.com");
        assert!(config.allow_credentials);
        assert_eq!(config.logging.level, "warn");
        assert!(config.logging.json);
    }

    #[test]
    fn test_unknown_field_rejected() {
        let result: Result<HermesConfig, _> = toml::from_str("allow_orign = \"*\"");
        assert!(result.is_err());
    }

    #[test]
    fn test_validate_status_range() {
        for status in [0, 99, 600, 999] {
            let config = HermesConfig {
                fallback_status: status,
                ..HermesConfig::default()
            };
            let err = config.validate().unwrap_err();
            assert!(err.to_string().contains("fallback_status"), "{status}");
        }

        let config = HermesConfig {
            internal_error_status: 1000,
            ..HermesConfig::default()
        };
        assert!(config
            .validate()
            .unwrap_err()
            .to_string()
            .contains("internal_error_status"));
    }

    #[test]
    fn test_validate_empty_origin() {
        let config = HermesConfig {
            allow_origin: "  ".to_string(),
            ..HermesConfig::default()
        };
        assert!(config.validate().unwrap_err().to_string().contains("allow_origin"));
    }

    #[test]
    fn test_validate_extra_header_name() {
        let mut config = HermesConfig::default();
        config
            .extra_headers
            .insert("Bad Header".to_string(), "x".to_string());
        assert!(config.validate().unwrap_err().to_string().contains("Bad Header"));
    }

    #[test]
    fn test_validate_log_level() {
        let config = HermesConfig {
            logging: LoggingSection {
                level: "hermes=loudest".to_string(),
                json: true,
            },
            ..HermesConfig::default()
        };
        assert!(config.validate().unwrap_err().to_string().contains("logging.level"));
    }

    #[test]
    fn test_default_headers_layering() {
        let mut config = HermesConfig {
            allow_credentials: false,
            ..HermesConfig::default()
        };
        config
            .extra_headers
            .insert("Access-Control-Allow-Origin".to_string(), "https://a.example".to_string());
        config
            .extra_headers
            .insert("X-Service".to_string(), "orders".to_string());

        let headers = config.default_headers();
        assert_eq!(headers["Access-Control-Allow-Origin"], "https://a.example");
        assert_eq!(headers["Access-Control-Allow-Credentials"], "false");
        assert_eq!(headers["X-Service"], "orders");
    }

    #[test]
    fn test_conversions() {
        let config = HermesConfig {
            fallback_status: 500,
            internal_error_status: 503,
            echo_event: false,
            ..HermesConfig::default()
        };

        assert_eq!(config.normalizer_config().fallback_status, 500);
        assert_eq!(config.wrapper_config().internal_error_status, 503);
        assert!(!config.wrapper_config().echo_event);

        let log = config.log_config();
        assert_eq!(log.level, hermes_directive("info"));
        assert!(log.json_format);
    }

    #[test]
    fn test_log_config_keeps_full_directive() {
        let config = HermesConfig {
            logging: LoggingSection {
                level: "hermes_middleware=trace".to_string(),
                json: false,
            },
            ..HermesConfig::default()
        };

        let log = config.log_config();
        assert_eq!(log.level, "hermes_middleware=trace");
        assert!(!log.json_format);
    }

    #[test]
    fn test_middleware_applies_config() {
        let config = HermesConfig {
            internal_error_status: 503,
            echo_event: false,
            ..HermesConfig::default()
        };

        let handler = config.middleware(None).wrap(
            |_: hermes_core::Request, _: &()| -> anyhow::Result<serde_json::Value> {
                anyhow::bail!("down")
            },
        );
        let envelope = handler.call(&json!({ "body": "secret" }), &());

        assert_eq!(envelope.status_code(), 503);
        assert_eq!(
            envelope.json_body(),
            Some(json!({
                "errors": [{ "message": "down" }],
                "lambda_handler": { "event": null }
            }))
        );
    }
}
