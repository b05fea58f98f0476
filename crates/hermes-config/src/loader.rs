//! Configuration loader with layered approach.
//!
//! This module provides the [`ConfigLoader`] for loading configuration from
//! multiple sources: defaults, files, and environment variables.

use std::env;
use std::fs;
use std::path::Path;

use crate::{ConfigError, HermesConfig};

/// Environment prefix used by [`ConfigLoader::from_env`].
pub const DEFAULT_ENV_PREFIX: &str = "HERMES";

/// Configuration loader with layered approach.
///
/// Later layers override earlier ones:
/// 1. Default values (built into the code)
/// 2. Configuration file (TOML or JSON)
/// 3. Environment variables (`PREFIX_KEY`)
///
/// # Example
///
/// ```no_run
/// use hermes_config::ConfigLoader;
///
/// # fn main() -> Result<(), hermes_config::ConfigError> {
/// let config = ConfigLoader::new()
///     .with_optional_file("hermes.toml")?
///     .with_env_prefix("HERMES")
///     .load()?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct ConfigLoader {
    config: HermesConfig,
    env_prefix: Option<String>,
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigLoader {
    /// Create a new loader seeded with default values.
    #[must_use]
    pub fn new() -> Self {
        Self {
            config: HermesConfig::default(),
            env_prefix: None,
        }
    }

    /// Loads defaults overridden by `HERMES_*` environment variables.
    ///
    /// This is the usual entry point inside a deployed function, where
    /// configuration arrives only through the environment.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable cannot be parsed or the result is
    /// invalid.
    pub fn from_env() -> Result<HermesConfig, ConfigError> {
        Self::new().with_env_prefix(DEFAULT_ENV_PREFIX).load()
    }

    /// Start with the development preset.
    ///
    /// # Example
    ///
    /// ```
    /// use hermes_config::ConfigLoader;
    ///
    /// let config = ConfigLoader::new().with_development().load().unwrap();
    /// assert_eq!(config.logging.level, "debug");
    /// ```
    #[must_use]
    pub fn with_development(mut self) -> Self {
        self.config = HermesConfig::development();
        self
    }

    /// Start with the production preset.
    #[must_use]
    pub fn with_production(mut self) -> Self {
        self.config = HermesConfig::production();
        self
    }

    /// Load configuration from a file.
    ///
    /// The format is chosen by extension: `.toml` or `.json`. Fields missing
    /// from the file take their default values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - The file does not exist
    /// - The file cannot be read
    /// - The extension is neither `toml` nor `json`
    /// - The file contains invalid TOML/JSON or unknown fields
    pub fn with_file<P: AsRef<Path>>(mut self, path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(ConfigError::file_not_found(path));
        }

        let content =
            fs::read_to_string(path).map_err(|e| ConfigError::read_error(path, e))?;

        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_lowercase);

        self.config = match extension.as_deref() {
            Some("toml") => toml::from_str(&content)?,
            Some("json") => serde_json::from_str(&content)?,
            _ => return Err(ConfigError::unsupported_format(path.display().to_string())),
        };

        Ok(self)
    }

    /// Load configuration from a file if it exists.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the file exists but cannot be loaded.
    pub fn with_optional_file<P: AsRef<Path>>(self, path: P) -> Result<Self, ConfigError> {
        if path.as_ref().exists() {
            self.with_file(path)
        } else {
            Ok(self)
        }
    }

    /// Load configuration from a string.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the format is unknown or parsing fails.
    ///
    /// # Example
    ///
    /// ```
    /// use hermes_config::ConfigLoader;
    ///
    /// let config = ConfigLoader::new()
    ///     .with_string("fallback_status = 500", "toml")
    ///     .unwrap()
    ///     .load()
    ///     .unwrap();
    ///
    /// assert_eq!(config.fallback_status, 500);
    /// ```
    pub fn with_string(mut self, content: &str, format: &str) -> Result<Self, ConfigError> {
        self.config = match format.to_lowercase().as_str() {
            "toml" => toml::from_str(content)?,
            "json" => serde_json::from_str(content)?,
            _ => return Err(ConfigError::unsupported_format(format)),
        };
        Ok(self)
    }

    /// Set the environment variable prefix for overrides.
    ///
    /// With prefix `HERMES`, `HERMES_ALLOW_ORIGIN` overrides `allow_origin`
    /// and `HERMES_LOG_LEVEL` overrides `logging.level`.
    #[must_use]
    pub fn with_env_prefix(mut self, prefix: &str) -> Self {
        self.env_prefix = Some(prefix.to_uppercase());
        self
    }

    /// Load a `.env` file from the current directory, if present.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::EnvError`] if the file exists but is malformed.
    pub fn with_dotenv(self) -> Result<Self, ConfigError> {
        match dotenvy::dotenv() {
            Ok(_) => Ok(self),
            Err(e) if e.not_found() => Ok(self),
            Err(e) => Err(ConfigError::env_error(".env", e.to_string())),
        }
    }

    /// Finalize and return the loaded configuration.
    ///
    /// Applies environment variable overrides (if a prefix was set) and
    /// validates the final configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if an environment variable cannot be parsed or
    /// validation fails.
    pub fn load(mut self) -> Result<HermesConfig, ConfigError> {
        if let Some(prefix) = self.env_prefix.take() {
            self.apply_env_overrides(&prefix)?;
        }

        self.config.validate()?;

        Ok(self.config)
    }

    /// Finalize without validation.
    #[must_use]
    pub fn load_unvalidated(self) -> HermesConfig {
        self.config
    }

    fn apply_env_overrides(&mut self, prefix: &str) -> Result<(), ConfigError> {
        let marker = format!("{prefix}_");
        for (key, value) in env::vars().filter(|(k, _)| k.starts_with(&marker)) {
            self.apply_env_var(&key, &value, prefix)?;
        }
        Ok(())
    }

    fn apply_env_var(&mut self, key: &str, value: &str, prefix: &str) -> Result<(), ConfigError> {
        let name = key
            .strip_prefix(prefix)
            .and_then(|k| k.strip_prefix('_'))
            .ok_or_else(|| ConfigError::env_error(key, "invalid key format"))?;

        match name {
            "ALLOW_ORIGIN" => self.config.allow_origin = value.to_string(),
            "ALLOW_CREDENTIALS" => self.config.allow_credentials = parse_bool(key, value)?,
            "FALLBACK_STATUS" => self.config.fallback_status = parse_status(key, value)?,
            "INTERNAL_ERROR_STATUS" => {
                self.config.internal_error_status = parse_status(key, value)?;
            }
            "ECHO_EVENT" => self.config.echo_event = parse_bool(key, value)?,
            "LOG_LEVEL" => self.config.logging.level = value.to_string(),
            "LOG_JSON" => self.config.logging.json = parse_bool(key, value)?,
            // Unrelated variables sharing the prefix
            _ => {}
        }

        Ok(())
    }
}

fn parse_bool(key: &str, value: &str) -> Result<bool, ConfigError> {
    match value.to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::env_error(key, "expected boolean")),
    }
}

fn parse_status(key: &str, value: &str) -> Result<u16, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::env_error(key, "expected integer status code"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    // Environment overrides are exercised through apply_env_var directly;
    // mutating the process environment races with other tests.

    #[test]
    fn test_loader_new() {
        let config = ConfigLoader::new().load().unwrap();
        assert_eq!(config, HermesConfig::default());
    }

    #[test]
    fn test_loader_with_development() {
        let config = ConfigLoader::new().with_development().load().unwrap();
        assert_eq!(config.logging.level, "debug");
        assert!(!config.logging.json);
    }

    #[test]
    fn test_loader_with_production() {
        let config = ConfigLoader::new().with_production().load().unwrap();
        assert!(!config.echo_event);
    }

    #[test]
    fn test_loader_with_string_json() {
        let json = r#"{"allow_credentials": false, "extra_headers": {"X-Service": "orders"}}"#;

        let config = ConfigLoader::new()
            .with_string(json, "json")
            .unwrap()
            .load()
            .unwrap();

        assert!(!config.allow_credentials);
        assert_eq!(config.extra_headers["X-Service"], "orders");
    }

    #[test]
    fn test_loader_with_string_unsupported() {
        let result = ConfigLoader::new().with_string("a: 1", "yaml");
        assert!(matches!(result, Err(ConfigError::UnsupportedFormat { .. })));
    }

    #[test]
    fn test_loader_with_toml_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            r#"
            allow_origin = "https://app.example.com"
            internal_error_status = 503

            [extra_headers]
            Cache-Control = "no-store"

            [logging]
            level = "warn"
            json = false
            "#
        )
        .unwrap();

        let config = ConfigLoader::new()
            .with_file(file.path())
            .unwrap()
            .load()
            .unwrap();

        assert_eq!(config.allow_origin, "https://app.example.com");
        assert_eq!(config.internal_error_status, 503);
        assert_eq!(config.extra_headers["Cache-Control"], "no-store");
        assert_eq!(config.logging.level, "warn");
        assert!(!config.logging.json);
        assert_eq!(config.fallback_status, 502);
    }

    #[test]
    fn test_loader_with_json_file() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(file, r#"{{"echo_event": false}}"#).unwrap();

        let config = ConfigLoader::new()
            .with_file(file.path())
            .unwrap()
            .load()
            .unwrap();
        assert!(!config.echo_event);
    }

    #[test]
    fn test_loader_with_unknown_extension() {
        let file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();

        let result = ConfigLoader::new().with_file(file.path());
        assert!(matches!(result, Err(ConfigError::UnsupportedFormat { .. })));
    }

    #[test]
    fn test_loader_with_unknown_field_in_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "cors_origin = \"*\"").unwrap();

        let result = ConfigLoader::new().with_file(file.path());
        assert!(matches!(result, Err(ConfigError::TomlError(_))));
    }

    #[test]
    fn test_loader_with_file_not_found() {
        let result = ConfigLoader::new().with_file("/nonexistent/hermes.toml");
        assert!(matches!(result, Err(ConfigError::FileNotFound { .. })));
    }

    #[test]
    fn test_loader_with_optional_file_not_found() {
        let config = ConfigLoader::new()
            .with_optional_file("/nonexistent/hermes.toml")
            .unwrap()
            .load()
            .unwrap();

        assert_eq!(config, HermesConfig::default());
    }

    #[test]
    fn test_load_validates() {
        let result = ConfigLoader::new()
            .with_string("fallback_status = 42", "toml")
            .unwrap()
            .load();
        assert!(matches!(result, Err(ConfigError::InvalidValue { .. })));
    }

    #[test]
    fn test_load_unvalidated() {
        let config = ConfigLoader::new()
            .with_string("fallback_status = 42", "toml")
            .unwrap()
            .load_unvalidated();
        assert_eq!(config.fallback_status, 42);
    }

    #[test]
    fn test_apply_env_var_strings() {
        let mut loader = ConfigLoader::new();
        loader
            .apply_env_var("TEST_ALLOW_ORIGIN", "https://a.example", "TEST")
            .unwrap();
        loader.apply_env_var("TEST_LOG_LEVEL", "debug", "TEST").unwrap();
        assert_eq!(loader.config.allow_origin, "https://a.example");
        assert_eq!(loader.config.logging.level, "debug");
    }

    #[test]
    fn test_apply_env_var_booleans() {
        let mut loader = ConfigLoader::new();
        loader.apply_env_var("TEST_ALLOW_CREDENTIALS", "off", "TEST").unwrap();
        loader.apply_env_var("TEST_ECHO_EVENT", "0", "TEST").unwrap();
        loader.apply_env_var("TEST_LOG_JSON", "False", "TEST").unwrap();
        assert!(!loader.config.allow_credentials);
        assert!(!loader.config.echo_event);
        assert!(!loader.config.logging.json);
    }

    #[test]
    fn test_apply_env_var_statuses() {
        let mut loader = ConfigLoader::new();
        loader.apply_env_var("TEST_FALLBACK_STATUS", "500", "TEST").unwrap();
        loader
            .apply_env_var("TEST_INTERNAL_ERROR_STATUS", " 503 ", "TEST")
            .unwrap();
        assert_eq!(loader.config.fallback_status, 500);
        assert_eq!(loader.config.internal_error_status, 503);
    }

    #[test]
    fn test_apply_env_var_invalid_values() {
        let mut loader = ConfigLoader::new();
        let err = loader
            .apply_env_var("TEST_FALLBACK_STATUS", "bad-gateway", "TEST")
            .unwrap_err();
        assert!(err.to_string().contains("TEST_FALLBACK_STATUS"));

        let err = loader.apply_env_var("TEST_ECHO_EVENT", "maybe", "TEST").unwrap_err();
        assert!(matches!(err, ConfigError::EnvError { .. }));
    }

    #[test]
    fn test_apply_env_var_ignores_unrelated() {
        let mut loader = ConfigLoader::new();
        loader.apply_env_var("TEST_SOMETHING_ELSE", "x", "TEST").unwrap();
        assert_eq!(loader.config, HermesConfig::default());
    }

    #[test]
    fn test_parse_bool() {
        for truthy in ["true", "TRUE", "1", "yes", "on"] {
            assert!(parse_bool("K", truthy).unwrap());
        }
        for falsy in ["false", "False", "0", "no", "off"] {
            assert!(!parse_bool("K", falsy).unwrap());
        }
        assert!(parse_bool("K", "").is_err());
    }
}
