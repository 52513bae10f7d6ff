//! QR check-in configuration.
//!
//! Layered configuration: defaults -> YAML file (if provided) -> environment
//! (`QR_CHECKIN__*`, `__` separates nested keys). CLI overrides are applied by
//! the binary on top of the loaded value.

use std::path::{Path, PathBuf};
use std::time::Duration;

use figment::Figment;
use figment::providers::{Env, Format, Serialized, Yaml};
use qr_checkin_sdk::Symbology;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

/// Environment variable prefix, e.g. `QR_CHECKIN__SERVICE__BASE_URL`.
pub const ENV_PREFIX: &str = "QR_CHECKIN__";

/// Default User-Agent string for lookup requests.
pub const DEFAULT_USER_AGENT: &str = concat!("qr-checkin/", env!("CARGO_PKG_VERSION"));

/// Configuration loading and validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file does not exist: {}", .0.display())]
    MissingFile(PathBuf),

    #[error("failed to load configuration: {0}")]
    Load(#[from] Box<figment::Error>),

    #[error("invalid configuration: {field}: {message}")]
    Invalid {
        field: &'static str,
        message: String,
    },

    #[error("failed to render configuration: {0}")]
    Render(String),
}

impl ConfigError {
    fn invalid(field: &'static str, message: impl Into<String>) -> Self {
        Self::Invalid {
            field,
            message: message.into(),
        }
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CheckinConfig {
    pub service: ServiceConfig,
    pub scanner: ScannerConfig,
    pub logging: LoggingConfig,
}

/// Remote lookup/validate service settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServiceConfig {
    /// Base URL; `users/{identifier}` is appended to it.
    pub base_url: Url,
    /// Sent as `x-api-key` when set.
    pub api_key: Option<String>,
    /// Request timeout in milliseconds.
    pub request_timeout_ms: u64,
    /// Connection timeout in milliseconds.
    pub connect_timeout_ms: u64,
    /// Maximum response body size in bytes.
    pub max_response_size_bytes: usize,
    pub user_agent: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_key: None,
            request_timeout_ms: 10_000,
            connect_timeout_ms: 5_000,
            max_response_size_bytes: 1_048_576, // 1 MiB
            user_agent: DEFAULT_USER_AGENT.to_owned(),
        }
    }
}

impl ServiceConfig {
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    #[must_use]
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }
}

#[allow(clippy::unwrap_used)]
fn default_base_url() -> Url {
    // Static literal, always parses.
    Url::parse("https://reqres.in/api/").unwrap()
}

/// Scanner settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ScannerConfig {
    pub symbology: Symbology,
}

/// Logging settings used by the binaries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingConfig {
    /// Default filter directive when `RUST_LOG` is not set.
    pub level: String,
    /// Emit JSON lines instead of human readable output.
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_owned(),
            json: false,
        }
    }
}

impl CheckinConfig {
    /// Build the layered figment without extracting it.
    ///
    /// # Errors
    /// Returns [`ConfigError::MissingFile`] if `path` is given but is not a file.
    pub fn figment(path: Option<&Path>) -> Result<Figment, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));
        if let Some(path) = path {
            if !path.is_file() {
                return Err(ConfigError::MissingFile(path.to_path_buf()));
            }
            figment = figment.merge(Yaml::file(path));
        }
        Ok(figment.merge(Env::prefixed(ENV_PREFIX).split("__")))
    }

    /// Load and validate the layered configuration.
    ///
    /// # Errors
    /// Returns an error if the file is missing, a layer fails to parse, or
    /// the merged value fails validation.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let config: Self = Self::figment(path)?.extract().map_err(Box::new)?;
        config.validate()?;
        Ok(config)
    }

    /// Check values serde cannot check.
    ///
    /// # Errors
    /// Returns [`ConfigError::Invalid`] naming the first offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let base_url = &self.service.base_url;
        if !matches!(base_url.scheme(), "http" | "https") {
            return Err(ConfigError::invalid(
                "service.base_url",
                format!("unsupported scheme '{}'", base_url.scheme()),
            ));
        }
        if base_url.cannot_be_a_base() {
            return Err(ConfigError::invalid(
                "service.base_url",
                "URL cannot carry path segments",
            ));
        }
        if self.service.request_timeout_ms == 0 {
            return Err(ConfigError::invalid(
                "service.request_timeout_ms",
                "must be greater than zero",
            ));
        }
        if self.service.connect_timeout_ms == 0 {
            return Err(ConfigError::invalid(
                "service.connect_timeout_ms",
                "must be greater than zero",
            ));
        }
        if self.service.max_response_size_bytes == 0 {
            return Err(ConfigError::invalid(
                "service.max_response_size_bytes",
                "must be greater than zero",
            ));
        }
        Ok(())
    }

    /// Render the effective configuration as YAML.
    ///
    /// # Errors
    /// Returns [`ConfigError::Render`] if serialization fails.
    pub fn to_yaml(&self) -> Result<String, ConfigError> {
        serde_saphyr::to_string(self).map_err(|e| ConfigError::Render(e.to_string()))
    }
}
