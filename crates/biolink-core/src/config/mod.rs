//! Broker configuration
//!
//! Configuration is layered: built-in defaults, then an optional TOML file,
//! then `BIOLINK_*` environment variables. Every layer is validated together
//! once merging is done.

pub mod validation;

use crate::BiolinkError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
pub use validation::{ConfigValidator, ValidationError, ValidationResult};

/// Prefix for environment overrides (`BIOLINK_DEFAULT_TIMEOUT_MS`, ...)
pub const ENV_PREFIX: &str = "BIOLINK_";

/// Smallest accepted prompt timeout
pub const MIN_TIMEOUT_MS: u64 = 1_000;

/// Largest accepted prompt timeout
pub const MAX_TIMEOUT_MS: u64 = 600_000;

const LOG_LEVELS: [&str; 5] = ["TRACE", "DEBUG", "INFO", "WARN", "ERROR"];

/// Configuration for a `BiolinkCore` instance
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BrokerConfig {
    /// Prompt timeout applied when the caller gives none; `None` leaves it to the platform
    pub default_timeout_ms: Option<u64>,
    /// Title shown on the biometric prompt
    pub prompt_title: String,
    /// Subtitle shown on the biometric prompt
    pub prompt_subtitle: String,
    /// Negative-button label
    pub cancel_button_text: String,
    /// Allow the device credential as a fallback unless the caller says otherwise
    pub fallback_to_device_credential: bool,
    /// Log filter used by binaries embedding the broker
    pub log_level: String,
    /// Directory for the encrypted secret store
    pub secret_dir: Option<PathBuf>,
}

impl Default for BrokerConfig {
    fn default() -> Self {
        Self {
            default_timeout_ms: None,
            prompt_title: "Authentication Required".to_string(),
            prompt_subtitle: "Authenticate to continue".to_string(),
            cancel_button_text: "Cancel".to_string(),
            fallback_to_device_credential: false,
            log_level: "info".to_string(),
            secret_dir: None,
        }
    }
}

impl BrokerConfig {
    /// Load configuration from a TOML file; missing fields take their defaults
    pub fn load_from_file(path: &Path) -> Result<Self, BiolinkError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            BiolinkError::config(format!(
                "Failed to read config file {}: {e}",
                path.display()
            ))
        })?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self, BiolinkError> {
        Ok(toml::from_str(content)?)
    }

    /// Load from `path` when it exists, otherwise start from defaults
    pub fn load_or_default(path: &Path) -> Result<Self, BiolinkError> {
        if path.exists() {
            Self::load_from_file(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Merge `BIOLINK_*` variables from the process environment
    pub fn merge_with_env(&mut self) -> Result<(), BiolinkError> {
        self.merge_with_vars(std::env::vars())
    }

    /// Merge `BIOLINK_*` entries from an explicit variable list
    pub fn merge_with_vars<I, K, V>(&mut self, vars: I) -> Result<(), BiolinkError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        for (key, value) in vars {
            if let Some(field) = key.as_ref().strip_prefix(ENV_PREFIX) {
                let field = field.to_ascii_lowercase();
                // Variables for other components share the prefix
                if Self::is_known_field(&field) {
                    self.set_from_string(&field, value.as_ref())?;
                }
            }
        }
        Ok(())
    }

    fn is_known_field(field: &str) -> bool {
        matches!(
            field,
            "default_timeout_ms"
                | "prompt_title"
                | "prompt_subtitle"
                | "cancel_button_text"
                | "fallback_to_device_credential"
                | "log_level"
                | "secret_dir"
        )
    }

    /// Set a configuration value from a string (env vars, CLI overrides)
    pub fn set_from_string(&mut self, key: &str, value: &str) -> Result<(), BiolinkError> {
        match key {
            "default_timeout_ms" => {
                self.default_timeout_ms = if value.trim().is_empty() {
                    None
                } else {
                    Some(value.trim().parse().map_err(|e| {
                        BiolinkError::config(format!("default_timeout_ms: {e}"))
                    })?)
                };
            }
            "prompt_title" => self.prompt_title = value.to_string(),
            "prompt_subtitle" => self.prompt_subtitle = value.to_string(),
            "cancel_button_text" => self.cancel_button_text = value.to_string(),
            "fallback_to_device_credential" => {
                self.fallback_to_device_credential = value.trim().parse().map_err(|e| {
                    BiolinkError::config(format!("fallback_to_device_credential: {e}"))
                })?;
            }
            "log_level" => self.log_level = value.to_string(),
            "secret_dir" => self.secret_dir = Some(PathBuf::from(value)),
            other => {
                return Err(BiolinkError::config(format!(
                    "Unknown configuration key: {other}"
                )))
            }
        }
        Ok(())
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), BiolinkError> {
        let mut validator = ConfigValidator::new();
        if let Some(timeout_ms) = self.default_timeout_ms {
            validator.range(
                "default_timeout_ms",
                timeout_ms,
                Some(MIN_TIMEOUT_MS),
                Some(MAX_TIMEOUT_MS),
            );
        }
        validator
            .non_empty("prompt_title", &self.prompt_title)
            .non_empty("cancel_button_text", &self.cancel_button_text)
            .one_of("log_level", &self.log_level, &LOG_LEVELS);
        validator.result().map_err(Into::into)
    }

    /// Default prompt timeout as a `Duration`
    pub fn default_timeout(&self) -> Option<Duration> {
        self.default_timeout_ms.map(Duration::from_millis)
    }
}
