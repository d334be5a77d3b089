//! TOML configuration.
//!
//! ```toml
//! [telemetry]
//! log_level = "debug"
//! json_logs = true
//! redact_fields = ["x-session"]
//!
//! [runner]
//! default_environment_id = "staging"
//! redact_metadata = true
//! ```

use std::path::Path;

use rgate_telemetry::TelemetryConfig;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Top-level configuration file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GateConfig {
    pub telemetry: TelemetryConfig,
    pub runner: RunnerConfig,
}

/// Orchestrator settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunnerConfig {
    /// Environment used when a request names none.
    pub default_environment_id: Option<String>,
    /// Mask credentials in the request snapshot stored on the run.
    pub redact_metadata: bool,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            default_environment_id: None,
            redact_metadata: true,
        }
    }
}

impl GateConfig {
    /// Parse a TOML document.
    ///
    /// # Errors
    /// Returns [`ConfigError::Parse`] on malformed TOML or mistyped fields.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(s)?)
    }

    /// Read and parse a TOML file.
    ///
    /// # Errors
    /// Returns [`ConfigError::Read`] if the file cannot be read, or
    /// [`ConfigError::Parse`] if it is not valid config.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_is_default() {
        let config = GateConfig::from_toml_str("").unwrap();
        assert_eq!(config, GateConfig::default());
        assert!(config.runner.redact_metadata);
    }

    #[test]
    fn sections_override_defaults() {
        let config = GateConfig::from_toml_str(
            r#"
            [telemetry]
            log_level = "debug"
            redact_fields = ["x-session"]

            [runner]
            default_environment_id = "staging"
            redact_metadata = false
            "#,
        )
        .unwrap();

        assert_eq!(config.telemetry.log_level, "debug");
        assert_eq!(config.telemetry.service_name, "rgate");
        assert_eq!(config.telemetry.redact_fields, ["x-session"]);
        assert_eq!(config.runner.default_environment_id.as_deref(), Some("staging"));
        assert!(!config.runner.redact_metadata);
    }

    #[test]
    fn mistyped_field_is_a_parse_error() {
        let err = GateConfig::from_toml_str("[runner]\nredact_metadata = \"yes\"").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn missing_file_is_a_read_error() {
        let err = GateConfig::load("/nonexistent/rgate.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
