//! rgate telemetry - structured logging for gate runs.
//!
//! - **Structured logging**: JSON or pretty output on stderr, filtered by
//!   `RUST_LOG` or the configured level
//! - **Redaction**: masks credentials in request metadata before it is
//!   persisted or logged
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use rgate_telemetry::{TelemetryConfig, init_logging};
//!
//! init_logging(&TelemetryConfig::new("rgate").with_json_logs(false))?;
//! tracing::info!(security_run_id = "run-1", "gate run started");
//! ```

#![forbid(unsafe_code)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

mod logging;

pub use logging::*;

use serde::{Deserialize, Serialize};

/// Configuration for logging initialization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TelemetryConfig {
    /// Service name attached to the root span.
    pub service_name: String,

    /// Log level filter (e.g., "info", "debug", "trace").
    pub log_level: String,

    /// Enable JSON log output.
    pub json_logs: bool,

    /// Keys to redact in addition to [`DEFAULT_REDACT_FIELDS`].
    pub redact_fields: Vec<String>,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            service_name: "rgate".to_string(),
            log_level: "info".to_string(),
            json_logs: false,
            redact_fields: Vec::new(),
        }
    }
}

impl TelemetryConfig {
    /// Create a new configuration with the given service name.
    #[must_use]
    pub fn new(service_name: impl Into<String>) -> Self {
        Self {
            service_name: service_name.into(),
            ..Default::default()
        }
    }

    /// Set the log level.
    #[must_use]
    pub fn with_log_level(mut self, level: impl Into<String>) -> Self {
        self.log_level = level.into();
        self
    }

    /// Enable or disable JSON logs.
    #[must_use]
    pub const fn with_json_logs(mut self, enabled: bool) -> Self {
        self.json_logs = enabled;
        self
    }

    /// Add fields to redact from metadata.
    #[must_use]
    pub fn with_redact_fields(mut self, fields: Vec<String>) -> Self {
        self.redact_fields.extend(fields);
        self
    }

    /// Built-in sensitive keys followed by the configured extras.
    #[must_use]
    pub fn effective_redact_fields(&self) -> Vec<String> {
        DEFAULT_REDACT_FIELDS
            .iter()
            .map(|f| (*f).to_string())
            .chain(self.redact_fields.iter().cloned())
            .collect()
    }
}

/// Telemetry error type.
#[derive(Debug, thiserror::Error)]
pub enum TelemetryError {
    /// Failed to initialize logging.
    #[error("Failed to initialize logging: {0}")]
    LoggingInit(String),

    /// The configured level is not a valid filter directive.
    #[error("Invalid log filter '{filter}': {reason}")]
    InvalidFilter { filter: String, reason: String },
}
