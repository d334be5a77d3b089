//! Structured logging with JSON output and sensitive data redaction.

use serde_json::Value;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use crate::{TelemetryConfig, TelemetryError};

/// Keys always treated as sensitive, matched case-insensitively as substrings.
pub const DEFAULT_REDACT_FIELDS: &[&str] = &[
    "password",
    "api_key",
    "secret",
    "token",
    "authorization",
    "cookie",
];

const REDACTED: &str = "[REDACTED]";

/// Install the global subscriber.
///
/// `RUST_LOG` wins over `config.log_level` when set. Output goes to stderr.
///
/// # Errors
///
/// Returns an error if the level is not a valid filter or a global
/// subscriber is already installed.
pub fn init_logging(config: &TelemetryConfig) -> Result<(), TelemetryError> {
    let env_filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&config.log_level).map_err(|e| {
            TelemetryError::InvalidFilter {
                filter: config.log_level.clone(),
                reason: e.to_string(),
            }
        })?,
    };

    let subscriber = tracing_subscriber::registry().with(env_filter);

    if config.json_logs {
        let json_layer = fmt::layer()
            .json()
            .with_current_span(true)
            .with_span_list(true)
            .with_target(true)
            .with_writer(std::io::stderr);

        subscriber
            .with(json_layer)
            .try_init()
            .map_err(|e| TelemetryError::LoggingInit(e.to_string()))?;
    } else {
        let pretty_layer = fmt::layer()
            .with_ansi(false)
            .with_target(true)
            .with_writer(std::io::stderr);

        subscriber
            .with(pretty_layer)
            .try_init()
            .map_err(|e| TelemetryError::LoggingInit(e.to_string()))?;
    }

    tracing::debug!(service = %config.service_name, "logging initialized");
    Ok(())
}

/// Mask every object key containing one of `fields` (case-insensitive) with
/// `[REDACTED]`, at any depth. Arrays are walked element by element. Empty
/// field names are ignored.
#[must_use]
pub fn redact_sensitive(value: &Value, fields: &[String]) -> Value {
    let needles: Vec<String> = fields
        .iter()
        .filter(|field| !field.is_empty())
        .map(|field| field.to_ascii_lowercase())
        .collect();
    mask(value, &needles)
}

fn mask(value: &Value, needles: &[String]) -> Value {
    match value {
        Value::Object(map) => map
            .iter()
            .map(|(key, inner)| {
                let masked = if is_sensitive(key, needles) {
                    Value::from(REDACTED)
                } else {
                    mask(inner, needles)
                };
                (key.clone(), masked)
            })
            .collect(),
        Value::Array(items) => items.iter().map(|item| mask(item, needles)).collect(),
        scalar => scalar.clone(),
    }
}

fn is_sensitive(key: &str, needles: &[String]) -> bool {
    let key = key.to_ascii_lowercase();
    needles.iter().any(|needle| key.contains(needle.as_str()))
}
