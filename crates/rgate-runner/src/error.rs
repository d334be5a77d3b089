//! Error types for gate runs.

use std::path::PathBuf;

use rgate_core::{GateExitCode, PolicyError};
use rgate_store::StoreError;
use thiserror::Error;

/// Errors raised by a test or workflow executor.
///
/// These are infrastructure failures. A test that ran and found problems,
/// or that reported `has_execution_error`, is an `Ok` outcome.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExecutorError {
    #[error("no recorded outcome for workflow {0}")]
    UnknownWorkflow(String),

    #[error("no recorded outcome for the template batch")]
    NoTemplateOutcome,

    #[error("executor unavailable: {0}")]
    Unavailable(String),
}

/// Errors from [`GateRunner::run`](crate::GateRunner::run).
#[derive(Debug, Error)]
pub enum GateRunError {
    #[error("at least one template id or workflow id is required")]
    NoTargets,

    #[error("gate policy not found: {0}")]
    PolicyNotFound(String),

    #[error("gate policy is disabled: {0}")]
    PolicyDisabled(String),

    #[error("gate policy {policy_id} is invalid: {source}")]
    InvalidPolicy {
        policy_id: String,
        #[source]
        source: PolicyError,
    },

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Executor(#[from] ExecutorError),

    /// The run row exists and has been marked `failed`.
    #[error("security run {run_id} aborted: {source}")]
    Aborted {
        run_id: String,
        #[source]
        source: Box<GateRunError>,
    },
}

impl GateRunError {
    /// Every orchestration failure maps to the orchestration exit code.
    #[must_use]
    pub const fn exit_code(&self) -> GateExitCode {
        GateExitCode::OrchestrationFailure
    }

    /// Id of the persisted run, if one was created before the failure.
    #[must_use]
    pub fn run_id(&self) -> Option<&str> {
        match self {
            Self::Aborted { run_id, .. } => Some(run_id),
            _ => None,
        }
    }
}

/// Errors loading a [`GateConfig`](crate::GateConfig).
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
}
