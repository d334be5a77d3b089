//! Persisted run records.
//!
//! A [`SecurityRun`] is created once per gate invocation in the `running`
//! state and written exactly once more when the run completes or fails.
//! [`TestRun`]s are the per-execution records handed to the executors.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::gate::{GateAction, GateExitCode};

/// Lifecycle of a security run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Running,
    Completed,
    CompletedWithErrors,
    Failed,
}

impl RunStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Running => "running",
            Self::Completed => "completed",
            Self::CompletedWithErrors => "completed_with_errors",
            Self::Failed => "failed",
        }
    }

    #[must_use]
    pub const fn is_terminal(self) -> bool {
        !matches!(self, Self::Running)
    }
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One gate invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SecurityRun {
    pub id: String,
    pub status: RunStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub policy_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exit_code: Option<GateExitCode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gate_result: Option<GateAction>,
    #[serde(default)]
    pub test_findings: u64,
    #[serde(default)]
    pub workflow_findings: u64,
    #[serde(default)]
    pub gate_score: u64,
    #[serde(default)]
    pub errors: Vec<String>,
    /// Request snapshot plus, once finished, the full gate calculation.
    #[serde(default)]
    pub metadata: serde_json::Value,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

impl SecurityRun {
    /// A new run in the `running` state.
    #[must_use]
    pub fn started(
        id: impl Into<String>,
        policy_id: Option<String>,
        metadata: serde_json::Value,
    ) -> Self {
        Self {
            id: id.into(),
            status: RunStatus::Running,
            policy_id,
            exit_code: None,
            gate_result: None,
            test_findings: 0,
            workflow_findings: 0,
            gate_score: 0,
            errors: Vec::new(),
            metadata,
            created_at: Utc::now(),
            completed_at: None,
        }
    }
}

/// What a test run executes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TestRunTarget {
    /// All requested templates, batched into one run.
    Templates { template_ids: Vec<String> },
    /// A single workflow.
    Workflow { workflow_id: String },
}

/// One executor invocation within a security run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestRun {
    pub id: String,
    pub security_run_id: String,
    pub target: TestRunTarget,
    #[serde(default)]
    pub account_ids: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub environment_id: Option<String>,
    pub created_at: DateTime<Utc>,
}
