//! Executor collaborators.
//!
//! The gate never sends HTTP itself. Executors run the baseline and mutated
//! requests, compare responses, and hand back a finding count.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::ExecutorError;

/// A batched template execution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateExecution {
    pub test_run_id: String,
    pub security_run_id: String,
    pub template_ids: Vec<String>,
    pub account_ids: Vec<String>,
    pub environment_id: Option<String>,
}

/// A single workflow execution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowExecution {
    pub test_run_id: String,
    pub security_run_id: String,
    pub workflow_id: String,
    pub account_ids: Vec<String>,
    pub environment_id: Option<String>,
}

const fn default_success() -> bool {
    true
}

/// What an executor reports back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionOutcome {
    #[serde(default = "default_success")]
    pub success: bool,
    #[serde(default)]
    pub findings_count: u64,
    #[serde(default)]
    pub has_execution_error: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ExecutionOutcome {
    /// A clean execution that produced `count` findings.
    #[must_use]
    pub const fn findings(count: u64) -> Self {
        Self {
            success: true,
            findings_count: count,
            has_execution_error: false,
            error: None,
        }
    }

    /// An execution that failed part-way, keeping whatever it found.
    #[must_use]
    pub fn failed(findings_count: u64, error: impl Into<String>) -> Self {
        Self {
            success: false,
            findings_count,
            has_execution_error: true,
            error: Some(error.into()),
        }
    }

    /// Whether this outcome counts as an execution error for the gate.
    #[must_use]
    pub const fn is_error(&self) -> bool {
        self.has_execution_error || !self.success
    }
}

/// Runs a batch of templates.
#[async_trait]
pub trait TestExecutor: Send + Sync {
    /// # Errors
    /// Returns an error if the executor could not run at all.
    async fn run_templates(
        &self,
        execution: &TemplateExecution,
    ) -> Result<ExecutionOutcome, ExecutorError>;
}

/// Runs one workflow.
#[async_trait]
pub trait WorkflowExecutor: Send + Sync {
    /// # Errors
    /// Returns an error if the executor could not run at all.
    async fn run_workflow(
        &self,
        execution: &WorkflowExecution,
    ) -> Result<ExecutionOutcome, ExecutorError>;
}
