//! Replay of recorded executor outcomes.
//!
//! CI jobs that already executed a batch can push the recorded counts
//! back through the gate without re-running any requests.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use rgate_core::GatePolicy;
use rgate_store::MemoryDataStore;
use serde::{Deserialize, Serialize};

use crate::config::GateConfig;
use crate::error::{ExecutorError, GateRunError};
use crate::executor::{
    ExecutionOutcome, TemplateExecution, TestExecutor, WorkflowExecution, WorkflowExecutor,
};
use crate::runner::{GateRunRequest, GateRunResult, GateRunner};

/// A recorded gate run: the request, the policies it may reference, and
/// what each executor reported.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReplayPlan {
    pub request: GateRunRequest,
    pub policies: Vec<GatePolicy>,
    pub templates: Option<ExecutionOutcome>,
    pub workflows: BTreeMap<String, ExecutionOutcome>,
}

/// Executor answering from a [`ReplayPlan`].
#[derive(Debug, Clone, Default)]
pub struct ReplayExecutor {
    templates: Option<ExecutionOutcome>,
    workflows: BTreeMap<String, ExecutionOutcome>,
}

impl ReplayExecutor {
    #[must_use]
    pub const fn new(
        templates: Option<ExecutionOutcome>,
        workflows: BTreeMap<String, ExecutionOutcome>,
    ) -> Self {
        Self {
            templates,
            workflows,
        }
    }

    #[must_use]
    pub fn from_plan(plan: &ReplayPlan) -> Self {
        Self::new(plan.templates.clone(), plan.workflows.clone())
    }
}

#[async_trait]
impl TestExecutor for ReplayExecutor {
    async fn run_templates(
        &self,
        execution: &TemplateExecution,
    ) -> Result<ExecutionOutcome, ExecutorError> {
        tracing::debug!(test_run_id = %execution.test_run_id, "replaying template batch");
        self.templates.clone().ok_or(ExecutorError::NoTemplateOutcome)
    }
}

#[async_trait]
impl WorkflowExecutor for ReplayExecutor {
    async fn run_workflow(
        &self,
        execution: &WorkflowExecution,
    ) -> Result<ExecutionOutcome, ExecutorError> {
        tracing::debug!(
            test_run_id = %execution.test_run_id,
            workflow_id = %execution.workflow_id,
            "replaying workflow"
        );
        self.workflows
            .get(&execution.workflow_id)
            .cloned()
            .ok_or_else(|| ExecutorError::UnknownWorkflow(execution.workflow_id.clone()))
    }
}

/// Run `plan` through the gate against a fresh in-memory store.
///
/// # Errors
/// Same as [`GateRunner::run`].
pub async fn replay(plan: ReplayPlan, config: &GateConfig) -> Result<GateRunResult, GateRunError> {
    let executor = Arc::new(ReplayExecutor::from_plan(&plan));
    let store = Arc::new(MemoryDataStore::new().with_policies(plan.policies));
    let runner = GateRunner::new(store, executor.clone(), executor).with_config(config);
    runner.run(plan.request).await
}
