//! Scripted executors.

use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::Mutex;
use rgate_runner::{
    ExecutionOutcome, ExecutorError, TemplateExecution, TestExecutor, WorkflowExecution,
    WorkflowExecutor,
};

/// Template executor returning one scripted answer and recording each call.
#[derive(Debug)]
pub struct ScriptedTestExecutor {
    answer: Result<ExecutionOutcome, ExecutorError>,
    calls: Mutex<Vec<TemplateExecution>>,
}

impl ScriptedTestExecutor {
    #[must_use]
    pub fn returning(outcome: ExecutionOutcome) -> Self {
        Self {
            answer: Ok(outcome),
            calls: Mutex::new(Vec::new()),
        }
    }

    #[must_use]
    pub fn failing(error: ExecutorError) -> Self {
        Self {
            answer: Err(error),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Every execution received, in call order.
    #[must_use]
    pub fn calls(&self) -> Vec<TemplateExecution> {
        self.calls.lock().clone()
    }

    #[must_use]
    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }
}

#[async_trait]
impl TestExecutor for ScriptedTestExecutor {
    async fn run_templates(
        &self,
        execution: &TemplateExecution,
    ) -> Result<ExecutionOutcome, ExecutorError> {
        self.calls.lock().push(execution.clone());
        self.answer.clone()
    }
}

/// Workflow executor with a per-workflow script.
///
/// Workflows without a scripted answer report zero findings.
#[derive(Debug, Default)]
pub struct ScriptedWorkflowExecutor {
    answers: HashMap<String, Result<ExecutionOutcome, ExecutorError>>,
    calls: Mutex<Vec<WorkflowExecution>>,
}

impl ScriptedWorkflowExecutor {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_outcome(mut self, workflow_id: impl Into<String>, outcome: ExecutionOutcome) -> Self {
        self.answers.insert(workflow_id.into(), Ok(outcome));
        self
    }

    #[must_use]
    pub fn with_error(mut self, workflow_id: impl Into<String>, error: ExecutorError) -> Self {
        self.answers.insert(workflow_id.into(), Err(error));
        self
    }

    #[must_use]
    pub fn calls(&self) -> Vec<WorkflowExecution> {
        self.calls.lock().clone()
    }

    /// Workflow ids in the order they were executed.
    #[must_use]
    pub fn executed_workflows(&self) -> Vec<String> {
        self.calls
            .lock()
            .iter()
            .map(|c| c.workflow_id.clone())
            .collect()
    }
}

#[async_trait]
impl WorkflowExecutor for ScriptedWorkflowExecutor {
    async fn run_workflow(
        &self,
        execution: &WorkflowExecution,
    ) -> Result<ExecutionOutcome, ExecutorError> {
        self.calls.lock().push(execution.clone());
        self.answers
            .get(&execution.workflow_id)
            .cloned()
            .unwrap_or_else(|| Ok(ExecutionOutcome::findings(0)))
    }
}
