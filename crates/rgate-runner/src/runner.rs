//! Gate run orchestration.
//!
//! One call to [`GateRunner::run`] creates one `SecurityRun`, drives the
//! executors, evaluates the gate, and writes the run exactly once more.

use std::sync::Arc;

use chrono::Utc;
use rgate_core::{
    GateAction, GateCalculation, GateExitCode, GatePolicy, RunStatus, SecurityRun, TestRun,
    TestRunTarget, evaluate_gate,
};
use rgate_store::DataStore;
use rgate_telemetry::{TelemetryConfig, redact_sensitive};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::{GateConfig, RunnerConfig};
use crate::error::GateRunError;
use crate::executor::{
    ExecutionOutcome, TemplateExecution, TestExecutor, WorkflowExecution, WorkflowExecutor,
};

// ─────────────────────────────────────────────────────────────────────────────
// Request / Result
// ─────────────────────────────────────────────────────────────────────────────

/// Input to one gate run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GateRunRequest {
    /// Stored policy to apply; the default policy when absent.
    pub policy_id: Option<String>,
    /// Templates, executed together as one test run.
    pub template_ids: Vec<String>,
    /// Workflows, each executed as its own test run in order.
    pub workflow_ids: Vec<String>,
    pub account_ids: Vec<String>,
    pub environment_id: Option<String>,
    /// Caller context (CI job, commit, ...) stored on the run.
    pub metadata: Option<serde_json::Value>,
}

/// Outcome of a completed gate run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GateRunResult {
    pub security_run_id: String,
    pub status: RunStatus,
    pub policy_id: String,
    pub gate_action: GateAction,
    pub exit_code: GateExitCode,
    pub test_findings: u64,
    pub workflow_findings: u64,
    pub gate_score: u64,
    pub test_run_ids: Vec<String>,
    pub errors: Vec<String>,
    pub calculation: GateCalculation,
}

/// Accumulated executor results.
#[derive(Debug, Default)]
struct Tally {
    test_findings: u64,
    workflow_findings: u64,
    has_error: bool,
    errors: Vec<String>,
    test_run_ids: Vec<String>,
}

impl Tally {
    fn record(&mut self, test_run_id: &str, label: &str, outcome: &ExecutionOutcome) {
        self.test_run_ids.push(test_run_id.to_string());
        if outcome.is_error() {
            self.has_error = true;
            let message = outcome.error.as_deref().unwrap_or("execution failed");
            tracing::warn!(
                test_run_id = %test_run_id,
                target = %label,
                error = %message,
                "executor reported an error"
            );
            self.errors.push(format!("{label}: {message}"));
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Runner
// ─────────────────────────────────────────────────────────────────────────────

/// Coordinates policy resolution, execution, evaluation and persistence.
pub struct GateRunner {
    store: Arc<dyn DataStore>,
    test_executor: Arc<dyn TestExecutor>,
    workflow_executor: Arc<dyn WorkflowExecutor>,
    config: RunnerConfig,
    redact_fields: Vec<String>,
}

impl GateRunner {
    #[must_use]
    pub fn new(
        store: Arc<dyn DataStore>,
        test_executor: Arc<dyn TestExecutor>,
        workflow_executor: Arc<dyn WorkflowExecutor>,
    ) -> Self {
        Self {
            store,
            test_executor,
            workflow_executor,
            config: RunnerConfig::default(),
            redact_fields: TelemetryConfig::default().effective_redact_fields(),
        }
    }

    /// Apply runner settings and the configured redaction fields.
    #[must_use]
    pub fn with_config(mut self, config: &GateConfig) -> Self {
        self.config = config.runner.clone();
        self.redact_fields = config.telemetry.effective_redact_fields();
        self
    }

    /// Execute a gate run.
    ///
    /// # Errors
    /// Input errors (`NoTargets`, policy lookup) are returned before any run
    /// is persisted. Any failure after that marks the run `failed` with exit
    /// code 3 and a `BLOCK` verdict, and is returned as
    /// [`GateRunError::Aborted`].
    pub async fn run(&self, request: GateRunRequest) -> Result<GateRunResult, GateRunError> {
        if request.template_ids.is_empty() && request.workflow_ids.is_empty() {
            return Err(GateRunError::NoTargets);
        }

        let policy = self.resolve_policy(request.policy_id.as_deref()).await?;
        for warning in policy.lint() {
            tracing::warn!(policy_id = %policy.id, warning = %warning, "gate policy lint");
        }

        let environment_id = request
            .environment_id
            .clone()
            .or_else(|| self.config.default_environment_id.clone());

        let run = SecurityRun::started(
            Uuid::new_v4().to_string(),
            Some(policy.id.clone()),
            self.snapshot(&request, environment_id.as_deref()),
        );
        let run = self.store.security_runs().create(run).await?;
        tracing::info!(
            security_run_id = %run.id,
            policy_id = %policy.id,
            templates = request.template_ids.len(),
            workflows = request.workflow_ids.len(),
            "security run started"
        );

        match self
            .drive(&run, &policy, &request, environment_id.as_deref())
            .await
        {
            Ok(result) => Ok(result),
            Err(err) => Err(self.abort(run, err).await),
        }
    }

    /// The `limit` most recently created runs, newest first.
    ///
    /// # Errors
    /// Returns a store error if the runs cannot be read.
    pub async fn recent_runs(&self, limit: usize) -> Result<Vec<SecurityRun>, GateRunError> {
        let mut runs = self.store.security_runs().find_all().await?;
        runs.reverse();
        runs.truncate(limit);
        Ok(runs)
    }

    async fn resolve_policy(&self, policy_id: Option<&str>) -> Result<GatePolicy, GateRunError> {
        let Some(policy_id) = policy_id else {
            return Ok(GatePolicy::default_policy());
        };

        let policy = self
            .store
            .gate_policies()
            .find_by_id(policy_id)
            .await?
            .ok_or_else(|| GateRunError::PolicyNotFound(policy_id.to_string()))?;

        if !policy.is_enabled {
            return Err(GateRunError::PolicyDisabled(policy_id.to_string()));
        }
        policy
            .validate()
            .map_err(|source| GateRunError::InvalidPolicy {
                policy_id: policy_id.to_string(),
                source,
            })?;
        Ok(policy)
    }

    fn snapshot(&self, request: &GateRunRequest, environment_id: Option<&str>) -> serde_json::Value {
        let snapshot = serde_json::json!({
            "request": request,
            "environment_id": environment_id,
        });
        if self.config.redact_metadata {
            redact_sensitive(&snapshot, &self.redact_fields)
        } else {
            snapshot
        }
    }

    async fn drive(
        &self,
        run: &SecurityRun,
        policy: &GatePolicy,
        request: &GateRunRequest,
        environment_id: Option<&str>,
    ) -> Result<GateRunResult, GateRunError> {
        let tally = self.execute(&run.id, request, environment_id).await?;
        self.complete(run, policy, tally).await
    }

    async fn execute(
        &self,
        security_run_id: &str,
        request: &GateRunRequest,
        environment_id: Option<&str>,
    ) -> Result<Tally, GateRunError> {
        let mut tally = Tally::default();

        if !request.template_ids.is_empty() {
            let test_run = self
                .create_test_run(
                    security_run_id,
                    TestRunTarget::Templates {
                        template_ids: request.template_ids.clone(),
                    },
                    request,
                    environment_id,
                )
                .await?;
            let outcome = self
                .test_executor
                .run_templates(&TemplateExecution {
                    test_run_id: test_run.id.clone(),
                    security_run_id: security_run_id.to_string(),
                    template_ids: request.template_ids.clone(),
                    account_ids: request.account_ids.clone(),
                    environment_id: environment_id.map(str::to_string),
                })
                .await?;
            tracing::info!(
                security_run_id = %security_run_id,
                test_run_id = %test_run.id,
                findings = outcome.findings_count,
                "template batch executed"
            );
            tally.test_findings = tally.test_findings.saturating_add(outcome.findings_count);
            tally.record(&test_run.id, "templates", &outcome);
        }

        for workflow_id in &request.workflow_ids {
            let test_run = self
                .create_test_run(
                    security_run_id,
                    TestRunTarget::Workflow {
                        workflow_id: workflow_id.clone(),
                    },
                    request,
                    environment_id,
                )
                .await?;
            let outcome = self
                .workflow_executor
                .run_workflow(&WorkflowExecution {
                    test_run_id: test_run.id.clone(),
                    security_run_id: security_run_id.to_string(),
                    workflow_id: workflow_id.clone(),
                    account_ids: request.account_ids.clone(),
                    environment_id: environment_id.map(str::to_string),
                })
                .await?;
            tracing::info!(
                security_run_id = %security_run_id,
                test_run_id = %test_run.id,
                workflow_id = %workflow_id,
                findings = outcome.findings_count,
                "workflow executed"
            );
            tally.workflow_findings = tally
                .workflow_findings
                .saturating_add(outcome.findings_count);
            tally.record(&test_run.id, &format!("workflow {workflow_id}"), &outcome);
        }

        Ok(tally)
    }

    async fn create_test_run(
        &self,
        security_run_id: &str,
        target: TestRunTarget,
        request: &GateRunRequest,
        environment_id: Option<&str>,
    ) -> Result<TestRun, GateRunError> {
        let test_run = TestRun {
            id: Uuid::new_v4().to_string(),
            security_run_id: security_run_id.to_string(),
            target,
            account_ids: request.account_ids.clone(),
            environment_id: environment_id.map(str::to_string),
            created_at: Utc::now(),
        };
        Ok(self.store.test_runs().create(test_run).await?)
    }

    async fn complete(
        &self,
        run: &SecurityRun,
        policy: &GatePolicy,
        tally: Tally,
    ) -> Result<GateRunResult, GateRunError> {
        let calculation = evaluate_gate(
            tally.test_findings,
            tally.workflow_findings,
            policy,
            tally.has_error,
        );
        if calculation.forced_block {
            tracing::warn!(
                security_run_id = %run.id,
                combined = %calculation.combined_action,
                "execution errors forced the gate to BLOCK"
            );
        }

        let status = if tally.has_error {
            RunStatus::CompletedWithErrors
        } else {
            RunStatus::Completed
        };

        let mut finished = run.clone();
        finished.status = status;
        finished.exit_code = Some(calculation.exit_code);
        finished.gate_result = Some(calculation.final_action);
        finished.test_findings = tally.test_findings;
        finished.workflow_findings = tally.workflow_findings;
        finished.gate_score = calculation.total_score();
        finished.errors.clone_from(&tally.errors);
        finished.completed_at = Some(Utc::now());
        if let serde_json::Value::Object(metadata) = &mut finished.metadata {
            metadata.insert(
                "gate_calculation".to_string(),
                serde_json::to_value(&calculation).unwrap_or_default(),
            );
            metadata.insert(
                "policy".to_string(),
                serde_json::to_value(policy).unwrap_or_default(),
            );
        }
        self.store.security_runs().update(finished).await?;

        tracing::info!(
            security_run_id = %run.id,
            status = %status,
            action = %calculation.final_action,
            exit_code = calculation.exit_code.code(),
            test_findings = tally.test_findings,
            workflow_findings = tally.workflow_findings,
            "security run completed"
        );

        Ok(GateRunResult {
            security_run_id: run.id.clone(),
            status,
            policy_id: policy.id.clone(),
            gate_action: calculation.final_action,
            exit_code: calculation.exit_code,
            test_findings: tally.test_findings,
            workflow_findings: tally.workflow_findings,
            gate_score: calculation.total_score(),
            test_run_ids: tally.test_run_ids,
            errors: tally.errors,
            calculation,
        })
    }

    async fn abort(&self, mut run: SecurityRun, err: GateRunError) -> GateRunError {
        tracing::error!(security_run_id = %run.id, error = %err, "security run failed");

        run.status = RunStatus::Failed;
        run.exit_code = Some(GateExitCode::OrchestrationFailure);
        run.gate_result = Some(GateAction::Block);
        run.errors.push(err.to_string());
        run.completed_at = Some(Utc::now());

        let run_id = run.id.clone();
        if let Err(store_err) = self.store.security_runs().update(run).await {
            tracing::error!(
                security_run_id = %run_id,
                error = %store_err,
                "could not mark security run as failed"
            );
        }

        GateRunError::Aborted {
            run_id,
            source: Box::new(err),
        }
    }
}
