//! Offline replay of recorded executor outcomes.

use std::io::Write;

use rgate_core::{GateAction, RunStatus};
use rgate_runner::{ExecutorError, GateConfig, GateRunError, ReplayPlan, replay};
use rgate_testkit::init_test_tracing;

const PLAN: &str = r#"{
    "request": {
        "policy_id": "ci",
        "template_ids": ["idor-basic"],
        "workflow_ids": ["checkout", "refund"]
    },
    "policies": [{
        "id": "ci",
        "weight_test": 50,
        "weight_workflow": 100,
        "combine_operator": "AND",
        "rules_test": [{"operator": ">=", "threshold": 2, "action": "WARN"}],
        "rules_workflow": [{"operator": ">", "threshold": 0, "action": "BLOCK"}]
    }],
    "templates": {"findings_count": 3},
    "workflows": {
        "checkout": {"findings_count": 1},
        "refund": {"findings_count": 0}
    }
}"#;

#[tokio::test]
async fn recorded_plan_replays_through_stored_policy() {
    init_test_tracing();
    let plan: ReplayPlan = serde_json::from_str(PLAN).unwrap();

    let result = replay(plan, &GateConfig::default()).await.unwrap();

    // ceil(3 * 50 / 100) = 2 => WARN; workflows 1 => BLOCK; AND => WARN
    assert_eq!(result.calculation.test.score, Some(2));
    assert_eq!(result.calculation.test.action, GateAction::Warn);
    assert_eq!(result.calculation.workflow.action, GateAction::Block);
    assert_eq!(result.gate_action, GateAction::Warn);
    assert_eq!(result.exit_code.code(), 0);
    assert_eq!(result.status, RunStatus::Completed);
    assert_eq!(result.gate_score, 3);
}

#[tokio::test]
async fn unrecorded_workflow_aborts_the_run() {
    init_test_tracing();
    let mut plan: ReplayPlan = serde_json::from_str(PLAN).unwrap();
    plan.workflows.remove("refund");

    let err = replay(plan, &GateConfig::default()).await.unwrap_err();

    match err {
        GateRunError::Aborted { source, .. } => assert!(matches!(
            *source,
            GateRunError::Executor(ExecutorError::UnknownWorkflow(ref id)) if id == "refund"
        )),
        other => panic!("expected abort, got {other:?}"),
    }
}

#[tokio::test]
async fn missing_template_outcome_aborts_the_run() {
    init_test_tracing();
    let mut plan: ReplayPlan = serde_json::from_str(PLAN).unwrap();
    plan.templates = None;

    let err = replay(plan, &GateConfig::default()).await.unwrap_err();

    assert_eq!(err.exit_code().code(), 3);
    assert!(err.to_string().contains("template batch"));
}

#[test]
fn config_loads_from_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "[telemetry]\njson_logs = true\n\n[runner]\nredact_metadata = false").unwrap();

    let config = GateConfig::load(file.path()).unwrap();

    assert!(config.telemetry.json_logs);
    assert!(!config.runner.redact_metadata);
}
