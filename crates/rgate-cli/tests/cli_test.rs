//! End-to-end tests for the `rgate` binary.

use std::fs;
use std::path::PathBuf;

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::{Value, json};
use tempfile::TempDir;

fn rgate_cmd() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_rgate"));
    // Suppress tracing output during tests
    cmd.env("RUST_LOG", "error");
    cmd
}

fn write_json(dir: &TempDir, name: &str, value: &Value) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, serde_json::to_string_pretty(value).unwrap()).unwrap();
    path
}

fn stdout_json(output: &std::process::Output) -> Value {
    serde_json::from_slice(&output.stdout).expect("stdout should be JSON")
}

// ─────────────────────────────────────────────────────────────────────────────
// evaluate
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn evaluate_default_policy_warns_on_three_findings() {
    rgate_cmd()
        .args(["evaluate", "--test-findings", "3"])
        .assert()
        .success()
        .stdout(predicate::str::contains("rule >= 1 -> WARN"))
        .stdout(predicate::str::contains("Gate: WARN (exit 0)"));
}

#[test]
fn evaluate_default_policy_blocks_on_seven_findings() {
    rgate_cmd()
        .args(["evaluate", "--test-findings", "7"])
        .assert()
        .code(1)
        .stdout(predicate::str::contains("Gate: BLOCK (exit 1)"));
}

#[test]
fn evaluate_execution_error_forces_block() {
    rgate_cmd()
        .args(["evaluate", "--execution-error"])
        .assert()
        .code(1)
        .stdout(predicate::str::contains("forced BLOCK (was PASS)"));
}

#[test]
fn evaluate_json_with_custom_and_policy() {
    let dir = TempDir::new().unwrap();
    let policy = write_json(
        &dir,
        "policy.json",
        &json!({
            "id": "both-origins",
            "weight_test": 100,
            "weight_workflow": 50,
            "combine_operator": "AND",
            "rules_test": [{"operator": ">=", "threshold": 1, "action": "BLOCK"}],
            "rules_workflow": [{"operator": ">=", "threshold": 2, "action": "BLOCK"}]
        }),
    );

    let output = rgate_cmd()
        .args(["evaluate", "--test-findings", "4", "--workflow-findings", "3", "--json"])
        .arg("--policy")
        .arg(&policy)
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(1));
    let calc = stdout_json(&output);
    assert_eq!(calc["workflow"]["score"], 2);
    assert_eq!(calc["combined_action"], "BLOCK");
    assert_eq!(calc["exit_code"], 1);
}

#[test]
fn evaluate_reads_policy_from_stdin() {
    rgate_cmd()
        .args(["evaluate", "--test-findings", "1", "--policy", "-"])
        .write_stdin(
            r#"{"id": "lenient", "weight_test": 100, "weight_workflow": 0,
                "rules_test": [{"operator": ">", "threshold": 10, "action": "BLOCK"}]}"#,
        )
        .assert()
        .success()
        .stdout(predicate::str::contains("no rule matched -> PASS"));
}

#[test]
fn evaluate_accepts_fractional_threshold() {
    rgate_cmd()
        .args(["evaluate", "--test-findings", "1", "--policy", "-"])
        .write_stdin(
            r#"{"id": "strict", "weight_test": 50, "weight_workflow": 0,
                "rules_test": [{"operator": ">", "threshold": 0.5, "action": "BLOCK"}]}"#,
        )
        .assert()
        .code(1)
        .stdout(predicate::str::contains("rule > 0.5 -> BLOCK"))
        .stdout(predicate::str::contains("Gate: BLOCK (exit 1)"));
}

#[test]
fn evaluate_rejects_out_of_range_weight() {
    rgate_cmd()
        .args(["evaluate", "--policy", "-"])
        .write_stdin(r#"{"id": "heavy", "weight_test": 150, "weight_workflow": 0}"#)
        .assert()
        .code(3)
        .stderr(predicate::str::contains("test weight 150 is out of range"));
}

#[test]
fn evaluate_rejects_malformed_policy() {
    rgate_cmd()
        .args(["evaluate", "--policy", "-"])
        .write_stdin("{not json")
        .assert()
        .code(3)
        .stderr(predicate::str::contains("failed to parse gate policy"));
}

// ─────────────────────────────────────────────────────────────────────────────
// drop-rules
// ─────────────────────────────────────────────────────────────────────────────

fn drop_rules(dir: &TempDir) -> PathBuf {
    write_json(
        dir,
        "rules.json",
        &json!([
            {"id": "everything", "name": "catch all", "priority": 2, "applies_to": "both"},
            {"id": "admin", "name": "admin area", "priority": 1,
             "match_type": "prefix", "match_path": "/admin"},
            {"id": "disabled", "name": "off", "priority": 0, "is_enabled": false}
        ]),
    )
}

fn drop_context(dir: &TempDir, path: &str) -> PathBuf {
    write_json(
        dir,
        "context.json",
        &json!({"method": "GET", "path": path, "source_type": "test_run"}),
    )
}

#[test]
fn drop_rules_check_lowest_priority_wins() {
    let dir = TempDir::new().unwrap();
    let rules = drop_rules(&dir);
    let context = drop_context(&dir, "/admin/x");

    rgate_cmd()
        .args(["drop-rules", "check"])
        .arg("--rules")
        .arg(&rules)
        .arg("--context")
        .arg(&context)
        .assert()
        .success()
        .stdout(predicate::str::contains("dropped by rule admin (admin area)"));
}

#[test]
fn drop_rules_check_json_falls_through_to_catch_all() {
    let dir = TempDir::new().unwrap();
    let rules = drop_rules(&dir);
    let context = drop_context(&dir, "/other");

    let output = rgate_cmd()
        .args(["drop-rules", "check", "--json"])
        .arg("--rules")
        .arg(&rules)
        .arg("--context")
        .arg(&context)
        .output()
        .unwrap();

    assert!(output.status.success());
    let decision = stdout_json(&output);
    assert_eq!(decision["dropped"], true);
    assert_eq!(decision["rule_id"], "everything");
}

#[test]
fn drop_rules_preview_regex() {
    let dir = TempDir::new().unwrap();
    let rule = write_json(
        &dir,
        "rule.json",
        &json!({"match_type": "regex", "match_path": "^/users/\\d+$", "match_method": "DELETE"}),
    );

    let matching = write_json(
        &dir,
        "delete.json",
        &json!({"method": "DELETE", "path": "/users/42", "source_type": "workflow"}),
    );
    rgate_cmd()
        .args(["drop-rules", "preview"])
        .arg("--rule")
        .arg(&rule)
        .arg("--context")
        .arg(&matching)
        .assert()
        .success()
        .stdout(predicate::str::diff("match\n"));

    let other_method = write_json(
        &dir,
        "get.json",
        &json!({"method": "GET", "path": "/users/42", "source_type": "workflow"}),
    );
    rgate_cmd()
        .args(["drop-rules", "preview"])
        .arg("--rule")
        .arg(&rule)
        .arg("--context")
        .arg(&other_method)
        .assert()
        .success()
        .stdout(predicate::str::diff("no match\n"));
}

#[test]
fn drop_rules_preview_rejects_bad_regex() {
    let dir = TempDir::new().unwrap();
    let rule = write_json(
        &dir,
        "rule.json",
        &json!({"name": "broken", "match_type": "regex", "match_path": "(unclosed"}),
    );
    let context = drop_context(&dir, "/x");

    rgate_cmd()
        .args(["drop-rules", "preview"])
        .arg("--rule")
        .arg(&rule)
        .arg("--context")
        .arg(&context)
        .assert()
        .code(3)
        .stderr(predicate::str::contains("invalid regex pattern"));
}

// ─────────────────────────────────────────────────────────────────────────────
// roles
// ─────────────────────────────────────────────────────────────────────────────

fn roles_input(strategy: &str, attacker: Option<&str>) -> Value {
    json!({
        "strategy": strategy,
        "attacker_account_id": attacker,
        "accounts": [
            {"id": "a1", "name": "alice", "fields": {"A": "x"}},
            {"id": "a2", "name": "bob", "fields": {"B": "y"}},
            {"id": "a3", "name": "carol", "fields": {"A": "x", "B": "y"}}
        ],
        "variables": [
            {"name": "var_a", "data_source": "account_field", "account_field_name": "A"},
            {"name": "var_b", "data_source": "account_field", "account_field_name": "B",
             "is_attacker_field": true}
        ]
    })
}

#[test]
fn roles_validate_per_account_keeps_the_complete_account() {
    let dir = TempDir::new().unwrap();
    let input = write_json(&dir, "roles.json", &roles_input("per_account", None));

    let output = rgate_cmd()
        .args(["roles", "validate", "--json"])
        .arg("--input")
        .arg(&input)
        .output()
        .unwrap();

    assert!(output.status.success());
    let plan = stdout_json(&output);
    assert_eq!(plan["valid"], true);
    assert_eq!(plan["filtered_accounts"][0]["id"], "a3");
    assert_eq!(plan["filtered_accounts"].as_array().unwrap().len(), 1);
}

#[test]
fn roles_validate_anchor_attacker_missing_field_exits_one() {
    let dir = TempDir::new().unwrap();
    let input = write_json(&dir, "roles.json", &roles_input("anchor_attacker", Some("a1")));

    rgate_cmd()
        .args(["roles", "validate"])
        .arg("--input")
        .arg(&input)
        .assert()
        .code(1)
        .stdout(predicate::str::contains("invalid"))
        .stdout(predicate::str::contains("fatal: attacker account alice (a1)"));
}

// ─────────────────────────────────────────────────────────────────────────────
// run
// ─────────────────────────────────────────────────────────────────────────────

fn replay_plan(workflows: &Value) -> Value {
    json!({
        "request": {
            "template_ids": ["bola-orders"],
            "workflow_ids": ["checkout"],
            "metadata": {"commit": "abc123", "ci_token": "shh"}
        },
        "templates": {"findings_count": 6},
        "workflows": workflows
    })
}

#[test]
fn run_replays_plan_and_exits_with_gate_code() {
    let dir = TempDir::new().unwrap();
    let plan = write_json(&dir, "plan.json", &replay_plan(&json!({"checkout": {}})));

    let output = rgate_cmd()
        .args(["run", "--json"])
        .arg("--plan")
        .arg(&plan)
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(1));
    let result = stdout_json(&output);
    assert_eq!(result["status"], "completed");
    assert_eq!(result["gate_action"], "BLOCK");
    assert_eq!(result["policy_id"], "default");
    assert_eq!(result["test_run_ids"].as_array().unwrap().len(), 2);
}

#[test]
fn run_with_unrecorded_workflow_is_an_orchestration_failure() {
    let dir = TempDir::new().unwrap();
    let plan = write_json(&dir, "plan.json", &replay_plan(&json!({})));

    rgate_cmd()
        .args(["run"])
        .arg("--plan")
        .arg(&plan)
        .assert()
        .code(3)
        .stderr(predicate::str::contains("no recorded outcome for workflow checkout"));
}

#[test]
fn run_rejects_invalid_config() {
    let dir = TempDir::new().unwrap();
    let plan = write_json(&dir, "plan.json", &replay_plan(&json!({"checkout": {}})));
    let config = dir.path().join("rgate.toml");
    fs::write(&config, "[runner]\nredact_metadata = \"sometimes\"\n").unwrap();

    rgate_cmd()
        .args(["run"])
        .arg("--plan")
        .arg(&plan)
        .arg("--config")
        .arg(&config)
        .assert()
        .code(3)
        .stderr(predicate::str::contains("failed to load config"));
}

#[test]
fn run_with_no_targets_fails() {
    rgate_cmd()
        .args(["run", "--plan", "-"])
        .write_stdin(r#"{"request": {}}"#)
        .assert()
        .code(3)
        .stderr(predicate::str::contains("at least one template id or workflow id"));
}
