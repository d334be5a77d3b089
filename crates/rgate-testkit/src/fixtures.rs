//! Test fixtures for gate runs.
//!
//! Provides pre-built test data and factory functions.

use rgate_core::{
    Account, CombineOperator, DropContext, GateAction, GatePolicy, SourceType, ThresholdOperator,
    ThresholdRule,
};
use rgate_runner::GateRunRequest;

// ─────────────────────────────────────────────────────────────────────────────
// Account Fixtures
// ─────────────────────────────────────────────────────────────────────────────

/// An account with the given string fields.
#[must_use]
pub fn account(id: &str, fields: &[(&str, &str)]) -> Account {
    fields
        .iter()
        .fold(Account::new(id, id), |acc, (key, value)| {
            acc.with_field(*key, *value)
        })
}

/// Three accounts: one with only `user_id`, one with only `org_id`, one with
/// both.
#[must_use]
pub fn split_field_accounts() -> Vec<Account> {
    vec![
        account("a1", &[("user_id", "u-1")]),
        account("a2", &[("org_id", "o-2")]),
        account("a3", &[("user_id", "u-3"), ("org_id", "o-3")]),
    ]
}

// ─────────────────────────────────────────────────────────────────────────────
// Policy Fixtures
// ─────────────────────────────────────────────────────────────────────────────

/// `>= threshold` blocks, anything else passes.
#[must_use]
pub fn block_at(threshold: f64) -> Vec<ThresholdRule> {
    vec![ThresholdRule::new(
        ThresholdOperator::Gte,
        threshold,
        GateAction::Block,
    )]
}

/// A stored policy weighting both origins equally.
#[must_use]
pub fn balanced_policy(id: &str, combine_operator: CombineOperator) -> GatePolicy {
    GatePolicy {
        id: id.to_string(),
        name: format!("{id} (balanced)"),
        is_enabled: true,
        weight_test: 100,
        weight_workflow: 100,
        combine_operator,
        rules_test: block_at(1.0),
        rules_workflow: block_at(1.0),
    }
}

/// A disabled copy of [`GatePolicy::default_policy`].
#[must_use]
pub fn disabled_policy(id: &str) -> GatePolicy {
    GatePolicy {
        id: id.to_string(),
        is_enabled: false,
        ..GatePolicy::default_policy()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Request Fixtures
// ─────────────────────────────────────────────────────────────────────────────

/// A request for a template batch only.
#[must_use]
pub fn templates_request(template_ids: &[&str]) -> GateRunRequest {
    GateRunRequest {
        template_ids: template_ids.iter().map(|s| (*s).to_string()).collect(),
        account_ids: vec!["a1".to_string(), "a2".to_string()],
        ..GateRunRequest::default()
    }
}

/// A request for workflows only.
#[must_use]
pub fn workflows_request(workflow_ids: &[&str]) -> GateRunRequest {
    GateRunRequest {
        workflow_ids: workflow_ids.iter().map(|s| (*s).to_string()).collect(),
        ..GateRunRequest::default()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Drop Context Fixtures
// ─────────────────────────────────────────────────────────────────────────────

/// A test-run context for `method path`.
#[must_use]
pub fn context(method: &str, path: &str) -> DropContext {
    DropContext {
        method: method.to_string(),
        path: path.to_string(),
        request_raw: format!("{method} {path} HTTP/1.1\r\nHost: api.internal\r\n\r\n"),
        template_id: None,
        workflow_id: None,
        source_type: SourceType::TestRun,
    }
}
