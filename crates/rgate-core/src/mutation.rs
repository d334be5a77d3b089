//! Mutation-role preparation.
//!
//! Before a mutation test runs, every variable that is sourced from an
//! account field needs a pool of accounts able to supply it, and the chosen
//! [`MutationStrategy`] decides how those pools constrain each other:
//!
//! - `independent`: each variable draws from its own pool; no cross-variable
//!   constraint.
//! - `per_account`: one account must supply every variable at once.
//! - `anchor_attacker`: a fixed attacker supplies attacker variables, and the
//!   remaining accounts are victims that must jointly supply the rest.
//!
//! Coverage is always measured against each variable's own scoped pool so the
//! report reflects the raw account universe, not an already-narrowed set.
//! Coverage problems never raise; they land in [`ValidationReport`] as `fatal`
//! or `warn` entries and the caller decides whether to proceed.

use std::collections::{BTreeMap, HashSet};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::account::{Account, VariableConfig, VariableRole, resolve_account_pool};
use crate::error::ValidationError;

/// Coverage below this rate is reported as a warning.
pub const LOW_COVERAGE_THRESHOLD: f64 = 0.3;

// ─────────────────────────────────────────────────────────────────────────────
// Report Types
// ─────────────────────────────────────────────────────────────────────────────

/// Strategy governing which accounts may play attacker and victim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MutationStrategy {
    #[default]
    Independent,
    PerAccount,
    AnchorAttacker,
}

impl MutationStrategy {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Independent => "independent",
            Self::PerAccount => "per_account",
            Self::AnchorAttacker => "anchor_attacker",
        }
    }
}

impl fmt::Display for MutationStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-variable diagnostic severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Ok,
    Warn,
    Fatal,
}

impl Severity {
    /// `present == 0` is fatal, coverage under [`LOW_COVERAGE_THRESHOLD`] warns.
    #[must_use]
    pub fn classify(present: usize, coverage_rate: f64) -> Self {
        if present == 0 {
            Self::Fatal
        } else if coverage_rate < LOW_COVERAGE_THRESHOLD {
            Self::Warn
        } else {
            Self::Ok
        }
    }
}

/// Coverage diagnostics for one account-field variable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariableValidationResult {
    pub variable: String,
    pub field_key: String,
    pub role: VariableRole,
    pub pool_total: usize,
    pub present: usize,
    pub missing: usize,
    pub coverage_rate: f64,
    pub severity: Severity,
    pub message: String,
}

/// Diagnostic report produced by [`prepare_mutation_roles`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub strategy: MutationStrategy,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attacker_account_id: Option<String>,
    pub variables: Vec<VariableValidationResult>,
    pub fatal_errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl ValidationReport {
    fn new(strategy: MutationStrategy, attacker_account_id: Option<&str>) -> Self {
        Self {
            strategy,
            attacker_account_id: attacker_account_id.map(str::to_string),
            variables: Vec::new(),
            fatal_errors: Vec::new(),
            warnings: Vec::new(),
        }
    }

    fn record(&mut self, result: VariableValidationResult) {
        match result.severity {
            Severity::Fatal => self.fatal_errors.push(result.message.clone()),
            Severity::Warn => self.warnings.push(result.message.clone()),
            Severity::Ok => {}
        }
        self.variables.push(result);
    }

    /// Whether no fatal error was recorded.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.fatal_errors.is_empty()
    }
}

/// Outcome of role preparation: the usable accounts plus diagnostics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MutationPlan {
    pub valid: bool,
    pub report: ValidationReport,
    /// Accounts eligible to supply each variable, keyed by variable name.
    pub variable_pools: BTreeMap<String, Vec<Account>>,
    /// Accounts the run may use. For `anchor_attacker` the attacker is first.
    pub filtered_accounts: Vec<Account>,
}

impl MutationPlan {
    fn finish(
        report: ValidationReport,
        variable_pools: BTreeMap<String, Vec<Account>>,
        filtered_accounts: Vec<Account>,
    ) -> Self {
        tracing::debug!(
            strategy = %report.strategy,
            valid = report.is_valid(),
            fatal = report.fatal_errors.len(),
            warnings = report.warnings.len(),
            accounts = filtered_accounts.len(),
            "mutation roles prepared"
        );
        Self {
            valid: report.is_valid(),
            report,
            variable_pools,
            filtered_accounts,
        }
    }

    /// Pool for a variable by name.
    #[must_use]
    pub fn pool_for(&self, variable: &str) -> Option<&[Account]> {
        self.variable_pools.get(variable).map(Vec::as_slice)
    }

    /// The fixed attacker, when the plan was built with `anchor_attacker`.
    #[must_use]
    pub fn attacker(&self) -> Option<&Account> {
        if self.report.strategy != MutationStrategy::AnchorAttacker {
            return None;
        }
        self.filtered_accounts.first()
    }

    /// Filtered accounts usable in `role`.
    ///
    /// Only `anchor_attacker` separates roles; the other strategies return
    /// every filtered account for any role.
    #[must_use]
    pub fn accounts_for_role(&self, role: VariableRole) -> Vec<&Account> {
        if self.report.strategy != MutationStrategy::AnchorAttacker {
            return self.filtered_accounts.iter().collect();
        }
        match role {
            VariableRole::Attacker => self.filtered_accounts.iter().take(1).collect(),
            VariableRole::Victim => self.filtered_accounts.iter().skip(1).collect(),
            VariableRole::Neutral => self.filtered_accounts.iter().collect(),
        }
    }

    /// Convert an invalid plan into an error carrying its fatal messages.
    ///
    /// # Errors
    /// Returns [`ValidationError::Unsatisfiable`] when any fatal error was recorded.
    pub fn ensure_valid(&self) -> Result<(), ValidationError> {
        if self.valid {
            Ok(())
        } else {
            Err(ValidationError::Unsatisfiable {
                errors: self.report.fatal_errors.clone(),
            })
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Preparation
// ─────────────────────────────────────────────────────────────────────────────

/// A variable that takes part in role preparation.
struct FieldVariable<'a> {
    config: &'a VariableConfig,
    field: &'a str,
}

impl FieldVariable<'_> {
    fn base_pool(&self, accounts: &[Account]) -> Vec<Account> {
        resolve_account_pool(
            accounts,
            self.config.account_scope_mode,
            &self.config.account_scope_ids,
        )
    }
}

/// Compute per-variable account pools and the usable account set.
///
/// Only variables sourced from a non-empty account field participate. When
/// none do, the plan is valid, the report is empty, and every account is kept.
#[must_use]
pub fn prepare_mutation_roles(
    accounts: &[Account],
    variables: &[VariableConfig],
    strategy: MutationStrategy,
    attacker_account_id: Option<&str>,
) -> MutationPlan {
    let field_vars: Vec<FieldVariable<'_>> = variables
        .iter()
        .filter_map(|config| {
            config
                .account_field_key()
                .map(|field| FieldVariable { config, field })
        })
        .collect();

    let report = ValidationReport::new(strategy, attacker_account_id);
    if field_vars.is_empty() {
        return MutationPlan::finish(report, BTreeMap::new(), accounts.to_vec());
    }

    match strategy {
        MutationStrategy::Independent => prepare_independent(accounts, &field_vars, report),
        MutationStrategy::PerAccount => prepare_per_account(accounts, &field_vars, report),
        MutationStrategy::AnchorAttacker => {
            prepare_anchor_attacker(accounts, &field_vars, attacker_account_id, report)
        }
    }
}

fn prepare_independent(
    accounts: &[Account],
    field_vars: &[FieldVariable<'_>],
    mut report: ValidationReport,
) -> MutationPlan {
    let mut pools = BTreeMap::new();
    for var in field_vars {
        let base = var.base_pool(accounts);
        let present = present_accounts(&base, var.field);
        report.record(diagnose(var, base.len(), present.len()));
        pools.insert(var.config.name.clone(), present);
    }
    MutationPlan::finish(report, pools, accounts.to_vec())
}

fn prepare_per_account(
    accounts: &[Account],
    field_vars: &[FieldVariable<'_>],
    mut report: ValidationReport,
) -> MutationPlan {
    let mut base_pools = Vec::with_capacity(field_vars.len());
    let mut pools = BTreeMap::new();
    for var in field_vars {
        let base = var.base_pool(accounts);
        let present = present_accounts(&base, var.field);
        report.record(diagnose(var, base.len(), present.len()));
        pools.insert(var.config.name.clone(), present);
        base_pools.push(base);
    }

    let qualified: Vec<Account> = intersect_by_id(&base_pools)
        .into_iter()
        .filter(|account| field_vars.iter().all(|var| account.has_field(var.field)))
        .collect();

    if qualified.is_empty() {
        let fields: Vec<&str> = field_vars.iter().map(|var| var.field).collect();
        report.fatal_errors.push(format!(
            "no single account provides every required field ({})",
            fields.join(", ")
        ));
    } else {
        for pool in pools.values_mut() {
            pool.clone_from(&qualified);
        }
    }

    MutationPlan::finish(report, pools, qualified)
}

fn prepare_anchor_attacker(
    accounts: &[Account],
    field_vars: &[FieldVariable<'_>],
    attacker_account_id: Option<&str>,
    mut report: ValidationReport,
) -> MutationPlan {
    let attacker = match attacker_account_id {
        None => Err(ValidationError::MissingAttacker),
        Some(id) => accounts
            .iter()
            .find(|account| account.id == id)
            .ok_or_else(|| ValidationError::UnknownAttacker(id.to_string())),
    };
    let attacker = match attacker {
        Ok(attacker) => attacker,
        Err(err) => {
            report.fatal_errors.push(err.to_string());
            return MutationPlan::finish(report, BTreeMap::new(), Vec::new());
        }
    };

    let (attacker_vars, victim_vars): (Vec<_>, Vec<_>) = field_vars
        .iter()
        .partition(|var| var.config.effective_role() == VariableRole::Attacker);

    let mut pools = BTreeMap::new();
    for var in attacker_vars {
        let has = attacker.has_field(var.field);
        let mut result = diagnose(var, 1, usize::from(has));
        if has {
            pools.insert(var.config.name.clone(), vec![attacker.clone()]);
        } else {
            result.message = format!(
                "attacker account {} ({}) has no value for field {:?} required by variable {:?}",
                attacker.name, attacker.id, var.field, var.config.name
            );
            pools.insert(var.config.name.clone(), Vec::new());
        }
        report.record(result);
    }

    let non_attackers: Vec<Account> = accounts
        .iter()
        .filter(|account| account.id != attacker.id)
        .cloned()
        .collect();

    let mut present_lists = Vec::with_capacity(victim_vars.len());
    for var in &victim_vars {
        let base = var.base_pool(&non_attackers);
        let present = present_accounts(&base, var.field);
        report.record(diagnose(var, base.len(), present.len()));
        present_lists.push(present);
    }

    let victims = if victim_vars.is_empty() {
        non_attackers
    } else {
        intersect_by_id(&present_lists)
    };
    if !victim_vars.is_empty() && victims.is_empty() && report.is_valid() {
        report
            .warnings
            .push("no single victim account provides every victim field".to_string());
    }
    for var in &victim_vars {
        pools.insert(var.config.name.clone(), victims.clone());
    }

    let filtered = if report.is_valid() {
        std::iter::once(attacker.clone()).chain(victims).collect()
    } else {
        Vec::new()
    };
    MutationPlan::finish(report, pools, filtered)
}

// ─────────────────────────────────────────────────────────────────────────────
// Internal Helpers
// ─────────────────────────────────────────────────────────────────────────────

fn present_accounts(pool: &[Account], field: &str) -> Vec<Account> {
    pool.iter()
        .filter(|account| account.has_field(field))
        .cloned()
        .collect()
}

#[allow(clippy::cast_precision_loss)]
fn coverage_rate(present: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        present as f64 / total as f64
    }
}

fn diagnose(var: &FieldVariable<'_>, pool_total: usize, present: usize) -> VariableValidationResult {
    let rate = coverage_rate(present, pool_total);
    let severity = Severity::classify(present, rate);
    let name = &var.config.name;
    let field = var.field;
    let message = match severity {
        Severity::Fatal => format!(
            "variable {name:?}: no account in a pool of {pool_total} provides field {field:?}"
        ),
        Severity::Warn => format!(
            "variable {name:?}: low coverage for field {field:?} ({present}/{pool_total}, {:.0}%)",
            rate * 100.0
        ),
        Severity::Ok => format!("{present}/{pool_total} accounts provide field {field:?}"),
    };

    VariableValidationResult {
        variable: name.clone(),
        field_key: field.to_string(),
        role: var.config.effective_role(),
        pool_total,
        present,
        missing: pool_total - present,
        coverage_rate: rate,
        severity,
        message,
    }
}

/// Accounts of the first list whose id appears in every other list.
fn intersect_by_id(lists: &[Vec<Account>]) -> Vec<Account> {
    let Some((first, rest)) = lists.split_first() else {
        return Vec::new();
    };
    let rest_ids: Vec<HashSet<&str>> = rest
        .iter()
        .map(|list| list.iter().map(|account| account.id.as_str()).collect())
        .collect();

    first
        .iter()
        .filter(|account| rest_ids.iter().all(|ids| ids.contains(account.id.as_str())))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::account::{AccountScopeMode, DataSource};

    fn ids(accounts: &[Account]) -> Vec<&str> {
        accounts.iter().map(|a| a.id.as_str()).collect()
    }

    fn team() -> Vec<Account> {
        vec![
            Account::new("a1", "alice")
                .with_field("token", "t1")
                .with_field("user_id", "u1"),
            Account::new("a2", "bob").with_field("token", "t2"),
            Account::new("a3", "carol")
                .with_field("token", "t3")
                .with_field("user_id", "u3"),
            Account::new("a4", "dave").with_field("token", "t4"),
        ]
    }

    #[test]
    fn no_account_field_variables_is_a_noop() {
        let mut var = VariableConfig::account_field("q", "token");
        var.data_source = DataSource::Checklist;

        let plan = prepare_mutation_roles(&team(), &[var], MutationStrategy::PerAccount, None);
        assert!(plan.valid);
        assert!(plan.report.variables.is_empty());
        assert!(plan.variable_pools.is_empty());
        assert_eq!(plan.filtered_accounts, team());
    }

    #[test]
    fn independent_reduces_each_pool_but_keeps_all_accounts() {
        let vars = [
            VariableConfig::account_field("auth", "token"),
            VariableConfig::account_field("uid", "user_id"),
        ];
        let plan = prepare_mutation_roles(&team(), &vars, MutationStrategy::Independent, None);

        assert!(plan.valid);
        assert_eq!(ids(plan.pool_for("auth").unwrap()), ["a1", "a2", "a3", "a4"]);
        assert_eq!(ids(plan.pool_for("uid").unwrap()), ["a1", "a3"]);
        assert_eq!(plan.filtered_accounts.len(), 4);

        let uid = &plan.report.variables[1];
        assert_eq!(uid.present, 2);
        assert_eq!(uid.missing, 2);
        assert!((uid.coverage_rate - 0.5).abs() < f64::EPSILON);
        assert_eq!(uid.severity, Severity::Ok);
    }

    #[test]
    fn independent_is_fatal_when_a_variable_has_no_supplier() {
        let vars = [VariableConfig::account_field("sess", "session_cookie")];
        let plan = prepare_mutation_roles(&team(), &vars, MutationStrategy::Independent, None);

        assert!(!plan.valid);
        assert_eq!(plan.report.variables[0].severity, Severity::Fatal);
        assert!(plan.report.fatal_errors[0].contains("session_cookie"));
        assert!(plan.report.fatal_errors[0].contains("sess"));
    }

    #[test]
    fn low_coverage_warns() {
        let mut accounts = team();
        accounts.push(Account::new("a5", "erin"));
        accounts[2].fields.remove("user_id");

        let vars = [VariableConfig::account_field("uid", "user_id")];
        let plan = prepare_mutation_roles(&accounts, &vars, MutationStrategy::Independent, None);

        assert!(plan.valid);
        assert_eq!(plan.report.variables[0].severity, Severity::Warn);
        assert_eq!(plan.report.warnings.len(), 1);
    }

    #[test]
    fn scope_narrows_the_measured_pool() {
        let vars = [VariableConfig::account_field("uid", "user_id")
            .with_scope(AccountScopeMode::OnlySelected, vec!["a2".into(), "a4".into()])];
        let plan = prepare_mutation_roles(&team(), &vars, MutationStrategy::Independent, None);

        assert!(!plan.valid);
        assert_eq!(plan.report.variables[0].pool_total, 2);
    }

    #[test]
    fn per_account_keeps_only_accounts_supplying_every_field() {
        let accounts = vec![
            Account::new("x", "only-a").with_field("A", "x"),
            Account::new("y", "only-b").with_field("B", "y"),
            Account::new("z", "both").with_field("A", "x").with_field("B", "y"),
        ];
        let vars = [
            VariableConfig::account_field("va", "A"),
            VariableConfig::account_field("vb", "B"),
        ];
        let plan = prepare_mutation_roles(&accounts, &vars, MutationStrategy::PerAccount, None);

        assert!(plan.valid);
        assert_eq!(ids(&plan.filtered_accounts), ["z"]);
        assert_eq!(ids(plan.pool_for("va").unwrap()), ["z"]);
        assert_eq!(ids(plan.pool_for("vb").unwrap()), ["z"]);
        // Diagnostics are measured against the base pool, not the intersection.
        assert_eq!(plan.report.variables[0].present, 2);
        assert_eq!(plan.report.variables[0].pool_total, 3);
    }

    #[test]
    fn per_account_is_fatal_when_no_account_has_everything() {
        let accounts = vec![
            Account::new("x", "only-a").with_field("A", "x"),
            Account::new("y", "only-b").with_field("B", "y"),
        ];
        let vars = [
            VariableConfig::account_field("va", "A"),
            VariableConfig::account_field("vb", "B"),
        ];
        let plan = prepare_mutation_roles(&accounts, &vars, MutationStrategy::PerAccount, None);

        assert!(!plan.valid);
        assert!(plan.filtered_accounts.is_empty());
        assert!(plan.report.fatal_errors[0].contains("A, B"));
        assert!(plan.ensure_valid().is_err());
    }

    #[test]
    fn per_account_intersects_scoped_pools() {
        let vars = [
            VariableConfig::account_field("auth", "token")
                .with_scope(AccountScopeMode::ExcludeSelected, vec!["a1".into()]),
            VariableConfig::account_field("uid", "user_id"),
        ];
        let plan = prepare_mutation_roles(&team(), &vars, MutationStrategy::PerAccount, None);

        assert!(plan.valid);
        assert_eq!(ids(&plan.filtered_accounts), ["a3"]);
    }

    #[test]
    fn anchor_attacker_requires_an_attacker_id() {
        let vars = [VariableConfig::account_field("uid", "user_id")];
        let plan = prepare_mutation_roles(&team(), &vars, MutationStrategy::AnchorAttacker, None);

        assert!(!plan.valid);
        assert_eq!(
            plan.report.fatal_errors,
            [ValidationError::MissingAttacker.to_string()]
        );
        assert!(plan.filtered_accounts.is_empty());
    }

    #[test]
    fn anchor_attacker_rejects_unknown_attacker() {
        let vars = [VariableConfig::account_field("uid", "user_id")];
        let plan =
            prepare_mutation_roles(&team(), &vars, MutationStrategy::AnchorAttacker, Some("nope"));

        assert!(!plan.valid);
        assert!(plan.report.fatal_errors[0].contains("nope"));
    }

    #[test]
    fn anchor_attacker_missing_field_is_fatal_and_empties_accounts() {
        let vars = [
            VariableConfig::account_field("auth", "token").with_role(VariableRole::Attacker),
            VariableConfig::account_field("uid", "user_id").with_role(VariableRole::Attacker),
        ];
        let plan =
            prepare_mutation_roles(&team(), &vars, MutationStrategy::AnchorAttacker, Some("a2"));

        assert!(!plan.valid);
        assert!(plan.filtered_accounts.is_empty());
        assert_eq!(plan.report.fatal_errors.len(), 1);
        assert!(plan.report.fatal_errors[0].contains("user_id"));
        assert!(plan.pool_for("uid").unwrap().is_empty());
        assert_eq!(ids(plan.pool_for("auth").unwrap()), ["a2"]);
    }

    #[test]
    fn anchor_attacker_puts_attacker_first_then_intersected_victims() {
        let vars = [
            VariableConfig::account_field("auth", "token").with_role(VariableRole::Attacker),
            VariableConfig::account_field("victim_token", "token").with_role(VariableRole::Victim),
            VariableConfig::account_field("victim_uid", "user_id").with_role(VariableRole::Victim),
        ];
        let plan =
            prepare_mutation_roles(&team(), &vars, MutationStrategy::AnchorAttacker, Some("a1"));

        assert!(plan.valid);
        assert_eq!(ids(&plan.filtered_accounts), ["a1", "a3"]);
        assert_eq!(plan.attacker().map(|a| a.id.as_str()), Some("a1"));
        assert_eq!(ids(plan.pool_for("victim_uid").unwrap()), ["a3"]);

        let victims = plan.accounts_for_role(VariableRole::Victim);
        assert_eq!(victims.len(), 1);
        assert_eq!(victims[0].id, "a3");

        // Victim coverage excludes the attacker from the pool.
        let victim_uid = &plan.report.variables[2];
        assert_eq!(victim_uid.pool_total, 3);
        assert_eq!(victim_uid.present, 1);
    }

    #[test]
    fn anchor_attacker_without_victim_variables_keeps_every_other_account() {
        let vars = [VariableConfig::account_field("auth", "token").with_role(VariableRole::Attacker)];
        let plan =
            prepare_mutation_roles(&team(), &vars, MutationStrategy::AnchorAttacker, Some("a3"));

        assert!(plan.valid);
        assert_eq!(ids(&plan.filtered_accounts), ["a3", "a1", "a2", "a4"]);
    }

    #[test]
    fn anchor_attacker_victim_without_supplier_is_fatal() {
        let vars = [
            VariableConfig::account_field("auth", "token").with_role(VariableRole::Attacker),
            VariableConfig::account_field("victim_uid", "user_id").with_role(VariableRole::Victim),
        ];
        let accounts: Vec<Account> = team().into_iter().filter(|a| a.id != "a3").collect();
        let plan =
            prepare_mutation_roles(&accounts, &vars, MutationStrategy::AnchorAttacker, Some("a1"));

        assert!(!plan.valid);
        assert!(plan.report.fatal_errors[0].contains("victim_uid"));
    }

    #[test]
    fn anchor_attacker_with_disjoint_victim_fields_keeps_only_the_attacker() {
        let accounts = vec![
            Account::new("a1", "attacker").with_field("token", "t1"),
            Account::new("a2", "has-email").with_field("email", "b@example.com"),
            Account::new("a3", "has-phone").with_field("phone", "555-0103"),
        ];
        let vars = [
            VariableConfig::account_field("auth", "token").with_role(VariableRole::Attacker),
            VariableConfig::account_field("victim_email", "email").with_role(VariableRole::Victim),
            VariableConfig::account_field("victim_phone", "phone").with_role(VariableRole::Victim),
        ];
        let plan =
            prepare_mutation_roles(&accounts, &vars, MutationStrategy::AnchorAttacker, Some("a1"));

        // Each victim field has a supplier, so nothing is fatal; no single
        // victim has both, so the plan degrades to the attacker alone.
        assert!(plan.valid);
        assert!(plan.report.fatal_errors.is_empty());
        assert_eq!(ids(&plan.filtered_accounts), ["a1"]);
        assert_eq!(
            plan.report.warnings,
            ["no single victim account provides every victim field"]
        );
        assert!(plan.pool_for("victim_email").unwrap().is_empty());
        assert!(plan.accounts_for_role(VariableRole::Victim).is_empty());
        assert_eq!(plan.attacker().map(|a| a.id.as_str()), Some("a1"));
    }

    #[test]
    fn inputs_are_left_untouched() {
        let accounts = team();
        let vars = vec![VariableConfig::account_field("uid", "user_id")];
        let before = (accounts.clone(), vars.clone());

        let _ = prepare_mutation_roles(&accounts, &vars, MutationStrategy::PerAccount, None);
        assert_eq!((accounts, vars), before);
    }

    #[test]
    fn strategy_uses_snake_case_on_the_wire() {
        let json = serde_json::to_string(&MutationStrategy::AnchorAttacker).unwrap();
        assert_eq!(json, "\"anchor_attacker\"");
    }
}
