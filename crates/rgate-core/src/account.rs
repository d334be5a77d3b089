//! Accounts, mutable-variable configuration, and account pool resolution.

use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};

// ─────────────────────────────────────────────────────────────────────────────
// Accounts
// ─────────────────────────────────────────────────────────────────────────────

/// A configured test identity whose fields can supply variable values.
///
/// Owned by the calling system; nothing in this crate mutates it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub fields: BTreeMap<String, serde_json::Value>,
}

impl Account {
    /// Create an account with no fields.
    #[must_use]
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            fields: BTreeMap::new(),
        }
    }

    /// Set a field value.
    #[must_use]
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    /// Whether the account can supply `field`: defined, non-null, and not an
    /// empty string.
    #[must_use]
    pub fn has_field(&self, field: &str) -> bool {
        match self.fields.get(field) {
            None | Some(serde_json::Value::Null) => false,
            Some(serde_json::Value::String(s)) => !s.is_empty(),
            Some(_) => true,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Variable Configuration
// ─────────────────────────────────────────────────────────────────────────────

/// Where a mutable variable draws its value from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataSource {
    AccountField,
    Checklist,
    SecurityRule,
    WorkflowContext,
    Original,
}

/// Role a variable plays in a mutation test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VariableRole {
    Attacker,
    Victim,
    #[default]
    #[serde(other)]
    Neutral,
}

impl VariableRole {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Attacker => "attacker",
            Self::Victim => "victim",
            Self::Neutral => "neutral",
        }
    }
}

/// How a variable's account scope narrows the account list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountScopeMode {
    OnlySelected,
    ExcludeSelected,
    #[default]
    #[serde(other)]
    All,
}

/// One mutable parameter of a test template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariableConfig {
    pub name: String,
    pub data_source: DataSource,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account_field_name: Option<String>,
    #[serde(default)]
    pub role: VariableRole,
    #[serde(default)]
    pub is_attacker_field: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account_scope_mode: Option<AccountScopeMode>,
    #[serde(default)]
    pub account_scope_ids: Vec<String>,
}

impl VariableConfig {
    /// A variable sourced from an account field, neutral role, unscoped.
    #[must_use]
    pub fn account_field(name: impl Into<String>, field: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data_source: DataSource::AccountField,
            account_field_name: Some(field.into()),
            role: VariableRole::Neutral,
            is_attacker_field: false,
            account_scope_mode: None,
            account_scope_ids: Vec::new(),
        }
    }

    #[must_use]
    pub const fn with_role(mut self, role: VariableRole) -> Self {
        self.role = role;
        self
    }

    #[must_use]
    pub fn with_scope(mut self, mode: AccountScopeMode, ids: Vec<String>) -> Self {
        self.account_scope_mode = Some(mode);
        self.account_scope_ids = ids;
        self
    }

    /// The account field this variable reads, if it takes part in role
    /// preparation at all.
    #[must_use]
    pub fn account_field_key(&self) -> Option<&str> {
        if self.data_source != DataSource::AccountField {
            return None;
        }
        self.account_field_name.as_deref().filter(|f| !f.is_empty())
    }

    /// Effective role: the attacker flag wins over the declared role.
    #[must_use]
    pub fn effective_role(&self) -> VariableRole {
        if self.is_attacker_field {
            VariableRole::Attacker
        } else {
            self.role
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Account Pool Resolution
// ─────────────────────────────────────────────────────────────────────────────

/// Narrow `accounts` to those a variable may draw from.
///
/// An absent mode, `all`, or an empty id list leaves the list unchanged.
#[must_use]
pub fn resolve_account_pool(
    accounts: &[Account],
    scope_mode: Option<AccountScopeMode>,
    scope_ids: &[String],
) -> Vec<Account> {
    let mode = scope_mode.unwrap_or_default();
    if mode == AccountScopeMode::All || scope_ids.is_empty() {
        return accounts.to_vec();
    }

    let selected: HashSet<&str> = scope_ids.iter().map(String::as_str).collect();
    let keep_selected = mode == AccountScopeMode::OnlySelected;
    accounts
        .iter()
        .filter(|account| selected.contains(account.id.as_str()) == keep_selected)
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn accounts() -> Vec<Account> {
        vec![
            Account::new("a1", "alice"),
            Account::new("a2", "bob"),
            Account::new("a3", "carol"),
        ]
    }

    fn ids(pool: &[Account]) -> Vec<&str> {
        pool.iter().map(|a| a.id.as_str()).collect()
    }

    #[test]
    fn unscoped_pool_is_the_full_list() {
        let all = accounts();
        assert_eq!(resolve_account_pool(&all, None, &[]), all);
        assert_eq!(
            resolve_account_pool(&all, Some(AccountScopeMode::All), &["a1".into()]),
            all
        );
    }

    #[test]
    fn empty_scope_ids_ignore_the_mode() {
        let all = accounts();
        assert_eq!(
            resolve_account_pool(&all, Some(AccountScopeMode::OnlySelected), &[]),
            all
        );
    }

    #[test]
    fn only_selected_keeps_listed_ids_in_account_order() {
        let pool = resolve_account_pool(
            &accounts(),
            Some(AccountScopeMode::OnlySelected),
            &["a3".into(), "a1".into()],
        );
        assert_eq!(ids(&pool), ["a1", "a3"]);
    }

    #[test]
    fn exclude_selected_drops_listed_ids() {
        let pool = resolve_account_pool(
            &accounts(),
            Some(AccountScopeMode::ExcludeSelected),
            &["a2".into()],
        );
        assert_eq!(ids(&pool), ["a1", "a3"]);
    }

    #[test]
    fn unknown_scope_mode_falls_back_to_all() {
        let mode: AccountScopeMode = serde_json::from_str("\"everyone\"").unwrap();
        assert_eq!(mode, AccountScopeMode::All);
    }

    #[test]
    fn has_field_rejects_null_and_empty_string() {
        let account = Account::new("a1", "alice")
            .with_field("token", "abc")
            .with_field("empty", "")
            .with_field("nothing", serde_json::Value::Null)
            .with_field("user_id", 42);

        assert!(account.has_field("token"));
        assert!(account.has_field("user_id"));
        assert!(!account.has_field("empty"));
        assert!(!account.has_field("nothing"));
        assert!(!account.has_field("missing"));
    }

    #[test]
    fn attacker_flag_overrides_declared_role() {
        let mut var = VariableConfig::account_field("uid", "user_id").with_role(VariableRole::Victim);
        assert_eq!(var.effective_role(), VariableRole::Victim);
        var.is_attacker_field = true;
        assert_eq!(var.effective_role(), VariableRole::Attacker);
    }

    #[test]
    fn only_account_field_variables_have_a_field_key() {
        let mut var = VariableConfig::account_field("uid", "user_id");
        assert_eq!(var.account_field_key(), Some("user_id"));

        var.account_field_name = Some(String::new());
        assert_eq!(var.account_field_key(), None);

        var.account_field_name = Some("user_id".into());
        var.data_source = DataSource::Checklist;
        assert_eq!(var.account_field_key(), None);
    }
}
