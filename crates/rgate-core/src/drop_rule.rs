//! Drop rules: operator-authored suppression of findings.
//!
//! Rules are evaluated as an ordered predicate chain. Disabled rules are
//! skipped, the rest run in ascending `priority` order, and the first rule
//! whose predicates all hold decides the drop. Every predicate is optional;
//! a rule with none set matches everything in its `applies_to` scope.
//!
//! A malformed `regex` path pattern never matches. It does not abort
//! evaluation of later rules.

use serde::{Deserialize, Serialize};

use crate::error::DropRuleError;

/// Wildcard method accepted by every request.
pub const ANY_METHOD: &str = "ANY";

// ─────────────────────────────────────────────────────────────────────────────
// Rule Model
// ─────────────────────────────────────────────────────────────────────────────

/// Which kind of execution a finding came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceType {
    TestRun,
    Workflow,
}

/// Execution kinds a rule applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleScope {
    TestRun,
    Workflow,
    #[default]
    Both,
}

impl RuleScope {
    #[must_use]
    pub const fn covers(self, source: SourceType) -> bool {
        matches!(
            (self, source),
            (Self::Both, _)
                | (Self::TestRun, SourceType::TestRun)
                | (Self::Workflow, SourceType::Workflow)
        )
    }
}

/// How `match_path` is compared against the request path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PathMatchType {
    Exact,
    Prefix,
    #[default]
    Contains,
    /// Unanchored search with the `regex` crate's syntax. Lookaround and
    /// backreferences (`(?!me)`, `\1`) are not supported: such patterns fail
    /// draft validation and never match when already stored.
    Regex,
}

fn default_enabled() -> bool {
    true
}

fn default_method() -> String {
    ANY_METHOD.to_string()
}

/// A persisted suppression rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DropRule {
    pub id: String,
    pub name: String,
    #[serde(default = "default_enabled")]
    pub is_enabled: bool,
    /// Lower values are evaluated first.
    #[serde(default)]
    pub priority: i64,
    #[serde(default)]
    pub applies_to: RuleScope,
    #[serde(default = "default_method")]
    pub match_method: String,
    #[serde(default)]
    pub match_type: PathMatchType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub match_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub match_service_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub match_template_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub match_workflow_id: Option<String>,
}

impl DropRule {
    /// An enabled rule with no predicates that matches every request.
    #[must_use]
    pub fn catch_all(id: impl Into<String>, name: impl Into<String>, priority: i64) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            is_enabled: true,
            priority,
            applies_to: RuleScope::Both,
            match_method: default_method(),
            match_type: PathMatchType::Contains,
            match_path: None,
            match_service_id: None,
            match_template_id: None,
            match_workflow_id: None,
        }
    }

    #[must_use]
    pub fn with_path(mut self, match_type: PathMatchType, path: impl Into<String>) -> Self {
        self.match_type = match_type;
        self.match_path = Some(path.into());
        self
    }

    #[must_use]
    pub fn with_method(mut self, method: impl Into<String>) -> Self {
        self.match_method = method.into();
        self
    }

    #[must_use]
    pub const fn with_scope(mut self, applies_to: RuleScope) -> Self {
        self.applies_to = applies_to;
        self
    }
}

/// A partially specified rule, as submitted by "test this rule" previews and
/// by create/update requests before defaults are applied.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DropRuleDraft {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_enabled: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub applies_to: Option<RuleScope>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub match_method: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub match_type: Option<PathMatchType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub match_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub match_service_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub match_template_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub match_workflow_id: Option<String>,
}

impl DropRuleDraft {
    /// Save-time validation.
    ///
    /// Stricter than matching: a pattern that would silently never match is
    /// rejected here so the operator sees it.
    ///
    /// # Errors
    /// Returns [`DropRuleError`] for an empty name or method, or an invalid
    /// regex pattern.
    pub fn validate(&self) -> Result<(), DropRuleError> {
        if self.name.as_deref().is_some_and(|name| name.trim().is_empty()) {
            return Err(DropRuleError::EmptyName);
        }
        if self.match_method.as_deref().is_some_and(str::is_empty) {
            return Err(DropRuleError::EmptyMethod);
        }
        if self.match_type == Some(PathMatchType::Regex) {
            if let Some(pattern) = non_empty(self.match_path.as_deref()) {
                regex::Regex::new(pattern).map_err(|e| DropRuleError::InvalidPattern {
                    pattern: pattern.to_string(),
                    reason: e.to_string(),
                })?;
            }
        }
        Ok(())
    }

    /// Fill defaults: enabled, priority 0, `both`, `ANY`, `contains`.
    #[must_use]
    pub fn into_rule(self, id: impl Into<String>) -> DropRule {
        DropRule {
            id: id.into(),
            name: self.name.unwrap_or_default(),
            is_enabled: self.is_enabled.unwrap_or(true),
            priority: self.priority.unwrap_or(0),
            applies_to: self.applies_to.unwrap_or_default(),
            match_method: self.match_method.unwrap_or_else(default_method),
            match_type: self.match_type.unwrap_or_default(),
            match_path: self.match_path,
            match_service_id: self.match_service_id,
            match_template_id: self.match_template_id,
            match_workflow_id: self.match_workflow_id,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Findings and Contexts
// ─────────────────────────────────────────────────────────────────────────────

/// The request a finding was raised against.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DropContext {
    pub method: String,
    pub path: String,
    #[serde(default)]
    pub request_raw: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workflow_id: Option<String>,
    pub source_type: SourceType,
}

/// A candidate vulnerability produced by a test or workflow execution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Finding {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(flatten)]
    pub context: DropContext,
}

/// Result of checking a context against a rule set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DropDecision {
    pub dropped: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rule_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rule_name: Option<String>,
}

impl DropDecision {
    #[must_use]
    pub const fn kept() -> Self {
        Self {
            dropped: false,
            rule_id: None,
            rule_name: None,
        }
    }

    fn dropped_by(rule: &DropRule) -> Self {
        Self {
            dropped: true,
            rule_id: Some(rule.id.clone()),
            rule_name: Some(rule.name.clone()),
        }
    }
}

/// A finding suppressed by a rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DroppedFinding {
    pub finding: Finding,
    pub rule_id: String,
    pub rule_name: String,
}

/// Findings split into kept and dropped, each in input order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartitionedFindings {
    pub kept: Vec<Finding>,
    pub dropped: Vec<DroppedFinding>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Compiled Rule Set
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
enum PathMatcher {
    Any,
    Exact(String),
    Prefix(String),
    Contains(String),
    Regex(regex::Regex),
    Never,
}

impl PathMatcher {
    fn compile(rule: &DropRule) -> Self {
        let Some(pattern) = non_empty(rule.match_path.as_deref()) else {
            return Self::Any;
        };
        match rule.match_type {
            PathMatchType::Exact => Self::Exact(pattern.to_string()),
            PathMatchType::Prefix => Self::Prefix(pattern.to_string()),
            PathMatchType::Contains => Self::Contains(pattern.to_string()),
            PathMatchType::Regex => match regex::Regex::new(pattern) {
                Ok(re) => Self::Regex(re),
                Err(err) => {
                    tracing::warn!(
                        rule_id = %rule.id,
                        pattern = pattern,
                        error = %err,
                        "drop rule has an invalid regex; it will never match"
                    );
                    Self::Never
                }
            },
        }
    }

    fn matches(&self, path: &str) -> bool {
        match self {
            Self::Any => true,
            Self::Exact(p) => path == p,
            Self::Prefix(p) => path.starts_with(p.as_str()),
            Self::Contains(p) => path.contains(p.as_str()),
            Self::Regex(re) => re.is_match(path),
            Self::Never => false,
        }
    }
}

#[derive(Debug, Clone)]
struct CompiledRule {
    rule: DropRule,
    path: PathMatcher,
}

impl CompiledRule {
    fn new(rule: DropRule) -> Self {
        let path = PathMatcher::compile(&rule);
        Self { rule, path }
    }

    fn matches(&self, ctx: &DropContext) -> bool {
        let rule = &self.rule;
        if !rule.applies_to.covers(ctx.source_type) {
            return false;
        }
        if !rule.match_method.is_empty()
            && rule.match_method != ANY_METHOD
            && rule.match_method != ctx.method
        {
            return false;
        }
        if let Some(template_id) = non_empty(rule.match_template_id.as_deref()) {
            if ctx.template_id.as_deref() != Some(template_id) {
                return false;
            }
        }
        if let Some(workflow_id) = non_empty(rule.match_workflow_id.as_deref()) {
            if ctx.workflow_id.as_deref() != Some(workflow_id) {
                return false;
            }
        }
        if let Some(service_id) = non_empty(rule.match_service_id.as_deref()) {
            if !ctx.request_raw.contains(service_id) {
                return false;
            }
        }
        self.path.matches(&ctx.path)
    }
}

/// Enabled rules sorted by priority with their path patterns pre-compiled.
#[derive(Debug, Clone, Default)]
pub struct DropRuleSet {
    rules: Vec<CompiledRule>,
}

impl DropRuleSet {
    /// Build a rule set. Disabled rules are discarded; ties in priority keep
    /// their input order.
    #[must_use]
    pub fn new(rules: impl IntoIterator<Item = DropRule>) -> Self {
        let mut enabled: Vec<DropRule> = rules.into_iter().filter(|r| r.is_enabled).collect();
        enabled.sort_by_key(|r| r.priority);
        Self {
            rules: enabled.into_iter().map(CompiledRule::new).collect(),
        }
    }

    /// Number of enabled rules.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// First matching rule decides; no match keeps the finding.
    #[must_use]
    pub fn check(&self, ctx: &DropContext) -> DropDecision {
        self.rules
            .iter()
            .find(|compiled| compiled.matches(ctx))
            .map_or_else(DropDecision::kept, |compiled| {
                DropDecision::dropped_by(&compiled.rule)
            })
    }

    /// Split findings into kept and dropped.
    #[must_use]
    pub fn partition(&self, findings: impl IntoIterator<Item = Finding>) -> PartitionedFindings {
        let mut out = PartitionedFindings::default();
        for finding in findings {
            let decision = self.check(&finding.context);
            match (decision.rule_id, decision.rule_name) {
                (Some(rule_id), Some(rule_name)) if decision.dropped => {
                    out.dropped.push(DroppedFinding {
                        finding,
                        rule_id,
                        rule_name,
                    });
                }
                _ => out.kept.push(finding),
            }
        }
        out
    }
}

/// Check one context against an unsorted rule list.
#[must_use]
pub fn check_drop_rules(rules: &[DropRule], ctx: &DropContext) -> DropDecision {
    DropRuleSet::new(rules.iter().cloned()).check(ctx)
}

/// Evaluate a single hypothetical rule without persisting it.
///
/// The draft gets the same defaults a saved rule would, and is treated as
/// enabled regardless of its `is_enabled` field.
#[must_use]
pub fn preview_drop_rule(draft: &DropRuleDraft, ctx: &DropContext) -> bool {
    let mut rule = draft.clone().into_rule("preview");
    rule.is_enabled = true;
    CompiledRule::new(rule).matches(ctx)
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}
