//! Gate policy evaluation: finding counts to a PASS/WARN/BLOCK verdict.
//!
//! # Algorithm
//!
//! 1. Each origin (test runs, workflows) scales its finding count by its
//!    percentage weight and rounds up: `score = ceil(count * weight / 100)`.
//!    An origin weighted `0` is not scored at all and contributes `PASS`.
//! 2. The origin's threshold rules are scanned in list order; the first rule
//!    whose comparison holds for the score supplies the action. No match is
//!    `PASS`.
//! 3. The two actions combine under `PASS < WARN < BLOCK`: `OR` takes the
//!    worse of the two, `AND` the milder.
//! 4. An execution error forces `BLOCK`.
//! 5. `BLOCK` exits `1`; `PASS` and `WARN` exit `0`.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::PolicyError;

/// Id recorded for the synthesized default policy.
pub const DEFAULT_POLICY_ID: &str = "default";

// ─────────────────────────────────────────────────────────────────────────────
// Actions and Exit Codes
// ─────────────────────────────────────────────────────────────────────────────

/// Gate verdict. Ordering is severity: `Pass < Warn < Block`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "UPPERCASE")]
pub enum GateAction {
    #[default]
    Pass,
    Warn,
    Block,
}

impl GateAction {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pass => "PASS",
            Self::Warn => "WARN",
            Self::Block => "BLOCK",
        }
    }

    /// Exit code for a calculated verdict.
    #[must_use]
    pub const fn exit_code(self) -> GateExitCode {
        match self {
            Self::Pass | Self::Warn => GateExitCode::Success,
            Self::Block => GateExitCode::Blocked,
        }
    }
}

impl fmt::Display for GateAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Process exit code reported to a CI pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum GateExitCode {
    /// `PASS` or `WARN`.
    Success,
    /// `BLOCK`.
    Blocked,
    /// The orchestration itself failed; the verdict is `BLOCK`.
    OrchestrationFailure,
    /// Reserved for a misconfigured policy. Never produced.
    PolicyMisconfigured,
}

impl GateExitCode {
    #[must_use]
    pub const fn code(self) -> u8 {
        match self {
            Self::Success => 0,
            Self::Blocked => 1,
            Self::OrchestrationFailure => 3,
            Self::PolicyMisconfigured => 4,
        }
    }
}

impl From<GateExitCode> for u8 {
    fn from(code: GateExitCode) -> Self {
        code.code()
    }
}

impl TryFrom<u8> for GateExitCode {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Success),
            1 => Ok(Self::Blocked),
            3 => Ok(Self::OrchestrationFailure),
            4 => Ok(Self::PolicyMisconfigured),
            other => Err(format!("unknown gate exit code {other}")),
        }
    }
}

impl fmt::Display for GateExitCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Policy Model
// ─────────────────────────────────────────────────────────────────────────────

/// Numeric comparison used by a threshold rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ThresholdOperator {
    #[serde(rename = ">=")]
    Gte,
    #[serde(rename = ">")]
    Gt,
    #[serde(rename = "<=")]
    Lte,
    #[serde(rename = "<")]
    Lt,
    #[serde(rename = "==")]
    Eq,
    #[serde(rename = "!=")]
    Ne,
}

impl ThresholdOperator {
    /// Compare an integer score against a possibly fractional or negative
    /// threshold.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub const fn holds(self, score: u64, threshold: f64) -> bool {
        let score = score as f64;
        match self {
            Self::Gte => score >= threshold,
            Self::Gt => score > threshold,
            Self::Lte => score <= threshold,
            Self::Lt => score < threshold,
            Self::Eq => score == threshold,
            Self::Ne => score != threshold,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Gte => ">=",
            Self::Gt => ">",
            Self::Lte => "<=",
            Self::Lt => "<",
            Self::Eq => "==",
            Self::Ne => "!=",
        }
    }
}

/// `score <operator> threshold => action`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ThresholdRule {
    pub operator: ThresholdOperator,
    pub threshold: f64,
    pub action: GateAction,
}

impl ThresholdRule {
    #[must_use]
    pub const fn new(operator: ThresholdOperator, threshold: f64, action: GateAction) -> Self {
        Self {
            operator,
            threshold,
            action,
        }
    }

    #[must_use]
    pub const fn matches(&self, score: u64) -> bool {
        self.operator.holds(score, self.threshold)
    }
}

impl fmt::Display for ThresholdRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} -> {}",
            self.operator.as_str(),
            self.threshold,
            self.action
        )
    }
}

/// How the per-origin actions combine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CombineOperator {
    /// Either origin escalates: the worse action wins.
    #[default]
    Or,
    /// Both origins must agree: the milder action wins.
    And,
}

impl CombineOperator {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Or => "OR",
            Self::And => "AND",
        }
    }

    #[must_use]
    pub fn combine(self, a: GateAction, b: GateAction) -> GateAction {
        match self {
            Self::Or => a.max(b),
            Self::And => a.min(b),
        }
    }
}

impl fmt::Display for CombineOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn default_enabled() -> bool {
    true
}

/// A weighted, combinable gate policy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GatePolicy {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default = "default_enabled")]
    pub is_enabled: bool,
    /// Percentage weight applied to test-run findings.
    pub weight_test: u32,
    /// Percentage weight applied to workflow findings.
    pub weight_workflow: u32,
    #[serde(default)]
    pub combine_operator: CombineOperator,
    #[serde(default)]
    pub rules_test: Vec<ThresholdRule>,
    #[serde(default)]
    pub rules_workflow: Vec<ThresholdRule>,
}

impl GatePolicy {
    /// The policy used when a run names none: test findings at full weight,
    /// workflows ignored, `>=5 BLOCK`, `>=1 WARN`, `<1 PASS`.
    #[must_use]
    pub fn default_policy() -> Self {
        let rules = vec![
            ThresholdRule::new(ThresholdOperator::Gte, 5.0, GateAction::Block),
            ThresholdRule::new(ThresholdOperator::Gte, 1.0, GateAction::Warn),
            ThresholdRule::new(ThresholdOperator::Lt, 1.0, GateAction::Pass),
        ];
        Self {
            id: DEFAULT_POLICY_ID.to_string(),
            name: "Default gate policy".to_string(),
            is_enabled: true,
            weight_test: 100,
            weight_workflow: 0,
            combine_operator: CombineOperator::Or,
            rules_test: rules.clone(),
            rules_workflow: rules,
        }
    }

    /// Reject weights outside `0..=100`.
    ///
    /// # Errors
    /// Returns [`PolicyError::WeightOutOfRange`] naming the offending origin.
    pub const fn validate(&self) -> Result<(), PolicyError> {
        if self.weight_test > 100 {
            return Err(PolicyError::WeightOutOfRange {
                origin: "test",
                weight: self.weight_test,
            });
        }
        if self.weight_workflow > 100 {
            return Err(PolicyError::WeightOutOfRange {
                origin: "workflow",
                weight: self.weight_workflow,
            });
        }
        Ok(())
    }

    /// Non-fatal configuration smells.
    #[must_use]
    pub fn lint(&self) -> Vec<String> {
        let mut warnings = Vec::new();
        if self.weight_test > 0 && self.rules_test.is_empty() {
            warnings.push("test findings are weighted but have no threshold rules".to_string());
        }
        if self.weight_workflow > 0 && self.rules_workflow.is_empty() {
            warnings
                .push("workflow findings are weighted but have no threshold rules".to_string());
        }
        if self.weight_test == 0 && self.weight_workflow == 0 {
            warnings.push("both origins are weighted 0; the gate always passes".to_string());
        }
        for rule in self.rules_test.iter().chain(&self.rules_workflow) {
            if !rule.threshold.is_finite() {
                warnings.push(format!(
                    "rule {rule} has a non-finite threshold and never matches"
                ));
            }
        }
        warnings
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Evaluation
// ─────────────────────────────────────────────────────────────────────────────

/// Scoring detail for one origin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OriginEvaluation {
    pub findings: u64,
    pub weight: u32,
    /// `None` when the origin was weighted `0` and not scored.
    pub score: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub matched_rule: Option<ThresholdRule>,
    pub action: GateAction,
}

/// Full audit trail of one gate calculation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GateCalculation {
    pub test: OriginEvaluation,
    pub workflow: OriginEvaluation,
    pub combine_operator: CombineOperator,
    pub combined_action: GateAction,
    pub has_execution_error: bool,
    /// Whether the execution error escalated the combined action.
    pub forced_block: bool,
    pub final_action: GateAction,
    pub exit_code: GateExitCode,
}

impl GateCalculation {
    /// Sum of the weighted scores of both origins.
    #[must_use]
    pub fn total_score(&self) -> u64 {
        self.test.score.unwrap_or(0) + self.workflow.score.unwrap_or(0)
    }
}

/// `ceil(count * weight / 100)`.
#[must_use]
pub fn weighted_score(count: u64, weight: u32) -> u64 {
    count.saturating_mul(u64::from(weight)).div_ceil(100)
}

/// Action of the first rule satisfied by `score`, in list order.
#[must_use]
pub fn first_matching_rule(rules: &[ThresholdRule], score: u64) -> Option<&ThresholdRule> {
    rules.iter().find(|rule| rule.matches(score))
}

fn evaluate_origin(findings: u64, weight: u32, rules: &[ThresholdRule]) -> OriginEvaluation {
    if weight == 0 {
        return OriginEvaluation {
            findings,
            weight,
            score: None,
            matched_rule: None,
            action: GateAction::Pass,
        };
    }

    let score = weighted_score(findings, weight);
    let matched_rule = first_matching_rule(rules, score).copied();
    OriginEvaluation {
        findings,
        weight,
        score: Some(score),
        matched_rule,
        action: matched_rule.map_or(GateAction::Pass, |rule| rule.action),
    }
}

/// Convert finding counts into a verdict under `policy`.
#[must_use]
pub fn evaluate_gate(
    test_findings: u64,
    workflow_findings: u64,
    policy: &GatePolicy,
    has_execution_error: bool,
) -> GateCalculation {
    let test = evaluate_origin(test_findings, policy.weight_test, &policy.rules_test);
    let workflow = evaluate_origin(
        workflow_findings,
        policy.weight_workflow,
        &policy.rules_workflow,
    );

    let combined_action = policy.combine_operator.combine(test.action, workflow.action);
    let forced_block = has_execution_error && combined_action != GateAction::Block;
    let final_action = if has_execution_error {
        GateAction::Block
    } else {
        combined_action
    };

    GateCalculation {
        test,
        workflow,
        combine_operator: policy.combine_operator,
        combined_action,
        has_execution_error,
        forced_block,
        final_action,
        exit_code: final_action.exit_code(),
    }
}
