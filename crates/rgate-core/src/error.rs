//! Error types for gate policy and drop-rule authoring.
//!
//! The evaluation paths themselves are infallible: coverage failures are
//! reported inside a [`ValidationReport`](crate::ValidationReport) and a
//! malformed drop-rule pattern simply never matches. These errors cover the
//! save-time checks an operator hits when authoring rules and policies.

use thiserror::Error;

/// Errors raised when validating a gate policy.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PolicyError {
    #[error("{origin} weight {weight} is out of range (0..=100)")]
    WeightOutOfRange { origin: &'static str, weight: u32 },
}

/// Errors raised when validating a drop-rule draft before it is saved.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DropRuleError {
    #[error("drop rule name must not be empty")]
    EmptyName,

    #[error("invalid regex pattern {pattern:?}: {reason}")]
    InvalidPattern { pattern: String, reason: String },

    #[error("match_method must not be empty")]
    EmptyMethod,
}

/// Errors raised when a mutation request cannot be prepared at all.
///
/// Coverage problems are not errors; see
/// [`ValidationReport::fatal_errors`](crate::ValidationReport::fatal_errors).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("anchor_attacker strategy requires an attacker account id")]
    MissingAttacker,

    #[error("attacker account {0} was not found")]
    UnknownAttacker(String),

    #[error("mutation roles are not satisfiable: {}", errors.join("; "))]
    Unsatisfiable { errors: Vec<String> },
}
