//! rgate core - decision logic for API security regression gates
//!
//! This crate holds the pure, synchronous parts of a gate run:
//!
//! - **Account pools**: narrowing the account list per variable scope
//! - **Mutation roles**: which accounts may act as attacker or victim under a
//!   [`MutationStrategy`], with per-variable coverage diagnostics
//! - **Drop rules**: ordered suppression rules for findings
//! - **Gate policy**: weighted finding counts to a PASS/WARN/BLOCK verdict and
//!   a CI exit code
//!
//! Nothing here performs I/O or mutates its inputs. Orchestration, persistence,
//! and execution live in `rgate-runner` and `rgate-store`.
//!
//! # Example
//!
//! ```rust
//! use rgate_core::{GateAction, GatePolicy, evaluate_gate};
//!
//! let calc = evaluate_gate(7, 0, &GatePolicy::default_policy(), false);
//! assert_eq!(calc.final_action, GateAction::Block);
//! assert_eq!(calc.exit_code.code(), 1);
//! ```

#![forbid(unsafe_code)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

mod account;
mod drop_rule;
mod error;
mod gate;
mod mutation;
mod run;

pub use account::*;
pub use drop_rule::*;
pub use error::*;
pub use gate::*;
pub use mutation::*;
pub use run::*;

// Re-export commonly used external types
pub use chrono::{DateTime, Utc};
