//! rgate test kit - test doubles for gate runs.
//!
//! - [`ScriptedTestExecutor`] / [`ScriptedWorkflowExecutor`] - executors that
//!   record every call and answer from a script
//! - [`FaultyStore`] - an in-memory store that fails chosen operations
//! - [`fixtures`] - accounts, policies and drop-rule contexts
//! - [`init_test_tracing`] - test-friendly subscriber
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use rgate_testkit::{FaultyStore, ScriptedTestExecutor, ScriptedWorkflowExecutor};
//!
//! let store = Arc::new(FaultyStore::new());
//! let runner = GateRunner::new(
//!     store.clone(),
//!     Arc::new(ScriptedTestExecutor::returning(ExecutionOutcome::findings(3))),
//!     Arc::new(ScriptedWorkflowExecutor::new()),
//! );
//! ```

#![forbid(unsafe_code)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::significant_drop_tightening)]

mod executors;
pub mod fixtures;
mod store;
mod tracing_config;

pub use executors::*;
pub use store::*;
pub use tracing_config::*;
