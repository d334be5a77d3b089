//! rgate runner - gate run orchestration.
//!
//! [`GateRunner`] turns a [`GateRunRequest`] into a persisted `SecurityRun`
//! and a PASS/WARN/BLOCK verdict:
//!
//! 1. reject requests with no templates and no workflows
//! 2. load the named policy, or fall back to the default policy
//! 3. persist a `running` security run holding the request snapshot
//! 4. execute the template batch, then each workflow in order
//! 5. evaluate the gate and persist the result
//!
//! Any failure after step 3 marks the run `failed` with exit code 3.

#![forbid(unsafe_code)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

mod config;
mod error;
mod executor;
mod replay;
mod runner;

pub use config::*;
pub use error::*;
pub use executor::*;
pub use replay::*;
pub use runner::*;
