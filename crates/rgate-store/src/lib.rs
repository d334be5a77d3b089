//! rgate store - persistence interface for gate runs.
//!
//! The gate core never persists anything itself; it reads and writes through
//! the [`DataStore`] collaborator defined here.
//!
//! # Overview
//!
//! - **Repository**: async id-keyed CRUD over one collection
//! - **`DataStore`**: the bundle of collections a gate run touches (accounts,
//!   gate policies, security runs, test runs, drop rules)
//! - **Memory store**: an in-process implementation preserving insertion order
//!
//! Database-backed implementations live with the calling system.

#![forbid(unsafe_code)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::significant_drop_tightening)]

mod error;
mod memory;
mod repository;

pub use error::{StoreError, StoreResult};
pub use memory::{MemoryDataStore, MemoryRepository};
pub use repository::{DataStore, Entity, Repository};
