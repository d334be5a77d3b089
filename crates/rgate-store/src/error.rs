//! Error types for rgate stores.

use thiserror::Error;

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors for repository operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("{collection} entity not found: {id}")]
    NotFound {
        collection: &'static str,
        id: String,
    },

    #[error("{collection} entity already exists: {id}")]
    AlreadyExists {
        collection: &'static str,
        id: String,
    },

    #[error("store backend error: {0}")]
    Backend(String),
}

impl StoreError {
    #[must_use]
    pub fn not_found(collection: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            collection,
            id: id.into(),
        }
    }
}
