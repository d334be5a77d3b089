//! Repository interface for rgate entities.
//!
//! Provides id-keyed CRUD over one entity collection.

use async_trait::async_trait;
use rgate_core::{Account, DropRule, GatePolicy, SecurityRun, TestRun};

use crate::error::{StoreError, StoreResult};

/// An entity stored in a named collection and keyed by a string id.
pub trait Entity: Clone + Send + Sync + 'static {
    /// Collection name, used in errors and logs.
    const COLLECTION: &'static str;

    fn id(&self) -> &str;
}

impl Entity for Account {
    const COLLECTION: &'static str = "accounts";

    fn id(&self) -> &str {
        &self.id
    }
}

impl Entity for GatePolicy {
    const COLLECTION: &'static str = "gate_policies";

    fn id(&self) -> &str {
        &self.id
    }
}

impl Entity for SecurityRun {
    const COLLECTION: &'static str = "security_runs";

    fn id(&self) -> &str {
        &self.id
    }
}

impl Entity for TestRun {
    const COLLECTION: &'static str = "test_runs";

    fn id(&self) -> &str {
        &self.id
    }
}

impl Entity for DropRule {
    const COLLECTION: &'static str = "drop_rules";

    fn id(&self) -> &str {
        &self.id
    }
}

/// CRUD interface over one collection.
#[async_trait]
pub trait Repository<T: Entity>: Send + Sync {
    /// All entities in creation order.
    ///
    /// # Errors
    /// Returns a backend error if the collection cannot be read.
    async fn find_all(&self) -> StoreResult<Vec<T>>;

    /// Look up an entity; `Ok(None)` if it does not exist.
    ///
    /// # Errors
    /// Returns a backend error if the collection cannot be read.
    async fn find_by_id(&self, id: &str) -> StoreResult<Option<T>>;

    /// Insert a new entity.
    ///
    /// # Errors
    /// Returns `AlreadyExists` if the id is taken.
    async fn create(&self, entity: T) -> StoreResult<T>;

    /// Replace an existing entity.
    ///
    /// # Errors
    /// Returns `NotFound` if no entity has this id.
    async fn update(&self, entity: T) -> StoreResult<T>;

    /// Remove an entity.
    ///
    /// # Errors
    /// Returns `NotFound` if no entity has this id.
    async fn delete(&self, id: &str) -> StoreResult<()>;

    /// Look up an entity that must exist.
    ///
    /// # Errors
    /// Returns `NotFound` if no entity has this id.
    async fn get(&self, id: &str) -> StoreResult<T> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| StoreError::not_found(T::COLLECTION, id))
    }
}

/// The collections a gate run reads and writes.
pub trait DataStore: Send + Sync {
    fn accounts(&self) -> &dyn Repository<Account>;

    fn gate_policies(&self) -> &dyn Repository<GatePolicy>;

    fn security_runs(&self) -> &dyn Repository<SecurityRun>;

    fn test_runs(&self) -> &dyn Repository<TestRun>;

    fn drop_rules(&self) -> &dyn Repository<DropRule>;
}
