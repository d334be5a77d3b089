//! In-memory data store.
//!
//! Suitable for testing, offline replays, and single-process deployments.

use async_trait::async_trait;
use parking_lot::RwLock;
use rgate_core::{Account, DropRule, GatePolicy, SecurityRun, TestRun};

use crate::error::{StoreError, StoreResult};
use crate::repository::{DataStore, Entity, Repository};

/// In-memory repository preserving insertion order.
#[derive(Debug)]
pub struct MemoryRepository<T> {
    entities: RwLock<Vec<T>>,
}

impl<T> Default for MemoryRepository<T> {
    fn default() -> Self {
        Self {
            entities: RwLock::new(Vec::new()),
        }
    }
}

impl<T: Entity> MemoryRepository<T> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a repository pre-populated with `entities`.
    ///
    /// Later duplicates of an id replace earlier ones.
    #[must_use]
    pub fn from_entities(entities: impl IntoIterator<Item = T>) -> Self {
        let mut stored: Vec<T> = Vec::new();
        for entity in entities {
            match stored.iter_mut().find(|e| e.id() == entity.id()) {
                Some(existing) => *existing = entity,
                None => stored.push(entity),
            }
        }
        Self {
            entities: RwLock::new(stored),
        }
    }

    /// Number of stored entities.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entities.read().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entities.read().is_empty()
    }
}

#[async_trait]
impl<T: Entity> Repository<T> for MemoryRepository<T> {
    async fn find_all(&self) -> StoreResult<Vec<T>> {
        Ok(self.entities.read().clone())
    }

    async fn find_by_id(&self, id: &str) -> StoreResult<Option<T>> {
        Ok(self.entities.read().iter().find(|e| e.id() == id).cloned())
    }

    async fn create(&self, entity: T) -> StoreResult<T> {
        let mut entities = self.entities.write();
        if entities.iter().any(|e| e.id() == entity.id()) {
            return Err(StoreError::AlreadyExists {
                collection: T::COLLECTION,
                id: entity.id().to_string(),
            });
        }
        entities.push(entity.clone());
        Ok(entity)
    }

    async fn update(&self, entity: T) -> StoreResult<T> {
        let mut entities = self.entities.write();
        let slot = entities
            .iter_mut()
            .find(|e| e.id() == entity.id())
            .ok_or_else(|| StoreError::not_found(T::COLLECTION, entity.id()))?;
        slot.clone_from(&entity);
        Ok(entity)
    }

    async fn delete(&self, id: &str) -> StoreResult<()> {
        let mut entities = self.entities.write();
        let idx = entities
            .iter()
            .position(|e| e.id() == id)
            .ok_or_else(|| StoreError::not_found(T::COLLECTION, id))?;
        entities.remove(idx);
        Ok(())
    }
}

/// In-memory [`DataStore`] with one repository per collection.
#[derive(Debug, Default)]
pub struct MemoryDataStore {
    pub accounts: MemoryRepository<Account>,
    pub gate_policies: MemoryRepository<GatePolicy>,
    pub security_runs: MemoryRepository<SecurityRun>,
    pub test_runs: MemoryRepository<TestRun>,
    pub drop_rules: MemoryRepository<DropRule>,
}

impl MemoryDataStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed gate policies.
    #[must_use]
    pub fn with_policies(mut self, policies: impl IntoIterator<Item = GatePolicy>) -> Self {
        self.gate_policies = MemoryRepository::from_entities(policies);
        self
    }
}

impl DataStore for MemoryDataStore {
    fn accounts(&self) -> &dyn Repository<Account> {
        &self.accounts
    }

    fn gate_policies(&self) -> &dyn Repository<GatePolicy> {
        &self.gate_policies
    }

    fn security_runs(&self) -> &dyn Repository<SecurityRun> {
        &self.security_runs
    }

    fn test_runs(&self) -> &dyn Repository<TestRun> {
        &self.test_runs
    }

    fn drop_rules(&self) -> &dyn Repository<DropRule> {
        &self.drop_rules
    }
}
