//! Fault-injecting data store.

use std::fmt;

use async_trait::async_trait;
use parking_lot::Mutex;
use rgate_core::{Account, DropRule, GatePolicy, SecurityRun, TestRun};
use rgate_store::{DataStore, Entity, MemoryRepository, Repository, StoreError, StoreResult};

/// Repository operations that can be made to fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    FindAll,
    FindById,
    Create,
    Update,
    Delete,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::FindAll => "find_all",
            Self::FindById => "find_by_id",
            Self::Create => "create",
            Self::Update => "update",
            Self::Delete => "delete",
        };
        f.write_str(name)
    }
}

/// In-memory repository that returns a backend error for selected operations.
#[derive(Debug)]
pub struct FaultyRepository<T> {
    inner: MemoryRepository<T>,
    failing: Mutex<Vec<Operation>>,
}

impl<T: Entity> Default for FaultyRepository<T> {
    fn default() -> Self {
        Self::from_inner(MemoryRepository::new())
    }
}

impl<T: Entity> FaultyRepository<T> {
    #[must_use]
    pub fn from_inner(inner: MemoryRepository<T>) -> Self {
        Self {
            inner,
            failing: Mutex::new(Vec::new()),
        }
    }

    /// Make `op` fail from now on.
    pub fn fail_on(&self, op: Operation) {
        let mut failing = self.failing.lock();
        if !failing.contains(&op) {
            failing.push(op);
        }
    }

    /// Stop injecting failures.
    pub fn heal(&self) {
        self.failing.lock().clear();
    }

    fn check(&self, op: Operation) -> StoreResult<()> {
        if self.failing.lock().contains(&op) {
            return Err(StoreError::Backend(format!(
                "injected {op} failure on {}",
                T::COLLECTION
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl<T: Entity> Repository<T> for FaultyRepository<T> {
    async fn find_all(&self) -> StoreResult<Vec<T>> {
        self.check(Operation::FindAll)?;
        self.inner.find_all().await
    }

    async fn find_by_id(&self, id: &str) -> StoreResult<Option<T>> {
        self.check(Operation::FindById)?;
        self.inner.find_by_id(id).await
    }

    async fn create(&self, entity: T) -> StoreResult<T> {
        self.check(Operation::Create)?;
        self.inner.create(entity).await
    }

    async fn update(&self, entity: T) -> StoreResult<T> {
        self.check(Operation::Update)?;
        self.inner.update(entity).await
    }

    async fn delete(&self, id: &str) -> StoreResult<()> {
        self.check(Operation::Delete)?;
        self.inner.delete(id).await
    }
}

/// [`DataStore`] whose collections can each be told to fail.
#[derive(Debug, Default)]
pub struct FaultyStore {
    pub accounts: FaultyRepository<Account>,
    pub gate_policies: FaultyRepository<GatePolicy>,
    pub security_runs: FaultyRepository<SecurityRun>,
    pub test_runs: FaultyRepository<TestRun>,
    pub drop_rules: FaultyRepository<DropRule>,
}

impl FaultyStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_policies(mut self, policies: impl IntoIterator<Item = GatePolicy>) -> Self {
        self.gate_policies =
            FaultyRepository::from_inner(MemoryRepository::from_entities(policies));
        self
    }
}

impl DataStore for FaultyStore {
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
