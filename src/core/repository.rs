use std::collections::HashMap;
use std::env;
use std::fmt;
use std::fmt::{Display, Formatter};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use crate::core::domain::Identifiable;
use crate::core::library::{LibraryError, LibraryResult, PageRequest, Pagination};

#[cfg(test)]
use mockall::automock;

#[cfg_attr(test, automock)]
#[async_trait]
pub trait Repository<Entity: Send + Sync + 'static>: Sync + Send {
    // get an entity by id, None when it does not exist
    async fn get(&self, id: i64) -> LibraryResult<Option<Entity>>;

    // checks existence without loading the entity
    async fn exists(&self, id: i64) -> LibraryResult<bool>;

    // allocates identity for a new entity
    async fn next_id(&self) -> LibraryResult<i64>;

    // page of entities matching all predicate attributes, sorted per the page request
    async fn query(&self, predicate: &HashMap<String, String>,
                   page: &PageRequest) -> LibraryResult<Pagination<Entity>>;

    // applies all writes atomically, returns number of written entities
    async fn commit(&self, writes: Vec<WriteOp<Entity>>, token: &CancellationToken) -> LibraryResult<usize>;
}

// WriteOp is a single mutation staged inside a transaction scope
#[derive(Debug, Clone, PartialEq)]
pub enum WriteOp<Entity> {
    Add(Entity),
    Update(Entity),
    Delete(Entity),
}

impl<Entity: Identifiable> WriteOp<Entity> {
    pub fn id(&self) -> i64 {
        self.entity().id()
    }

    pub fn entity(&self) -> &Entity {
        match self {
            WriteOp::Add(e) => e,
            WriteOp::Update(e) => e,
            WriteOp::Delete(e) => e,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            WriteOp::Add(_) => "add",
            WriteOp::Update(_) => "update",
            WriteOp::Delete(_) => "delete",
        }
    }
}

// TransactionScope stages writes and hands them to the repository as one atomic commit.
// A scope dropped without being committed discards its writes.
pub struct TransactionScope<'a, Entity: Identifiable + 'static> {
    repository: &'a dyn Repository<Entity>,
    writes: Vec<WriteOp<Entity>>,
    completed: bool,
}

impl<'a, Entity: Identifiable + 'static> TransactionScope<'a, Entity> {
    pub fn begin(repository: &'a dyn Repository<Entity>) -> Self {
        Self {
            repository,
            writes: vec![],
            completed: false,
        }
    }

    pub fn add(&mut self, entity: Entity) {
        self.writes.push(WriteOp::Add(entity));
    }

    pub fn update(&mut self, entity: Entity) {
        self.writes.push(WriteOp::Update(entity));
    }

    pub fn delete(&mut self, entity: Entity) {
        self.writes.push(WriteOp::Delete(entity));
    }

    pub fn staged(&self) -> usize {
        self.writes.len()
    }

    pub async fn commit(mut self, token: &CancellationToken) -> LibraryResult<usize> {
        self.completed = true;
        if token.is_cancelled() {
            warn!(staged = self.writes.len(), "transaction cancelled before commit");
            return Err(LibraryError::cancelled("transaction cancelled before commit"));
        }
        if self.writes.is_empty() {
            return Ok(0);
        }
        let writes = std::mem::take(&mut self.writes);
        let summary: Vec<String> = writes.iter()
            .map(|w| format!("{}:{}", w.kind(), w.id()))
            .collect();
        match self.repository.commit(writes, token).await {
            Ok(size) => {
                info!(writes = ?summary, "transaction committed");
                Ok(size)
            }
            Err(err) => {
                warn!(writes = ?summary, error = %err, "transaction rolled back");
                Err(err)
            }
        }
    }
}

impl<Entity: Identifiable + 'static> Drop for TransactionScope<'_, Entity> {
    fn drop(&mut self) {
        if !self.completed {
            warn!(staged = self.writes.len(), "transaction aborted without commit");
        }
    }
}

// Runs `action` against a fresh scope and commits what it staged. An error from the
// action aborts the scope and nothing reaches the repository.
pub async fn execute_transaction<Entity, F>(repository: &dyn Repository<Entity>,
                                            token: &CancellationToken,
                                            action: F) -> LibraryResult<usize>
    where Entity: Identifiable + 'static,
          F: FnOnce(&mut TransactionScope<'_, Entity>) -> LibraryResult<()> + Send {
    let mut scope = TransactionScope::begin(repository);
    action(&mut scope)?;
    scope.commit(token).await
}

#[derive(Debug, PartialEq, Serialize, Deserialize, Clone, Copy)]
pub enum RepositoryStore {
    Memory,
    DynamoDB,
    LocalDynamoDB,
}

impl RepositoryStore {
    // Reads CATALOG_STORE, defaulting to the in-memory store.
    pub fn from_env() -> Self {
        env::var("CATALOG_STORE").map(RepositoryStore::from).unwrap_or(RepositoryStore::Memory)
    }
}

impl From<String> for RepositoryStore {
    fn from(s: String) -> Self {
        match s.as_str() {
            "DynamoDB" => RepositoryStore::DynamoDB,
            "LocalDynamoDB" => RepositoryStore::LocalDynamoDB,
            _ => RepositoryStore::Memory,
        }
    }
}

impl Display for RepositoryStore {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            RepositoryStore::Memory => write!(f, "Memory"),
            RepositoryStore::DynamoDB => write!(f, "DynamoDB"),
            RepositoryStore::LocalDynamoDB => write!(f, "LocalDynamoDB"),
        }
    }
}
