//! Durable string key-value storage
//!
//! The services only ever need three primitives over string keys:
//! `get`, `set`, `remove`. Everything typed goes through the codec
//! helpers below, so there is exactly one serialization boundary and
//! records are validated on read, not just on write.
//!
//! Two backends:
//!
//! - [`MemoryStore`] - process-local, used by tests and defaults
//! - [`RedbStore`] - redb-backed durable storage

mod memory;
mod redb;

pub use memory::MemoryStore;
pub use redb::RedbStore;

use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

/// Storage errors
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] ::redb::DatabaseError),

    #[error("Transaction error: {0}")]
    Transaction(#[from] ::redb::TransactionError),

    #[error("Table error: {0}")]
    Table(#[from] ::redb::TableError),

    #[error("Storage error: {0}")]
    Storage(#[from] ::redb::StorageError),

    #[error("Commit error: {0}")]
    Commit(#[from] ::redb::CommitError),

    #[error("Serialization error: {0}")]
    Codec(#[from] serde_json::Error),

    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Durable string key-value store
///
/// Implementations must be safe to share across tasks; the intended
/// usage pattern has each collection key owned by exactly one service.
pub trait KvStore: Send + Sync {
    fn get(&self, key: &str) -> StoreResult<Option<String>>;
    fn set(&self, key: &str, value: &str) -> StoreResult<()>;
    fn remove(&self, key: &str) -> StoreResult<()>;
}

// ========== Typed codec boundary ==========

/// Read a record list from `key`; a missing key is an empty list
pub fn read_list<T: DeserializeOwned>(store: &dyn KvStore, key: &str) -> StoreResult<Vec<T>> {
    match store.get(key)? {
        Some(raw) => Ok(serde_json::from_str(&raw)?),
        None => Ok(Vec::new()),
    }
}

/// Persist a record list under `key`
pub fn write_list<T: Serialize>(store: &dyn KvStore, key: &str, items: &[T]) -> StoreResult<()> {
    store.set(key, &serde_json::to_string(items)?)
}

/// Read a single optional record from `key`
pub fn read_opt<T: DeserializeOwned>(store: &dyn KvStore, key: &str) -> StoreResult<Option<T>> {
    match store.get(key)? {
        Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
        None => Ok(None),
    }
}

/// Persist a single record under `key`
pub fn write_opt<T: Serialize>(store: &dyn KvStore, key: &str, value: &T) -> StoreResult<()> {
    store.set(key, &serde_json::to_string(value)?)
}
