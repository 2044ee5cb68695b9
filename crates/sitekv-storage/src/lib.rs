//! Storage backend abstraction for `sitekv`.
//!
//! This crate defines the [`StorageBackend`] trait — the minimal key-value
//! capability set the record service needs: point reads, whole-value writes,
//! deletes, and prefix listing. It knows nothing about tenants, record types,
//! or JSON; key shape is decided one layer up in `sitekv-core`.
//!
//! Implementations:
//!
//! - [`MemoryBackend`] — in-memory, for tests and local development
//! - [`RedbBackend`] — pure-Rust persistent store (feature `redb-backend`)
//! - [`RocksDbBackend`] — `RocksDB` persistent store (feature `rocksdb-backend`)
//! - [`PostgresBackend`] — single-table `PostgreSQL` store (feature `postgres-backend`)

mod error;
mod memory;
#[cfg(feature = "postgres-backend")]
mod postgres_backend;
#[cfg(feature = "redb-backend")]
mod redb_backend;
#[cfg(feature = "rocksdb-backend")]
mod rocksdb_backend;

pub use error::StorageError;
pub use memory::MemoryBackend;
#[cfg(feature = "postgres-backend")]
pub use postgres_backend::PostgresBackend;
#[cfg(feature = "redb-backend")]
pub use redb_backend::RedbBackend;
#[cfg(feature = "rocksdb-backend")]
pub use rocksdb_backend::RocksDbBackend;

/// A pluggable key-value storage backend.
///
/// Keys are UTF-8 strings using `:` as a namespace separator (e.g.
/// `site1:page:about`, `site1:navigation`). Values are raw strings, normally
/// serialized JSON documents; the backend never inspects them.
///
/// Implementations must be safe to share across async tasks (`Send + Sync`).
/// Concurrent writes to the same key are last-write-wins.
#[async_trait::async_trait]
pub trait StorageBackend: Send + Sync + 'static {
    /// Retrieve a value by key.
    ///
    /// Returns `Ok(None)` if the key does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Read`] if the underlying backend fails.
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Store a key-value pair, overwriting any existing value.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Write`] if the underlying backend fails.
    async fn put(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Delete a key. Deleting a non-existent key is not an error.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Delete`] if the underlying backend fails.
    async fn delete(&self, key: &str) -> Result<(), StorageError>;

    /// List all keys that start with the given prefix, in the backend's
    /// native order.
    ///
    /// Returns keys only, not values.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::List`] if the underlying backend fails.
    async fn list(&self, prefix: &str) -> Result<Vec<String>, StorageError>;

    /// Check whether a key exists in storage.
    ///
    /// The default implementation calls [`get`](StorageBackend::get) and checks
    /// for `Some`. Backends may override this with a cheaper check.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Read`] if the underlying backend fails.
    async fn exists(&self, key: &str) -> Result<bool, StorageError> {
        Ok(self.get(key).await?.is_some())
    }
}
