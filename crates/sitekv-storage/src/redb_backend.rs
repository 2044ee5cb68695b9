//! Pure-Rust redb storage backend.
//!
//! The persistent default for single-node deployments: no C++ toolchain,
//! one file on disk. Feature-gated behind `redb-backend`.
//!
//! redb is a B-tree, so prefix listing is a range scan that stops at the
//! first key outside the prefix. All operations are transactional.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use redb::{Database, ReadableTable, TableDefinition};

use crate::{StorageBackend, StorageError};

/// The single table holding every record. Namespacing lives in the key.
const RECORDS: TableDefinition<&str, &str> = TableDefinition::new("records");

/// A storage backend backed by a redb database file.
///
/// Thread-safe via `Arc<Database>`. Blocking redb calls are offloaded to the
/// Tokio blocking thread pool.
///
/// # Examples
///
/// ```no_run
/// # use sitekv_storage::RedbBackend;
/// let backend = RedbBackend::open("/var/lib/sitekv/records.redb").unwrap();
/// ```
#[derive(Clone)]
pub struct RedbBackend {
    db: Arc<Database>,
    path: PathBuf,
}

impl std::fmt::Debug for RedbBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedbBackend")
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

fn txn_err(e: impl std::fmt::Display) -> StorageError {
    StorageError::Transaction {
        reason: e.to_string(),
    }
}

fn table_err(e: impl std::fmt::Display) -> StorageError {
    StorageError::MissingTable {
        name: format!("records: {e}"),
    }
}

impl RedbBackend {
    /// Open or create a redb database at the given path.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Open`] if redb fails to open or create the
    /// database file, or a transaction error if the records table cannot be
    /// created.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StorageError> {
        let path = path.as_ref();
        let db = Database::create(path).map_err(|e| StorageError::Open {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;

        // Opening the table in a write txn creates it if missing.
        let txn = db.begin_write().map_err(txn_err)?;
        {
            let _table = txn.open_table(RECORDS).map_err(table_err)?;
        }
        txn.commit().map_err(txn_err)?;
        tracing::debug!(path = %path.display(), "opened redb database");

        Ok(Self {
            db: Arc::new(db),
            path: path.to_path_buf(),
        })
    }
}

#[async_trait::async_trait]
impl StorageBackend for RedbBackend {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let db = Arc::clone(&self.db);
        let key = key.to_owned();
        tokio::task::spawn_blocking(move || {
            let txn = db.begin_read().map_err(txn_err)?;
            let table = txn.open_table(RECORDS).map_err(table_err)?;
            let value = table
                .get(key.as_str())
                .map_err(|e| StorageError::Read {
                    key: key.clone(),
                    reason: e.to_string(),
                })?
                .map(|v| v.value().to_owned());
            Ok(value)
        })
        .await
        .map_err(|e| StorageError::Read {
            key: String::new(),
            reason: format!("blocking task panicked: {e}"),
        })?
    }

    async fn put(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let db = Arc::clone(&self.db);
        let key = key.to_owned();
        let value = value.to_owned();
        tokio::task::spawn_blocking(move || {
            let txn = db.begin_write().map_err(txn_err)?;
            {
                let mut table = txn.open_table(RECORDS).map_err(table_err)?;
                table
                    .insert(key.as_str(), value.as_str())
                    .map_err(|e| StorageError::Write {
                        key: key.clone(),
                        reason: e.to_string(),
                    })?;
            }
            txn.commit().map_err(txn_err)?;
            Ok(())
        })
        .await
        .map_err(|e| StorageError::Write {
            key: String::new(),
            reason: format!("blocking task panicked: {e}"),
        })?
    }

    async fn delete(&self, key: &str) -> Result<(), StorageError> {
        let db = Arc::clone(&self.db);
        let key = key.to_owned();
        tokio::task::spawn_blocking(move || {
            let txn = db.begin_write().map_err(txn_err)?;
            {
                let mut table = txn.open_table(RECORDS).map_err(table_err)?;
                table
                    .remove(key.as_str())
                    .map_err(|e| StorageError::Delete {
                        key: key.clone(),
                        reason: e.to_string(),
                    })?;
            }
            txn.commit().map_err(txn_err)?;
            Ok(())
        })
        .await
        .map_err(|e| StorageError::Delete {
            key: String::new(),
            reason: format!("blocking task panicked: {e}"),
        })?
    }

    async fn list(&self, prefix: &str) -> Result<Vec<String>, StorageError> {
        let db = Arc::clone(&self.db);
        let prefix = prefix.to_owned();
        tokio::task::spawn_blocking(move || {
            let txn = db.begin_read().map_err(txn_err)?;
            let table = txn.open_table(RECORDS).map_err(table_err)?;

            let list_err = |e: redb::StorageError| StorageError::List {
                prefix: prefix.clone(),
                reason: e.to_string(),
            };

            let mut keys = Vec::new();
            for item in table.range(prefix.as_str()..).map_err(list_err)? {
                let (k, _) = item.map_err(list_err)?;
                let key = k.value();
                if !key.starts_with(&prefix) {
                    break;
                }
                keys.push(key.to_owned());
            }
            Ok(keys)
        })
        .await
        .map_err(|e| StorageError::List {
            prefix: String::new(),
            reason: format!("blocking task panicked: {e}"),
        })?
    }
}
