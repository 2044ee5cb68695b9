//! `RocksDB` storage backend.
//!
//! Keys and values are UTF-8 strings written as raw bytes. `RocksDB` keeps
//! keys sorted, so a prefix listing seeks to the prefix and reads forward
//! until the first key outside it. Every call runs on the Tokio blocking
//! pool; the C++ library never blocks a runtime worker.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use rocksdb::{DBWithThreadMode, Direction, IteratorMode, MultiThreaded, Options};

use crate::{StorageBackend, StorageError};

type Db = DBWithThreadMode<MultiThreaded>;

/// A storage backend backed by a `RocksDB` directory.
///
/// # Examples
///
/// ```no_run
/// # use sitekv_storage::RocksDbBackend;
/// let backend = RocksDbBackend::open("/var/lib/sitekv/rocks").unwrap();
/// ```
#[derive(Clone)]
pub struct RocksDbBackend {
    db: Arc<Db>,
    path: PathBuf,
}

impl std::fmt::Debug for RocksDbBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RocksDbBackend")
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

fn value_string(key: &str, bytes: Vec<u8>) -> Result<String, StorageError> {
    String::from_utf8(bytes).map_err(|e| StorageError::InvalidEncoding {
        key: key.to_owned(),
        reason: e.utf8_error().to_string(),
    })
}

fn key_string(bytes: Box<[u8]>) -> Result<String, StorageError> {
    String::from_utf8(bytes.into_vec()).map_err(|e| StorageError::InvalidEncoding {
        key: String::from_utf8_lossy(e.as_bytes()).into_owned(),
        reason: e.utf8_error().to_string(),
    })
}

impl RocksDbBackend {
    /// Open the database directory at `path`, creating it if missing.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Open`] if `RocksDB` cannot open or create it,
    /// including when another process holds its lock.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StorageError> {
        let path = path.as_ref();
        let mut opts = Options::default();
        opts.create_if_missing(true);

        let db = Db::open(&opts, path).map_err(|e| StorageError::Open {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        tracing::debug!(path = %path.display(), "opened RocksDB database");

        Ok(Self {
            db: Arc::new(db),
            path: path.to_path_buf(),
        })
    }

    /// Run `op` against the database on the blocking pool.
    async fn with_db<T, F>(&self, op: F) -> Result<T, StorageError>
    where
        T: Send + 'static,
        F: FnOnce(&Db) -> Result<T, StorageError> + Send + 'static,
    {
        let db = Arc::clone(&self.db);
        tokio::task::spawn_blocking(move || op(&db))
            .await
            .map_err(|e| StorageError::Transaction {
                reason: format!("blocking RocksDB task failed: {e}"),
            })?
    }
}

#[async_trait::async_trait]
impl StorageBackend for RocksDbBackend {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let key = key.to_owned();
        self.with_db(move |db| {
            let raw = db.get(key.as_bytes()).map_err(|e| StorageError::Read {
                key: key.clone(),
                reason: e.to_string(),
            })?;
            raw.map(|bytes| value_string(&key, bytes)).transpose()
        })
        .await
    }

    async fn put(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let key = key.to_owned();
        let value = value.to_owned();
        self.with_db(move |db| {
            db.put(key.as_bytes(), value.as_bytes())
                .map_err(|e| StorageError::Write {
                    key,
                    reason: e.to_string(),
                })
        })
        .await
    }

    async fn delete(&self, key: &str) -> Result<(), StorageError> {
        let key = key.to_owned();
        self.with_db(move |db| {
            db.delete(key.as_bytes()).map_err(|e| StorageError::Delete {
                key,
                reason: e.to_string(),
            })
        })
        .await
    }

    async fn list(&self, prefix: &str) -> Result<Vec<String>, StorageError> {
        let prefix = prefix.to_owned();
        self.with_db(move |db| {
            let mut keys = Vec::new();
            for item in db.iterator(IteratorMode::From(prefix.as_bytes(), Direction::Forward)) {
                let (key, _) = item.map_err(|e| StorageError::List {
                    prefix: prefix.clone(),
                    reason: e.to_string(),
                })?;
                if !key.starts_with(prefix.as_bytes()) {
                    break;
                }
                keys.push(key_string(key)?);
            }
            Ok(keys)
        })
        .await
    }

    // Pinned read: no copy and no UTF-8 check just to test presence.
    async fn exists(&self, key: &str) -> Result<bool, StorageError> {
        let key = key.to_owned();
        self.with_db(move |db| {
            db.get_pinned(key.as_bytes())
                .map(|slice| slice.is_some())
                .map_err(|e| StorageError::Read {
                    key,
                    reason: e.to_string(),
                })
        })
        .await
    }
}
