//! `PostgreSQL` storage backend.
//!
//! Stores every record in a single `site_records` table. Listing uses a
//! `text_pattern_ops` index so prefix scans stay index-backed. `LIKE`
//! metacharacters in the prefix are escaped before the query.
//!
//! Feature-gated behind `postgres-backend`.

use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

use crate::{StorageBackend, StorageError};

/// A storage backend backed by `PostgreSQL`.
///
/// # Examples
///
/// ```no_run
/// # use sitekv_storage::PostgresBackend;
/// # #[tokio::main]
/// # async fn main() {
/// let backend = PostgresBackend::connect("postgres://localhost/sitekv").await.unwrap();
/// # }
/// ```
#[derive(Clone)]
pub struct PostgresBackend {
    pool: PgPool,
}

impl std::fmt::Debug for PostgresBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PostgresBackend")
            .field("pool", &"[PgPool]")
            .finish_non_exhaustive()
    }
}

/// Escape `%`, `_` and `\` so the prefix matches literally under `LIKE`.
fn like_prefix(prefix: &str) -> String {
    let mut pattern = String::with_capacity(prefix.len() + 1);
    for c in prefix.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

impl PostgresBackend {
    /// Connect to `PostgreSQL` and create the records table if needed.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Open`] if the connection or migration fails.
    pub async fn connect(database_url: &str) -> Result<Self, StorageError> {
        let open_err = |reason: String| StorageError::Open {
            path: "[redacted]".to_owned(),
            reason,
        };

        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect(database_url)
            .await
            .map_err(|e| open_err(e.to_string()))?;

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS site_records (\
                key   TEXT PRIMARY KEY, \
                value TEXT NOT NULL\
            )",
        )
        .execute(&pool)
        .await
        .map_err(|e| open_err(format!("migration failed: {e}")))?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_site_records_key_prefix \
             ON site_records (key text_pattern_ops)",
        )
        .execute(&pool)
        .await
        .map_err(|e| open_err(format!("index creation failed: {e}")))?;

        Ok(Self { pool })
    }
}

#[async_trait::async_trait]
impl StorageBackend for PostgresBackend {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let row: Option<(String,)> = sqlx::query_as("SELECT value FROM site_records WHERE key = $1")
            .bind(key)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| StorageError::Read {
                key: key.to_owned(),
                reason: e.to_string(),
            })?;

        Ok(row.map(|(v,)| v))
    }

    async fn put(&self, key: &str, value: &str) -> Result<(), StorageError> {
        sqlx::query(
            "INSERT INTO site_records (key, value) VALUES ($1, $2) \
             ON CONFLICT (key) DO UPDATE SET value = EXCLUDED.value",
        )
        .bind(key)
        .bind(value)
        .execute(&self.pool)
        .await
        .map_err(|e| StorageError::Write {
            key: key.to_owned(),
            reason: e.to_string(),
        })?;

        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), StorageError> {
        sqlx::query("DELETE FROM site_records WHERE key = $1")
            .bind(key)
            .execute(&self.pool)
            .await
            .map_err(|e| StorageError::Delete {
                key: key.to_owned(),
                reason: e.to_string(),
            })?;

        Ok(())
    }

    async fn list(&self, prefix: &str) -> Result<Vec<String>, StorageError> {
        let rows: Vec<(String,)> =
            sqlx::query_as("SELECT key FROM site_records WHERE key LIKE $1 ORDER BY key")
                .bind(like_prefix(prefix))
                .fetch_all(&self.pool)
                .await
                .map_err(|e| StorageError::List {
                    prefix: prefix.to_owned(),
                    reason: e.to_string(),
                })?;

        Ok(rows.into_iter().map(|(k,)| k).collect())
    }

    async fn exists(&self, key: &str) -> Result<bool, StorageError> {
        let (found,): (bool,) =
            sqlx::query_as("SELECT EXISTS(SELECT 1 FROM site_records WHERE key = $1)")
                .bind(key)
                .fetch_one(&self.pool)
                .await
                .map_err(|e| StorageError::Read {
                    key: key.to_owned(),
                    reason: e.to_string(),
                })?;

        Ok(found)
    }
}
