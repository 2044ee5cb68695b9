//! Server configuration for `sitekv`.
//!
//! Loaded from environment variables with defaults suitable for local
//! development. All settings can be overridden via `SITEKV_*` variables.

use std::net::SocketAddr;

/// Default request body cap: 1 MiB.
const DEFAULT_MAX_BODY_BYTES: usize = 1024 * 1024;
const DEFAULT_MAX_CONCURRENT_REQUESTS: usize = 512;

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind the HTTP listener to.
    pub bind_addr: SocketAddr,
    /// Storage backend type.
    pub storage_backend: StorageBackendType,
    /// Log level filter (e.g., `info`, `debug`, `warn`).
    pub log_level: String,
    /// Maximum accepted request body size in bytes.
    pub max_body_bytes: usize,
    /// Maximum number of requests processed at once.
    pub max_concurrent_requests: usize,
    /// Allowed CORS origin. `None` allows any origin.
    pub cors_origin: Option<String>,
}

/// Supported storage backend types.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageBackendType {
    /// In-memory (data lost on restart).
    Memory,
    /// redb single-file storage.
    Redb { path: String },
    /// `RocksDB` storage.
    RocksDb { path: String },
    /// `PostgreSQL` storage.
    Postgres { url: String },
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 8787)),
            storage_backend: StorageBackendType::Memory,
            log_level: "info".to_owned(),
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
            max_concurrent_requests: DEFAULT_MAX_CONCURRENT_REQUESTS,
            cors_origin: None,
        }
    }
}

impl ServerConfig {
    /// Load configuration from the process environment.
    ///
    /// Environment variables:
    /// - `PORT` — port to bind on, all interfaces
    /// - `SITEKV_BIND_ADDR` — full bind address (overrides `PORT`, default: `127.0.0.1:8787`)
    /// - `SITEKV_STORAGE` — `memory`, `redb`, `rocksdb`, or `postgres` (default: `memory`)
    /// - `SITEKV_STORAGE_PATH` — path for on-disk backends (default: `./data`)
    /// - `DATABASE_URL` — `PostgreSQL` connection string for `postgres`
    /// - `SITEKV_LOG_LEVEL` — log filter (default: `info`)
    /// - `SITEKV_MAX_BODY_BYTES` — request body cap (default: 1 MiB)
    /// - `SITEKV_MAX_CONCURRENT_REQUESTS` — in-flight request cap (default: `512`)
    /// - `SITEKV_CORS_ORIGIN` — allowed origin (default: any)
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    #[must_use]
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        // Priority: SITEKV_BIND_ADDR > PORT > default.
        let bind_addr = if let Some(addr) = lookup("SITEKV_BIND_ADDR") {
            addr.parse().unwrap_or(defaults.bind_addr)
        } else if let Some(port) = lookup("PORT").and_then(|p| p.parse::<u16>().ok()) {
            SocketAddr::from(([0, 0, 0, 0], port))
        } else {
            defaults.bind_addr
        };

        let storage_path = lookup("SITEKV_STORAGE_PATH").unwrap_or_else(|| "./data".to_owned());

        let storage_backend = match lookup("SITEKV_STORAGE")
            .unwrap_or_else(|| "memory".to_owned())
            .to_lowercase()
            .as_str()
        {
            "redb" => StorageBackendType::Redb { path: storage_path },
            "rocksdb" => StorageBackendType::RocksDb { path: storage_path },
            "postgres" | "postgresql" => StorageBackendType::Postgres {
                url: lookup("DATABASE_URL")
                    .unwrap_or_else(|| "postgres://localhost/sitekv".to_owned()),
            },
            _ => StorageBackendType::Memory,
        };

        let log_level = lookup("SITEKV_LOG_LEVEL").unwrap_or(defaults.log_level);

        let max_body_bytes = lookup("SITEKV_MAX_BODY_BYTES")
            .and_then(|v| v.parse().ok())
            .unwrap_or(defaults.max_body_bytes);

        let max_concurrent_requests = lookup("SITEKV_MAX_CONCURRENT_REQUESTS")
            .and_then(|v| v.parse().ok())
            .filter(|n: &usize| *n > 0)
            .unwrap_or(defaults.max_concurrent_requests);

        let cors_origin = lookup("SITEKV_CORS_ORIGIN").filter(|v| !v.is_empty() && v != "*");

        Self {
            bind_addr,
            storage_backend,
            log_level,
            max_body_bytes,
            max_concurrent_requests,
            cors_origin,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config(vars: &[(&str, &str)]) -> ServerConfig {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect();
        ServerConfig::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn defaults() {
        let cfg = config(&[]);
        assert_eq!(cfg.bind_addr, SocketAddr::from(([127, 0, 0, 1], 8787)));
        assert_eq!(cfg.storage_backend, StorageBackendType::Memory);
        assert_eq!(cfg.log_level, "info");
        assert_eq!(cfg.max_body_bytes, DEFAULT_MAX_BODY_BYTES);
        assert_eq!(cfg.cors_origin, None);
    }

    #[test]
    fn bind_addr_beats_port() {
        let cfg = config(&[("SITEKV_BIND_ADDR", "10.0.0.1:9000"), ("PORT", "3000")]);
        assert_eq!(cfg.bind_addr, SocketAddr::from(([10, 0, 0, 1], 9000)));

        let cfg = config(&[("PORT", "3000")]);
        assert_eq!(cfg.bind_addr, SocketAddr::from(([0, 0, 0, 0], 3000)));
    }

    #[test]
    fn storage_selection() {
        let cfg = config(&[("SITEKV_STORAGE", "REDB"), ("SITEKV_STORAGE_PATH", "/tmp/r.redb")]);
        assert_eq!(
            cfg.storage_backend,
            StorageBackendType::Redb {
                path: "/tmp/r.redb".to_owned()
            }
        );

        let cfg = config(&[("SITEKV_STORAGE", "postgres"), ("DATABASE_URL", "postgres://db/x")]);
        assert_eq!(
            cfg.storage_backend,
            StorageBackendType::Postgres {
                url: "postgres://db/x".to_owned()
            }
        );

        let cfg = config(&[("SITEKV_STORAGE", "bogus")]);
        assert_eq!(cfg.storage_backend, StorageBackendType::Memory);
    }

    #[test]
    fn invalid_numbers_fall_back() {
        let cfg = config(&[
            ("SITEKV_MAX_BODY_BYTES", "lots"),
            ("SITEKV_MAX_CONCURRENT_REQUESTS", "0"),
        ]);
        assert_eq!(cfg.max_body_bytes, DEFAULT_MAX_BODY_BYTES);
        assert_eq!(cfg.max_concurrent_requests, DEFAULT_MAX_CONCURRENT_REQUESTS);
    }

    #[test]
    fn wildcard_cors_means_any() {
        assert_eq!(config(&[("SITEKV_CORS_ORIGIN", "*")]).cors_origin, None);
        assert_eq!(
            config(&[("SITEKV_CORS_ORIGIN", "https://admin.example.com")]).cors_origin,
            Some("https://admin.example.com".to_owned())
        );
    }
}
