//! `sitekv` server entry point.
//!
//! Loads configuration, opens the storage backend, and serves the record API
//! with graceful shutdown on SIGINT/SIGTERM.

use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;
use tracing::info;

use sitekv_server::config::{ServerConfig, StorageBackendType};
use sitekv_server::state::AppState;
use sitekv_storage::{MemoryBackend, StorageBackend};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ServerConfig::from_env();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.log_level)),
        )
        .json()
        .init();

    info!(storage = ?redacted(&config.storage_backend), "sitekv starting");

    let storage = open_storage(&config.storage_backend).await?;
    let state = Arc::new(AppState::new(storage));
    let app = sitekv_server::build_router(state, &config);

    let listener = TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("failed to bind to {}", config.bind_addr))?;

    info!(addr = %config.bind_addr, "sitekv listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("sitekv stopped");
    Ok(())
}

/// Storage description safe to log.
fn redacted(backend: &StorageBackendType) -> StorageBackendType {
    match backend {
        StorageBackendType::Postgres { .. } => StorageBackendType::Postgres {
            url: "[redacted]".to_owned(),
        },
        other => other.clone(),
    }
}

async fn open_storage(backend: &StorageBackendType) -> anyhow::Result<Arc<dyn StorageBackend>> {
    let storage: Arc<dyn StorageBackend> = match backend {
        StorageBackendType::Memory => {
            info!("using in-memory storage (data will not persist)");
            Arc::new(MemoryBackend::new())
        }
        #[cfg(feature = "redb-backend")]
        StorageBackendType::Redb { path } => {
            info!(path = %path, "using redb storage");
            Arc::new(sitekv_storage::RedbBackend::open(path).context("failed to open redb storage")?)
        }
        #[cfg(not(feature = "redb-backend"))]
        StorageBackendType::Redb { .. } => {
            anyhow::bail!("redb backend requested but feature 'redb-backend' is not enabled");
        }
        #[cfg(feature = "rocksdb-backend")]
        StorageBackendType::RocksDb { path } => {
            info!(path = %path, "using RocksDB storage");
            Arc::new(
                sitekv_storage::RocksDbBackend::open(path)
                    .context("failed to open RocksDB storage")?,
            )
        }
        #[cfg(not(feature = "rocksdb-backend"))]
        StorageBackendType::RocksDb { .. } => {
            anyhow::bail!("RocksDB backend requested but feature 'rocksdb-backend' is not enabled");
        }
        #[cfg(feature = "postgres-backend")]
        StorageBackendType::Postgres { url } => {
            info!("using PostgreSQL storage");
            Arc::new(
                sitekv_storage::PostgresBackend::connect(url)
                    .await
                    .context("failed to connect to PostgreSQL storage")?,
            )
        }
        #[cfg(not(feature = "postgres-backend"))]
        StorageBackendType::Postgres { .. } => {
            anyhow::bail!(
                "PostgreSQL backend requested but feature 'postgres-backend' is not enabled"
            );
        }
    };
    Ok(storage)
}

/// Wait for SIGINT or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c().await.ok();
    };

    #[cfg(unix)]
    let terminate = async {
        if let Ok(mut sig) =
            tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
        {
            sig.recv().await;
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    info!("shutdown signal received, stopping server");
}
