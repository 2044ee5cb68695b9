//! Shared application state.
//!
//! Built once at startup from an injected storage backend and shared across
//! handlers via `Arc`. The store is the only shared resource; there is no
//! other mutable state between requests.

use std::sync::Arc;

use sitekv_core::RecordStore;
use sitekv_storage::StorageBackend;

/// State passed to every request handler.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Tenant-scoped record operations.
    pub records: RecordStore,
}

impl AppState {
    /// Build state over the given backend.
    #[must_use]
    pub fn new(storage: Arc<dyn StorageBackend>) -> Self {
        Self {
            records: RecordStore::new(storage),
        }
    }
}
