//! Error types for `sitekv-core`.

use sitekv_storage::StorageError;

use crate::key::RecordType;

/// Errors from record operations.
#[derive(Debug, thiserror::Error)]
pub enum RecordError {
    /// The addressed record does not exist.
    #[error("{} not found", .record_type.label())]
    NotFound {
        /// Type of the missing record.
        record_type: RecordType,
        /// Canonical key that was looked up.
        key: String,
    },

    /// The caller supplied an unusable tenant id, identifier, or document.
    #[error("invalid request: {reason}")]
    InvalidRequest { reason: String },

    /// A document could not be serialized for storage.
    #[error("serialization failed: {reason}")]
    Serialization { reason: String },

    /// The underlying storage backend returned an error.
    #[error("record storage error: {0}")]
    Storage(#[from] StorageError),
}

impl RecordError {
    pub(crate) fn invalid(reason: impl Into<String>) -> Self {
        Self::InvalidRequest {
            reason: reason.into(),
        }
    }
}
