//! Core library for `sitekv`.
//!
//! Holds the key-naming convention that scopes every record to a tenant and a
//! record type, the tolerant value decoder, and [`records::RecordStore`] — the
//! get / upsert / delete / list / bundle operations over any
//! [`sitekv_storage::StorageBackend`]. Nothing here knows about HTTP.

pub mod error;
pub mod key;
pub mod records;
pub mod value;

pub use error::RecordError;
pub use key::{RecordType, build_key, prefix_for};
pub use records::RecordStore;
