//! Record operations over a storage backend.
//!
//! [`RecordStore`] is the whole data path of the service: it resolves
//! canonical keys through [`build_key`], reads with tolerant decoding, writes
//! whole documents, deletes with an existence check, and fans out concurrent
//! reads for listings and bundles. It holds no state besides the injected
//! backend, so it is cheap to clone into every request.

use std::sync::Arc;

use futures::future::try_join_all;
use serde_json::Value;
use sitekv_storage::StorageBackend;
use tracing::{debug, info};

use crate::error::RecordError;
use crate::key::{RecordType, SEPARATOR, build_key, prefix_for};
use crate::value::{self, Bundle, ListedRecord};

/// Tenant-scoped record access over an injected [`StorageBackend`].
#[derive(Clone)]
pub struct RecordStore {
    storage: Arc<dyn StorageBackend>,
}

impl std::fmt::Debug for RecordStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecordStore").finish_non_exhaustive()
    }
}

fn validate_tenant(tenant_id: &str) -> Result<(), RecordError> {
    if tenant_id.trim().is_empty() {
        return Err(RecordError::invalid("tenant id must not be empty"));
    }
    if tenant_id.contains(SEPARATOR) {
        return Err(RecordError::invalid(format!(
            "tenant id must not contain '{SEPARATOR}'"
        )));
    }
    Ok(())
}

fn validate_identifier(record_type: RecordType, identifier: &str) -> Result<(), RecordError> {
    if identifier.trim().is_empty() {
        return Err(RecordError::invalid(format!(
            "{record_type} identifier must not be empty"
        )));
    }
    Ok(())
}

fn require_singleton(record_type: RecordType) -> Result<(), RecordError> {
    if record_type.is_singleton() {
        Ok(())
    } else {
        Err(RecordError::invalid(format!(
            "{record_type} is not a singleton record type"
        )))
    }
}

fn require_identified(record_type: RecordType) -> Result<(), RecordError> {
    if record_type.is_singleton() {
        Err(RecordError::invalid(format!(
            "{record_type} is a singleton record type"
        )))
    } else {
        Ok(())
    }
}

impl RecordStore {
    /// Create a record store over the given backend.
    #[must_use]
    pub fn new(storage: Arc<dyn StorageBackend>) -> Self {
        Self { storage }
    }

    /// Resolve the key of an identified record.
    ///
    /// Without a tenant the identifier must already be a full key and is used
    /// as-is.
    fn identified_key(
        record_type: RecordType,
        tenant_id: Option<&str>,
        identifier: &str,
    ) -> Result<String, RecordError> {
        require_identified(record_type)?;
        validate_identifier(record_type, identifier)?;
        match tenant_id {
            Some(tenant) => {
                validate_tenant(tenant)?;
                Ok(build_key(tenant, record_type, Some(identifier)))
            }
            None => Ok(identifier.to_owned()),
        }
    }

    /// Read an identified record (page, product).
    ///
    /// # Errors
    ///
    /// - [`RecordError::NotFound`] if the key is absent.
    /// - [`RecordError::InvalidRequest`] for an empty identifier or bad tenant.
    /// - [`RecordError::Storage`] if the backend fails.
    pub async fn get(
        &self,
        record_type: RecordType,
        tenant_id: Option<&str>,
        identifier: &str,
    ) -> Result<Value, RecordError> {
        let key = Self::identified_key(record_type, tenant_id, identifier)?;
        debug!(key = %key, "reading record");
        let Some(raw) = self.storage.get(&key).await? else {
            return Err(RecordError::NotFound { record_type, key });
        };
        Ok(value::decode(&raw))
    }

    /// Read a singleton record (navigation, footer).
    ///
    /// Absence is `Ok(None)`: an unconfigured singleton is a normal state.
    ///
    /// # Errors
    ///
    /// Returns [`RecordError::InvalidRequest`] for a bad tenant id and
    /// [`RecordError::Storage`] if the backend fails.
    pub async fn get_singleton(
        &self,
        record_type: RecordType,
        tenant_id: &str,
    ) -> Result<Option<Value>, RecordError> {
        require_singleton(record_type)?;
        validate_tenant(tenant_id)?;
        let key = build_key(tenant_id, record_type, None);
        debug!(key = %key, "reading singleton record");
        let raw = self.storage.get(&key).await?;
        Ok(raw.as_deref().map(value::decode))
    }

    /// Create or replace an identified record. Returns the canonical key.
    ///
    /// # Errors
    ///
    /// Returns [`RecordError::InvalidRequest`] for bad input and
    /// [`RecordError::Storage`] if the write fails.
    pub async fn put(
        &self,
        record_type: RecordType,
        tenant_id: &str,
        identifier: &str,
        document: &Value,
    ) -> Result<String, RecordError> {
        let key = Self::identified_key(record_type, Some(tenant_id), identifier)?;
        self.write(key, document).await
    }

    /// Create or replace a singleton record. Returns the canonical key.
    ///
    /// # Errors
    ///
    /// Returns [`RecordError::InvalidRequest`] for bad input and
    /// [`RecordError::Storage`] if the write fails.
    pub async fn put_singleton(
        &self,
        record_type: RecordType,
        tenant_id: &str,
        document: &Value,
    ) -> Result<String, RecordError> {
        require_singleton(record_type)?;
        validate_tenant(tenant_id)?;
        self.write(build_key(tenant_id, record_type, None), document)
            .await
    }

    async fn write(&self, key: String, document: &Value) -> Result<String, RecordError> {
        let raw = value::encode(document)?;
        self.storage.put(&key, &raw).await?;
        info!(key = %key, bytes = raw.len(), "record written");
        Ok(key)
    }

    /// Delete an identified record. Returns the deleted key.
    ///
    /// The key is checked first; a missing record is reported instead of
    /// silently succeeding, and the store is not touched.
    ///
    /// # Errors
    ///
    /// - [`RecordError::NotFound`] if the key is absent.
    /// - [`RecordError::InvalidRequest`] for bad input.
    /// - [`RecordError::Storage`] if the backend fails.
    pub async fn delete(
        &self,
        record_type: RecordType,
        tenant_id: &str,
        identifier: &str,
    ) -> Result<String, RecordError> {
        let key = Self::identified_key(record_type, Some(tenant_id), identifier)?;
        if !self.storage.exists(&key).await? {
            return Err(RecordError::NotFound { record_type, key });
        }
        self.storage.delete(&key).await?;
        info!(key = %key, "record deleted");
        Ok(key)
    }

    /// List every identified record of `record_type` for a tenant.
    ///
    /// One prefix scan, then one concurrent read per key. Entries keep the
    /// backend's listing order and carry the raw stored string. A key removed
    /// between the scan and its read is left out.
    ///
    /// # Errors
    ///
    /// Returns [`RecordError::InvalidRequest`] for a bad tenant id and
    /// [`RecordError::Storage`] if the scan or any read fails.
    pub async fn list(
        &self,
        record_type: RecordType,
        tenant_id: &str,
    ) -> Result<Vec<ListedRecord>, RecordError> {
        require_identified(record_type)?;
        validate_tenant(tenant_id)?;
        let prefix = prefix_for(tenant_id, record_type);
        let keys = self.storage.list(&prefix).await?;
        debug!(prefix = %prefix, count = keys.len(), "listing records");

        let reads = keys.into_iter().map(|key| async move {
            let raw = self.storage.get(&key).await?;
            Ok::<_, RecordError>(raw.map(|value| ListedRecord { key, value }))
        });

        Ok(try_join_all(reads).await?.into_iter().flatten().collect())
    }

    /// Fetch a page with navigation and footer in one call.
    ///
    /// All three keys are used verbatim and read concurrently. The page is
    /// mandatory; navigation and footer are `None` when their key is absent
    /// or not supplied.
    ///
    /// # Errors
    ///
    /// - [`RecordError::NotFound`] if the page key is absent.
    /// - [`RecordError::InvalidRequest`] if the page key is empty.
    /// - [`RecordError::Storage`] if any read fails.
    pub async fn bundle(
        &self,
        page_key: &str,
        navigation_key: Option<&str>,
        footer_key: Option<&str>,
    ) -> Result<Bundle, RecordError> {
        validate_identifier(RecordType::Page, page_key)?;

        let (page, navigation, footer) = tokio::try_join!(
            self.storage.get(page_key),
            self.read_optional(navigation_key),
            self.read_optional(footer_key),
        )?;

        let page = page.ok_or_else(|| RecordError::NotFound {
            record_type: RecordType::Page,
            key: page_key.to_owned(),
        })?;
        debug!(
            page_key = %page_key,
            navigation = navigation.is_some(),
            footer = footer.is_some(),
            "bundle fetched"
        );

        Ok(Bundle {
            page: value::decode(&page),
            navigation: navigation.as_deref().map(value::decode),
            footer: footer.as_deref().map(value::decode),
        })
    }

    async fn read_optional(
        &self,
        key: Option<&str>,
    ) -> Result<Option<String>, sitekv_storage::StorageError> {
        match key.filter(|k| !k.is_empty()) {
            Some(k) => self.storage.get(k).await,
            None => Ok(None),
        }
    }
}
