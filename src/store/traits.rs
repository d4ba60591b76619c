//! `Store` trait: one async interface over typed JSON records.

use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::warn;

use crate::error::StoreError;

/// Backend-agnostic key/value store. Each `set` replaces the whole record.
#[async_trait]
pub trait Store: Send + Sync {
    /// Read a record, `None` when absent.
    async fn get(&self, key: &str) -> Result<Option<serde_json::Value>, StoreError>;

    /// Write (upsert) a record.
    async fn set(&self, key: &str, value: &serde_json::Value) -> Result<(), StoreError>;

    /// Remove a record. Returns whether it existed.
    async fn delete(&self, key: &str) -> Result<bool, StoreError>;
}

/// Read and decode a typed record.
///
/// A record that no longer decodes is treated as absent so a schema change
/// never wedges the flow.
pub async fn load<T: DeserializeOwned>(
    store: &dyn Store,
    key: &str,
) -> Result<Option<T>, StoreError> {
    let Some(value) = store.get(key).await? else {
        return Ok(None);
    };
    match serde_json::from_value(value) {
        Ok(v) => Ok(Some(v)),
        Err(e) => {
            warn!(key, error = %e, "Discarding unreadable record");
            Ok(None)
        }
    }
}

/// Encode and write a typed record.
pub async fn save<T: Serialize + ?Sized>(
    store: &dyn Store,
    key: &str,
    value: &T,
) -> Result<(), StoreError> {
    let json = serde_json::to_value(value)?;
    store.set(key, &json).await
}
