use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value as JsonValue;
use std::sync::Arc;
use thiserror::Error;

/// A schemaless document addressed by its partition key.
///
/// `version` increases monotonically on every write to the same key and is
/// the handle for conditional writes: read an item, compute the replacement,
/// and write it back only if the version is still the one read. The store
/// assigns versions; callers never set them directly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredItem {
    pub key: String,
    pub version: u64,
    pub payload: JsonValue,
}

impl StoredItem {
    /// Encode a record for writing. The version is assigned by the store on
    /// write, so it starts at zero here.
    pub fn encode<T: Serialize>(key: impl Into<String>, record: &T) -> Result<Self, StoreError> {
        let payload = serde_json::to_value(record)
            .map_err(|e| StoreError::Serde(format!("payload serialization failed: {e}")))?;
        Ok(Self {
            key: key.into(),
            version: 0,
            payload,
        })
    }

    pub fn decode<T: DeserializeOwned>(&self) -> Result<T, StoreError> {
        serde_json::from_value(self.payload.clone())
            .map_err(|e| StoreError::Serde(format!("payload deserialization failed: {e}")))
    }
}

/// Item store operation error.
///
/// `ConditionFailed` is the one variant with control-flow meaning: the stock
/// adjustment engine consumes it to drive its retry loop. Everything else is
/// an infrastructure fault surfaced as-is.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A conditional write found a different version than expected.
    #[error("conditional write failed: version mismatch")]
    ConditionFailed,

    /// Payload (de)serialization failed.
    #[error("serde: {0}")]
    Serde(String),

    /// The backing store could not be reached or failed mid-operation.
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Uniform get/put/delete/scan/query over a partition-keyed store.
///
/// Contract:
/// - `get` returns the item or `None`; absence is not an error.
/// - `put` is unconditional (last write wins) and bumps the item version.
/// - `put_if_version` writes only if the current version equals `expected`
///   (an absent item counts as version 0), else `ConditionFailed`.
/// - `scan` and `query` return complete, unordered sequences; any store-side
///   result paging is absorbed by the implementation.
/// - `delete` is idempotent; deleting an absent key succeeds.
///
/// Implementations perform no retries. Faults map to `StoreError` and
/// propagate; the caller decides what is retryable.
pub trait ItemStore: Send + Sync {
    fn get(&self, table: &str, key: &str) -> Result<Option<StoredItem>, StoreError>;

    fn put(&self, table: &str, item: StoredItem) -> Result<(), StoreError>;

    /// Conditional write: the compare-and-swap primitive behind the stock
    /// adjustment engine.
    fn put_if_version(
        &self,
        table: &str,
        item: StoredItem,
        expected_version: u64,
    ) -> Result<(), StoreError>;

    fn delete(&self, table: &str, key: &str) -> Result<(), StoreError>;

    fn scan(&self, table: &str) -> Result<Vec<StoredItem>, StoreError>;

    /// Secondary-index lookup: all items whose `attribute` equals `value`.
    fn query(&self, table: &str, attribute: &str, value: &str)
    -> Result<Vec<StoredItem>, StoreError>;
}

impl<S> ItemStore for Arc<S>
where
    S: ItemStore + ?Sized,
{
    fn get(&self, table: &str, key: &str) -> Result<Option<StoredItem>, StoreError> {
        (**self).get(table, key)
    }

    fn put(&self, table: &str, item: StoredItem) -> Result<(), StoreError> {
        (**self).put(table, item)
    }

    fn put_if_version(
        &self,
        table: &str,
        item: StoredItem,
        expected_version: u64,
    ) -> Result<(), StoreError> {
        (**self).put_if_version(table, item, expected_version)
    }

    fn delete(&self, table: &str, key: &str) -> Result<(), StoreError> {
        (**self).delete(table, key)
    }

    fn scan(&self, table: &str) -> Result<Vec<StoredItem>, StoreError> {
        (**self).scan(table)
    }

    fn query(
        &self,
        table: &str,
        attribute: &str,
        value: &str,
    ) -> Result<Vec<StoredItem>, StoreError> {
        (**self).query(table, attribute, value)
    }
}
