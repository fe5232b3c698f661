//! Typed repositories over the item store, one per aggregate.
//!
//! Repositories translate between domain records and `StoredItem` payloads
//! and own their table names (injected via [`crate::StorageConfig`]). They
//! surface store faults as `DomainError::StorageUnavailable`; only the
//! conditional-write path keeps `StoreError` visible, because the stock
//! adjustment engine needs to see `ConditionFailed` to retry.

pub mod customers;
pub mod orders;
pub mod products;

pub use customers::CustomerRepository;
pub use orders::OrderRepository;
pub use products::ProductRepository;

use stockpile_core::DomainError;

use crate::item_store::StoreError;

/// A decoded record together with the store version it was read at.
///
/// The version is the token for a later conditional write of the same key.
#[derive(Debug, Clone, PartialEq)]
pub struct Versioned<T> {
    pub record: T,
    pub version: u64,
}

pub(crate) fn store_fault(err: StoreError) -> DomainError {
    match err {
        // Conditional failures must be handled where the condition was set;
        // reaching here means a caller leaked one past its retry loop.
        StoreError::ConditionFailed => {
            DomainError::conflict("conditional write failed: version mismatch")
        }
        StoreError::Serde(msg) => DomainError::storage_unavailable(msg),
        StoreError::Unavailable(msg) => DomainError::storage_unavailable(msg),
    }
}
