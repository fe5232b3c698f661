//! Domain error model.

use thiserror::Error;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level error.
///
/// Every failure a caller can observe maps onto one of these variants.
/// `InsufficientStock` is kept distinct from `Conflict` so callers can tell
/// "the invariant forbids this" apart from "a concurrent writer got there
/// first, retry if you want".
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A requested record does not exist.
    #[error("not found")]
    NotFound,

    /// A value failed validation (e.g. malformed input, invalid identifier).
    #[error("validation failed: {0}")]
    Validation(String),

    /// A stock decrement would drive `stock_quantity` below zero.
    #[error("insufficient stock: requested {requested}, available {available}")]
    InsufficientStock { requested: i64, available: i64 },

    /// Optimistic-concurrency retries exhausted; safe for the caller to retry.
    #[error("conflict: {0}")]
    Conflict(String),

    /// Transient store fault; no partial state was left behind.
    #[error("storage unavailable: {0}")]
    StorageUnavailable(String),
}

impl DomainError {
    pub fn not_found() -> Self {
        Self::NotFound
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn insufficient_stock(requested: i64, available: i64) -> Self {
        Self::InsufficientStock {
            requested,
            available,
        }
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    pub fn storage_unavailable(msg: impl Into<String>) -> Self {
        Self::StorageUnavailable(msg.into())
    }
}
