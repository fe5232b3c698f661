//! Item store boundary.
//!
//! This module defines an infrastructure-facing abstraction over a
//! partition-keyed, schemaless document store without making any storage
//! assumptions. Business rules live above it; retry policy lives in the
//! stock adjustment engine, never here.

pub mod in_memory;
pub mod postgres;
pub mod r#trait;

pub use in_memory::InMemoryItemStore;
pub use postgres::PostgresItemStore;
pub use r#trait::{ItemStore, StoreError, StoredItem};
