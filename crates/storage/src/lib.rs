//! Storage layer: the item-store adapter, its backends, typed repositories
//! per aggregate, and the stock adjustment engine.

pub mod config;
pub mod item_store;
pub mod repository;
pub mod stock;

pub use config::StorageConfig;
pub use item_store::{InMemoryItemStore, ItemStore, PostgresItemStore, StoreError, StoredItem};
pub use repository::{
    CustomerRepository, OrderRepository, ProductRepository, Versioned,
};
pub use stock::StockAdjuster;
