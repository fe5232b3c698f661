//! Storage configuration resolved once at startup and injected into the
//! adapters. There is no lazily-initialized global table state anywhere.

/// Table and index names for the three aggregates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageConfig {
    pub products_table: String,
    pub customers_table: String,
    pub orders_table: String,
    /// Attribute the products secondary index is keyed on.
    pub category_attribute: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            products_table: "products".to_string(),
            customers_table: "customers".to_string(),
            orders_table: "orders".to_string(),
            category_attribute: "category".to_string(),
        }
    }
}

impl StorageConfig {
    /// Read table names from the environment, falling back to the defaults.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            products_table: std::env::var("PRODUCTS_TABLE").unwrap_or(defaults.products_table),
            customers_table: std::env::var("CUSTOMERS_TABLE").unwrap_or(defaults.customers_table),
            orders_table: std::env::var("ORDERS_TABLE").unwrap_or(defaults.orders_table),
            category_attribute: defaults.category_attribute,
        }
    }
}
