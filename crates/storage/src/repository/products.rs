use stockpile_core::{DomainResult, ProductId};
use stockpile_products::{Product, ProductStatus};

use super::{Versioned, store_fault};
use crate::config::StorageConfig;
use crate::item_store::{ItemStore, StoreError, StoredItem};

/// Product persistence over the item store.
///
/// Reads return the store version alongside the record so callers can do
/// conditional writes. `find_by_category` uses the secondary index via
/// `query`; `find_by_status` is a scan-and-filter because status is not
/// indexed.
#[derive(Debug, Clone)]
pub struct ProductRepository<S> {
    store: S,
    table: String,
    category_attribute: String,
}

impl<S: ItemStore> ProductRepository<S> {
    pub fn new(store: S, config: &StorageConfig) -> Self {
        Self {
            store,
            table: config.products_table.clone(),
            category_attribute: config.category_attribute.clone(),
        }
    }

    pub fn find_by_id(&self, id: ProductId) -> DomainResult<Option<Versioned<Product>>> {
        let item = self
            .store
            .get(&self.table, &id.to_string())
            .map_err(store_fault)?;
        item.map(|item| {
            Ok(Versioned {
                record: item.decode()?,
                version: item.version,
            })
        })
        .transpose()
        .map_err(store_fault)
    }

    /// Unconditional write (last write wins). Used by create and full update.
    pub fn save(&self, product: &Product) -> DomainResult<()> {
        let item =
            StoredItem::encode(product.product_id.to_string(), product).map_err(store_fault)?;
        self.store.put(&self.table, item).map_err(store_fault)
    }

    /// Conditional write keyed on the version a prior read returned.
    ///
    /// Returns `StoreError` rather than `DomainError` so the stock adjustment
    /// engine can observe `ConditionFailed` and retry.
    pub fn save_if_version(&self, product: &Product, expected_version: u64) -> Result<(), StoreError> {
        let item = StoredItem::encode(product.product_id.to_string(), product)?;
        self.store.put_if_version(&self.table, item, expected_version)
    }

    pub fn delete(&self, id: ProductId) -> DomainResult<()> {
        self.store
            .delete(&self.table, &id.to_string())
            .map_err(store_fault)
    }

    pub fn find_all(&self) -> DomainResult<Vec<Product>> {
        let items = self.store.scan(&self.table).map_err(store_fault)?;
        decode_all(items)
    }

    /// Secondary-index lookup on the denormalized category attribute.
    pub fn find_by_category(&self, category: &str) -> DomainResult<Vec<Product>> {
        let items = self
            .store
            .query(&self.table, &self.category_attribute, category)
            .map_err(store_fault)?;
        decode_all(items)
    }

    /// Status is not indexed; this is a full scan with an in-process filter.
    pub fn find_by_status(&self, status: ProductStatus) -> DomainResult<Vec<Product>> {
        let products = self.find_all()?;
        Ok(products.into_iter().filter(|p| p.status == status).collect())
    }
}

fn decode_all(items: Vec<StoredItem>) -> DomainResult<Vec<Product>> {
    items
        .into_iter()
        .map(|item| item.decode().map_err(store_fault))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item_store::InMemoryItemStore;
    use chrono::Utc;
    use rust_decimal::Decimal;
    use std::sync::Arc;
    use stockpile_products::NewProduct;

    fn repo() -> ProductRepository<Arc<InMemoryItemStore>> {
        ProductRepository::new(
            Arc::new(InMemoryItemStore::new()),
            &StorageConfig::default(),
        )
    }

    fn product(name: &str, category: &str, stock: i64) -> Product {
        NewProduct {
            name: name.to_string(),
            description: None,
            category: category.to_string(),
            price: Decimal::new(500, 2),
            stock_quantity: stock,
            manufacturer: None,
            status: None,
        }
        .into_product(ProductId::new(), Utc::now())
        .unwrap()
    }

    #[test]
    fn save_then_find_round_trips_with_version() {
        let repo = repo();
        let p = product("Widget", "Tools", 5);
        repo.save(&p).unwrap();

        let found = repo.find_by_id(p.product_id).unwrap().unwrap();
        assert_eq!(found.record, p);
        assert_eq!(found.version, 1);
    }

    #[test]
    fn find_missing_is_none() {
        let repo = repo();
        assert!(repo.find_by_id(ProductId::new()).unwrap().is_none());
    }

    #[test]
    fn conditional_save_respects_version() {
        let repo = repo();
        let p = product("Widget", "Tools", 5);
        repo.save(&p).unwrap();

        let read = repo.find_by_id(p.product_id).unwrap().unwrap();
        let updated = read.record.with_stock_delta(-1, Utc::now()).unwrap();
        repo.save_if_version(&updated, read.version).unwrap();

        // Same version again is stale now.
        let err = repo.save_if_version(&updated, read.version).unwrap_err();
        assert!(matches!(err, StoreError::ConditionFailed));
    }

    #[test]
    fn find_by_category_uses_exact_match() {
        let repo = repo();
        repo.save(&product("Drill", "Tools", 3)).unwrap();
        repo.save(&product("Saw", "Tools", 2)).unwrap();
        repo.save(&product("Phone", "Electronics", 1)).unwrap();

        let tools = repo.find_by_category("Tools").unwrap();
        assert_eq!(tools.len(), 2);
        assert!(repo.find_by_category("tools").unwrap().is_empty());
        assert!(repo.find_by_category("Garden").unwrap().is_empty());
    }

    #[test]
    fn find_by_status_filters_scan() {
        let repo = repo();
        repo.save(&product("Drill", "Tools", 3)).unwrap();
        repo.save(&product("Saw", "Tools", 0)).unwrap();

        let available = repo.find_by_status(ProductStatus::Active).unwrap();
        assert_eq!(available.len(), 1);
        assert_eq!(available[0].name, "Drill");

        let out = repo.find_by_status(ProductStatus::OutOfStock).unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].name, "Saw");
    }

    #[test]
    fn delete_removes_record() {
        let repo = repo();
        let p = product("Widget", "Tools", 5);
        repo.save(&p).unwrap();
        repo.delete(p.product_id).unwrap();
        assert!(repo.find_by_id(p.product_id).unwrap().is_none());
    }
}
