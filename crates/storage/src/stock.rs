//! Stock adjustment engine.
//!
//! Serializes concurrent stock mutations through optimistic concurrency:
//! read the product and its version, compute the replacement with
//! [`Product::with_stock_delta`], and write it back conditionally on the
//! version still matching. A failed condition means another writer landed
//! in between; re-read and recompute from the fresh state, up to a bounded
//! number of attempts.

use tracing::{debug, instrument};

use stockpile_core::{DomainError, DomainResult, ProductId};
use stockpile_products::Product;

use crate::item_store::{ItemStore, StoreError};
use crate::repository::ProductRepository;

/// Attempts per adjustment before giving up with a conflict.
const MAX_ATTEMPTS: u32 = 5;

/// Retrying compare-and-swap loop around product stock mutations.
///
/// Every stock-changing path goes through [`adjust`](Self::adjust); there is
/// no unconditional write of `stock_quantity` anywhere. Validation failures
/// (zero delta, insufficient stock) abort immediately and are never retried,
/// since re-reading cannot make an invalid request valid on its own.
#[derive(Debug, Clone)]
pub struct StockAdjuster<S> {
    products: ProductRepository<S>,
}

impl<S: ItemStore> StockAdjuster<S> {
    pub fn new(products: ProductRepository<S>) -> Self {
        Self { products }
    }

    /// Apply a signed delta to a product's stock, returning the updated
    /// record as persisted.
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub fn adjust(&self, product_id: ProductId, delta: i64) -> DomainResult<Product> {
        for attempt in 1..=MAX_ATTEMPTS {
            let read = self
                .products
                .find_by_id(product_id)?
                .ok_or_else(DomainError::not_found)?;

            let updated = read.record.with_stock_delta(delta, chrono::Utc::now())?;

            match self.products.save_if_version(&updated, read.version) {
                Ok(()) => return Ok(updated),
                Err(StoreError::ConditionFailed) => {
                    debug!(attempt, "stock write lost the race, re-reading");
                    continue;
                }
                Err(other) => return Err(crate::repository::store_fault(other)),
            }
        }

        Err(DomainError::conflict(format!(
            "stock adjustment contended {MAX_ATTEMPTS} times, giving up"
        )))
    }

    /// Decrease stock by a positive quantity.
    pub fn reduce(&self, product_id: ProductId, quantity: i64) -> DomainResult<Product> {
        let delta = positive_quantity(quantity)?;
        self.adjust(product_id, -delta)
    }

    /// Increase stock by a positive quantity.
    pub fn increase(&self, product_id: ProductId, quantity: i64) -> DomainResult<Product> {
        let delta = positive_quantity(quantity)?;
        self.adjust(product_id, delta)
    }
}

fn positive_quantity(quantity: i64) -> DomainResult<i64> {
    if quantity <= 0 {
        return Err(DomainError::validation("quantity must be positive"));
    }
    Ok(quantity)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StorageConfig;
    use crate::item_store::{InMemoryItemStore, StoredItem};
    use chrono::Utc;
    use rust_decimal::Decimal;
    use std::sync::Arc;
    use stockpile_products::{NewProduct, ProductStatus};

    fn setup(stock: i64) -> (StockAdjuster<Arc<InMemoryItemStore>>, ProductId) {
        setup_with_status(stock, None)
    }

    fn setup_with_status(
        stock: i64,
        status: Option<ProductStatus>,
    ) -> (StockAdjuster<Arc<InMemoryItemStore>>, ProductId) {
        let store = Arc::new(InMemoryItemStore::new());
        let repo = ProductRepository::new(store, &StorageConfig::default());
        let product = NewProduct {
            name: "Widget".to_string(),
            description: None,
            category: "Tools".to_string(),
            price: Decimal::new(500, 2),
            stock_quantity: stock,
            manufacturer: None,
            status,
        }
        .into_product(ProductId::new(), Utc::now())
        .unwrap();
        repo.save(&product).unwrap();
        let id = product.product_id;
        (StockAdjuster::new(repo), id)
    }

    fn read(adjuster: &StockAdjuster<Arc<InMemoryItemStore>>, id: ProductId) -> Product {
        adjuster.products.find_by_id(id).unwrap().unwrap().record
    }

    #[test]
    fn reduce_to_zero_goes_out_of_stock() {
        let (adjuster, id) = setup(4);
        let updated = adjuster.reduce(id, 4).unwrap();
        assert_eq!(updated.stock_quantity, 0);
        assert_eq!(updated.status, ProductStatus::OutOfStock);
        assert_eq!(read(&adjuster, id), updated);
    }

    #[test]
    fn overdraw_fails_and_leaves_record_unchanged() {
        let (adjuster, id) = setup(4);
        let before = read(&adjuster, id);

        let err = adjuster.reduce(id, 5).unwrap_err();
        assert_eq!(
            err,
            DomainError::InsufficientStock {
                requested: 5,
                available: 4
            }
        );
        assert_eq!(read(&adjuster, id), before);
    }

    #[test]
    fn increase_reactivates_out_of_stock() {
        let (adjuster, id) = setup(0);
        assert_eq!(read(&adjuster, id).status, ProductStatus::OutOfStock);

        let updated = adjuster.increase(id, 3).unwrap();
        assert_eq!(updated.status, ProductStatus::Active);
        assert_eq!(updated.stock_quantity, 3);
    }

    #[test]
    fn increase_leaves_discontinued_alone() {
        let (adjuster, id) = setup_with_status(0, Some(ProductStatus::Discontinued));
        let updated = adjuster.increase(id, 3).unwrap();
        assert_eq!(updated.status, ProductStatus::Discontinued);
    }

    #[test]
    fn missing_product_is_not_found() {
        let (adjuster, _) = setup(4);
        assert_eq!(
            adjuster.adjust(ProductId::new(), 1).unwrap_err(),
            DomainError::NotFound
        );
    }

    #[test]
    fn non_positive_quantities_are_rejected() {
        let (adjuster, id) = setup(4);
        assert!(matches!(
            adjuster.reduce(id, 0).unwrap_err(),
            DomainError::Validation(_)
        ));
        assert!(matches!(
            adjuster.increase(id, -1).unwrap_err(),
            DomainError::Validation(_)
        ));
    }

    #[test]
    fn concurrent_reductions_lose_no_updates() {
        let threads = 16;
        let (adjuster, id) = setup(threads);

        let handles: Vec<_> = (0..threads)
            .map(|_| {
                let adjuster = adjuster.clone();
                std::thread::spawn(move || adjuster.reduce(id, 1))
            })
            .collect();

        let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        // In-memory CAS contention can exceed the attempt budget; successes
        // plus conflicts must account for every thread, with no lost writes.
        let successes = results.iter().filter(|r| r.is_ok()).count() as i64;
        let conflicts = results
            .iter()
            .filter(|r| matches!(r, Err(DomainError::Conflict(_))))
            .count() as i64;
        assert_eq!(successes + conflicts, threads);

        let final_product = read(&adjuster, id);
        assert_eq!(final_product.stock_quantity, threads - successes);
        if final_product.stock_quantity == 0 {
            assert_eq!(final_product.status, ProductStatus::OutOfStock);
        }
    }

    /// Store wrapper whose conditional writes always fail, to pin the retry
    /// budget behavior.
    struct AlwaysContended {
        inner: InMemoryItemStore,
    }

    impl ItemStore for AlwaysContended {
        fn get(&self, table: &str, key: &str) -> Result<Option<StoredItem>, StoreError> {
            self.inner.get(table, key)
        }

        fn put(&self, table: &str, item: StoredItem) -> Result<(), StoreError> {
            self.inner.put(table, item)
        }

        fn put_if_version(
            &self,
            _table: &str,
            _item: StoredItem,
            _expected_version: u64,
        ) -> Result<(), StoreError> {
            Err(StoreError::ConditionFailed)
        }

        fn delete(&self, table: &str, key: &str) -> Result<(), StoreError> {
            self.inner.delete(table, key)
        }

        fn scan(&self, table: &str) -> Result<Vec<StoredItem>, StoreError> {
            self.inner.scan(table)
        }

        fn query(
            &self,
            table: &str,
            attribute: &str,
            value: &str,
        ) -> Result<Vec<StoredItem>, StoreError> {
            self.inner.query(table, attribute, value)
        }
    }

    #[test]
    fn exhausted_retries_surface_as_conflict() {
        let store = Arc::new(AlwaysContended {
            inner: InMemoryItemStore::new(),
        });
        let repo = ProductRepository::new(store, &StorageConfig::default());
        let product = NewProduct {
            name: "Widget".to_string(),
            description: None,
            category: "Tools".to_string(),
            price: Decimal::new(500, 2),
            stock_quantity: 10,
            manufacturer: None,
            status: None,
        }
        .into_product(ProductId::new(), Utc::now())
        .unwrap();
        repo.save(&product).unwrap();

        let adjuster = StockAdjuster::new(repo);
        assert!(matches!(
            adjuster.reduce(product.product_id, 1).unwrap_err(),
            DomainError::Conflict(_)
        ));
    }

    #[cfg(test)]
    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #![proptest_config(ProptestConfig::with_cases(32))]

            /// Property: under concurrent random deltas, the final stock is
            /// the initial stock plus exactly the accepted deltas, and never
            /// negative.
            #[test]
            fn concurrent_deltas_account_exactly(
                initial in 1i64..50,
                deltas in proptest::collection::vec(-5i64..=5, 2..8)
            ) {
                let (adjuster, id) = setup(initial);

                let handles: Vec<_> = deltas
                    .into_iter()
                    .filter(|d| *d != 0)
                    .map(|delta| {
                        let adjuster = adjuster.clone();
                        std::thread::spawn(move || (delta, adjuster.adjust(id, delta)))
                    })
                    .collect();

                let mut accepted = 0i64;
                for handle in handles {
                    let (delta, result) = handle.join().unwrap();
                    if result.is_ok() {
                        accepted += delta;
                    }
                }

                let final_product = read(&adjuster, id);
                prop_assert_eq!(final_product.stock_quantity, initial + accepted);
                prop_assert!(final_product.stock_quantity >= 0);
            }
        }
    }
}
