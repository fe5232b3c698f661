use stockpile_core::{CustomerId, DomainResult, OrderId};
use stockpile_orders::Order;

use super::store_fault;
use crate::config::StorageConfig;
use crate::item_store::{ItemStore, StoredItem};

/// Order persistence over the item store.
#[derive(Debug, Clone)]
pub struct OrderRepository<S> {
    store: S,
    table: String,
}

impl<S: ItemStore> OrderRepository<S> {
    pub fn new(store: S, config: &StorageConfig) -> Self {
        Self {
            store,
            table: config.orders_table.clone(),
        }
    }

    pub fn find_by_id(&self, id: OrderId) -> DomainResult<Option<Order>> {
        let item = self
            .store
            .get(&self.table, &id.to_string())
            .map_err(store_fault)?;
        item.map(|item| item.decode()).transpose().map_err(store_fault)
    }

    pub fn save(&self, order: &Order) -> DomainResult<()> {
        let item = StoredItem::encode(order.order_id.to_string(), order).map_err(store_fault)?;
        self.store.put(&self.table, item).map_err(store_fault)
    }

    pub fn delete(&self, id: OrderId) -> DomainResult<()> {
        self.store
            .delete(&self.table, &id.to_string())
            .map_err(store_fault)
    }

    pub fn find_all(&self) -> DomainResult<Vec<Order>> {
        let items = self.store.scan(&self.table).map_err(store_fault)?;
        items
            .into_iter()
            .map(|item| item.decode().map_err(store_fault))
            .collect()
    }

    /// No index on customerId; scan and filter in process.
    pub fn find_by_customer(&self, customer_id: CustomerId) -> DomainResult<Vec<Order>> {
        let orders = self.find_all()?;
        Ok(orders
            .into_iter()
            .filter(|o| o.customer_id == customer_id)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item_store::InMemoryItemStore;
    use chrono::Utc;
    use rust_decimal::Decimal;
    use std::sync::Arc;
    use stockpile_orders::{NewOrder, OrderStatus};

    fn repo() -> OrderRepository<Arc<InMemoryItemStore>> {
        OrderRepository::new(
            Arc::new(InMemoryItemStore::new()),
            &StorageConfig::default(),
        )
    }

    fn order(customer_id: CustomerId) -> Order {
        NewOrder {
            customer_id,
            product_name: "Widget".to_string(),
            quantity: 2,
            total_amount: Decimal::new(3998, 2),
            status: None,
        }
        .into_order(OrderId::new(), Utc::now())
        .unwrap()
    }

    #[test]
    fn save_then_find_round_trips() {
        let repo = repo();
        let o = order(CustomerId::new());
        repo.save(&o).unwrap();
        let found = repo.find_by_id(o.order_id).unwrap().unwrap();
        assert_eq!(found, o);
        assert_eq!(found.status, OrderStatus::Pending);
    }

    #[test]
    fn find_by_customer_filters_scan() {
        let repo = repo();
        let customer = CustomerId::new();
        repo.save(&order(customer)).unwrap();
        repo.save(&order(customer)).unwrap();
        repo.save(&order(CustomerId::new())).unwrap();

        let theirs = repo.find_by_customer(customer).unwrap();
        assert_eq!(theirs.len(), 2);
        assert!(theirs.iter().all(|o| o.customer_id == customer));
    }

    #[test]
    fn delete_then_find_is_none() {
        let repo = repo();
        let o = order(CustomerId::new());
        repo.save(&o).unwrap();
        repo.delete(o.order_id).unwrap();
        assert!(repo.find_by_id(o.order_id).unwrap().is_none());
    }
}
