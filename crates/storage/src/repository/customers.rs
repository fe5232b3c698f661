use stockpile_core::{CustomerId, DomainResult};
use stockpile_customers::Customer;

use super::store_fault;
use crate::config::StorageConfig;
use crate::item_store::{ItemStore, StoredItem};

/// Customer persistence over the item store.
///
/// Customers carry no concurrency-sensitive invariant, so all writes are
/// unconditional.
#[derive(Debug, Clone)]
pub struct CustomerRepository<S> {
    store: S,
    table: String,
}

impl<S: ItemStore> CustomerRepository<S> {
    pub fn new(store: S, config: &StorageConfig) -> Self {
        Self {
            store,
            table: config.customers_table.clone(),
        }
    }

    pub fn find_by_id(&self, id: CustomerId) -> DomainResult<Option<Customer>> {
        let item = self
            .store
            .get(&self.table, &id.to_string())
            .map_err(store_fault)?;
        item.map(|item| item.decode()).transpose().map_err(store_fault)
    }

    pub fn save(&self, customer: &Customer) -> DomainResult<()> {
        let item = StoredItem::encode(customer.customer_id.to_string(), customer)
            .map_err(store_fault)?;
        self.store.put(&self.table, item).map_err(store_fault)
    }

    pub fn delete(&self, id: CustomerId) -> DomainResult<()> {
        self.store
            .delete(&self.table, &id.to_string())
            .map_err(store_fault)
    }

    pub fn find_all(&self) -> DomainResult<Vec<Customer>> {
        let items = self.store.scan(&self.table).map_err(store_fault)?;
        items
            .into_iter()
            .map(|item| item.decode().map_err(store_fault))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item_store::InMemoryItemStore;
    use chrono::Utc;
    use std::sync::Arc;
    use stockpile_customers::NewCustomer;

    fn repo() -> CustomerRepository<Arc<InMemoryItemStore>> {
        CustomerRepository::new(
            Arc::new(InMemoryItemStore::new()),
            &StorageConfig::default(),
        )
    }

    fn customer(email: &str) -> Customer {
        NewCustomer {
            email: email.to_string(),
            first_name: "Jo".to_string(),
            last_name: "Bloggs".to_string(),
            phone: None,
            address: None,
        }
        .into_customer(CustomerId::new(), Utc::now())
        .unwrap()
    }

    #[test]
    fn save_then_find_round_trips() {
        let repo = repo();
        let c = customer("jo@example.com");
        repo.save(&c).unwrap();
        assert_eq!(repo.find_by_id(c.customer_id).unwrap().unwrap(), c);
    }

    #[test]
    fn find_all_lists_every_customer() {
        let repo = repo();
        repo.save(&customer("a@example.com")).unwrap();
        repo.save(&customer("b@example.com")).unwrap();
        assert_eq!(repo.find_all().unwrap().len(), 2);
    }

    #[test]
    fn delete_then_find_is_none() {
        let repo = repo();
        let c = customer("jo@example.com");
        repo.save(&c).unwrap();
        repo.delete(c.customer_id).unwrap();
        assert!(repo.find_by_id(c.customer_id).unwrap().is_none());
    }
}
