//! Store selection and the per-aggregate application services.
//!
//! Services own identifier assignment, timestamps, and existence checks;
//! repositories stay a thin persistence mapping. The store backend is picked
//! once at startup: in-memory for dev/test, Postgres when
//! `USE_PERSISTENT_STORES=true`.
//!
//! Repositories and the stock adjustment engine are synchronous; service
//! methods bridge them onto the async runtime via `spawn_blocking` so a
//! blocking store call never stalls a worker.

use std::sync::Arc;

use chrono::Utc;
use sqlx::PgPool;
use tracing::info;

use stockpile_core::{CustomerId, DomainError, DomainResult, OrderId, ProductId};
use stockpile_customers::{Customer, NewCustomer};
use stockpile_orders::{NewOrder, Order, OrderStatus};
use stockpile_products::{NewProduct, Product, ProductStatus, ProductUpdate};
use stockpile_storage::{
    CustomerRepository, InMemoryItemStore, ItemStore, OrderRepository, PostgresItemStore,
    ProductRepository, StockAdjuster, StorageConfig,
};

type Store = Arc<dyn ItemStore>;

pub struct AppServices {
    pub products: ProductService,
    pub customers: CustomerService,
    pub orders: OrderService,
}

pub async fn build_services() -> AppServices {
    let use_persistent = std::env::var("USE_PERSISTENT_STORES")
        .unwrap_or_else(|_| "false".to_string())
        .parse::<bool>()
        .unwrap_or(false);

    let store: Store = if use_persistent {
        let database_url = std::env::var("DATABASE_URL")
            .expect("DATABASE_URL must be set when USE_PERSISTENT_STORES=true");
        let pool = PgPool::connect(&database_url)
            .await
            .expect("failed to connect to Postgres");
        Arc::new(PostgresItemStore::new(pool))
    } else {
        Arc::new(InMemoryItemStore::new())
    };

    build_with_store(store, &StorageConfig::from_env())
}

/// Wire the services over an explicit store (also used by tests).
pub fn build_with_store(store: Store, config: &StorageConfig) -> AppServices {
    let product_repo = ProductRepository::new(store.clone(), config);
    AppServices {
        products: ProductService {
            adjuster: StockAdjuster::new(product_repo.clone()),
            repo: product_repo,
        },
        customers: CustomerService {
            repo: CustomerRepository::new(store.clone(), config),
        },
        orders: OrderService {
            repo: OrderRepository::new(store, config),
        },
    }
}

async fn run_blocking<T, F>(f: F) -> DomainResult<T>
where
    F: FnOnce() -> DomainResult<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| DomainError::storage_unavailable(format!("worker task failed: {e}")))?
}

#[derive(Clone)]
pub struct ProductService {
    repo: ProductRepository<Store>,
    adjuster: StockAdjuster<Store>,
}

impl ProductService {
    pub async fn create(&self, input: NewProduct) -> DomainResult<Product> {
        let repo = self.repo.clone();
        run_blocking(move || {
            let product = input.into_product(ProductId::new(), Utc::now())?;
            repo.save(&product)?;
            info!(product_id = %product.product_id, "created product");
            Ok(product)
        })
        .await
    }

    pub async fn get(&self, id: ProductId) -> DomainResult<Product> {
        let repo = self.repo.clone();
        run_blocking(move || {
            Ok(repo
                .find_by_id(id)?
                .ok_or_else(DomainError::not_found)?
                .record)
        })
        .await
    }

    pub async fn list(&self) -> DomainResult<Vec<Product>> {
        let repo = self.repo.clone();
        run_blocking(move || repo.find_all()).await
    }

    pub async fn list_by_category(&self, category: String) -> DomainResult<Vec<Product>> {
        let repo = self.repo.clone();
        run_blocking(move || repo.find_by_category(&category)).await
    }

    pub async fn list_by_status(&self, status: ProductStatus) -> DomainResult<Vec<Product>> {
        let repo = self.repo.clone();
        run_blocking(move || repo.find_by_status(status)).await
    }

    pub async fn available(&self) -> DomainResult<Vec<Product>> {
        self.list_by_status(ProductStatus::Active).await
    }

    pub async fn out_of_stock(&self) -> DomainResult<Vec<Product>> {
        self.list_by_status(ProductStatus::OutOfStock).await
    }

    pub async fn update(&self, id: ProductId, update: ProductUpdate) -> DomainResult<Product> {
        let repo = self.repo.clone();
        run_blocking(move || {
            let existing = repo
                .find_by_id(id)?
                .ok_or_else(DomainError::not_found)?
                .record;
            let updated = existing.with_update(update, Utc::now())?;
            repo.save(&updated)?;
            Ok(updated)
        })
        .await
    }

    pub async fn update_status(&self, id: ProductId, status: ProductStatus) -> DomainResult<Product> {
        let repo = self.repo.clone();
        run_blocking(move || {
            let existing = repo
                .find_by_id(id)?
                .ok_or_else(DomainError::not_found)?
                .record;
            let updated = existing.with_status(status, Utc::now());
            repo.save(&updated)?;
            info!(product_id = %id, status = %status, "updated product status");
            Ok(updated)
        })
        .await
    }

    pub async fn delete(&self, id: ProductId) -> DomainResult<()> {
        let repo = self.repo.clone();
        run_blocking(move || {
            repo.find_by_id(id)?.ok_or_else(DomainError::not_found)?;
            repo.delete(id)
        })
        .await
    }

    pub async fn adjust_stock(&self, id: ProductId, delta: i64) -> DomainResult<Product> {
        let adjuster = self.adjuster.clone();
        run_blocking(move || adjuster.adjust(id, delta)).await
    }

    pub async fn reduce_stock(&self, id: ProductId, quantity: i64) -> DomainResult<Product> {
        let adjuster = self.adjuster.clone();
        run_blocking(move || adjuster.reduce(id, quantity)).await
    }

    pub async fn increase_stock(&self, id: ProductId, quantity: i64) -> DomainResult<Product> {
        let adjuster = self.adjuster.clone();
        run_blocking(move || adjuster.increase(id, quantity)).await
    }
}

#[derive(Clone)]
pub struct CustomerService {
    repo: CustomerRepository<Store>,
}

impl CustomerService {
    pub async fn create(&self, input: NewCustomer) -> DomainResult<Customer> {
        let repo = self.repo.clone();
        run_blocking(move || {
            let customer = input.into_customer(CustomerId::new(), Utc::now())?;
            repo.save(&customer)?;
            info!(customer_id = %customer.customer_id, "created customer");
            Ok(customer)
        })
        .await
    }

    pub async fn get(&self, id: CustomerId) -> DomainResult<Customer> {
        let repo = self.repo.clone();
        run_blocking(move || repo.find_by_id(id)?.ok_or_else(DomainError::not_found)).await
    }

    pub async fn list(&self) -> DomainResult<Vec<Customer>> {
        let repo = self.repo.clone();
        run_blocking(move || repo.find_all()).await
    }

    pub async fn update(&self, id: CustomerId, input: NewCustomer) -> DomainResult<Customer> {
        let repo = self.repo.clone();
        run_blocking(move || {
            let existing = repo.find_by_id(id)?.ok_or_else(DomainError::not_found)?;
            let updated = input.apply_to(&existing, Utc::now())?;
            repo.save(&updated)?;
            Ok(updated)
        })
        .await
    }

    pub async fn delete(&self, id: CustomerId) -> DomainResult<()> {
        let repo = self.repo.clone();
        run_blocking(move || {
            repo.find_by_id(id)?.ok_or_else(DomainError::not_found)?;
            repo.delete(id)
        })
        .await
    }
}

#[derive(Clone)]
pub struct OrderService {
    repo: OrderRepository<Store>,
}

impl OrderService {
    pub async fn create(&self, input: NewOrder) -> DomainResult<Order> {
        let repo = self.repo.clone();
        run_blocking(move || {
            let order = input.into_order(OrderId::new(), Utc::now())?;
            repo.save(&order)?;
            info!(order_id = %order.order_id, customer_id = %order.customer_id, "created order");
            Ok(order)
        })
        .await
    }

    pub async fn get(&self, id: OrderId) -> DomainResult<Order> {
        let repo = self.repo.clone();
        run_blocking(move || repo.find_by_id(id)?.ok_or_else(DomainError::not_found)).await
    }

    pub async fn list(&self) -> DomainResult<Vec<Order>> {
        let repo = self.repo.clone();
        run_blocking(move || repo.find_all()).await
    }

    pub async fn list_by_customer(&self, customer_id: CustomerId) -> DomainResult<Vec<Order>> {
        let repo = self.repo.clone();
        run_blocking(move || repo.find_by_customer(customer_id)).await
    }

    pub async fn update(&self, id: OrderId, input: NewOrder) -> DomainResult<Order> {
        let repo = self.repo.clone();
        run_blocking(move || {
            let existing = repo.find_by_id(id)?.ok_or_else(DomainError::not_found)?;
            let updated = input.apply_to(&existing, Utc::now())?;
            repo.save(&updated)?;
            Ok(updated)
        })
        .await
    }

    pub async fn update_status(&self, id: OrderId, status: OrderStatus) -> DomainResult<Order> {
        let repo = self.repo.clone();
        run_blocking(move || {
            let existing = repo.find_by_id(id)?.ok_or_else(DomainError::not_found)?;
            let updated = existing.with_status(status, Utc::now());
            repo.save(&updated)?;
            Ok(updated)
        })
        .await
    }

    pub async fn delete(&self, id: OrderId) -> DomainResult<()> {
        let repo = self.repo.clone();
        run_blocking(move || {
            repo.find_by_id(id)?.ok_or_else(DomainError::not_found)?;
            repo.delete(id)
        })
        .await
    }
}
