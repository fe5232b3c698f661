use axum::Router;

pub mod customers;
pub mod orders;
pub mod products;
pub mod system;

/// Router for all aggregate endpoints (nested under `/api/v1`).
pub fn router() -> Router {
    Router::new()
        .nest("/products", products::router())
        .nest("/customers", customers::router())
        .nest("/orders", orders::router())
}
