//! Product catalog domain: the product record, its status lifecycle, and the
//! pure stock/status rules shared by every mutation path.

pub mod product;

pub use product::{
    NewProduct, Product, ProductStatus, ProductUpdate, derive_status,
};
