//! Order domain: a plain value-object record. Orders reference customers and
//! products by opaque values only; nothing is validated or locked across
//! aggregates.

pub mod order;

pub use order::{NewOrder, Order, OrderStatus};
