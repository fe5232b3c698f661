//! Customer domain: a plain value-object record with no cross-record
//! invariants.

pub mod customer;

pub use customer::{Customer, NewCustomer};
