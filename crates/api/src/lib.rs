//! HTTP API over the customer, order, and product aggregates.

pub mod app;
