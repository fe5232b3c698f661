//! Request parsing helpers.
//!
//! Domain types validate fail-fast; the HTTP surface reports every bad field
//! in one response, so handlers run these collectors before touching the
//! services.

use rust_decimal::Decimal;
use serde::Deserialize;

use stockpile_customers::NewCustomer;
use stockpile_orders::NewOrder;

#[derive(Debug, Deserialize)]
pub struct ProductListQuery {
    pub category: Option<String>,
    pub status: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct StatusQuery {
    pub status: String,
}

#[derive(Debug, Deserialize)]
pub struct QuantityQuery {
    pub quantity: i64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderListQuery {
    pub customer_id: Option<String>,
}

pub fn product_field_errors(
    name: &str,
    category: &str,
    price: Decimal,
    stock_quantity: i64,
) -> Vec<(&'static str, String)> {
    let mut errors = Vec::new();
    if name.trim().is_empty() {
        errors.push(("name", "must not be blank".to_string()));
    }
    if category.trim().is_empty() {
        errors.push(("category", "must not be blank".to_string()));
    }
    if price < Decimal::ZERO {
        errors.push(("price", "must not be negative".to_string()));
    }
    if stock_quantity < 0 {
        errors.push(("stockQuantity", "must not be negative".to_string()));
    }
    errors
}

pub fn customer_field_errors(input: &NewCustomer) -> Vec<(&'static str, String)> {
    let mut errors = Vec::new();
    if input.email.trim().is_empty() {
        errors.push(("email", "must not be blank".to_string()));
    }
    if input.first_name.trim().is_empty() {
        errors.push(("firstName", "must not be blank".to_string()));
    }
    if input.last_name.trim().is_empty() {
        errors.push(("lastName", "must not be blank".to_string()));
    }
    errors
}

pub fn order_field_errors(input: &NewOrder) -> Vec<(&'static str, String)> {
    let mut errors = Vec::new();
    if input.product_name.trim().is_empty() {
        errors.push(("productName", "must not be blank".to_string()));
    }
    if input.quantity <= 0 {
        errors.push(("quantity", "must be positive".to_string()));
    }
    if input.total_amount < Decimal::ZERO {
        errors.push(("totalAmount", "must not be negative".to_string()));
    }
    errors
}

#[cfg(test)]
mod tests {
    use super::*;
    use stockpile_core::CustomerId;

    #[test]
    fn collects_every_bad_product_field() {
        let errors = product_field_errors("", "  ", Decimal::new(-1, 0), -5);
        let fields: Vec<_> = errors.iter().map(|(f, _)| *f).collect();
        assert_eq!(fields, vec!["name", "category", "price", "stockQuantity"]);
    }

    #[test]
    fn valid_order_has_no_field_errors() {
        let input = NewOrder {
            customer_id: CustomerId::new(),
            product_name: "Widget".to_string(),
            quantity: 1,
            total_amount: Decimal::new(100, 2),
            status: None,
        };
        assert!(order_field_errors(&input).is_empty());
    }
}
