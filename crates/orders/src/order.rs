use chrono::{DateTime, Utc};
use core::str::FromStr;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use stockpile_core::{CustomerId, DomainError, DomainResult, OrderId};

/// Order status lifecycle. Transitions are operator-driven; no state machine
/// is enforced beyond the PENDING default at creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    Pending,
    Confirmed,
    Shipped,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "PENDING",
            OrderStatus::Confirmed => "CONFIRMED",
            OrderStatus::Shipped => "SHIPPED",
            OrderStatus::Delivered => "DELIVERED",
            OrderStatus::Cancelled => "CANCELLED",
        }
    }
}

impl FromStr for OrderStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "PENDING" => Ok(OrderStatus::Pending),
            "CONFIRMED" => Ok(OrderStatus::Confirmed),
            "SHIPPED" => Ok(OrderStatus::Shipped),
            "DELIVERED" => Ok(OrderStatus::Delivered),
            "CANCELLED" => Ok(OrderStatus::Cancelled),
            other => Err(DomainError::validation(format!(
                "unknown order status: {other}"
            ))),
        }
    }
}

impl core::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The order record as persisted and served.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub order_id: OrderId,
    pub customer_id: CustomerId,
    pub product_name: String,
    pub quantity: i64,
    pub total_amount: Decimal,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    pub fn with_status(&self, status: OrderStatus, now: DateTime<Utc>) -> Order {
        let mut updated = self.clone();
        updated.status = status;
        updated.updated_at = now;
        updated
    }
}

/// Input for creating or fully replacing an order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewOrder {
    pub customer_id: CustomerId,
    pub product_name: String,
    pub quantity: i64,
    pub total_amount: Decimal,
    #[serde(default)]
    pub status: Option<OrderStatus>,
}

impl NewOrder {
    pub fn validate(&self) -> DomainResult<()> {
        if self.product_name.trim().is_empty() {
            return Err(DomainError::validation("productName cannot be empty"));
        }
        if self.quantity <= 0 {
            return Err(DomainError::validation("quantity must be positive"));
        }
        if self.total_amount < Decimal::ZERO {
            return Err(DomainError::validation("totalAmount cannot be negative"));
        }
        Ok(())
    }

    pub fn into_order(self, order_id: OrderId, now: DateTime<Utc>) -> DomainResult<Order> {
        self.validate()?;
        Ok(Order {
            order_id,
            customer_id: self.customer_id,
            product_name: self.product_name,
            quantity: self.quantity,
            total_amount: self.total_amount,
            status: self.status.unwrap_or(OrderStatus::Pending),
            created_at: now,
            updated_at: now,
        })
    }

    /// Full replace: identity and `created_at` come from the existing record.
    pub fn apply_to(self, existing: &Order, now: DateTime<Utc>) -> DomainResult<Order> {
        self.validate()?;
        Ok(Order {
            order_id: existing.order_id,
            customer_id: self.customer_id,
            product_name: self.product_name,
            quantity: self.quantity,
            total_amount: self.total_amount,
            status: self.status.unwrap_or(existing.status),
            created_at: existing.created_at,
            updated_at: now,
        })
    }
}
