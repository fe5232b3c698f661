use chrono::{DateTime, Utc};
use core::str::FromStr;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use stockpile_core::{DomainError, DomainResult, ProductId};

/// Product status lifecycle.
///
/// OUT_OF_STOCK⇄ACTIVE is driven automatically by stock level; INACTIVE and
/// DISCONTINUED are explicit operator states that stock increases never clear.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProductStatus {
    Active,
    Inactive,
    OutOfStock,
    Discontinued,
}

impl ProductStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProductStatus::Active => "ACTIVE",
            ProductStatus::Inactive => "INACTIVE",
            ProductStatus::OutOfStock => "OUT_OF_STOCK",
            ProductStatus::Discontinued => "DISCONTINUED",
        }
    }
}

impl FromStr for ProductStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "ACTIVE" => Ok(ProductStatus::Active),
            "INACTIVE" => Ok(ProductStatus::Inactive),
            "OUT_OF_STOCK" => Ok(ProductStatus::OutOfStock),
            "DISCONTINUED" => Ok(ProductStatus::Discontinued),
            other => Err(DomainError::validation(format!(
                "unknown product status: {other}"
            ))),
        }
    }
}

impl core::fmt::Display for ProductStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Derive the status that a given stock level implies.
///
/// Zero stock always forces OUT_OF_STOCK. Positive stock re-activates a
/// product only if it was OUT_OF_STOCK; INACTIVE and DISCONTINUED are left
/// alone. Every mutation path (create, full update, stock adjustment) goes
/// through this one function so the invariant cannot drift between paths.
pub fn derive_status(current: ProductStatus, new_stock: i64) -> ProductStatus {
    if new_stock == 0 {
        ProductStatus::OutOfStock
    } else if current == ProductStatus::OutOfStock {
        ProductStatus::Active
    } else {
        current
    }
}

/// The product record as persisted and served.
///
/// `product_id` is the store partition key; `category` is denormalized into
/// the secondary index. Wire format is camelCase JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub product_id: ProductId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub category: String,
    pub price: Decimal,
    pub stock_quantity: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manufacturer: Option<String>,
    pub status: ProductStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Apply a signed stock delta, returning the updated record.
    ///
    /// Pure: the caller (the stock adjustment engine) owns the write and its
    /// concurrency discipline. Fails without producing a record when the
    /// delta is zero, overflows, or would drive stock negative.
    pub fn with_stock_delta(&self, delta: i64, now: DateTime<Utc>) -> DomainResult<Product> {
        if delta == 0 {
            return Err(DomainError::validation("stock delta cannot be zero"));
        }

        let new_stock = self
            .stock_quantity
            .checked_add(delta)
            .ok_or_else(|| DomainError::validation("stock delta overflows"))?;

        if new_stock < 0 {
            return Err(DomainError::insufficient_stock(-delta, self.stock_quantity));
        }

        let mut updated = self.clone();
        updated.stock_quantity = new_stock;
        updated.status = derive_status(self.status, new_stock);
        updated.updated_at = now;
        Ok(updated)
    }

    /// Replace every caller-editable field, keeping identity and `created_at`.
    ///
    /// Status follows the same derivation rule as stock adjustment: an
    /// explicit status in the update is the starting point (operator
    /// override), otherwise the existing status is, and the new stock level
    /// then gets the final say on the OUT_OF_STOCK⇄ACTIVE transition.
    pub fn with_update(&self, update: ProductUpdate, now: DateTime<Utc>) -> DomainResult<Product> {
        update.validate()?;

        let base_status = update.status.unwrap_or(self.status);
        Ok(Product {
            product_id: self.product_id,
            name: update.name,
            description: update.description,
            category: update.category,
            price: update.price,
            stock_quantity: update.stock_quantity,
            manufacturer: update.manufacturer,
            status: derive_status(base_status, update.stock_quantity),
            created_at: self.created_at,
            updated_at: now,
        })
    }

    /// Explicit operator status change; no stock-based derivation.
    pub fn with_status(&self, status: ProductStatus, now: DateTime<Utc>) -> Product {
        let mut updated = self.clone();
        updated.status = status;
        updated.updated_at = now;
        updated
    }
}

/// Input for creating a product (identifier and timestamps are assigned by
/// the service, never the caller).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProduct {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub category: String,
    pub price: Decimal,
    pub stock_quantity: i64,
    #[serde(default)]
    pub manufacturer: Option<String>,
    #[serde(default)]
    pub status: Option<ProductStatus>,
}

impl NewProduct {
    pub fn validate(&self) -> DomainResult<()> {
        validate_fields(&self.name, &self.category, self.price, self.stock_quantity)
    }

    /// Materialize the record: assign identity, stamp timestamps, and seed
    /// the status from initial stock unless the caller supplied one.
    pub fn into_product(self, product_id: ProductId, now: DateTime<Utc>) -> DomainResult<Product> {
        self.validate()?;

        let status = self
            .status
            .unwrap_or_else(|| derive_status(ProductStatus::OutOfStock, self.stock_quantity));

        Ok(Product {
            product_id,
            name: self.name,
            description: self.description,
            category: self.category,
            price: self.price,
            stock_quantity: self.stock_quantity,
            manufacturer: self.manufacturer,
            status,
            created_at: now,
            updated_at: now,
        })
    }
}

/// Full-replace update payload (`PUT /products/{id}`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductUpdate {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub category: String,
    pub price: Decimal,
    pub stock_quantity: i64,
    #[serde(default)]
    pub manufacturer: Option<String>,
    #[serde(default)]
    pub status: Option<ProductStatus>,
}

impl ProductUpdate {
    pub fn validate(&self) -> DomainResult<()> {
        validate_fields(&self.name, &self.category, self.price, self.stock_quantity)
    }
}

fn validate_fields(
    name: &str,
    category: &str,
    price: Decimal,
    stock_quantity: i64,
) -> DomainResult<()> {
    if name.trim().is_empty() {
        return Err(DomainError::validation("name cannot be empty"));
    }
    if category.trim().is_empty() {
        return Err(DomainError::validation("category cannot be empty"));
    }
    if price < Decimal::ZERO {
        return Err(DomainError::validation("price cannot be negative"));
    }
    if stock_quantity < 0 {
        return Err(DomainError::validation("stockQuantity cannot be negative"));
    }
    Ok(())
}
